//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gradebook_requests_total` (counter): requests by method, route, status
//! - `gradebook_request_duration_seconds` (histogram): latency by method, route
//! - `gradebook_logins_total` (counter): login attempts by outcome
//! - `gradebook_guard_rejections_total` (counter): protected route hits without login
//! - `gradebook_writes_total` (counter): committed writes by entity, action
//! - `gradebook_validation_failures_total` (counter): rejected forms by form
//! - `gradebook_active_sessions` (gauge): live sessions
//!
//! Every recorder call is a no-op until [`init_metrics`] installs the exporter.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "gradebook_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gradebook_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_login(outcome: &'static str) {
    counter!("gradebook_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_guard_rejection() {
    counter!("gradebook_guard_rejections_total").increment(1);
}

pub fn record_write(entity: &'static str, action: &'static str) {
    counter!("gradebook_writes_total", "entity" => entity, "action" => action).increment(1);
}

pub fn record_validation_failure(form: &'static str) {
    counter!("gradebook_validation_failures_total", "form" => form).increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("gradebook_active_sessions").set(count as f64);
}

/// Middleware recording count and latency for every routed request.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
