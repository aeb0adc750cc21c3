//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, sessions, metrics)
//! - Serve over plain TCP or TLS
//! - Sweep expired sessions in the background
//! - Apply hot-reloaded configuration

use arc_swap::ArcSwap;
use axum::{middleware, Router};
use axum_server::Handle;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::time;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GradebookConfig;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::security::{headers::security_headers, limits::body_limit_layer};
use crate::session::{session_middleware, SessionStore};
use crate::storage::{DbPool, StorageError};
use crate::{auth, gradebook};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub sessions: SessionStore,
    settings: Arc<ArcSwap<GradebookConfig>>,
}

impl AppState {
    pub fn new(config: GradebookConfig, db: DbPool) -> Self {
        let sessions = SessionStore::new(Duration::from_secs(config.session.ttl_secs));
        Self {
            db,
            sessions,
            settings: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<GradebookConfig> {
        self.settings.load_full()
    }

    /// Swap in the reloadable sections of `incoming`.
    pub fn apply_reload(&self, incoming: &GradebookConfig) {
        let current = self.settings.load();
        let (merged, restart_required) = current.merge_reloadable(incoming);
        for section in restart_required {
            tracing::warn!(section, "Config section changed but requires a restart to apply");
        }
        if merged != **current {
            self.settings.store(Arc::new(merged));
            tracing::info!("Configuration reloaded");
        }
    }
}

/// HTTP server for the gradebook.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Open the configured database and build the router.
    pub fn new(config: GradebookConfig) -> Result<Self, StorageError> {
        let db = DbPool::open(&config.database)?;
        Ok(Self::with_pool(config, db))
    }

    pub fn with_pool(config: GradebookConfig, db: DbPool) -> Self {
        let state = AppState::new(config, db);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config();

        let mut router = Router::new()
            .merge(auth::routes())
            .merge(gradebook::teacher_routes())
            .merge(gradebook::public_routes())
            .layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            ))
            .layer(middleware::from_fn(metrics::track_requests))
            .with_state(state);

        if config.security.enable_headers {
            router = security_headers(router);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(propagate_request_id_layer())
                .layer(body_limit_layer(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GradebookConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let config = self.state.config();

        tokio::spawn(sweep_sessions(
            self.state.sessions.clone(),
            Duration::from_secs(config.session.sweep_interval_secs),
            shutdown.resubscribe(),
        ));
        tokio::spawn(apply_config_updates(
            self.state.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        if let Some(tls) = &config.listener.tls {
            let rustls = load_tls_config(&tls.cert_path, &tls.key_path).await?;
            tracing::info!(address = %addr, "HTTPS server starting");

            let handle = Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                let _ = shutdown.recv().await;
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(
                    config.timeouts.request_secs,
                )));
            });

            axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                .handle(handle)
                .serve(self.router.into_make_service())
                .await?;
        } else {
            tracing::info!(address = %addr, "HTTP server starting");

            axum::serve(listener, self.router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.recv().await;
                })
                .await?;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn sweep_sessions(
    sessions: SessionStore,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = sessions.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = sessions.len(), "Expired sessions purged");
                }
                metrics::record_active_sessions(sessions.len());
            }
            _ = shutdown.recv() => break,
        }
    }
}

async fn apply_config_updates(
    state: AppState,
    mut updates: mpsc::UnboundedReceiver<GradebookConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => state.apply_reload(&config),
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}
