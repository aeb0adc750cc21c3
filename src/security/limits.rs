//! Request limits.
//!
//! Bodies above `security.max_body_size` are rejected with
//! 413 Payload Too Large before any form parsing.

use tower_http::limit::RequestBodyLimitLayer;

pub fn body_limit_layer(max_body_size: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_body_size)
}
