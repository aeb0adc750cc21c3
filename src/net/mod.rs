//! Network transport.
//!
//! Plain TCP is served directly by axum. When `listener.tls` is configured
//! the same socket is handed to axum-server with the rustls acceptor built
//! here.

pub mod tls;
