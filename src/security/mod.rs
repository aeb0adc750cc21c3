//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (reject oversized bodies)
//!     → session cookie + guard (auth module)
//!     → handler
//! Outgoing response:
//!     → headers.rs (nosniff, frame denial, referrer policy)
//! ```

pub mod headers;
pub mod limits;
