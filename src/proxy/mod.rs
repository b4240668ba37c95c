//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (buffered inbound request)
//!     → forwarder.rs (outbound call, capture, decompression)
//!     → store::SessionStore (finalize + persist, best effort)
//!     → ProxyResponse or ApiError back to the decorators
//! ```

pub mod forwarder;

pub use forwarder::Forwarder;
