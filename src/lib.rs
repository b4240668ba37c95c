//! Transparent HTTP forwarding proxy with durable session capture.
//!
//! Every request under a fixed route prefix is relayed verbatim to one
//! configured upstream; each request/response exchange is recorded as a
//! session for audit and observability.
//!
//! # Architecture Overview
//!
//! ```text
//! inbound request
//!     → http::server (Axum entry, body buffering, RequestCx)
//!     → middleware::MetricsDecorator (outer)
//!     → middleware::LoggingDecorator (inner)
//!     → proxy::Forwarder ───────────────────────→ upstream
//!           │ capture + gzip decompression
//!           └→ store::SessionStore (persist, best effort)
//!     → result back up the chain unchanged
//!     → errors::ApiError translated at the boundary
//! ```

// Core subsystems
pub mod config;
pub mod errors;
pub mod http;
pub mod proxy;
pub mod store;

// Cross-cutting concerns
pub mod middleware;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
