//! Request-side types for the handler chain.
//!
//! # Responsibilities
//! - Carry the buffered inbound request through the chain
//! - Thread every cross-cutting datum the decorators need as typed fields
//!
//! # Design Decisions
//! - The context is an explicit value object, not ambient request-scoped
//!   storage; decorators clone it before handing the request inward
//! - The path keeps its query string, captured verbatim

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

/// Per-request context threaded explicitly through the handler chain.
#[derive(Debug, Clone)]
pub struct RequestCx {
    /// Inbound method, forwarded unchanged.
    pub method: Method,
    /// Original path and query, captured verbatim.
    pub path: String,
    /// Upstream resource label used by the metrics decorator.
    pub target: String,
}

/// A buffered inbound request ready for forwarding.
#[derive(Debug)]
pub struct ProxyRequest {
    pub cx: RequestCx,
    /// Inbound headers, copied to the outbound request without filtering.
    pub headers: HeaderMap,
    /// Raw inbound body bytes.
    pub body: Bytes,
}
