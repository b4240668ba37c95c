//! Response-side types for the handler chain.
//!
//! # Responsibilities
//! - Carry the fully captured upstream outcome back through the chain
//! - Expose the persistence outcome so decorators can observe it
//!
//! # Design Decisions
//! - The body is one buffer shared between the client response and the
//!   session record, so both see identical bytes by construction

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};

/// Fully captured upstream outcome handed back through the chain.
#[derive(Debug)]
pub struct ProxyResponse {
    /// Status delivered to the client (the upstream's own status).
    pub status: StatusCode,
    /// Upstream headers, minus `content-encoding` and `content-length`
    /// when the body was transparently decompressed.
    pub headers: HeaderMap,
    /// The capture buffer; the same bytes are persisted in the session.
    pub body: Bytes,
    /// False when the session insert failed and the exchange was delivered
    /// without an audit record.
    pub recorded: bool,
}
