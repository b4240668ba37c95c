//! Error taxonomy and boundary translation.
//!
//! # Responsibilities
//! - Define the closed set of errors the handler chain can surface
//! - Map each error to its client-visible status and JSON body
//! - Log one line per translated error at the boundary
//!
//! # Design Decisions
//! - A closed enum instead of runtime type inspection: decorators and the
//!   translator match exhaustively, and a new kind is a compile error
//! - `BadGateway` displays as "Timeout" and carries the underlying failure
//!   text separately; the detail reaches the session record and the logs,
//!   never the client
//! - Store failures live in `store::StoreError` and are absorbed where they
//!   occur; they never enter this taxonomy

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by the proxy handler chain.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Inbound body was not parseable JSON.
    #[error("invalid JSON request")]
    BadRequest,

    /// Request parameters failed validation; carries the field → message
    /// map reported to the client.
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    /// Local construction or decoding failure.
    #[error("{0}")]
    Internal(String),

    /// Upstream unreachable or timed out.
    #[error("Timeout")]
    BadGateway {
        /// Underlying failure text, recorded in the session and the logs.
        detail: String,
    },
}

impl ApiError {
    /// Client-visible status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable kind label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest => "bad_request",
            ApiError::Validation(_) => "validation",
            ApiError::Internal(_) => "internal",
            ApiError::BadGateway { .. } => "bad_gateway",
        }
    }
}

/// Serialize the standard `{"error": ...}` body.
///
/// The forwarder persists failure bodies through this same helper, so the
/// bytes stored in a session match the bytes the translator delivers.
pub fn error_body(message: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "error": message })).unwrap_or_default()
}

fn validation_body(errors: &BTreeMap<String, String>) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "errors": errors })).unwrap_or_default()
}

impl IntoResponse for ApiError {
    /// Terminal translation point: every error leaving the chain becomes a
    /// JSON response here.
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(status = status.as_u16(), error = %self, "request failed");

        let body = match &self {
            ApiError::Validation(errors) => validation_body(errors),
            other => error_body(&other.to_string()),
        };
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
