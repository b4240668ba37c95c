//! Request forwarding pipeline.
//!
//! # Responsibilities
//! - Build the outbound request (verbatim method, path, headers, body)
//! - Issue it against the fixed upstream within the per-request timeout
//! - Capture the response, transparently decompressing gzip bodies
//! - Finalize and persist one session record per request, on every path
//!
//! # Design Decisions
//! - The captured buffer is the one handed to the client response, so
//!   persisted bytes equal delivered bytes by construction
//! - Failure paths persist the exact body the error translator delivers
//! - Persistence is best effort: a store failure only clears the
//!   `recorded` flag and is logged where it happens

use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::response::Parts;
use axum::http::{header, HeaderMap, Request};
use flate2::read::GzDecoder;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;

use crate::errors::{error_body, ApiError};
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyResponse;
use crate::middleware::Handler;
use crate::store::{RequestParams, SessionRecord, SessionStore};

/// Failures of the upstream exchange, unified so the failure path records
/// one human-readable description.
#[derive(Debug, Error)]
enum UpstreamError {
    #[error("{0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    #[error("{0}")]
    Read(axum::Error),

    #[error("upstream request timed out after {0:?}")]
    TimedOut(Duration),
}

/// Forwards every request to the fixed upstream and records a session for
/// each exchange.
pub struct Forwarder {
    store: Arc<dyn SessionStore>,
    client: Client<HttpConnector, Body>,
    upstream_base: String,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(
        store: Arc<dyn SessionStore>,
        client: Client<HttpConnector, Body>,
        upstream_base: String,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            client,
            upstream_base,
            timeout,
        }
    }

    /// Issue the outbound call and collect the full response body, bounded
    /// by the per-request timeout (connect through last body byte).
    async fn exchange(&self, outbound: Request<Body>) -> Result<(Parts, Bytes), UpstreamError> {
        let fetch = async {
            let response = self.client.request(outbound).await?;
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(UpstreamError::Read)?;
            Ok((parts, bytes))
        };
        tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| UpstreamError::TimedOut(self.timeout))?
    }

    /// Best-effort persistence; a failure is logged and reflected only in
    /// the returned flag.
    async fn persist(&self, session: &SessionRecord) -> bool {
        match self.store.insert_session(session).await {
            Ok(_) => true,
            Err(error) => {
                tracing::error!(
                    session_id = %session.id,
                    error = %error,
                    "failed to insert session"
                );
                false
            }
        }
    }

    /// Failure-finalize the session with the exact body the translator
    /// will deliver, persist it, and hand the error back.
    async fn fail(&self, mut session: SessionRecord, error: ApiError, started: Instant) -> ApiError {
        let detail = match &error {
            ApiError::BadGateway { detail } => detail.clone(),
            other => other.to_string(),
        };
        session.finalize_failure(
            error_body(&error.to_string()),
            detail,
            error.status_code().as_u16(),
            started.elapsed(),
        );
        self.persist(&session).await;
        error
    }
}

#[async_trait]
impl Handler for Forwarder {
    async fn call(&self, req: ProxyRequest) -> Result<ProxyResponse, ApiError> {
        let started = Instant::now();

        // Malformed JSON is rejected before any session exists. The parsed
        // params are not validated further; the upstream owns that contract.
        let _params: RequestParams =
            serde_json::from_slice(&req.body).map_err(|_| ApiError::BadRequest)?;

        let mut session = SessionRecord::new(req.cx.path.clone(), req.body.to_vec());

        let uri = format!("{}{}", self.upstream_base, req.cx.path);
        let mut outbound = match Request::builder()
            .method(req.cx.method.clone())
            .uri(uri.as_str())
            .body(Body::from(req.body.clone()))
        {
            Ok(outbound) => outbound,
            Err(error) => {
                let error = ApiError::Internal(format!("failed to build upstream request: {error}"));
                return Err(self.fail(session, error, started).await);
            }
        };
        *outbound.headers_mut() = req.headers.clone();

        let (parts, raw) = match self.exchange(outbound).await {
            Ok(exchange) => exchange,
            Err(error) => {
                let error = ApiError::BadGateway {
                    detail: error.to_string(),
                };
                return Err(self.fail(session, error, started).await);
            }
        };

        let status = parts.status;
        let mut headers = parts.headers;

        let body = if is_gzip(&headers) {
            match gunzip(&raw) {
                Ok(decoded) => {
                    headers.remove(header::CONTENT_ENCODING);
                    // The upstream's length describes the compressed bytes.
                    headers.remove(header::CONTENT_LENGTH);
                    Bytes::from(decoded)
                }
                Err(error) => {
                    let error =
                        ApiError::Internal(format!("failed to decompress gzip response: {error}"));
                    return Err(self.fail(session, error, started).await);
                }
            }
        } else {
            raw
        };

        session.finalize_success(&body, status.as_u16(), started.elapsed());
        let recorded = self.persist(&session).await;

        Ok(ProxyResponse {
            status,
            headers,
            body,
            recorded,
        })
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("gzip"))
        .unwrap_or(false)
}

fn gunzip(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(raw);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(decoded)
}
