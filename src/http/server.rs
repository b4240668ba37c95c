//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxied routes and `/metrics`
//! - Buffer inbound bodies and thread an explicit request context
//! - Wire the fixed decorator chain around the forwarder
//! - Translate chain errors into client responses at the boundary
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::http::request::{ProxyRequest, RequestCx};
use crate::middleware::{instrument, Handler};
use crate::observability::ProxyMetrics;
use crate::proxy::Forwarder;
use crate::store::SessionStore;

/// Name under which the proxy handler reports metrics.
pub const PROXY_HANDLER: &str = "proxy";

/// Application state injected into handlers.
#[derive(Clone)]
struct AppState {
    chain: Arc<dyn Handler>,
    metrics: Arc<ProxyMetrics>,
    target: String,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wire the handler chain and build the router.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn SessionStore>,
        metrics: Arc<ProxyMetrics>,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let forwarder = Forwarder::new(
            store,
            client,
            config.upstream.base_url.clone(),
            Duration::from_millis(config.upstream.request_timeout_ms),
        );
        let chain = instrument(forwarder, metrics.clone(), PROXY_HANDLER);

        let state = AppState {
            chain: Arc::new(chain),
            metrics,
            target: config.upstream.base_url.clone(),
        };
        let router = Self::build_router(
            &config.upstream.route_prefix,
            config.observability.metrics_enabled,
            state,
        );
        Self { router }
    }

    /// Build the Axum router: any method under the route prefix is
    /// forwarded; `/metrics` serves the exposition.
    fn build_router(prefix: &str, metrics_enabled: bool, state: AppState) -> Router {
        let mut router = Router::new()
            .route(prefix, any(proxy_entry))
            .route(&format!("{prefix}/{{*path}}"), any(proxy_entry));
        if metrics_enabled {
            router = router.route("/metrics", get(metrics_handler));
        }
        router.with_state(state).layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Entry point for all proxied routes: buffers the inbound body, threads
/// the request context through the chain, and translates errors at the
/// boundary. A nil-error outcome already carries the full client response.
async fn proxy_entry(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            return ApiError::Internal(format!("failed to read request body: {error}"))
                .into_response();
        }
    };

    let req = ProxyRequest {
        cx: RequestCx {
            method: parts.method,
            path,
            target: state.target.clone(),
        },
        headers: parts.headers,
        body,
    };

    match state.chain.call(req).await {
        Ok(outcome) => {
            let mut response = Response::new(Body::from(outcome.body));
            *response.status_mut() = outcome.status;
            *response.headers_mut() = outcome.headers;
            response
        }
        Err(error) => error.into_response(),
    }
}

/// Prometheus text exposition.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
