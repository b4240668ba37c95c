//! End-to-end tests for the forwarding pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use audit_proxy::observability::ProxyMetrics;
use audit_proxy::store::{
    MemorySessionStore, SessionRecord, SessionStore, SessionUpdate, StoreError,
};
use common::{params_body, start_mock_upstream, start_proxy, MockResponse, ROUTE_PREFIX};
use uuid::Uuid;

async fn wait_for_server() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn forwards_request_and_records_session() {
    let upstream =
        start_mock_upstream(|_| MockResponse::ok("hello world").with_header("X-Upstream", "yes"))
            .await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, store.clone(), metrics).await;
    wait_for_server().await;

    let body = params_body();
    let response = test_client()
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments?mode=sync"))
        .header("content-type", "application/json")
        .body(body.clone())
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-upstream").unwrap(), "yes");
    let delivered = response.bytes().await.unwrap();
    assert_eq!(&delivered[..], b"hello world");

    let sessions = store.all();
    assert_eq!(sessions.len(), 1);
    let session = &sessions[0];
    assert_eq!(session.path, format!("{ROUTE_PREFIX}/payments?mode=sync"));
    assert_eq!(session.request_body, body.as_bytes());
    assert_eq!(session.response_body.as_deref(), Some(&delivered[..]));
    assert_eq!(session.status, Some(200));
    assert!(session.error.is_empty());
    assert!(session.duration_ms.unwrap() >= 0);
}

#[tokio::test]
async fn inbound_request_is_forwarded_verbatim() {
    let seen = Arc::new(std::sync::Mutex::new(String::new()));
    let capture = seen.clone();
    let upstream = start_mock_upstream(move |request| {
        *capture.lock().unwrap() = request.to_string();
        MockResponse::ok("ok")
    })
    .await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, store, metrics).await;
    wait_for_server().await;

    let body = params_body();
    let response = test_client()
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .header("x-terminal-key", "abc123")
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let request = seen.lock().unwrap().to_lowercase();
    // Full original path (prefix included), custom header, and exact body.
    assert!(request.starts_with(&format!("post {ROUTE_PREFIX}/payments http/1.1").to_lowercase()));
    assert!(request.contains("x-terminal-key: abc123"));
    assert!(request.ends_with(&body.to_lowercase()));
}

#[tokio::test]
async fn gzip_response_is_decompressed_for_client_and_session() {
    let upstream = start_mock_upstream(|_| MockResponse::gzipped(b"hello")).await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, store.clone(), metrics).await;
    wait_for_server().await;

    let response = test_client()
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .body(params_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    let delivered = response.bytes().await.unwrap();
    assert_eq!(&delivered[..], b"hello");

    let sessions = store.all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, Some(200));
    assert_eq!(sessions[0].response_body.as_deref(), Some(b"hello".as_slice()));
}

#[tokio::test]
async fn upstream_timeout_yields_bad_gateway_and_persisted_failure() {
    let upstream =
        start_mock_upstream(|_| MockResponse::ok("late").with_delay(Duration::from_secs(2))).await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 200, store.clone(), metrics).await;
    wait_for_server().await;

    let response = test_client()
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .body(params_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let delivered = response.bytes().await.unwrap();
    assert_eq!(&delivered[..], br#"{"error":"Timeout"}"#);

    let sessions = store.all();
    assert_eq!(sessions.len(), 1);
    let session = &sessions[0];
    assert_eq!(session.status, Some(502));
    assert!(!session.error.is_empty());
    // The synthesized body is both delivered and persisted.
    assert_eq!(session.response_body.as_deref(), Some(&delivered[..]));
    assert!(session.duration_ms.unwrap() >= 0);
}

#[tokio::test]
async fn malformed_body_is_rejected_before_any_session_exists() {
    let upstream = start_mock_upstream(|_| MockResponse::ok("unused")).await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, store.clone(), metrics).await;
    wait_for_server().await;

    let response = test_client()
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let delivered = response.bytes().await.unwrap();
    assert_eq!(&delivered[..], br#"{"error":"invalid JSON request"}"#);
    assert!(store.is_empty());
}

#[tokio::test]
async fn session_ids_are_unique_across_requests() {
    let upstream = start_mock_upstream(|_| MockResponse::ok("ok")).await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, store.clone(), metrics).await;
    wait_for_server().await;

    let client = test_client();
    for _ in 0..3 {
        let response = client
            .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
            .body(params_body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let sessions = store.all();
    assert_eq!(sessions.len(), 3);
    let mut ids: Vec<Uuid> = sessions.iter().map(|session| session.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn request_counter_increments_once_per_request() {
    let upstream = start_mock_upstream(|_| MockResponse::ok("ok")).await;
    let store = Arc::new(MemorySessionStore::new());
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, store, metrics).await;
    wait_for_server().await;

    let client = test_client();
    let ok = client
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .body(params_body())
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);

    let rejected = client
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);

    let exposition = client
        .get(format!("http://{proxy}/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    // One increment per completed request, success or failure.
    assert!(exposition.contains(r#"proxy_requests_total{handler="proxy"} 2"#));
    assert!(exposition.contains(r#"proxy_responses_total{status="200"} 1"#));
    assert!(exposition.contains(r#"proxy_responses_total{status="400"} 1"#));
    assert!(exposition.contains(r#"kind="bad_request""#));
}

/// Store whose inserts always fail, for exercising the recorded=false path.
struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn insert_session(&self, _record: &SessionRecord) -> Result<Uuid, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn update_session(&self, id: Uuid, _update: &SessionUpdate) -> Result<(), StoreError> {
        Err(StoreError::NotFound(id))
    }
}

#[tokio::test]
async fn store_failure_still_delivers_the_response_and_is_counted() {
    let upstream = start_mock_upstream(|_| MockResponse::ok("hello")).await;
    let metrics = Arc::new(ProxyMetrics::new().unwrap());
    let proxy = start_proxy(upstream, 2_000, Arc::new(FailingStore), metrics.clone()).await;
    wait_for_server().await;

    let response = test_client()
        .post(format!("http://{proxy}{ROUTE_PREFIX}/payments"))
        .body(params_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(&response.bytes().await.unwrap()[..], b"hello");

    let exposition = metrics.render();
    assert!(exposition.contains(r#"proxy_sessions_unrecorded_total{handler="proxy"} 1"#));
}
