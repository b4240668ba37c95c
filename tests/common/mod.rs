//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use audit_proxy::config::AppConfig;
use audit_proxy::observability::ProxyMetrics;
use audit_proxy::store::SessionStore;
use audit_proxy::HttpServer;

/// Route prefix the default config proxies under.
pub const ROUTE_PREFIX: &str = "/api/v1/service";

/// A canned upstream response.
#[derive(Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Delay before answering, for timeout tests.
    pub delay: Duration,
}

#[allow(dead_code)]
impl MockResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// A 200 response whose body is the gzip encoding of `body`.
    pub fn gzipped(body: &[u8]) -> Self {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).unwrap();
        let compressed = encoder.finish().unwrap();

        Self {
            status: 200,
            headers: vec![("Content-Encoding".to_string(), "gzip".to_string())],
            body: compressed,
            delay: Duration::ZERO,
        }
    }
}

/// Start a programmable mock upstream; returns its bound address. Each
/// connection reads one request (passed to `respond` as raw text) and
/// answers with the canned response.
pub async fn start_mock_upstream<F>(respond: F) -> SocketAddr
where
    F: Fn(&str) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let respond = respond.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let response = respond(&request);
                        if !response.delay.is_zero() {
                            tokio::time::sleep(response.delay).await;
                        }
                        let _ = socket.write_all(&encode_response(&response)).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request (head plus content-length body) as text.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = find_head_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= head_end + content_length {
                return String::from_utf8_lossy(&buf[..head_end + content_length]).to_string();
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

fn encode_response(response: &MockResponse) -> Vec<u8> {
    let reason = match response.status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "OK",
    };

    let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, reason).into_bytes();
    for (name, value) in &response.headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            response.body.len()
        )
        .as_bytes(),
    );
    out.extend_from_slice(&response.body);
    out
}

/// Spawn the proxy against the given upstream; returns its bound address.
pub async fn start_proxy(
    upstream: SocketAddr,
    timeout_ms: u64,
    store: Arc<dyn SessionStore>,
    metrics: Arc<ProxyMetrics>,
) -> SocketAddr {
    let mut config = AppConfig::default();
    config.upstream.base_url = format!("http://{upstream}");
    config.upstream.request_timeout_ms = timeout_ms;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, store, metrics);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}

/// A request body the forwarder accepts as valid params JSON.
#[allow(dead_code)]
pub fn params_body() -> String {
    serde_json::json!({
        "terminalId": "T-100",
        "amount": 1250,
        "dateTime": "2025-01-15T10:00:00Z",
        "async": false,
        "keyName": "primary",
        "message": "ping"
    })
    .to_string()
}
