//! Shared utilities for integration testing.
//!
//! Upstreams (Gemini, the chat gateway, the thumbnail host) are raw TCP
//! mocks speaking just enough HTTP/1.1 for reqwest.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use thumbnail_gateway::{HttpServer, ServiceConfig, Shutdown};

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// e.g. `POST /v1/chat/completions HTTP/1.1`
    pub request_line: String,
    /// Header lines, lowercased names.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Canned reply from a mock backend.
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, content_type: "application/json", body: body.to_string() }
    }

    pub fn raw(status: u16, content_type: &'static str, body: &str) -> Self {
        Self { status, content_type, body: body.to_string() }
    }
}

/// Requests captured by a backend, in arrival order.
pub type Captured = Arc<Mutex<Vec<MockRequest>>>;

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n").filter(|l| !l.is_empty());
    let request_line = lines.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some(MockRequest { request_line, headers, body })
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        402 => "402 Payment Required",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request is recorded in the returned [`Captured`] list before `f`
/// decides the reply.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Captured)
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = captured.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                log.lock().unwrap().push(request.clone());

                let reply = f(request).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text(reply.status),
                    reply.content_type,
                    reply.body.len(),
                    reply.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    (addr, captured)
}

/// Start a mock backend that always returns the same JSON.
pub async fn start_json_backend(status: u16, body: serde_json::Value) -> (SocketAddr, Captured) {
    start_programmable_backend(move |_| {
        let body = body.clone();
        async move { MockResponse::json(status, body) }
    })
    .await
}

/// An address nothing listens on, for transport-failure cases.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config with providers pointed at local mocks and no API keys.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.timeouts.upstream_secs = 5;
    config
}

pub fn with_gemini(mut config: ServiceConfig, addr: SocketAddr) -> ServiceConfig {
    config.providers.gemini.base_url = format!("http://{}/v1beta", addr);
    config.providers.gemini.api_key = Some("gemini-test-key".to_string());
    config
}

pub fn with_gateway(mut config: ServiceConfig, addr: SocketAddr) -> ServiceConfig {
    config.providers.gateway.url = format!("http://{}/v1/chat/completions", addr);
    config.providers.gateway.api_key = Some("gateway-test-key".to_string());
    config
}

/// A running gateway. Dropping it leaves the server running until the test
/// runtime exits; call [`TestGateway::stop`] to drain explicitly.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub reload: mpsc::UnboundedSender<ServiceConfig>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: ServiceConfig) -> TestGateway {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (reload, updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, rx).await;
    });

    TestGateway { addr, shutdown, reload }
}
