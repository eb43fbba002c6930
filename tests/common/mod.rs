//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use credential_gateway::config::GatewayConfig;
use credential_gateway::lifecycle::startup::build_gateway;
use credential_gateway::security::AdmissionLimiter;
use credential_gateway::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const SECRET: &str = "test-bearer-secret";
pub const KEY: &str = "0123456789abcdef0123456789abcdef";

/// What a mock upstream has seen.
#[derive(Clone, Default)]
pub struct UpstreamLog {
    calls: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl UpstreamLog {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.bodies
            .lock()
            .unwrap()
            .last()
            .map(|b| serde_json::from_str(b).unwrap())
    }
}

/// Read one HTTP/1.1 request and return (request line, body).
async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
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
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request_line = head.lines().next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some((request_line, body))
}

/// Start a mock signin endpoint answering every request with `status` and
/// the JSON `body`.
pub async fn start_mock_upstream(status: u16, body: &'static str) -> (SocketAddr, UpstreamLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = UpstreamLog::default();
    let server_log = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let log = server_log.clone();
                    tokio::spawn(async move {
                        let Some((request_line, request_body)) = read_request(&mut socket).await else {
                            return;
                        };
                        assert!(request_line.starts_with("POST /signin"), "unexpected request: {}", request_line);
                        log.calls.fetch_add(1, Ordering::SeqCst);
                        log.bodies.lock().unwrap().push(request_body);

                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// Config pointing at a plain-HTTP upstream on `upstream`.
pub fn gateway_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.security.bearer_secret = SECRET.into();
    config.security.encryption_key = KEY.into();
    config.upstream.host = upstream.ip().to_string();
    config.upstream.port = upstream.port().to_string();
    config.upstream.protocol = "http".into();
    config.upstream.timeout_secs = 5;
    config
}

/// A gateway serving on an ephemeral port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub limiter: Arc<AdmissionLimiter>,
    pub shutdown: Shutdown,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let (gateway, limiter) = build_gateway(&config).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, gateway);
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningGateway {
        addr,
        limiter,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn signin_body() -> serde_json::Value {
    serde_json::json!({ "ns": "test", "db": "test", "user": "root", "pass": "root" })
}
