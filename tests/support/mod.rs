//! Minimal stub HTTP backend for integration tests.
//!
//! Listens on an ephemeral local port, answers each request with a canned
//! status and JSON body keyed by `"METHOD /path"` (query string ignored for
//! routing), and records every hit so tests can assert which endpoints were
//! touched and how often.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// One request as seen by the stub: `"METHOD /path?query"` plus the
/// `Authorization` header value, if any.
#[derive(Clone)]
pub struct ReceivedRequest {
    pub target: String,
    pub authorization: Option<String>,
}

pub struct StubBackend {
    base_url: String,
    hits: Arc<Mutex<Vec<ReceivedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubBackend {
    /// Bind an ephemeral port and serve the given routes until dropped.
    /// Route keys look like `"GET /api/balance"`; unmatched requests get
    /// a 404 with an empty JSON body.
    pub async fn start(routes: Vec<(&str, CannedResponse)>) -> Self {
        let routes: HashMap<String, CannedResponse> = routes
            .into_iter()
            .map(|(key, response)| (key.to_string(), response))
            .collect();
        let hits: Arc<Mutex<Vec<ReceivedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}/api");

        let hits_for_server = Arc::clone(&hits);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let hits = Arc::clone(&hits_for_server);
                tokio::spawn(async move {
                    serve_connection(stream, routes, hits).await;
                });
            }
        });

        Self {
            base_url,
            hits,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Every request seen so far, as `"METHOD /path?query"` in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .map(|hit| hit.target.clone())
            .collect()
    }

    /// Number of requests whose `"METHOD /path"` (query stripped) matches.
    pub fn hit_count(&self, key: &str) -> usize {
        self.hits()
            .iter()
            .filter(|hit| strip_query(hit) == key)
            .count()
    }

    /// The `Authorization` header of the most recent request matching
    /// `"METHOD /path"` (query stripped), if that request carried one.
    pub fn last_authorization(&self, key: &str) -> Option<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|hit| strip_query(&hit.target) == key)
            .and_then(|hit| hit.authorization.clone())
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn strip_query(hit: &str) -> &str {
    hit.split('?').next().unwrap_or(hit)
}

async fn serve_connection(
    mut stream: tokio::net::TcpStream,
    routes: HashMap<String, CannedResponse>,
    hits: Arc<Mutex<Vec<ReceivedRequest>>>,
) {
    let Some(received) = read_request(&mut stream).await else {
        return;
    };
    let route_key = strip_query(&received.target).to_string();
    hits.lock().unwrap().push(received);
    let response = routes
        .get(&route_key)
        .cloned()
        .unwrap_or_else(|| CannedResponse::json(404, "{}"));

    let reason = match response.status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let payload = format!(
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(payload.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Read one HTTP/1.1 request (headers plus Content-Length body), or None
/// if the stream closed early.
async fn read_request(stream: &mut tokio::net::TcpStream) -> Option<ReceivedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > 64 * 1024 {
            return None;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let request_line = head.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;

    let header = |name: &str| {
        head.lines()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim().to_string())
    };
    let content_length = header("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    let authorization = header("authorization");

    // Drain the body so the client sees a clean connection close.
    let body_start = header_end + 4;
    let mut received = buffer.len().saturating_sub(body_start);
    while received < content_length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        received += read;
    }

    Some(ReceivedRequest {
        target: format!("{method} {target}"),
        authorization,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}
