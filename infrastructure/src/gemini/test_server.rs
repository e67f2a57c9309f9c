//! Minimal HTTP/1.1 stub for adapter tests.
//!
//! Serves one scripted response per connection and records every request.
//! Responses carry `Connection: close` so the client opens a new connection
//! for the next request.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub(crate) struct StubResponse {
    status: u16,
    content_type: &'static str,
    chunks: Vec<Vec<u8>>,
    delay: Duration,
    stall_after: Option<Duration>,
}

impl StubResponse {
    pub(crate) fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            chunks: vec![body.to_string().into_bytes()],
            delay: Duration::ZERO,
            stall_after: None,
        }
    }

    /// An SSE body sent as the given raw pieces, which need not align with
    /// event boundaries
    pub(crate) fn sse_raw(pieces: Vec<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream",
            chunks: pieces,
            delay: Duration::from_millis(10),
            stall_after: None,
        }
    }

    /// An SSE body with one `data:` event per value
    pub(crate) fn sse(events: &[serde_json::Value]) -> Self {
        Self::sse_raw(
            events
                .iter()
                .map(|event| format!("data: {}\r\n\r\n", event).into_bytes())
                .collect(),
        )
    }

    /// Keep the connection open without sending anything after the last chunk,
    /// leaving the body incomplete
    pub(crate) fn stall_after(mut self, stall: Duration) -> Self {
        self.stall_after = Some(stall);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub(crate) target: String,
    headers: Vec<(String, String)>,
    pub(crate) body: String,
}

impl CapturedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub(crate) struct StubServer {
    pub(crate) base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    pub(crate) async fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            for response in responses {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    serve(socket, response, captured).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub(crate) fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut socket: TcpStream,
    response: StubResponse,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    captured.lock().unwrap().push(request);

    let mut total: usize = response.chunks.iter().map(Vec::len).sum();
    if response.stall_after.is_some() {
        // Promise more body than is ever sent so the client keeps waiting
        total += 1024;
    }
    let head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status, response.content_type, total
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    for chunk in &response.chunks {
        if socket.write_all(chunk).await.is_err() {
            return;
        }
        let _ = socket.flush().await;
        tokio::time::sleep(response.delay).await;
    }
    if let Some(stall) = response.stall_after {
        tokio::time::sleep(stall).await;
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?;
    let target = request_line.split_whitespace().nth(1)?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buffer[header_end..]).to_string();

    Some(CapturedRequest {
        target,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
