//! HTTP surface for the query pipeline
//!
//! Plain HTTP/1.1 over tokio, one task per connection:
//!
//! - `GET /`        health check
//! - `GET /schema`  table listing
//! - `POST /ask`    `{"question": "..."}` -> pipeline response
//!
//! Pipeline failures come back as 200 with `error` set in the payload. Only an
//! empty question or an unreadable body is a 400.

use crate::error::{AgentError, Result};
use crate::pipeline::QueryPipeline;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

const MAX_HEADER_BYTES: usize = 16 * 1024;
const MAX_BODY_BYTES: usize = 1024 * 1024;
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Why a request could not be read off the socket.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The client sent something we answer with `status` instead of routing.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    fn bad_request(message: &str) -> Self {
        ReadError::Rejected { status: 400, message: message.to_string() }
    }

    fn too_large(message: &str) -> Self {
        ReadError::Rejected { status: 413, message: message.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self::json(status, &serde_json::json!({ "detail": detail.into() }))
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            413 => "Payload Too Large",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason());
        out.push_str("Content-Type: application/json\r\n");
        out.push_str("Access-Control-Allow-Origin: *\r\n");
        out.push_str("Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n");
        out.push_str("Access-Control-Allow-Headers: *\r\n");
        out.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        out.push_str("Connection: close\r\n\r\n");
        out.push_str(&self.body);
        out
    }
}

#[derive(Debug, Deserialize)]
struct QuestionRequest {
    question: String,
}

/// Accept connections forever, one spawned task each.
pub async fn serve(listener: TcpListener, pipeline: Arc<QueryPipeline>) -> Result<()> {
    info!("Server listening on {}", listener.local_addr()?);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                tokio::spawn(handle_connection(stream, pipeline.clone()));
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, pipeline: Arc<QueryPipeline>) {
    let response = match read_request(&mut stream).await {
        Ok(request) => handle_request(&pipeline, &request).await,
        Err(ReadError::Rejected { status, message }) => HttpResponse::detail(status, message),
        Err(ReadError::Io(e)) => {
            warn!("Failed to read request: {}", e);
            return;
        }
    };

    if let Err(e) = stream.write_all(response.to_http().as_bytes()).await {
        error!("Failed to write response: {}", e);
    }
    let _ = stream.shutdown().await;
}

/// Read one request: head up to the blank line, then `Content-Length` bytes.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> std::result::Result<HttpRequest, ReadError> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(ReadError::too_large("Request headers too large"));
        }
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(ReadError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before request head",
            )));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m.to_string(), t.to_string()),
        _ => return Err(ReadError::bad_request("Malformed request line")),
    };

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let content_length = match headers.get("content-length") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ReadError::bad_request("Invalid Content-Length"))?,
        None => 0,
    };
    if content_length > MAX_BODY_BYTES {
        return Err(ReadError::too_large("Request body too large"));
    }

    let mut body = buffer[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(HttpRequest {
        method,
        path: normalize_path(&target),
        headers,
        body,
    })
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Drop the query string and any trailing slash (except for the root).
fn normalize_path(target: &str) -> String {
    let path = target.split('?').next().unwrap_or("/");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

pub async fn handle_request(pipeline: &QueryPipeline, request: &HttpRequest) -> HttpResponse {
    debug!("Request: {} {}", request.method, request.path);

    match (request.method.as_str(), request.path.as_str()) {
        ("OPTIONS", _) => HttpResponse {
            status: 204,
            body: String::new(),
        },
        ("GET", "/") => HttpResponse::json(
            200,
            &serde_json::json!({
                "status": "healthy",
                "message": "E-commerce AI Data Agent is running!"
            }),
        ),
        ("GET", "/schema") => HttpResponse::json(200, &pipeline.schema().tables_json()),
        ("POST", "/ask") => ask(pipeline, &request.body).await,
        _ => HttpResponse::detail(404, "Not Found"),
    }
}

async fn ask(pipeline: &QueryPipeline, body: &[u8]) -> HttpResponse {
    let request: QuestionRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return HttpResponse::detail(400, format!("Invalid request body: {}", e)),
    };

    match pipeline.answer(&request.question).await {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(value) => HttpResponse::json(200, &value),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                HttpResponse::detail(500, "Failed to serialize response")
            }
        },
        Err(AgentError::ClientInput(msg)) => HttpResponse::detail(400, msg),
        Err(e) => {
            error!("Error in /ask: {}", e);
            HttpResponse::detail(500, e.to_string())
        }
    }
}
