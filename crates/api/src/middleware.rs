//! Request logging.

use std::time::Instant;

use axum::{
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log one line per request and echo the request id back to the caller.
///
/// An incoming `x-request-id` is reused; otherwise a fresh one is generated.
pub async fn request_log_middleware(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let request_id = extract_request_id(req.headers()).unwrap_or_else(|| Uuid::now_v7().to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(%request_id, %method, %path, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(%request_id, %method, %path, status = status.as_u16(), elapsed_ms, "request handled");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}
