// src/logging_middleware.rs
//! Request logging: one summary line per request, plus bodies at debug level

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{debug, info, Level};

/// Logs method, path, client IP, status and latency of every request
pub async fn log_access(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = client_ip(&request);

    debug!(method = %method, path = %path, client_ip = %client_ip, "Request started");

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        client_ip = %client_ip,
        "Request completed"
    );

    response
}

/// Prefers the first `X-Forwarded-For` hop, then the socket peer address
fn client_ip(request: &Request) -> String {
    forwarded_for(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// Logs request and response bodies when debug logging is enabled
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    // Bodies are only buffered when they would be logged
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body_str) = printable_body(&bytes) {
        debug!(
            method = %parts.method,
            uri = %parts.uri,
            request_body = %body_str,
            "📥 Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body_str) = printable_body(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %body_str,
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// Pretty-printed JSON, raw UTF-8 otherwise; None for empty or binary bodies
fn printable_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let body_str = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(json) => Some(
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string()),
        ),
        Err(_) => Some(body_str.to_string()),
    }
}
