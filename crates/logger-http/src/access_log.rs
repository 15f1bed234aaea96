//! The access log middleware

use crate::entry::{AccessEntry, CapturedBody};
use crate::error::{Error, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use flogging::LogSink;
use serde::Serialize;
use tracing::warn;

/// Largest request body buffered for the log by default
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Access log settings, used as the middleware state
///
/// ```no_run
/// use std::sync::Arc;
///
/// use axum::{Router, middleware, routing::get};
/// use flogging::StderrSink;
/// use flogging_http::{AccessLog, access_log};
///
/// let log = AccessLog::new(Arc::new(StderrSink)).color(true);
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(log, access_log));
/// ```
#[derive(Clone)]
pub struct AccessLog {
    sink: Arc<dyn LogSink>,
    include_body: bool,
    color: bool,
    body_limit: usize,
}

impl AccessLog {
    /// Log to `sink`, without bodies or colors
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            include_body: false,
            color: false,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Capture JSON request bodies into the entry
    #[must_use]
    pub const fn include_body(mut self, include_body: bool) -> Self {
        self.include_body = include_body;
        self
    }

    /// Color status and method
    #[must_use]
    pub const fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Largest body buffered when capturing; bigger bodies are rejected with 400
    #[must_use]
    pub const fn body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

impl std::fmt::Debug for AccessLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessLog")
            .field("include_body", &self.include_body)
            .field("color", &self.color)
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

/// Error text a handler attaches to its response for the `[ERROR]` line
///
/// ```
/// use axum::{Extension, http::StatusCode, response::IntoResponse};
/// use flogging_http::AccessLogError;
///
/// async fn handler() -> impl IntoResponse {
///     (
///         StatusCode::SERVICE_UNAVAILABLE,
///         Extension(AccessLogError::new("database unavailable")),
///         "try again later",
///     )
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessLogError(pub String);

impl AccessLogError {
    /// Wrap a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Middleware writing one access log entry per request.
///
/// Use with [`axum::middleware::from_fn_with_state`] and an [`AccessLog`] state.
pub async fn access_log(State(log): State<AccessLog>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let timestamp = Local::now();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
    let client_ip = client_ip(&request);
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut body = None;
    let mut error = None;
    let response = if log.include_body && is_json(&content_type) {
        match buffer_body(request, log.body_limit).await {
            Ok((request, bytes)) => {
                body = Some(CapturedBody {
                    content_type,
                    text: pretty_json(&bytes),
                });
                next.run(request).await
            }
            Err(e) => {
                warn!("{e}");
                error = Some(e.to_string());
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
        }
    } else {
        next.run(request).await
    };

    let error = error.or_else(|| {
        response
            .extensions()
            .get::<AccessLogError>()
            .map(|e| e.0.clone())
    });

    let entry = AccessEntry {
        timestamp,
        status: response.status(),
        latency: start.elapsed(),
        client_ip,
        method,
        path,
        body,
        error,
    };

    // One write keeps the entry's lines together.
    let _ = log.sink.write(entry.render(log.color).as_bytes());

    response
}

async fn buffer_body(request: Request, limit: usize) -> Result<(Request, Bytes)> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(Error::ReadBody)?;
    let request = Request::from_parts(parts, Body::from(bytes.clone()));
    Ok((request, bytes))
}

fn client_ip(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map_or_else(|| "-".to_string(), ToString::to_string)
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Re-indent a JSON document with four spaces, or return it as text when it is not JSON
pub fn pretty_json(raw: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(raw) else {
        return String::from_utf8_lossy(raw).into_owned();
    };

    let mut out = Vec::with_capacity(raw.len() * 2);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if value.serialize(&mut serializer).is_err() {
        return String::from_utf8_lossy(raw).into_owned();
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
