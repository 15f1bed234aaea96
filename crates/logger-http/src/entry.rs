//! Rendering of one access log entry

use std::fmt::Write as _;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Local};

const GREEN: &str = "\x1b[97;42m";
const WHITE: &str = "\x1b[90;47m";
const YELLOW: &str = "\x1b[90;43m";
const RED: &str = "\x1b[97;41m";
const BLUE: &str = "\x1b[97;44m";
const MAGENTA: &str = "\x1b[97;45m";
const CYAN: &str = "\x1b[97;46m";
const RESET: &str = "\x1b[0m";

/// A request body captured for the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedBody {
    /// The request's `Content-Type`
    pub content_type: String,
    /// The body, pretty-printed when it is valid JSON
    pub text: String,
}

/// Everything one access log entry reports
#[derive(Debug, Clone)]
pub struct AccessEntry {
    /// When the request arrived
    pub timestamp: DateTime<Local>,
    /// Response status
    pub status: StatusCode,
    /// Time spent in the inner service
    pub latency: Duration,
    /// Best guess at the client address, `-` when unknown
    pub client_ip: String,
    /// Request method
    pub method: Method,
    /// Path and query
    pub path: String,
    /// Captured request body
    pub body: Option<CapturedBody>,
    /// Error attached by the handler
    pub error: Option<String>,
}

impl AccessEntry {
    /// Render the entry, one or more newline-terminated lines
    pub fn render(&self, color: bool) -> String {
        let (status_color, method_color, reset) = if color {
            (
                status_color(self.status),
                method_color(&self.method),
                RESET,
            )
        } else {
            ("", "", "")
        };

        let latency = format!("{:?}", truncate_latency(self.latency));
        let mut out = format!(
            "[HTTP] {} |{status_color} {:>3} {reset}| {:>13} | {:>15} |{method_color} {:<7} {reset} {}\n",
            self.timestamp.format("%Y/%m/%d - %H:%M:%S"),
            self.status.as_u16(),
            latency,
            self.client_ip,
            self.method.as_str(),
            self.path,
        );

        if let Some(body) = &self.body {
            let _ = writeln!(
                out,
                "[BODY] Content-Type {} - {}",
                body.content_type, body.text
            );
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "[ERROR] {error}");
        }

        out
    }
}

/// Latencies above a minute are shown in whole seconds
pub fn truncate_latency(latency: Duration) -> Duration {
    if latency > Duration::from_secs(60) {
        Duration::from_secs(latency.as_secs())
    } else {
        latency
    }
}

const fn status_color(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => GREEN,
        300..=399 => WHITE,
        400..=499 => YELLOW,
        _ => RED,
    }
}

fn method_color(method: &Method) -> &'static str {
    match *method {
        Method::GET => BLUE,
        Method::POST => CYAN,
        Method::PUT => YELLOW,
        Method::DELETE => RED,
        Method::PATCH => GREEN,
        Method::HEAD => MAGENTA,
        Method::OPTIONS => WHITE,
        _ => RESET,
    }
}
