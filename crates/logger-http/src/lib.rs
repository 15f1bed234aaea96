//! HTTP access logging for axum services, written through a `flogging` sink
//!
//! Each request produces one entry:
//!
//! ```text
//! [HTTP] 2024/05/17 - 09:30:01 | 200 |      1.204ms |       10.0.0.7 | POST     /orders
//! [BODY] Content-Type application/json - {
//!     "id": 7
//! }
//! [ERROR] inventory service timed out
//! ```
//!
//! `[BODY]` appears when body capture is on and the request carried JSON; `[ERROR]` when the
//! handler attached an [`AccessLogError`] to its response.

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod access_log;
mod entry;
mod error;

pub use access_log::{AccessLog, AccessLogError, DEFAULT_BODY_LIMIT, access_log, pretty_json};
pub use entry::{AccessEntry, CapturedBody, truncate_latency};
pub use error::{Error, Result};
