//! Rotating log file writer with a single background writer task
//!
//! This crate provides the file sink behind `flogging`:
//! - Non-blocking writes from any number of producers into an unbounded FIFO
//! - One tokio task performing all file I/O, in queue order
//! - Rotation on calendar day or on size, checked before every buffer
//! - Retention of the newest `max_file_count` files in size mode
//! - Recovery of the rotation sequence from the files already on disk
//!
//! Files are named `{prefix}{YYYY-MM-DD}_{NNNN}.log`; those names are the only rotation state.

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

pub mod active;
pub mod clock;
mod config;
mod error;
pub mod naming;
pub mod policy;
pub mod queue;
pub mod scanner;
mod stats;
mod worker;
mod writer;

pub use active::ActiveFile;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_SIZE, RotationModel, WriterConfig, WriterConfigBuilder,
};
pub use error::{Error, Result};
pub use policy::must_rotate;
pub use scanner::ScanResult;
pub use stats::WriterStats;
pub use writer::RotatingWriter;
