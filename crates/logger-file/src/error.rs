//! Error types for the rotating file writer

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;

/// Result type for rotating writer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while setting up or driving the rotating writer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The log directory could not be created
    #[error("Cannot create log directory {path}: {source}")]
    CreateDirectory {
        /// Directory that was requested
        path: PathBuf,
        /// Filesystem error
        source: io::Error,
    },

    /// Failed to open a log file for appending
    #[error("Failed to open log file at {path}: {source}")]
    Open {
        /// The file that could not be opened
        path: PathBuf,
        /// Filesystem error
        source: io::Error,
    },

    /// Failed to scan the log directory
    #[error("Failed to scan log directory {path}: {source}")]
    Scan {
        /// The directory being scanned
        path: PathBuf,
        /// Filesystem error
        source: io::Error,
    },

    /// Failed to flush or sync the active file
    #[error("{0}: {1}")]
    Io(&'static str, #[source] io::Error),

    /// Every sequence number of the day is already taken
    #[error("No free log file sequence left for {date} in {dir}")]
    SequenceExhausted {
        /// The log directory
        dir: PathBuf,
        /// The day whose sequence ran out
        date: NaiveDate,
    },

    /// The writer configuration is unusable
    #[error("Invalid writer configuration: {0}")]
    Configuration(String),

    /// The writer was constructed outside of a tokio runtime
    #[error("Rotating writer requires a tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The writer task panicked or was aborted
    #[error("Rotating writer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The writer has been closed
    #[error("Rotating writer is closed")]
    Closed,
}
