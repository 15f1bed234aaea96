//! Error types for the access log middleware

/// Result type for access log operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while logging a request
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request body could not be buffered
    #[error("Failed to read request body: {0}")]
    ReadBody(#[source] axum::Error),
}
