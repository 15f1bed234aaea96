//! Error types for the logging front end

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring the logging front end
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A level name was not recognised
    #[error("Unknown log level {0:?}")]
    InvalidLevel(String),

    /// A log spec could not be parsed
    #[error("Invalid log spec {spec:?}: {reason}")]
    InvalidSpec {
        /// The spec as given
        spec: String,
        /// What was wrong with it
        reason: String,
    },

    /// A format string could not be parsed
    #[error("Invalid log format: {0}")]
    Format(String),

    /// A TOML configuration could not be decoded
    #[error("Failed to parse logging configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The rotating file sink failed
    #[error(transparent)]
    Writer(#[from] flogging_file::Error),

    /// Logging was used before `init`
    #[error("Logging has not been initialised")]
    NotInitialized,

    /// A global bridge could not be installed
    #[error("Failed to install {0} bridge: {1}")]
    Bridge(&'static str, String),
}
