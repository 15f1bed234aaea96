//! Leveled, module-aware logging on top of the rotating file writer
//!
//! - [`Logging`] holds the current [`LogSpec`], [`Formatter`] and [`LogSink`]
//! - [`ModuleLogger`]s are cheap named handles that filter before formatting
//! - [`LoggingFactory`] builds the whole stack from a [`LoggingConfig`]
//! - `compat` forwards `tracing` events and `log` records into the same sink
//!
//! ```no_run
//! use flogging::{LoggerExt, LoggingFactory};
//!
//! # async fn run() -> flogging::Result<()> {
//! let mut factory = LoggingFactory::builder("http=debug:info", "server")
//!     .root_dir("/var/log/server")
//!     .build();
//! let logging = factory.init().await?;
//!
//! logging.logger("http").debug("listening on :8080");
//! factory.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

pub mod compat;
mod error;
pub mod factory;
pub mod format;
mod level;
mod log_spec;
mod logger;
mod logging;
mod record;
mod sink;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{Error, Result};
pub use factory::{LoggingConfig, LoggingFactory, LoggingFactoryBuilder};
pub use format::{DEFAULT_FORMAT, Formatter};
pub use level::Level;
pub use log_spec::LogSpec;
pub use logger::{Logger, LoggerExt};
pub use logging::{Logging, LoggingSetup, ModuleLogger};
pub use record::Record;
pub use sink::{LogSink, StderrSink, StdoutSink};

pub use flogging_file::{RotatingWriter, RotationModel, WriterConfig};
