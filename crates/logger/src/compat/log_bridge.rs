//! Bridge from the `log` crate to the logging front end

use crate::error::{Error, Result};
use crate::level::Level;
use crate::logging::Logging;
use crate::record::Record;

use log::{Log, Metadata, Record as LogRecord};

/// Implements the log crate's `Log` trait on top of [`Logging`]
#[derive(Debug)]
pub struct LogBridge {
    logging: Logging,
}

impl LogBridge {
    /// Forward records to `logging`
    pub const fn new(logging: Logging) -> Self {
        Self { logging }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.logging
            .is_enabled(metadata.target(), Level::from(metadata.level()))
    }

    fn log(&self, record: &LogRecord<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut converted = Record::new(Level::from(record.level()), record.args().to_string());
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            converted = converted.with_location(file, line);
        }

        self.logging.log(record.target(), &converted);
    }

    fn flush(&self) {
        let _ = self.logging.sync();
    }
}

/// Route every `log` record in the process to `logging`.
///
/// Level filtering is left to the log spec, so the `log` max level is opened fully.
///
/// # Errors
///
/// Returns [`Error::Bridge`] if a `log` logger is already set.
pub fn install_log_bridge(logging: &Logging) -> Result<()> {
    // log::set_logger requires a 'static logger
    let bridge = Box::leak(Box::new(LogBridge::new(logging.clone())));
    log::set_logger(bridge).map_err(|e| Error::Bridge("log", e.to_string()))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
