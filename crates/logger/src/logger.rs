//! Core logger trait

use crate::level::Level;
use crate::record::Record;

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// Something that accepts records
pub trait Logger: Send + Sync + 'static {
    /// Log a record
    fn log(&self, record: Record<'_>);

    /// Push buffered output towards its destination
    fn sync(&self);

    /// Check if a level is enabled, before any formatting happens
    fn is_enabled(&self, level: Level) -> bool;
}

/// Extension trait for convenient logging methods
///
/// The message is only rendered when the level is enabled. Records carry the caller's location.
pub trait LoggerExt: Logger {
    /// Log a pre-built `format_args!` message
    #[inline]
    #[track_caller]
    fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.is_enabled(level) {
            let message = match args.as_str() {
                Some(text) => Cow::Borrowed(text),
                None => Cow::Owned(args.to_string()),
            };
            let caller = Location::caller();
            self.log(Record::new(level, message).with_location(caller.file(), caller.line()));
        }
    }

    /// Log at `level`
    #[inline]
    #[track_caller]
    fn log_at(&self, level: Level, msg: impl fmt::Display) {
        if self.is_enabled(level) {
            let caller = Location::caller();
            let record = Record::new(level, msg.to_string());
            self.log(record.with_location(caller.file(), caller.line()));
        }
    }

    /// Log an error
    #[inline]
    #[track_caller]
    fn error(&self, msg: impl fmt::Display) {
        self.log_at(Level::Error, msg);
    }

    /// Log a warning
    #[inline]
    #[track_caller]
    fn warn(&self, msg: impl fmt::Display) {
        self.log_at(Level::Warn, msg);
    }

    /// Log info
    #[inline]
    #[track_caller]
    fn info(&self, msg: impl fmt::Display) {
        self.log_at(Level::Info, msg);
    }

    /// Log debug
    #[inline]
    #[track_caller]
    fn debug(&self, msg: impl fmt::Display) {
        self.log_at(Level::Debug, msg);
    }

    /// Log trace
    #[inline]
    #[track_caller]
    fn trace(&self, msg: impl fmt::Display) {
        self.log_at(Level::Trace, msg);
    }
}

impl<T: Logger + ?Sized> LoggerExt for T {}
