//! Log record type

use crate::level::Level;

use std::borrow::Cow;

use chrono::{DateTime, Local};

/// A single log event on its way to the formatter
#[derive(Debug, Clone)]
pub struct Record<'a> {
    /// Severity
    pub level: Level,
    /// Message text
    pub message: Cow<'a, str>,
    /// When the record was created
    pub timestamp: DateTime<Local>,
    /// Source file, when known
    pub file: Option<&'a str>,
    /// Source line, when known
    pub line: Option<u32>,
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current local time
    #[inline]
    pub fn new(level: Level, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now(),
            file: None,
            line: None,
        }
    }

    /// Attach the call site
    #[inline]
    #[must_use]
    pub fn with_location(mut self, file: &'a str, line: u32) -> Self {
        self.file = Some(file);
        self.line = Some(line);
        self
    }

    /// Override the creation time
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
