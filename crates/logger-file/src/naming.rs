//! File naming: `{prefix}{YYYY-MM-DD}_{NNNN}.log`
//!
//! The names on disk are the only persisted rotation state, so the format here must stay stable.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;

/// Date stamp format of the period token
pub const PERIOD_FORMAT: &str = "%Y-%m-%d";

/// Extension of every managed file
pub const LOG_SUFFIX: &str = ".log";

/// The period token for a calendar day
pub fn period_token(date: NaiveDate) -> String {
    date.format(PERIOD_FORMAT).to_string()
}

/// The file name for a day and sequence number
pub fn file_name(prefix: &str, date: NaiveDate, sequence: u32) -> String {
    format!("{prefix}{}_{sequence:04}{LOG_SUFFIX}", period_token(date))
}

/// The full path of the file for a day and sequence number
pub fn next_path(dir: &Path, prefix: &str, date: NaiveDate, sequence: u32) -> PathBuf {
    dir.join(file_name(prefix, date, sequence))
}

/// Matches file names belonging to one prefix
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// Build the pattern for `prefix`, matched literally.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the compiled pattern exceeds the regex size limits.
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let expr = format!(
            r"^{}(\d{{4}}-\d{{2}}-\d{{2}})(?:_(\d+))?\.log$",
            regex::escape(prefix)
        );
        Ok(Self {
            regex: Regex::new(&expr)?,
        })
    }

    /// Parse a file name into its day and sequence.
    ///
    /// A name without the `_NNNN` part counts as sequence 0 of its day. Names that don't match,
    /// or whose date stamp isn't a real calendar day, yield `None`.
    pub fn parse(&self, name: &str) -> Option<(NaiveDate, u32)> {
        let caps = self.regex.captures(name)?;
        let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), PERIOD_FORMAT).ok()?;
        let sequence = match caps.get(2) {
            Some(seq) => seq.as_str().parse().ok()?,
            None => 0,
        };
        Some((date, sequence))
    }
}
