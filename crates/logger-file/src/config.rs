//! Writer configuration

use crate::error::{Error, Result};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default size threshold for [`RotationModel::Size`] (10 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of retained files for [`RotationModel::Size`]
pub const DEFAULT_MAX_FILE_COUNT: usize = 10;

/// When the active file is replaced by a new one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationModel {
    /// Rotate when the calendar day advances past the active file's day
    #[default]
    Date,
    /// Rotate once the active file has received `max_size` bytes
    Size,
}

impl fmt::Display for RotationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => f.write_str("date"),
            Self::Size => f.write_str("size"),
        }
    }
}

impl FromStr for RotationModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "size" => Ok(Self::Size),
            other => Err(Error::Configuration(format!(
                "unknown rotation model {other:?} (expected \"date\" or \"size\")"
            ))),
        }
    }
}

/// Configuration for a [`RotatingWriter`](crate::RotatingWriter)
///
/// `max_size` and `max_file_count` only matter for [`RotationModel::Size`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Directory holding the log files
    pub dir: PathBuf,
    /// File name prefix, placed directly before the date stamp
    pub prefix: String,
    /// Rotation trigger
    #[serde(default)]
    pub model: RotationModel,
    /// Byte threshold that triggers a size rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Number of files kept on disk in size mode
    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,
}

const fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

const fn default_max_file_count() -> usize {
    DEFAULT_MAX_FILE_COUNT
}

impl WriterConfig {
    /// Start building a configuration for files named `{prefix}YYYY-MM-DD_NNNN.log` in `dir`
    pub fn builder(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> WriterConfigBuilder {
        WriterConfigBuilder {
            config: Self {
                dir: dir.into(),
                prefix: prefix.into(),
                model: RotationModel::default(),
                max_size: DEFAULT_MAX_SIZE,
                max_file_count: DEFAULT_MAX_FILE_COUNT,
            },
        }
    }

    /// Directory holding the log files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a prefix containing a path separator, or for a size
    /// model without a positive threshold and at least one retained file.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "prefix {:?} must not contain a path separator",
                self.prefix
            )));
        }

        if self.model == RotationModel::Size {
            if self.max_size == 0 {
                return Err(Error::Configuration(
                    "max_size must be greater than zero in size model".to_string(),
                ));
            }
            if self.max_file_count == 0 {
                return Err(Error::Configuration(
                    "max_file_count must be at least one in size model".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Builder for [`WriterConfig`]
#[derive(Debug, Clone)]
pub struct WriterConfigBuilder {
    config: WriterConfig,
}

impl WriterConfigBuilder {
    /// Set the rotation model
    #[must_use]
    pub const fn model(mut self, model: RotationModel) -> Self {
        self.config.model = model;
        self
    }

    /// Rotate by calendar day
    #[must_use]
    pub const fn date_model(self) -> Self {
        self.model(RotationModel::Date)
    }

    /// Rotate by size
    #[must_use]
    pub const fn size_model(self) -> Self {
        self.model(RotationModel::Size)
    }

    /// Byte threshold for size rotation
    #[must_use]
    pub const fn max_size(mut self, max_size: u64) -> Self {
        self.config.max_size = max_size;
        self
    }

    /// Number of files kept in size mode
    #[must_use]
    pub const fn max_file_count(mut self, max_file_count: usize) -> Self {
        self.config.max_file_count = max_file_count;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// See [`WriterConfig::validate`].
    pub fn build(self) -> Result<WriterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
