//! Building a [`Logging`] front end from configuration
//!
//! ```toml
//! level = "http=debug:info"
//! name = "server"
//! root_dir = "/var/log/server"
//! model = "size"
//! max_file_size = 1048576
//! max_file_num = 5
//! ```

use crate::error::{Error, Result};
use crate::format::{DEFAULT_FORMAT, Formatter};
use crate::log_spec::LogSpec;
use crate::logging::{Logging, LoggingSetup, ModuleLogger};
use crate::sink::{LogSink, StderrSink};

use std::path::PathBuf;
use std::sync::Arc;

use flogging_file::{
    DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_SIZE, RotatingWriter, RotationModel, WriterConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Logging configuration
///
/// An empty `name` sends records to standard error; otherwise they go to rotating files
/// named `{root_dir}/{name}YYYY-MM-DD_NNNN.log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log spec, e.g. `"info"` or `"http=debug:warn"`
    pub level: String,
    /// File name prefix
    pub name: String,
    /// Directory for log files
    pub root_dir: PathBuf,
    /// Record format
    pub format: String,
    /// Rotation trigger
    pub model: RotationModel,
    /// Size threshold in size mode
    pub max_file_size: u64,
    /// Files kept in size mode
    pub max_file_num: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            name: String::new(),
            root_dir: std::env::temp_dir(),
            format: DEFAULT_FORMAT.to_string(),
            model: RotationModel::Date,
            max_file_size: DEFAULT_MAX_SIZE,
            max_file_num: DEFAULT_MAX_FILE_COUNT,
        }
    }
}

impl LoggingConfig {
    /// Decode a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the document does not match.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// The rotating writer settings, or `None` when logging to standard error
    pub fn writer_config(&self) -> Option<WriterConfig> {
        if self.name.is_empty() {
            return None;
        }

        Some(WriterConfig {
            dir: self.root_dir.clone(),
            prefix: self.name.clone(),
            model: self.model,
            max_size: self.max_file_size,
            max_file_count: self.max_file_num,
        })
    }
}

/// Owns the [`Logging`] front end and the rotating writer behind it
#[derive(Debug)]
pub struct LoggingFactory {
    config: LoggingConfig,
    logging: Option<Logging>,
    writer: Option<RotatingWriter>,
}

impl LoggingFactory {
    /// Create a factory; nothing is opened until [`init`](Self::init)
    pub const fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            logging: None,
            writer: None,
        }
    }

    /// Start from the defaults with the given spec and file prefix
    pub fn builder(level: impl Into<String>, name: impl Into<String>) -> LoggingFactoryBuilder {
        LoggingFactoryBuilder {
            config: LoggingConfig {
                level: level.into(),
                name: name.into(),
                ..LoggingConfig::default()
            },
        }
    }

    /// The configuration the next `init` will use
    pub const fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Build the sink and the front end from the current configuration.
    ///
    /// Calling `init` again re-routes every existing [`ModuleLogger`] to a freshly opened sink
    /// and closes the previous writer.
    ///
    /// # Errors
    ///
    /// Fails on an invalid spec or format, or when the rotating writer cannot start. The
    /// previous setup stays in place on failure.
    pub async fn init(&mut self) -> Result<Logging> {
        let spec: LogSpec = self.config.level.parse()?;
        let formatter = Formatter::parse(&self.config.format)?;

        let writer = match self.config.writer_config() {
            Some(writer_config) => Some(RotatingWriter::new(writer_config).await?),
            None => None,
        };
        let sink: Arc<dyn LogSink> = match &writer {
            Some(writer) => Arc::new(writer.clone()),
            None => Arc::new(StderrSink),
        };

        let setup = LoggingSetup {
            spec,
            formatter: formatter.with_color(writer.is_none()),
            sink,
        };
        let logging = match &self.logging {
            Some(logging) => {
                logging.apply(setup);
                logging.clone()
            }
            None => Logging::new(setup),
        };
        self.logging = Some(logging.clone());

        if let Some(previous) = std::mem::replace(&mut self.writer, writer) {
            close_writer(&previous).await;
        }

        debug!(
            "Logging initialised (spec {:?}, {})",
            self.config.level,
            self.writer
                .as_ref()
                .map_or_else(|| "stderr".to_string(), |w| w.active_path().display().to_string())
        );

        Ok(logging)
    }

    /// Change the configuration and re-initialise.
    ///
    /// # Errors
    ///
    /// See [`init`](Self::init); on failure the previous configuration is restored.
    pub async fn apply(&mut self, update: impl FnOnce(&mut LoggingConfig)) -> Result<Logging> {
        let mut config = self.config.clone();
        update(&mut config);
        let previous = std::mem::replace(&mut self.config, config);

        match self.init().await {
            Ok(logging) => Ok(logging),
            Err(e) => {
                self.config = previous;
                Err(e)
            }
        }
    }

    /// The front end, once initialised
    pub const fn logging(&self) -> Option<&Logging> {
        self.logging.as_ref()
    }

    /// A logger for `module`, once initialised
    pub fn logger(&self, module: impl Into<String>) -> Option<ModuleLogger> {
        self.logging.as_ref().map(|logging| logging.logger(module))
    }

    /// The rotating writer, when logging to files
    pub const fn writer(&self) -> Option<&RotatingWriter> {
        self.writer.as_ref()
    }

    /// Flush and close the writer.
    ///
    /// Loggers keep working afterwards but their records are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before `init`, or the writer's close error.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.logging.is_none() {
            return Err(Error::NotInitialized);
        }

        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        if let Err(e) = writer.flush().await {
            warn!("Failed to flush log writer on shutdown: {e}");
        }
        writer.close().await?;
        Ok(())
    }
}

async fn close_writer(writer: &RotatingWriter) {
    if let Err(e) = writer.flush().await {
        warn!(
            "Failed to flush previous log file {}: {e}",
            writer.active_path().display()
        );
    }
    if let Err(e) = writer.close().await {
        warn!(
            "Failed to close previous log file {}: {e}",
            writer.active_path().display()
        );
    }
}

/// Builder for [`LoggingFactory`]
#[derive(Debug, Clone)]
pub struct LoggingFactoryBuilder {
    config: LoggingConfig,
}

impl LoggingFactoryBuilder {
    /// Directory for log files
    #[must_use]
    pub fn root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.config.root_dir = root_dir.into();
        self
    }

    /// Record format
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    /// Rotate daily
    #[must_use]
    pub fn date_model(mut self) -> Self {
        self.config.model = RotationModel::Date;
        self
    }

    /// Rotate by size
    #[must_use]
    pub fn size_model(mut self) -> Self {
        self.config.model = RotationModel::Size;
        self
    }

    /// Size threshold in size mode
    #[must_use]
    pub fn max_file_size(mut self, max_file_size: u64) -> Self {
        self.config.max_file_size = max_file_size;
        self
    }

    /// Files kept in size mode
    #[must_use]
    pub fn max_file_num(mut self, max_file_num: usize) -> Self {
        self.config.max_file_num = max_file_num;
        self
    }

    /// Finish building
    pub fn build(self) -> LoggingFactory {
        LoggingFactory::new(self.config)
    }
}
