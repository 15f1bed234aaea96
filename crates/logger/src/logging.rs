//! Shared logging state and per-module loggers

use crate::format::Formatter;
use crate::level::Level;
use crate::log_spec::LogSpec;
use crate::logger::Logger;
use crate::record::Record;
use crate::sink::LogSink;

use std::fmt;
use std::io;
use std::sync::Arc;

use parking_lot::RwLock;

/// Everything [`Logging`] needs to route a record
#[derive(Clone)]
pub struct LoggingSetup {
    /// Which records pass
    pub spec: LogSpec,
    /// How they are rendered
    pub formatter: Formatter,
    /// Where they go
    pub sink: Arc<dyn LogSink>,
}

impl LoggingSetup {
    /// Default spec and format writing to `sink`
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            spec: LogSpec::default(),
            formatter: Formatter::default(),
            sink,
        }
    }

    /// Replace the spec
    #[must_use]
    pub fn with_spec(mut self, spec: LogSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Replace the formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }
}

impl fmt::Debug for LoggingSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingSetup")
            .field("spec", &self.spec)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

/// Logging front end shared by every [`ModuleLogger`] created from it.
///
/// Spec, format and sink can be replaced at runtime with [`apply`](Self::apply); loggers
/// already handed out pick the change up on their next record.
#[derive(Clone)]
pub struct Logging {
    state: Arc<RwLock<LoggingSetup>>,
}

impl Logging {
    /// Create the front end
    pub fn new(setup: LoggingSetup) -> Self {
        Self {
            state: Arc::new(RwLock::new(setup)),
        }
    }

    /// Swap in a new setup, returning the previous sink
    pub fn apply(&self, setup: LoggingSetup) -> Arc<dyn LogSink> {
        let previous = std::mem::replace(&mut *self.state.write(), setup);
        previous.sink
    }

    /// Replace only the spec
    pub fn set_spec(&self, spec: LogSpec) {
        self.state.write().spec = spec;
    }

    /// The current spec
    pub fn spec(&self) -> LogSpec {
        self.state.read().spec.clone()
    }

    /// Whether `module` logs at `level`
    pub fn is_enabled(&self, module: &str, level: Level) -> bool {
        self.state.read().spec.is_enabled(module, level)
    }

    /// A logger named `module`
    pub fn logger(&self, module: impl Into<String>) -> ModuleLogger {
        ModuleLogger {
            module: module.into().into(),
            logging: self.clone(),
        }
    }

    /// Filter, format and write `record` on behalf of `module`
    pub fn log(&self, module: &str, record: &Record<'_>) {
        let (line, sink) = {
            let state = self.state.read();
            if !state.spec.is_enabled(module, record.level) {
                return;
            }
            (
                state.formatter.format(module, record),
                Arc::clone(&state.sink),
            )
        };

        // A failing sink has nowhere else to report to.
        let _ = sink.write(line.as_bytes());
    }

    /// Sync the current sink
    ///
    /// # Errors
    ///
    /// Returns whatever the sink reports.
    pub fn sync(&self) -> io::Result<()> {
        let sink = Arc::clone(&self.state.read().sink);
        sink.sync()
    }
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("spec", &self.state.read().spec)
            .finish_non_exhaustive()
    }
}

/// Logger bound to a module name
#[derive(Clone, Debug)]
pub struct ModuleLogger {
    module: Arc<str>,
    logging: Logging,
}

impl ModuleLogger {
    /// The module name records are attributed to
    pub fn module(&self) -> &str {
        &self.module
    }

    /// A logger for `name` below this module (`parent.name`)
    pub fn child(&self, name: &str) -> Self {
        self.logging.logger(format!("{}.{name}", self.module))
    }

    /// Log with an explicit call site
    pub fn log_at_location(&self, level: Level, msg: impl fmt::Display, file: &str, line: u32) {
        if self.is_enabled(level) {
            let message = msg.to_string();
            self.log(Record::new(level, message).with_location(file, line));
        }
    }
}

impl Logger for ModuleLogger {
    fn log(&self, record: Record<'_>) {
        self.logging.log(&self.module, &record);
    }

    fn sync(&self) {
        let _ = self.logging.sync();
    }

    fn is_enabled(&self, level: Level) -> bool {
        self.logging.is_enabled(&self.module, level)
    }
}
