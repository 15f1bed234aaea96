//! Bridge from tracing to the logging front end

use crate::error::{Error, Result};
use crate::level::Level;
use crate::logging::Logging;
use crate::record::Record;

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Target prefix of the rotating writer's own diagnostics
const WRITER_TARGET: &str = "flogging_file";

/// A tracing layer that forwards events to [`Logging`], using the event target as module.
///
/// Events from the rotating writer itself are not forwarded: the writer may be the sink, and a
/// failing writer would otherwise queue a report of every failure back into itself.
#[derive(Clone, Debug)]
pub struct TracingBridge {
    logging: Logging,
}

impl TracingBridge {
    /// Forward events to `logging`
    pub const fn new(logging: Logging) -> Self {
        Self { logging }
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        let module = metadata.target();

        if is_writer_target(module) || !self.logging.is_enabled(module, level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let spans: Vec<&str> = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name()).collect())
            .unwrap_or_default();

        let message = if spans.is_empty() {
            visitor.finish()
        } else {
            format!("{}: {}", spans.join("::"), visitor.finish())
        };

        let mut record = Record::new(level, message);
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            record = record.with_location(file, line);
        }

        self.logging.log(module, &record);
    }
}

fn is_writer_target(target: &str) -> bool {
    target
        .strip_prefix(WRITER_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Collects the `message` field and renders the rest as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: impl fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={value}", field.name());
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field, value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field, value);
    }
}

/// Route every `tracing` event in the process to `logging`.
///
/// # Errors
///
/// Returns [`Error::Bridge`] if a global subscriber is already set.
pub fn install_tracing_bridge(logging: &Logging) -> Result<()> {
    use tracing_subscriber::prelude::*;

    let subscriber = tracing_subscriber::registry().with(TracingBridge::new(logging.clone()));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Bridge("tracing", e.to_string()))
}
