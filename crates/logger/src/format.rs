//! Record formatting
//!
//! Format strings mix literal text with `%{verb}` or `%{verb:arg}` directives:
//!
//! | verb       | output                                               |
//! |------------|------------------------------------------------------|
//! | `time`     | timestamp, `arg` is a chrono strftime pattern        |
//! | `module`   | name of the logger that produced the record          |
//! | `level`    | level name, `arg` `.N` keeps the first N characters  |
//! | `message`  | the message                                          |
//! | `location` | `file:line` of the call site                         |
//! | `color`    | level color, the next `%{color}` resets it           |
//!
//! `%{color:reset}` always resets. Every formatted record ends with a newline.

use crate::error::{Error, Result};
use crate::record::Record;

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};

/// Format used when none is configured
pub const DEFAULT_FORMAT: &str = "%{color}%{time:%Y-%m-%d %H:%M:%S%.3f %Z}%{color} [%{module}][%{level:.4}] [%{location}] \"%{message}\"";

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const RESET: &str = "\x1b[0m";
const UNKNOWN_LOCATION: &str = "???";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time(String),
    Module,
    Level(Option<usize>),
    Message,
    Location,
    Color,
    Reset,
}

/// Compiled format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    segments: Vec<Segment>,
    color: bool,
}

impl Formatter {
    /// Compile `format`, with color output enabled
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for an unknown verb, an unterminated directive, a bad level
    /// width or an invalid strftime pattern.
    pub fn parse(format: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = format;

        while let Some(start) = rest.find("%{") {
            literal.push_str(&rest[..start]);
            let body = &rest[start + 2..];
            let end = body
                .find('}')
                .ok_or_else(|| Error::Format(format!("unterminated directive in {format:?}")))?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            let directive = &body[..end];
            let (verb, arg) = match directive.split_once(':') {
                Some((verb, arg)) => (verb, Some(arg)),
                None => (directive, None),
            };
            segments.push(parse_verb(verb, arg)?);
            rest = &body[end + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            segments,
            color: true,
        })
    }

    /// Enable or disable ANSI colors
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Whether `%{color}` produces escape codes
    pub const fn color(&self) -> bool {
        self.color
    }

    /// Render `record` logged through `module`, newline-terminated
    pub fn format(&self, module: &str, record: &Record<'_>) -> String {
        let mut out = String::with_capacity(128);
        let mut colored = false;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Time(pattern) => {
                    let _ = write!(out, "{}", record.timestamp.format(pattern));
                }
                Segment::Module => out.push_str(module),
                Segment::Level(None) => out.push_str(record.level.as_str()),
                Segment::Level(Some(width)) => {
                    out.extend(record.level.as_str().chars().take(*width));
                }
                Segment::Message => out.push_str(&record.message),
                Segment::Location => match (record.file, record.line) {
                    (Some(file), Some(line)) => {
                        let _ = write!(out, "{file}:{line}");
                    }
                    _ => out.push_str(UNKNOWN_LOCATION),
                },
                Segment::Color if self.color => {
                    out.push_str(if colored {
                        RESET
                    } else {
                        record.level.ansi_color()
                    });
                    colored = !colored;
                }
                Segment::Reset if self.color && colored => {
                    out.push_str(RESET);
                    colored = false;
                }
                Segment::Color | Segment::Reset => {}
            }
        }

        if colored {
            out.push_str(RESET);
        }
        out.push('\n');
        out
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::parse(DEFAULT_FORMAT).unwrap_or_else(|_| Self {
            segments: vec![Segment::Message],
            color: true,
        })
    }
}

fn parse_verb(verb: &str, arg: Option<&str>) -> Result<Segment> {
    match verb {
        "time" => {
            let pattern = arg.unwrap_or(DEFAULT_TIME_FORMAT);
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(Error::Format(format!("invalid time pattern {pattern:?}")));
            }
            Ok(Segment::Time(pattern.to_string()))
        }
        "module" => Ok(Segment::Module),
        "message" => Ok(Segment::Message),
        "location" => Ok(Segment::Location),
        "level" => match arg {
            None => Ok(Segment::Level(None)),
            Some(arg) => arg
                .strip_prefix('.')
                .map(|width| width.trim_end_matches('s'))
                .and_then(|width| width.parse().ok())
                .map(|width| Segment::Level(Some(width)))
                .ok_or_else(|| Error::Format(format!("invalid level width {arg:?}"))),
        },
        "color" => match arg {
            None => Ok(Segment::Color),
            Some("reset") => Ok(Segment::Reset),
            Some(other) => Err(Error::Format(format!("unknown color {other:?}"))),
        },
        other => Err(Error::Format(format!("unknown verb {other:?}"))),
    }
}
