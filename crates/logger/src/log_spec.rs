//! Per-module level selection
//!
//! A log spec is either a bare level (`"debug"`) or colon-separated terms, each a bare level
//! (the default) or `module[,module...]=level`:
//!
//! ```text
//! http,store.fs=debug:db::pool=trace:warn
//! ```
//!
//! A module entry governs the module itself and everything below it, where children are
//! separated by `.` or `::`. The most specific entry wins.

use crate::error::{Error, Result};
use crate::level::Level;

use std::fmt;
use std::str::FromStr;

/// Parsed log spec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSpec {
    default: Level,
    modules: Vec<(String, Level)>,
}

impl LogSpec {
    /// A spec with only a default level
    pub const fn new(default: Level) -> Self {
        Self {
            default,
            modules: Vec::new(),
        }
    }

    /// Add or replace the level for `module`
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>, level: Level) -> Self {
        self.set_module(module.into(), level);
        self
    }

    /// Level used for modules without an entry
    pub const fn default_level(&self) -> Level {
        self.default
    }

    /// Threshold for `module`
    pub fn level_for(&self, module: &str) -> Level {
        let mut best: Option<(&str, Level)> = None;
        for (name, level) in &self.modules {
            if governs(name, module) && best.is_none_or(|(current, _)| name.len() > current.len())
            {
                best = Some((name, *level));
            }
        }
        best.map_or(self.default, |(_, level)| level)
    }

    /// Whether a record at `level` from `module` passes
    pub fn is_enabled(&self, module: &str, level: Level) -> bool {
        level >= self.level_for(module)
    }

    /// Least severe level any module can emit
    pub fn min_level(&self) -> Level {
        self.modules
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Level::min)
    }

    fn set_module(&mut self, module: String, level: Level) {
        match self.modules.iter_mut().find(|(name, _)| *name == module) {
            Some(entry) => entry.1 = level,
            None => self.modules.push((module, level)),
        }
    }
}

fn governs(entry: &str, module: &str) -> bool {
    match module.strip_prefix(entry) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') || rest.starts_with("::"),
        None => false,
    }
}

// Splits on ':' but keeps Rust paths such as `a::b` intact.
fn split_terms(spec: &str) -> Vec<&str> {
    let bytes = spec.as_bytes();
    let mut terms = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            if bytes.get(i + 1) == Some(&b':') {
                i += 2;
                continue;
            }
            terms.push(&spec[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    terms.push(&spec[start..]);
    terms
}

impl FromStr for LogSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidSpec {
            spec: s.to_string(),
            reason,
        };

        let mut spec = Self::default();
        if s.trim().is_empty() {
            return Ok(spec);
        }

        for term in split_terms(s.trim()) {
            let term = term.trim();
            if term.is_empty() {
                return Err(invalid("empty term".to_string()));
            }

            match term.split_once('=') {
                None => {
                    spec.default = term.parse().map_err(|e: Error| invalid(e.to_string()))?;
                }
                Some((modules, level)) => {
                    let level: Level = level.parse().map_err(|e: Error| invalid(e.to_string()))?;
                    for module in modules.split(',') {
                        let module = module.trim();
                        if module.is_empty() {
                            return Err(invalid(format!("empty module name in {term:?}")));
                        }
                        spec.set_module(module.to_string(), level);
                    }
                }
            }
        }

        Ok(spec)
    }
}

impl fmt::Display for LogSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (module, level) in &self.modules {
            write!(f, "{module}={}:", level.as_str().to_ascii_lowercase())?;
        }
        write!(f, "{}", self.default.as_str().to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level() {
        let spec: LogSpec = "debug".parse().unwrap();
        assert_eq!(spec.default_level(), Level::Debug);
        assert_eq!(spec.level_for("anything"), Level::Debug);
    }

    #[test]
    fn test_empty_is_info() {
        let spec: LogSpec = "  ".parse().unwrap();
        assert_eq!(spec, LogSpec::default());
        assert_eq!(spec.level_for("x"), Level::Info);
    }

    #[test]
    fn test_module_terms() {
        let spec: LogSpec = "http,store=debug:http.server=error:warn".parse().unwrap();
        assert_eq!(spec.default_level(), Level::Warn);
        assert_eq!(spec.level_for("http"), Level::Debug);
        assert_eq!(spec.level_for("http.client"), Level::Debug);
        assert_eq!(spec.level_for("http.server"), Level::Error);
        assert_eq!(spec.level_for("http.server.tls"), Level::Error);
        assert_eq!(spec.level_for("httpd"), Level::Warn);
        assert_eq!(spec.level_for("store"), Level::Debug);
        assert_eq!(spec.min_level(), Level::Debug);
    }

    #[test]
    fn test_rust_paths() {
        let spec: LogSpec = "flogging_file::worker=trace:error".parse().unwrap();
        assert_eq!(spec.level_for("flogging_file::worker"), Level::Trace);
        assert_eq!(spec.level_for("flogging_file::worker::inner"), Level::Trace);
        assert_eq!(spec.level_for("flogging_file"), Level::Error);
    }

    #[test]
    fn test_later_terms_override() {
        let spec: LogSpec = "a=debug:a=error:info:trace".parse().unwrap();
        assert_eq!(spec.level_for("a"), Level::Error);
        assert_eq!(spec.default_level(), Level::Trace);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            "info:".parse::<LogSpec>(),
            Err(Error::InvalidSpec { .. })
        ));
        assert!(matches!(
            "a,,b=debug".parse::<LogSpec>(),
            Err(Error::InvalidSpec { .. })
        ));
        assert!(matches!(
            "a=shout".parse::<LogSpec>(),
            Err(Error::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let spec = LogSpec::new(Level::Warn)
            .with_module("http", Level::Debug)
            .with_module("db", Level::Error);
        let text = spec.to_string();
        assert_eq!(text, "http=debug:db=error:warn");
        assert_eq!(text.parse::<LogSpec>().unwrap(), spec);
    }
}
