//! Runtime configuration.
//!
//! Defaults first, then the environment (`PHIC_ROOT`, `PHIC_TRACE`,
//! `PHIC_LOG`), then whatever the command line says.

use std::env;

use crate::runtime::dataized::TRACE_TARGET;

/// Log filter used when nothing else is configured.
pub const DEFAULT_LOG: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Object to dataize; when absent the program decides.
    pub root: Option<String>,
    /// Emit one line per dataization step.
    pub trace: bool,
    /// `tracing` filter directives, such as `info` or `phic=debug`.
    pub log: Option<String>,
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| env::var(key).ok())
    }

    /// Apply environment variables read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("PHIC_ROOT").filter(|root| !root.is_empty()) {
            self.root = Some(root);
        }
        if let Some(trace) = lookup("PHIC_TRACE") {
            self.trace = is_truthy(&trace);
        }
        if let Some(log) = lookup("PHIC_LOG").filter(|log| !log.is_empty()) {
            self.log = Some(log);
        }
        self
    }

    /// The filter to install: the configured one, plus the dataization
    /// trace when enabled.
    pub fn log_filter(&self) -> String {
        let base = self.log.as_deref().unwrap_or(DEFAULT_LOG);
        if self.trace {
            format!("{},{}=debug", base, TRACE_TARGET)
        } else {
            base.to_string()
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
