// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Severity levels used both to tag entries and as send/print thresholds.
//!
//! Levels are totally ordered from least to most severe:
//!
//! ```text
//! Debug < Info < Warn < Error < Disable
//! ```
//!
//! `Disable` is a threshold only. No entry is ever tagged with it, so a threshold of
//! `Disable` matches nothing.

use std::fmt;
use std::str::FromStr;

/// Severity of a log entry, or a send/print threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Maximum level. As a threshold it disables sending or printing.
    Disable,
}

impl LogLevel {
    /// Text prepended to lines logged at this level by the leveled calls.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug: ",
            LogLevel::Info => "Info: ",
            LogLevel::Warn => "Warn: ",
            LogLevel::Error => "Error: ",
            LogLevel::Disable => "",
        }
    }

    /// Whether an entry at this level passes `threshold`.
    #[must_use]
    pub fn meets(self, threshold: LogLevel) -> bool {
        self != LogLevel::Disable && self >= threshold
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Disable => "DISABLE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "disable" | "disabled" | "off" => Ok(LogLevel::Disable),
            _ => Err(format!(
                "Invalid log level: '{s}'. Valid levels are: debug, info, warn, error, disable",
            )),
        }
    }
}
