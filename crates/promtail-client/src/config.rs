// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    DEFAULT_BATCH_ENTRIES_NUMBER, DEFAULT_BATCH_WAIT, DEFAULT_LABELS, DEFAULT_PUSH_URL,
    DEFAULT_REQUEST_TIMEOUT,
};
use crate::errors::ConfigError;
use crate::level::LogLevel;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::error;

/// Configuration of a client instance. Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Push endpoint, e.g. `http://localhost:3100/api/prom/push`
    pub push_url: String,
    /// Label set applied to entries logged without an explicit label,
    /// e.g. `{source="app",job="web"}`
    pub labels: String,
    /// Longest time an entry waits in a partial batch
    pub batch_wait: Duration,
    /// Number of buffered entries that triggers an immediate flush
    pub batch_entries_number: usize,
    /// Longest a single push request may take before the batch is dropped
    pub request_timeout: Duration,
    /// Entries are sent if their level is >= this
    pub send_level: LogLevel,
    /// Entries are printed locally if their level is >= this
    pub print_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            push_url: DEFAULT_PUSH_URL.to_string(),
            labels: DEFAULT_LABELS.to_string(),
            batch_wait: DEFAULT_BATCH_WAIT,
            batch_entries_number: DEFAULT_BATCH_ENTRIES_NUMBER,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            send_level: LogLevel::Info,
            print_level: LogLevel::Error,
        }
    }
}

impl ClientConfig {
    /// Create configuration from `PROMTAIL_*` environment variables.
    ///
    /// Unset variables take their default. Unparseable values are logged and also fall
    /// back to the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let push_url = env::var("PROMTAIL_PUSH_URL").unwrap_or(defaults.push_url);
        let labels = env::var("PROMTAIL_LABELS").unwrap_or(defaults.labels);
        let batch_wait = parse_env("PROMTAIL_BATCH_WAIT_MS", |v| {
            v.parse::<u64>().map(Duration::from_millis).ok()
        })
        .unwrap_or(defaults.batch_wait);
        let batch_entries_number =
            parse_env("PROMTAIL_BATCH_ENTRIES", |v| v.parse::<usize>().ok())
                .unwrap_or(defaults.batch_entries_number);
        let request_timeout = parse_env("PROMTAIL_REQUEST_TIMEOUT_MS", |v| {
            v.parse::<u64>().map(Duration::from_millis).ok()
        })
        .unwrap_or(defaults.request_timeout);
        let send_level = parse_env("PROMTAIL_SEND_LEVEL", |v| LogLevel::from_str(v).ok())
            .unwrap_or(defaults.send_level);
        let print_level = parse_env("PROMTAIL_PRINT_LEVEL", |v| LogLevel::from_str(v).ok())
            .unwrap_or(defaults.print_level);

        let config = Self {
            push_url,
            labels,
            batch_wait,
            batch_entries_number,
            request_timeout,
            send_level,
            print_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.push_url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyPushUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(self.push_url.clone()));
        }

        if self.labels.trim().is_empty() {
            return Err(ConfigError::EmptyLabels);
        }

        if self.batch_wait.is_zero() {
            return Err(ConfigError::ZeroBatchWait);
        }

        if self.batch_entries_number == 0 {
            return Err(ConfigError::ZeroBatchEntries);
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }

        Ok(())
    }
}

fn parse_env<T>(name: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = env::var(name).ok()?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        error!("{name} has an invalid value '{raw}'. Using the default.");
    }
    parsed
}
