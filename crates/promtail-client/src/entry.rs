// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::level::LogLevel;
use chrono::{DateTime, Utc};

/// A single accepted logging call, on its way from a caller to the batching worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Per-call label override. `None` means the client's default label.
    pub label: Option<String>,
    pub text: String,
}

impl LogEntry {
    /// Stamps a rendered line with the current time. An empty label is treated as no
    /// label at all.
    #[must_use]
    pub fn new(level: LogLevel, label: Option<&str>, text: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            label: label.filter(|l| !l.is_empty()).map(str::to_owned),
            text,
        }
    }
}
