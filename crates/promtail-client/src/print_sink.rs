// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Local echo of entries that meet the print threshold.

use chrono::Local;
use std::io::Write;

/// Destination for locally printed lines. Only the batching worker calls it, one line
/// at a time, in processing order.
pub trait PrintSink: Send {
    fn print(&mut self, line: &str);
}

/// Writes each line to stderr, prefixed with the local date and time.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl PrintSink for StderrSink {
    fn print(&mut self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        // Nothing sensible can be done when stderr is gone
        let _ = writeln!(stderr, "{}", format_line(&Local::now(), line));
    }
}

fn format_line<Tz>(now: &chrono::DateTime<Tz>, line: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} {}",
        now.format("%Y/%m/%d %H:%M:%S"),
        line.trim_end_matches('\n')
    )
}
