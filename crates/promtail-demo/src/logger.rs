// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event formatter for the demo's diagnostics.
//!
//! Client internals log from two places: the caller's thread (construction, shutdown,
//! dropped entries) and the `promtail-batcher` worker (flushes, failed pushes). Each
//! line names the thread it came from so the two are easy to tell apart:
//!
//! ```text
//! DEBUG | main | PROMTAIL | Shutting down client
//! WARN | promtail-batcher | PROMTAIL | unable to send an HTTP request: ... Batch dropped.
//! ```

use std::fmt;
use std::thread;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext,
};
use tracing_subscriber::registry::LookupSpan;

const UNNAMED_THREAD: &str = "-";

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let current = thread::current();
        write!(
            &mut writer,
            "{} | {} | ",
            event.metadata().level(),
            current.name().unwrap_or(UNNAMED_THREAD)
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
