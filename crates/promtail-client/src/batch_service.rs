// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The batching worker: a single consumer of the ingestion queue.
//!
//! ```text
//!    ┌──────────────┐
//!    │   Client(s)  │ (any number of caller threads)
//!    └──────┬───────┘
//!           │ LogEntry via bounded channel
//!           v
//!    ┌──────────────┐   size threshold reached ──┐
//!    │ BatchService │   batch_wait elapsed ───────┼──> BatchSender::send(batch)
//!    │  (one task)  │   cancellation (drain) ─────┘
//!    └──────────────┘
//! ```
//!
//! The service owns the in-progress [`Batch`]; no caller ever touches it. Sends are
//! awaited inline, so while one is in flight the queue, the timer and cancellation
//! all wait.

use crate::batch::{Batch, Entry};
use crate::config::ClientConfig;
use crate::constants::LOG_ENTRIES_CHAN_SIZE;
use crate::entry::LogEntry;
use crate::level::LogLevel;
use crate::print_sink::PrintSink;
use crate::sender::{report, BatchSender};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Routing and grouping state of the worker, independent of any runtime.
pub struct Accumulator {
    default_label: String,
    send_level: LogLevel,
    print_level: LogLevel,
    batch_entries_number: usize,
    batch: Batch,
    sink: Box<dyn PrintSink>,
}

impl Accumulator {
    #[must_use]
    pub fn new(config: &ClientConfig, sink: Box<dyn PrintSink>) -> Self {
        Accumulator {
            default_label: config.labels.clone(),
            send_level: config.send_level,
            print_level: config.print_level,
            batch_entries_number: config.batch_entries_number,
            batch: Batch::new(),
            sink,
        }
    }

    /// Prints and/or buffers one entry. Returns `true` once the batch holds
    /// `batch_entries_number` entries and must be flushed.
    pub fn accept(&mut self, entry: LogEntry) -> bool {
        let LogEntry {
            timestamp,
            level,
            label,
            text,
        } = entry;

        if level.meets(self.print_level) {
            self.sink.print(&text);
        }

        if level.meets(self.send_level) {
            let label = label.as_deref().unwrap_or(&self.default_label);
            self.batch.push(
                label,
                Entry {
                    timestamp,
                    line: text,
                },
            );
        }

        self.batch.len() >= self.batch_entries_number
    }

    /// Hands out the current batch and starts a fresh one.
    pub fn take(&mut self) -> Batch {
        std::mem::take(&mut self.batch)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

pub struct BatchService<S> {
    accumulator: Accumulator,
    sender: S,
    rx: mpsc::Receiver<LogEntry>,
    cancel_token: CancellationToken,
    batch_wait: Duration,
}

impl<S: BatchSender> BatchService<S> {
    /// Creates the service and the producer side of its queue.
    ///
    /// The service stops when `cancel_token` is cancelled or every producer is dropped.
    /// Either way it drains the queue and flushes what is left before returning.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        sender: S,
        sink: Box<dyn PrintSink>,
        cancel_token: CancellationToken,
    ) -> (Self, mpsc::Sender<LogEntry>) {
        let (tx, rx) = mpsc::channel(LOG_ENTRIES_CHAN_SIZE);
        let service = BatchService {
            accumulator: Accumulator::new(config, sink),
            sender,
            rx,
            cancel_token,
            batch_wait: config.batch_wait,
        };
        (service, tx)
    }

    pub async fn run(mut self) {
        debug!("PROMTAIL | Batch service started");

        let timer = sleep(self.batch_wait);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    debug!("PROMTAIL | Batch service shutting down");
                    break;
                }

                entry = self.rx.recv() => {
                    let Some(entry) = entry else {
                        debug!("PROMTAIL | All producers gone, batch service shutting down");
                        break;
                    };
                    if self.accumulator.accept(entry) {
                        self.flush().await;
                        timer.as_mut().reset(Instant::now() + self.batch_wait);
                    }
                }

                () = &mut timer => {
                    if !self.accumulator.is_empty() {
                        self.flush().await;
                    }
                    timer.as_mut().reset(Instant::now() + self.batch_wait);
                }
            }
        }

        self.drain().await;
        debug!("PROMTAIL | Batch service stopped");
    }

    /// Refuses new entries, processes the ones already queued, and sends the final
    /// partial batch.
    async fn drain(&mut self) {
        self.rx.close();
        while let Some(entry) = self.rx.recv().await {
            if self.accumulator.accept(entry) {
                self.flush().await;
            }
        }
        if !self.accumulator.is_empty() {
            self.flush().await;
        }
    }

    async fn flush(&mut self) {
        let batch = self.accumulator.take();
        debug!("PROMTAIL | Flushing {} entries", batch.len());
        report(self.sender.send(batch).await);
    }
}
