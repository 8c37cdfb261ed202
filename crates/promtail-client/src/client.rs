// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The logging surface handed to application code.
//!
//! A [`Client`] owns one background worker thread running the [`BatchService`]. Logging
//! calls only filter, render and enqueue; everything else happens on the worker.

use crate::batch_service::BatchService;
use crate::config::ClientConfig;
use crate::constants::WORKER_THREAD_NAME;
use crate::entry::LogEntry;
use crate::errors::ClientError;
use crate::level::LogLevel;
use crate::print_sink::{PrintSink, StderrSink};
use crate::sender::{BatchSender, HttpSender};
use crate::wire::WireFormat;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Buffers log lines and ships them to a push endpoint from a background thread.
///
/// ```no_run
/// use promtail_client::{Client, ClientConfig};
///
/// let client = Client::json(ClientConfig {
///     labels: "{source=\"app\",job=\"web\"}".to_string(),
///     ..Default::default()
/// })?;
/// client.infof(format_args!("listening on port {}", 8080));
/// client.shutdown();
/// # Ok::<(), promtail_client::errors::ClientError>(())
/// ```
///
/// `Client` is `Send + Sync`; share it behind an `Arc` to log from many threads.
/// Once [`Client::shutdown`] has run, every logging method is a no-op.
pub struct Client {
    tx: mpsc::Sender<LogEntry>,
    send_level: LogLevel,
    print_level: LogLevel,
    cancel_token: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Client {
    /// Builds a client that ships batches in `format` and prints to stderr.
    pub fn new(config: ClientConfig, format: WireFormat) -> Result<Self, ClientError> {
        Self::with_print_sink(config, format, Box::new(StderrSink))
    }

    pub fn json(config: ClientConfig) -> Result<Self, ClientError> {
        Self::new(config, WireFormat::Json)
    }

    pub fn proto(config: ClientConfig) -> Result<Self, ClientError> {
        Self::new(config, WireFormat::Proto)
    }

    /// Like [`Client::new`], with locally printed lines going to `sink`.
    pub fn with_print_sink(
        config: ClientConfig,
        format: WireFormat,
        sink: Box<dyn PrintSink>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let sender = HttpSender::new(config.push_url.clone(), format, config.request_timeout)?;
        Self::with_sender(config, sender, sink)
    }

    /// Builds a client around any [`BatchSender`].
    pub fn with_sender<S>(
        config: ClientConfig,
        sender: S,
        sink: Box<dyn PrintSink>,
    ) -> Result<Self, ClientError>
    where
        S: BatchSender + 'static,
    {
        config.validate()?;

        let cancel_token = CancellationToken::new();
        let (service, tx) = BatchService::new(&config, sender, sink, cancel_token.clone());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(service.run()))
            .map_err(ClientError::Spawn)?;

        debug!(
            "PROMTAIL | Client started for {} with labels {}",
            config.push_url, config.labels
        );

        Ok(Client {
            tx,
            send_level: config.send_level,
            print_level: config.print_level,
            cancel_token,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, None, args);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, None, args);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, None, args);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, None, args);
    }

    pub fn debugf_with_label(&self, label: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, Some(label), args);
    }

    pub fn infof_with_label(&self, label: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, Some(label), args);
    }

    pub fn warnf_with_label(&self, label: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, Some(label), args);
    }

    pub fn errorf_with_label(&self, label: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, Some(label), args);
    }

    /// Logs at Info without the `"Info: "` prefix.
    pub fn logf(&self, args: fmt::Arguments<'_>) {
        self.enqueue(LogLevel::Info, "", None, args);
    }

    pub fn logf_with_label(&self, label: &str, args: fmt::Arguments<'_>) {
        self.enqueue(LogLevel::Info, "", Some(label), args);
    }

    /// Stops the worker after it has sent everything logged so far.
    ///
    /// Blocks until the final batch has been sent or its failure logged. Calling it
    /// again, or dropping the client afterwards, does nothing.
    pub fn shutdown(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = worker.take() else {
            return;
        };

        debug!("PROMTAIL | Shutting down client");
        self.cancel_token.cancel();
        if handle.join().is_err() {
            error!("PROMTAIL | Batch worker panicked before finishing its final flush");
        }
    }

    fn log(&self, level: LogLevel, label: Option<&str>, args: fmt::Arguments<'_>) {
        self.enqueue(level, level.prefix(), label, args);
    }

    fn enqueue(
        &self,
        level: LogLevel,
        prefix: &str,
        label: Option<&str>,
        args: fmt::Arguments<'_>,
    ) {
        if !(level.meets(self.send_level) || level.meets(self.print_level)) {
            return;
        }
        if self.cancel_token.is_cancelled() {
            return;
        }

        let entry = LogEntry::new(level, label, format!("{prefix}{args}"));
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => self.enqueue_blocking(entry),
            Err(TrySendError::Closed(_)) => {
                debug!("PROMTAIL | Batch worker has stopped, dropping log entry");
            }
        }
    }

    /// Waits for room in the queue.
    fn enqueue_blocking(&self, entry: LogEntry) {
        let delivered = if tokio::runtime::Handle::try_current().is_ok() {
            // blocking_send panics on a thread driving a runtime
            thread::scope(|s| {
                s.spawn(|| self.tx.blocking_send(entry).is_ok())
                    .join()
                    .unwrap_or(false)
            })
        } else {
            self.tx.blocking_send(entry).is_ok()
        };

        if !delivered {
            debug!("PROMTAIL | Batch worker has stopped, dropping log entry");
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("send_level", &self.send_level)
            .field("print_level", &self.print_level)
            .field("stopped", &self.cancel_token.is_cancelled())
            .finish_non_exhaustive()
    }
}
