// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Limits and defaults shared by the client and its worker.

use std::time::Duration;

/// Capacity of the ingestion queue between callers and the batching worker.
///
/// When the queue is full, logging calls block until the worker makes room.
pub const LOG_ENTRIES_CHAN_SIZE: usize = 5000;

/// Name given to the background worker thread.
pub const WORKER_THREAD_NAME: &str = "promtail-batcher";

/// Status the push endpoint answers with when it accepts a batch.
pub const SUCCESS_STATUS: u16 = 204;

pub const DEFAULT_PUSH_URL: &str = "http://localhost:3100/api/prom/push";
pub const DEFAULT_LABELS: &str = "{job=\"promtail-client\"}";
pub const DEFAULT_BATCH_WAIT: Duration = Duration::from_secs(5);
pub const DEFAULT_BATCH_ENTRIES_NUMBER: usize = 10_000;
/// Upper bound on one push request, from connect to the end of the response body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
