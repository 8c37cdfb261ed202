// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shipping of flushed batches to the push endpoint.
//!
//! ```text
//!   Batch ──> encode (json | proto+snappy) ──> HTTP POST ──> 204? ──> done
//!                  │                              │            │
//!                  └── Payload error              └ Transport  └ Rejected
//! ```
//!
//! Every failure drops the batch. Nothing is retried or requeued.

use crate::batch::Batch;
use crate::constants::SUCCESS_STATUS;
use crate::errors::ShippingError;
use crate::wire::WireFormat;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Delivers one flushed batch. The batching worker awaits each call before it touches
/// the queue again, so implementations never see concurrent sends from one client.
#[async_trait]
pub trait BatchSender: Send + Sync {
    async fn send(&self, batch: Batch) -> Result<(), ShippingError>;
}

#[derive(Debug, Clone)]
pub struct HttpSender {
    client: reqwest::Client,
    push_url: String,
    format: WireFormat,
    timeout: Duration,
}

impl HttpSender {
    /// `timeout` bounds each push request; an endpoint that stays silent past it
    /// yields [`ShippingError::Transport`].
    pub fn new(
        push_url: impl Into<String>,
        format: WireFormat,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(HttpSender {
            client,
            push_url: push_url.into(),
            format,
            timeout,
        })
    }
}

#[async_trait]
impl BatchSender for HttpSender {
    async fn send(&self, batch: Batch) -> Result<(), ShippingError> {
        if batch.is_empty() {
            return Ok(());
        }

        let n_entries = batch.len();
        let n_streams = batch.streams().len();
        let body = self.format.encode(batch.streams())?;
        drop(batch);

        debug!(
            "PROMTAIL | Sending {n_entries} entries in {n_streams} streams ({} bytes, {})",
            body.len(),
            self.format
        );

        let resp = self
            .client
            .post(&self.push_url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, self.format.content_type())
            .body(body)
            .send()
            .await
            .map_err(ShippingError::Transport)?;

        let status = resp.status();
        if status.as_u16() == SUCCESS_STATUS {
            return Ok(());
        }

        let body = resp.text().await.map_err(ShippingError::Transport)?;
        Err(ShippingError::Rejected { status, body })
    }
}

/// Logs the outcome of a send. The batch is gone either way.
pub fn report(result: Result<(), ShippingError>) {
    match result {
        Ok(()) => {}
        Err(e @ ShippingError::Transport(_)) => warn!("PROMTAIL | {e}. Batch dropped."),
        Err(e) => error!("PROMTAIL | {e}. Batch dropped."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Entry;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server};
    use reqwest::StatusCode;
    use std::net::TcpListener;
    use tracing_test::traced_test;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn batch_of(lines: &[(&str, &str)]) -> Batch {
        let mut batch = Batch::new();
        for (i, (label, line)) in lines.iter().enumerate() {
            batch.push(
                label,
                Entry {
                    timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
                    line: (*line).to_string(),
                },
            );
        }
        batch
    }

    #[tokio::test]
    async fn test_json_send_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/prom/push")
            .match_header("Content-Type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "streams": [
                    {"labels": "A", "entries": [{"line": "x"}, {"line": "y"}]},
                    {"labels": "B", "entries": [{"line": "z"}]}
                ]
            })))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let sender = HttpSender::new(
            format!("{}/api/prom/push", server.url()),
            WireFormat::Json,
            TIMEOUT,
        )
        .unwrap();
        let result = sender
            .send(batch_of(&[("A", "x"), ("B", "z"), ("A", "y")]))
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_proto_send_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/prom/push")
            .match_header("Content-Type", "application/x-protobuf")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let sender = HttpSender::new(
            format!("{}/api/prom/push", server.url()),
            WireFormat::Proto,
            TIMEOUT,
        )
        .unwrap();
        assert!(sender.send(batch_of(&[("A", "x")])).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let sender = HttpSender::new(server.url(), WireFormat::Json, TIMEOUT).unwrap();
        assert!(sender.send(Batch::new()).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_204_is_rejected_with_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/prom/push")
            .with_status(200)
            .with_body("ok but not what we wanted")
            .expect(1)
            .create_async()
            .await;

        let sender = HttpSender::new(
            format!("{}/api/prom/push", server.url()),
            WireFormat::Json,
            TIMEOUT,
        )
        .unwrap();
        let result = sender.send(batch_of(&[("A", "x")])).await;

        match result {
            Err(ShippingError::Rejected { status, body }) => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, "ok but not what we wanted");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/prom/push")
            .with_status(500)
            .with_body("Internal Server Error")
            .expect(1)
            .create_async()
            .await;

        let sender = HttpSender::new(
            format!("{}/api/prom/push", server.url()),
            WireFormat::Proto,
            TIMEOUT,
        )
        .unwrap();
        let result = sender.send(batch_of(&[("A", "x")])).await;

        assert!(matches!(result, Err(ShippingError::Rejected { .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP connections
        let sender = HttpSender::new("http://127.0.0.1:9/push", WireFormat::Json, TIMEOUT).unwrap();
        let result = sender.send(batch_of(&[("A", "x")])).await;
        assert!(matches!(result, Err(ShippingError::Transport(_))));
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        // The kernel completes the handshake for a bound listener; nobody ever answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/push", listener.local_addr().unwrap());

        let sender = HttpSender::new(url, WireFormat::Json, Duration::from_millis(300)).unwrap();
        let started = std::time::Instant::now();
        let result = sender.send(batch_of(&[("A", "x")])).await;

        match result {
            Err(ShippingError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_report_logs_transport_failure_as_warning() {
        let sender = HttpSender::new("http://127.0.0.1:9/push", WireFormat::Json, TIMEOUT).unwrap();
        let result = sender.send(batch_of(&[("A", "x")])).await;
        assert!(matches!(result, Err(ShippingError::Transport(_))));

        report(result);
        assert!(logs_contain("WARN"));
        assert!(logs_contain("unable to send an HTTP request"));
        assert!(logs_contain("Batch dropped."));
    }

    #[traced_test]
    #[test]
    fn test_report_logs_rejection() {
        report(Err(ShippingError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: "bad labels".to_string(),
        }));
        assert!(logs_contain("unexpected HTTP status code: 400 Bad Request"));
        assert!(logs_contain("bad labels"));
    }

    #[traced_test]
    #[test]
    fn test_report_logs_payload_error() {
        report(Err(ShippingError::Payload("boom".to_string())));
        assert!(logs_contain("unable to encode payload: boom"));
    }

    #[traced_test]
    #[test]
    fn test_report_success_is_silent() {
        report(Ok(()));
        assert!(!logs_contain("Batch dropped"));
    }
}
