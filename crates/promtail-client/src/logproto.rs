// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Protobuf messages of the Loki push API (`logproto.PushRequest`).
//!
//! Only the fields a push client writes are declared. Tags match `logproto.proto`:
//!
//! ```text
//! message PushRequest { repeated StreamAdapter streams = 1; }
//! message StreamAdapter { string labels = 1; repeated EntryAdapter entries = 2; }
//! message EntryAdapter { google.protobuf.Timestamp timestamp = 1; string line = 2; }
//! ```

use crate::batch;
use chrono::{DateTime, Utc};
use prost_types::Timestamp;

#[derive(Clone, PartialEq, prost::Message)]
pub struct PushRequest {
    #[prost(message, repeated, tag = "1")]
    pub streams: Vec<StreamAdapter>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StreamAdapter {
    #[prost(string, tag = "1")]
    pub labels: String,
    #[prost(message, repeated, tag = "2")]
    pub entries: Vec<EntryAdapter>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EntryAdapter {
    #[prost(message, optional, tag = "1")]
    pub timestamp: Option<Timestamp>,
    #[prost(string, tag = "2")]
    pub line: String,
}

impl From<&batch::Stream> for StreamAdapter {
    fn from(stream: &batch::Stream) -> Self {
        StreamAdapter {
            labels: stream.labels.clone(),
            entries: stream.entries.iter().map(EntryAdapter::from).collect(),
        }
    }
}

impl From<&batch::Entry> for EntryAdapter {
    fn from(entry: &batch::Entry) -> Self {
        EntryAdapter {
            timestamp: Some(to_timestamp(entry.timestamp)),
            line: entry.line.clone(),
        }
    }
}

/// Splits an instant into whole seconds and the nanosecond remainder.
#[must_use]
pub fn to_timestamp(instant: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: instant.timestamp(),
        // chrono reports a leap second as nanos >= 1_000_000_000, which protobuf rejects
        nanos: instant.timestamp_subsec_nanos().min(999_999_999) as i32,
    }
}
