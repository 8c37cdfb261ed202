// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire encodings accepted by the push endpoint.
//!
//! - **JSON**: `{"streams":[{"labels":..,"entries":[{"ts":..,"line":..}]}]}`
//! - **Proto**: a `logproto.PushRequest`, snappy block-compressed as a whole

use crate::batch::Stream;
use crate::errors::{ConfigError, ShippingError};
use crate::logproto::{PushRequest, StreamAdapter};
use prost::Message;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WireFormat {
    Json,
    #[default]
    Proto,
}

#[derive(Serialize)]
struct PushMessage<'a> {
    streams: Vec<&'a Stream>,
}

impl WireFormat {
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Json => JSON_CONTENT_TYPE,
            WireFormat::Proto => PROTOBUF_CONTENT_TYPE,
        }
    }

    /// Encodes the streams into a request body. Streams without entries are skipped.
    pub fn encode(self, streams: &[Stream]) -> Result<Vec<u8>, ShippingError> {
        let streams: Vec<&Stream> = streams.iter().filter(|s| !s.entries.is_empty()).collect();

        match self {
            WireFormat::Json => serde_json::to_vec(&PushMessage { streams })
                .map_err(|e| ShippingError::Payload(e.to_string())),
            WireFormat::Proto => {
                let request = PushRequest {
                    streams: streams.into_iter().map(StreamAdapter::from).collect(),
                };
                snap::raw::Encoder::new()
                    .compress_vec(&request.encode_to_vec())
                    .map_err(|e| ShippingError::Payload(e.to_string()))
            }
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Json => f.write_str("json"),
            WireFormat::Proto => f.write_str("proto"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "proto" | "protobuf" => Ok(WireFormat::Proto),
            _ => Err(ConfigError::UnknownWireFormat(s.to_string())),
        }
    }
}
