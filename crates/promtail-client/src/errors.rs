// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors surfaced by client construction. Nothing after construction is reported to
/// logging call sites.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("push URL cannot be empty")]
    EmptyPushUrl,

    #[error("push URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("default labels cannot be empty")]
    EmptyLabels,

    #[error("batch wait must be greater than zero")]
    ZeroBatchWait,

    #[error("batch entries number must be greater than zero")]
    ZeroBatchEntries,

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("unknown wire format '{0}', expected 'json' or 'proto'")]
    UnknownWireFormat(String),
}

/// Why a batch was dropped instead of delivered.
#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    /// The batch could not be turned into a request body.
    #[error("unable to encode payload: {0}")]
    Payload(String),

    /// No response was obtained from the endpoint.
    #[error("unable to send an HTTP request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with something other than 204 No Content.
    #[error("unexpected HTTP status code: {status}, message: {body}")]
    Rejected { status: StatusCode, body: String },
}
