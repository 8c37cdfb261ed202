// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Promtail client
//!
//! A client-side buffer that ships leveled, formatted log lines to a Loki/Promtail push
//! endpoint.
//!
//! ## Architecture
//!
//! ```text
//!   caller threads                     worker thread ("promtail-batcher")
//!  ┌──────────────┐   bounded queue   ┌────────────────┐      ┌──────────────┐
//!  │    Client    │ ────────────────> │  BatchService  │ ───> │  HttpSender  │ ──> push URL
//!  │ (level gate) │    (FIFO, 5000)   │ (size/time     │      │ (json|proto) │
//!  └──────────────┘                   │  flush, labels)│      └──────────────┘
//!                                     └────────────────┘
//! ```
//!
//! - [`client`]: public logging surface and shutdown coordination
//! - [`batch_service`]: the accumulator event loop and its flush triggers
//! - [`batch`]: label-grouped streams waiting to be sent
//! - [`sender`]: wire encoding, HTTP transport and outcome classification
//! - [`config`]: client configuration, defaults and environment loading

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod batch;
pub mod batch_service;
pub mod client;
pub mod config;
pub mod constants;
pub mod entry;
pub mod errors;
pub mod level;
pub mod logproto;
pub mod print_sink;
pub mod sender;
pub mod wire;

pub use client::Client;
pub use config::ClientConfig;
pub use level::LogLevel;
pub use wire::WireFormat;
