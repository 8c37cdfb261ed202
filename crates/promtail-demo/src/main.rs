// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ships a handful of leveled lines to a local push endpoint.
//!
//! ```text
//! promtail-demo proto my-source my-job
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod logger;

use anyhow::{ensure, Context};
use chrono::Local;
use clap::Parser;
use promtail_client::{Client, ClientConfig, WireFormat};
use std::env;
use std::thread;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const ROUNDS: usize = 4;
const ROUND_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
#[command(version, about = "Send a few test lines to Loki through promtail-client")]
struct Args {
    /// Wire format of the pushed batches: proto or json
    format: WireFormat,
    /// Value of the `source` label
    source_name: String,
    /// Value of the `job` label
    job_name: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    ensure!(
        is_valid_name(&args.source_name),
        "Invalid source name '{}', expected [a-zA-Z0-9_-]+",
        args.source_name
    );
    ensure!(
        is_valid_name(&args.job_name),
        "Invalid job name '{}', expected [a-zA-Z0-9_-]+",
        args.job_name
    );

    init_logging()?;

    let config = ClientConfig {
        labels: labels(&args.source_name, &args.job_name),
        ..ClientConfig::from_env()?
    };
    debug!("Using {config:?}");

    let client = Client::new(config, args.format).context("could not start promtail client")?;

    for _ in 0..ROUNDS {
        let now = Local::now().format("%H:%M:%S");
        let (source, job) = (&args.source_name, &args.job_name);
        client.debugf(format_args!("source = {source}, job = {job}, time = {now}"));
        client.infof(format_args!("source = {source}, job = {job}, time = {now}"));
        client.warnf(format_args!("source = {source}, job = {job}, time = {now}"));
        client.errorf(format_args!("source = {source}, job = {job}, time = {now}"));
        thread::sleep(ROUND_INTERVAL);
    }

    client.shutdown();
    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    let log_level = env::var("PROMTAIL_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = format!("h2=off,hyper=off,rustls=off,{log_level}");

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(env_filter).context("could not parse log level")?)
        .with_writer(std::io::stderr)
        .event_format(logger::Formatter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    debug!("Logging subsystem enabled");
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn labels(source: &str, job: &str) -> String {
    format!("{{source=\"{source}\",job=\"{job}\"}}")
}
