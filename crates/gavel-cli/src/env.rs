// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use gavel_engine::{Engine, ErrorResponse, PathLocks, PolicyGate, RepositoryRegistry, UpstreamProxy};

/// Trait all cli commands must implement to be runnable.
#[async_trait::async_trait]
pub trait Run {
    async fn run(&mut self) -> Result<i32>;
}

pub fn configure_logging(verbosity: u8) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    let mut directives = match verbosity {
        0 => "gavel=info",
        1 => "gavel=debug",
        _ => "gavel=trace",
    }
    .to_string();
    if let Ok(overrides) = std::env::var("GAVEL_LOG") {
        directives = format!("{directives},{overrides}");
    }
    if let Ok(overrides) = std::env::var("RUST_LOG") {
        // we also allow a full override via the RUST_LOG variable for debugging
        directives = overrides;
    }
    let env_filter = tracing_subscriber::filter::EnvFilter::new(directives);
    let registry = tracing_subscriber::Registry::default().with(env_filter);
    let mut fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time();
    if verbosity < 2 {
        fmt_layer = fmt_layer.with_target(false);
    }
    let sub = registry.with(fmt_layer);
    tracing::subscriber::set_global_default(sub).context("Failed to set default logger")
}

/// Assemble an engine from the current configuration.
pub async fn open_engine() -> Result<Engine> {
    let config = gavel_config::Config::current().context("Failed to load config")?;
    let registry = RepositoryRegistry::from_config(&config)
        .await
        .context("Failed to open configured repositories")?;
    let gate = PolicyGate::from_config(&config).context("Invalid token configuration")?;
    let locks = Arc::new(PathLocks::new());
    let proxy = UpstreamProxy::from_config(&config, Arc::clone(&locks));
    tracing::debug!(
        server = %config.server.id,
        repositories = registry.len(),
        proxy_timeout = ?Duration::from_secs(config.server.proxy_timeout_seconds),
        "engine ready"
    );
    Ok(Engine::new(
        Arc::new(registry),
        Arc::new(gate),
        Arc::new(proxy),
        locks,
    ))
}

/// Report a failed request and return the exit code for it.
pub fn report(err: &ErrorResponse) -> i32 {
    eprintln!(
        "{}",
        format!("{} {}", err.status_code(), err.message).red()
    );
    1
}
