// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Train builder daemon (tbd)
//!
//! Consumes build commands from the message bus and turns verified trains
//! into pushed container images.

use std::sync::Arc;

use anyhow::Context;
use tb_adapters::{AmqpSource, DockerAssembler, HttpBus, VaultSecrets};
use tb_daemon::{logging, Config, Consumer};
use tb_engine::{Orchestrator, OrchestratorDeps, ServiceKey};
use tb_storage::MemoryStatusStore;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("reading configuration")?;
    let _log_guard = logging::init(config.log_dir.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), config = ?config, "starting train builder");

    let service_key = match &config.public_key_path {
        Some(path) => {
            let key = ServiceKey::load(path)?;
            info!(fingerprint = %key.fingerprint(), "service signatures required");
            Some(key)
        }
        None => None,
    };

    let secrets = VaultSecrets::new(&config.vault_url, &config.vault_token)?;
    let bus = HttpBus::new(&config.bus)?;
    let commands = AmqpSource::new(&config.amqp_url, &config.bus.vhost, &config.bus.queue)?;
    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            secrets,
            images: DockerAssembler::default(),
            publisher: bus,
            store: Arc::new(MemoryStatusStore::new()),
        },
        config.orchestrator_config(service_key),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    Consumer::new(commands, orchestrator, config.max_concurrent_builds, config.poll_interval)
        .run(shutdown)
        .await;
    info!("train builder stopped");
    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
    shutdown.cancel();
}
