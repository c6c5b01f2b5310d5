//! # Vault Kubernetes Unsealer
//!
//! Discovers Vault pods in a Kubernetes namespace and unseals them with a set
//! of key shares.
//!
//! ## Overview
//!
//! 1. **Discovery** - lists running pods matching a label selector
//! 2. **Seal check** - queries `/v1/sys/seal-status` on every pod
//! 3. **Unseal** - submits key shares in order until the pod reports unsealed
//! 4. **Watch** - optionally repeats the cycle on a fixed interval
//!
//! Exit status is 0 when every pod is unsealed (or healthy in
//! `--health-check` mode) and 1 otherwise.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::error;
use vault_unsealer::cli::{Cli, RunMode};
use vault_unsealer::config::{load_keys_from_env, UnsealerConfig};
use vault_unsealer::error::ConfigurationError;
use vault_unsealer::observability;
use vault_unsealer::report::{
    health_exit_status, unseal_exit_status, JsonReporter, Reporter, TextReporter,
};
use vault_unsealer::runtime::{
    bind_server, build_unsealer, init_tracing, install_crypto_provider, run_watch_loop,
    spawn_shutdown_listener, start_server, ServerState, WatchSettings,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json)?;
    install_crypto_provider();

    let mode = cli.run_mode();
    let keys = cli.resolve_keys(load_keys_from_env);
    if keys.is_empty() && mode != RunMode::HealthCheck {
        return Err(ConfigurationError::NoKeys.into());
    }

    let config = UnsealerConfig::from_env();
    let unsealer = build_unsealer(&cli, &config).await?;
    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::stdout())
    } else {
        Box::new(TextReporter)
    };

    match mode {
        RunMode::HealthCheck => {
            let report = unsealer
                .health_check_all(&cli.namespace, &cli.label_selector)
                .await;
            reporter.health_report(&cli.namespace, &report)?;
            Ok(ExitCode::from(health_exit_status(&report)))
        }
        RunMode::Once => {
            let report = unsealer
                .unseal_all(&cli.namespace, &cli.label_selector, &keys)
                .await;
            reporter.unseal_report(&cli.namespace, &report)?;
            Ok(ExitCode::from(unseal_exit_status(&report)))
        }
        RunMode::Watch => {
            let cancel = CancellationToken::new();
            spawn_shutdown_listener(cancel.clone());

            if let Some(port) = cli.metrics_port {
                observability::metrics::register_metrics()?;
                let listener = bind_server(port).await?;
                let state = Arc::new(ServerState::default());
                let server_cancel = cancel.clone();
                tokio::spawn(async move {
                    if let Err(e) = start_server(listener, state, server_cancel).await {
                        error!("Metrics server error: {:#}", e);
                    }
                });
            }

            let settings = WatchSettings {
                namespace: cli.namespace.clone(),
                label_selector: cli.label_selector.clone(),
                interval: Duration::from_secs(cli.interval),
            };
            run_watch_loop(&unsealer, &settings, &keys, reporter.as_ref(), cancel).await;
            Ok(ExitCode::SUCCESS)
        }
    }
}
