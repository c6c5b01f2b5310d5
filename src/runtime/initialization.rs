//! # Initialization
//!
//! Process setup: tracing subscriber, rustls crypto provider, and assembly of
//! the Kubernetes directory and Vault client into an [`Unsealer`].

use crate::cli::Cli;
use crate::config::UnsealerConfig;
use crate::discovery::KubeDirectory;
use crate::unsealer::{UnsealSettings, Unsealer};
use crate::vault::VaultClient;
use anyhow::{anyhow, Context, Result};
use kube::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_LOG_FILTER: &str = "vault_unsealer=info,vault_k8s_unsealer=info";
const VERBOSE_LOG_FILTER: &str = "vault_unsealer=debug,vault_k8s_unsealer=debug";

/// Install the tracing subscriber
///
/// Logs go to stderr. `RUST_LOG` overrides the default filter unless
/// `verbose` is set. In JSON mode no subscriber is installed so stdout and
/// stderr only carry the JSON document.
pub fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    if json {
        return Ok(());
    }

    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize tracing subscriber: {e}"))
}

/// Configure the rustls crypto provider before any TLS connection is made
///
/// Required for rustls 0.23+ when no default provider is set via features.
/// We use ring as the crypto provider.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider was already installed");
    }
}

/// Build the unsealer for a run
///
/// Creates the Kubernetes client (in-cluster service account, or kubeconfig
/// when running outside the cluster) and the Vault HTTP client.
pub async fn build_unsealer(cli: &Cli, config: &UnsealerConfig) -> Result<Unsealer> {
    config.validate()?;

    let client = Client::try_default().await.context(
        "Failed to create Kubernetes client. Ensure a service account or kubeconfig is configured.",
    )?;
    let directory = KubeDirectory::new(client, config);
    let vault = VaultClient::new(Duration::from_secs(cli.timeout), config)?;

    let settings = UnsealSettings {
        scheme: config.scheme.clone(),
        use_service: cli.use_service,
        key_delay: config.key_delay,
        parallel: cli.parallel,
    };

    info!(
        "Unsealer ready: namespace={}, selector={}, scheme={}, use_service={}, parallel={}",
        cli.namespace, cli.label_selector, settings.scheme, settings.use_service, settings.parallel
    );

    Ok(Unsealer::new(Arc::new(directory), Arc::new(vault), settings))
}
