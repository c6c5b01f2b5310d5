//! # Command Line
//!
//! Flags of the `vault-k8s-unsealer` binary.
//!
//! ## Usage
//!
//! ```bash
//! # Unseal once
//! vault-k8s-unsealer --keys key1 key2 key3
//!
//! # Unseal using environment variables
//! export VAULT_UNSEAL_KEYS="key1,key2,key3"
//! vault-k8s-unsealer
//!
//! # Watch mode
//! vault-k8s-unsealer --watch --interval 30
//!
//! # Health check only
//! vault-k8s-unsealer --health-check
//!
//! # Custom namespace and label
//! vault-k8s-unsealer --namespace vault-prod --label app.kubernetes.io/name=vault
//! ```

use crate::config::UnsealKey;
use crate::constants::{
    DEFAULT_LABEL_SELECTOR, DEFAULT_NAMESPACE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_WATCH_INTERVAL_SECS,
};
use clap::Parser;

const ENV_HELP: &str = "\
Environment Variables:
  VAULT_UNSEAL_KEYS         Comma-separated unseal keys
  VAULT_UNSEAL_KEY_1,2,3    Individual unseal keys
  UNSEAL_KEY_1,2,3          Individual unseal keys (legacy names)
  VAULT_NAMESPACE           Kubernetes namespace (default: vault)
  VAULT_LABEL_SELECTOR      Pod label selector (default: app=vault)
  WATCH_INTERVAL            Watch interval in seconds (default: 60)
  VAULT_PORT                Vault API port (default: 8200)
  VAULT_SERVICE_NAME        Headless service for --use-service (default: vault-internal)
  VAULT_SCHEME              http or https (default: http)
  RUST_LOG                  Log filter (default: info)";

/// Vault Unsealer for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "vault-k8s-unsealer", version)]
#[command(about = "Discover Vault pods in Kubernetes and unseal them", long_about = None)]
#[command(after_help = ENV_HELP)]
pub struct Cli {
    /// Kubernetes namespace
    #[arg(short, long, env = "VAULT_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Pod label selector
    #[arg(
        short = 'l',
        long = "label",
        env = "VAULT_LABEL_SELECTOR",
        default_value = DEFAULT_LABEL_SELECTOR
    )]
    pub label_selector: String,

    /// Unseal keys (or use environment variables)
    #[arg(short, long, num_args = 1..)]
    pub keys: Vec<String>,

    /// Watch mode - unseal again whenever a pod is sealed
    #[arg(short, long)]
    pub watch: bool,

    /// Watch interval in seconds
    #[arg(
        short,
        long,
        env = "WATCH_INTERVAL",
        default_value_t = DEFAULT_WATCH_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Only check health status
    #[arg(long)]
    pub health_check: bool,

    /// Use the headless service DNS name instead of the pod IP
    #[arg(long)]
    pub use_service: bool,

    /// Request timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Run once and exit (useful for CronJobs); takes precedence over --watch
    #[arg(long)]
    pub once: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Output in JSON format (console logging is disabled)
    #[arg(long)]
    pub json: bool,

    /// Unseal pods concurrently instead of one at a time
    #[arg(long)]
    pub parallel: bool,

    /// Serve /metrics, /healthz and /readyz on this port in watch mode
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// What the process should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Classify health of every pod and exit
    HealthCheck,
    /// Unseal every pod on a fixed interval until interrupted
    Watch,
    /// Unseal every pod once and exit
    Once,
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        if self.health_check {
            RunMode::HealthCheck
        } else if self.watch && !self.once {
            RunMode::Watch
        } else {
            RunMode::Once
        }
    }

    /// Keys from `--keys`, falling back to `from_env` when none were given
    pub fn resolve_keys<F>(&self, from_env: F) -> Vec<UnsealKey>
    where
        F: FnOnce() -> Vec<UnsealKey>,
    {
        if self.keys.is_empty() {
            from_env()
        } else {
            self.keys.iter().map(|k| UnsealKey::from(k.as_str())).collect()
        }
    }
}
