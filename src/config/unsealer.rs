//! # Unsealer Tuning
//!
//! Connection and pacing settings loaded from environment variables.

use crate::constants::{
    DEFAULT_DISCOVERY_TIMEOUT_SECS, DEFAULT_KEY_DELAY_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_BACKOFF_MS, DEFAULT_VAULT_PORT, DEFAULT_VAULT_SCHEME,
    DEFAULT_VAULT_SERVICE_NAME,
};
use crate::error::ConfigurationError;
use std::time::Duration;

/// Connection and pacing settings for discovery and the Vault client
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct UnsealerConfig {
    /// Vault API port on every pod
    pub vault_port: u16,
    /// Headless service used to build stable per-pod DNS names
    pub service_name: String,
    /// `http` or `https`
    pub scheme: String,
    /// Accept self-signed certificates on `https` listeners
    pub tls_skip_verify: bool,
    /// Retries per request on transport errors and retryable status codes
    pub max_retries: u32,
    /// Base of the exponential retry backoff
    pub retry_backoff: Duration,
    /// Pause between two key submissions to the same instance
    pub key_delay: Duration,
    /// Upper bound for the pod list call
    pub discovery_timeout: Duration,
}

impl Default for UnsealerConfig {
    fn default() -> Self {
        Self {
            vault_port: DEFAULT_VAULT_PORT,
            service_name: DEFAULT_VAULT_SERVICE_NAME.to_string(),
            scheme: DEFAULT_VAULT_SCHEME.to_string(),
            tls_skip_verify: false,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            key_delay: Duration::from_millis(DEFAULT_KEY_DELAY_MS),
            discovery_timeout: Duration::from_secs(DEFAULT_DISCOVERY_TIMEOUT_SECS),
        }
    }
}

impl UnsealerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            vault_port: var_or_default(&lookup, "VAULT_PORT", DEFAULT_VAULT_PORT),
            service_name: var_or_default(
                &lookup,
                "VAULT_SERVICE_NAME",
                DEFAULT_VAULT_SERVICE_NAME.to_string(),
            ),
            scheme: var_or_default(&lookup, "VAULT_SCHEME", DEFAULT_VAULT_SCHEME.to_string())
                .to_ascii_lowercase(),
            tls_skip_verify: var_or_default(&lookup, "VAULT_TLS_SKIP_VERIFY", false),
            max_retries: var_or_default(&lookup, "VAULT_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            retry_backoff: Duration::from_millis(var_or_default(
                &lookup,
                "VAULT_RETRY_BACKOFF_MS",
                DEFAULT_RETRY_BACKOFF_MS,
            )),
            key_delay: Duration::from_millis(var_or_default(
                &lookup,
                "UNSEAL_KEY_DELAY_MS",
                DEFAULT_KEY_DELAY_MS,
            )),
            discovery_timeout: Duration::from_secs(var_or_default(
                &lookup,
                "DISCOVERY_TIMEOUT_SECS",
                DEFAULT_DISCOVERY_TIMEOUT_SECS,
            )),
        }
    }

    /// Reject settings that would make every request fail
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.scheme != "http" && self.scheme != "https" {
            return Err(ConfigurationError::InvalidValue {
                name: "VAULT_SCHEME",
                reason: format!("expected 'http' or 'https', got '{}'", self.scheme),
            });
        }
        if self.service_name.is_empty() {
            return Err(ConfigurationError::InvalidValue {
                name: "VAULT_SERVICE_NAME",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Read a variable through `lookup` or return the default value
fn var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
