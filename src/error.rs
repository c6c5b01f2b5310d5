//! # Error Types
//!
//! Error taxonomy for the unsealer. Every error here is scoped to the smallest
//! unit that produced it (one pod list, one HTTP call) and is degraded by the
//! caller rather than propagated to the process, with the exception of
//! [`ConfigurationError`] which stops the run before any instance is contacted.

use std::time::Duration;
use thiserror::Error;

/// Failure listing Vault pods from the Kubernetes API
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The Kubernetes API rejected or failed the list call
    #[error("failed to list pods: {0}")]
    Kube(#[from] kube::Error),
    /// The list call did not finish in time
    #[error("pod list timed out after {0:?}")]
    Timeout(Duration),
}

impl DiscoveryError {
    /// Whether the API server refused the service account (401/403)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Kube(kube::Error::Api(resp)) if resp.code == 401 || resp.code == 403)
    }
}

/// Failure of a single request against a Vault instance
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Connection, TLS or timeout failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Vault answered with a non-success status code
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// Response body was not a seal status document
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProtocolError {
    /// Status code carried by the error, if Vault answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

/// Invalid or missing configuration detected before contacting the cluster
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No unseal keys were supplied while unsealing was requested
    #[error(
        "no unseal keys found; use --keys or set VAULT_UNSEAL_KEYS='key1,key2,key3' \
         or VAULT_UNSEAL_KEY_1='key1' VAULT_UNSEAL_KEY_2='key2' ..."
    )]
    NoKeys,
    /// A setting had an unusable value
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
