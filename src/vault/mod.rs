//! # Vault Unseal Protocol
//!
//! The three Vault calls the unsealer needs:
//! - `GET /v1/sys/seal-status` - current seal state and progress
//! - `PUT /v1/sys/unseal` - submit one key share
//! - `GET /v1/sys/health` - liveness classification by status code

mod client;
mod retry;
mod types;

pub use client::VaultClient;
pub use retry::RetryPolicy;
pub use types::{HealthStatus, SealStatus};

use crate::config::UnsealKey;
use crate::error::ProtocolError;
use async_trait::async_trait;

/// Operations against one Vault instance, addressed by its base URL
#[async_trait]
pub trait UnsealApi: Send + Sync {
    /// Query the current seal state
    async fn seal_status(&self, endpoint: &str) -> Result<SealStatus, ProtocolError>;

    /// Submit exactly one key share and return the state reported by that call
    async fn submit_key(&self, endpoint: &str, key: &UnsealKey)
        -> Result<SealStatus, ProtocolError>;

    /// Classify the instance's health; transport failures are folded into the result
    async fn health(&self, endpoint: &str) -> HealthStatus;
}
