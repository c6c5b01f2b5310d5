//! # Vault HTTP Client
//!
//! `reqwest` implementation of [`UnsealApi`]. Every request carries the
//! configured timeout and goes through [`send_with_retry`].

use super::retry::{send_with_retry, RetryPolicy};
use super::types::{HealthStatus, SealStatus, UnsealRequest};
use super::UnsealApi;
use crate::config::{UnsealKey, UnsealerConfig};
use crate::error::ProtocolError;
use crate::observability::metrics;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

const SEAL_STATUS_PATH: &str = "/v1/sys/seal-status";
const UNSEAL_PATH: &str = "/v1/sys/unseal";
const HEALTH_PATH: &str = "/v1/sys/health";

/// Vault API client shared by every instance of a run
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: Client,
    retry: RetryPolicy,
}

impl VaultClient {
    /// Build a client with the given per-request timeout
    pub fn new(timeout: Duration, config: &UnsealerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            retry: RetryPolicy::new(config.max_retries, config.retry_backoff),
        })
    }
}

#[async_trait]
impl UnsealApi for VaultClient {
    async fn seal_status(&self, endpoint: &str) -> Result<SealStatus, ProtocolError> {
        let url = format!("{endpoint}{SEAL_STATUS_PATH}");
        let result = async {
            let response =
                send_with_retry(&self.retry, "seal_status", &url, || self.http.get(&url)).await?;
            decode_seal_status(response, &url).await
        }
        .await;

        metrics::record_vault_request("seal_status", result.is_ok());
        if let Err(e) = &result {
            debug!(url = %url, error = %e, "Seal status query failed");
        }
        result
    }

    async fn submit_key(&self, endpoint: &str, key: &UnsealKey) -> Result<SealStatus, ProtocolError> {
        let url = format!("{endpoint}{UNSEAL_PATH}");
        let result = async {
            let response = send_with_retry(&self.retry, "unseal", &url, || {
                self.http.put(&url).json(&UnsealRequest { key: key.expose() })
            })
            .await?;
            decode_seal_status(response, &url).await
        }
        .await;

        metrics::record_vault_request("unseal", result.is_ok());
        result
    }

    async fn health(&self, endpoint: &str) -> HealthStatus {
        let url = format!("{endpoint}{HEALTH_PATH}");
        let policy = self.retry.transport_only();

        match send_with_retry(&policy, "health", &url, || self.http.get(&url)).await {
            Ok(response) => {
                metrics::record_vault_request("health", true);
                HealthStatus::from_status_code(response.status().as_u16())
            }
            Err(e) => {
                metrics::record_vault_request("health", false);
                debug!(url = %url, error = %e, "Health query failed");
                HealthStatus::unreachable(e)
            }
        }
    }
}

/// Turn a response into a [`SealStatus`], rejecting non-success codes
async fn decode_seal_status(response: Response, url: &str) -> Result<SealStatus, ProtocolError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProtocolError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .json::<SealStatus>()
        .await
        .map_err(|source| ProtocolError::Decode {
            url: url.to_string(),
            source,
        })
}
