//! # Vault Wire Types
//!
//! Payloads of the `sys/seal-status`, `sys/unseal` and `sys/health` endpoints.

use serde::{Deserialize, Serialize};

/// Seal state reported by `GET /v1/sys/seal-status` and `PUT /v1/sys/unseal`
///
/// `sealed == false` means the instance is unlocked regardless of `progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealStatus {
    pub sealed: bool,
    /// Number of key shares required (`t` on the wire)
    #[serde(rename = "t", default)]
    pub threshold: u32,
    /// Number of valid shares accepted so far
    #[serde(default)]
    pub progress: u32,
}

impl SealStatus {
    pub fn unsealed() -> Self {
        Self {
            sealed: false,
            threshold: 0,
            progress: 0,
        }
    }

    pub fn sealed(threshold: u32, progress: u32) -> Self {
        Self {
            sealed: true,
            threshold,
            progress,
        }
    }
}

/// Request body for `PUT /v1/sys/unseal`
#[derive(Serialize)]
pub(crate) struct UnsealRequest<'a> {
    pub key: &'a str,
}

/// Classification of a `GET /v1/sys/health` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub initialized: bool,
    pub sealed: bool,
    pub standby: bool,
    /// HTTP status code, 0 when Vault could not be reached
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    /// Classify a health response by status code
    ///
    /// 200 active, 429 standby, 473 performance standby, 503 sealed,
    /// 501 not initialized. Sealed and standby nodes count as healthy.
    pub fn from_status_code(status_code: u16) -> Self {
        Self {
            healthy: matches!(status_code, 200 | 429 | 473 | 503),
            initialized: status_code != 501,
            sealed: status_code == 503,
            standby: status_code == 429,
            status_code,
            error: None,
        }
    }

    /// Health of an instance that could not be reached at all
    pub fn unreachable(error: impl std::fmt::Display) -> Self {
        Self {
            healthy: false,
            initialized: false,
            sealed: true,
            standby: false,
            status_code: 0,
            error: Some(error.to_string()),
        }
    }
}
