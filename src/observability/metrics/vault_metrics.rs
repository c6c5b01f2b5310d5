//! # Vault Request Metrics

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::IntCounterVec;
use std::sync::LazyLock;

static VAULT_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vault_unsealer_vault_requests_total",
            "Total number of Vault API requests by operation and result",
        ),
        &["operation", "result"],
    )
    .expect("Failed to create VAULT_REQUESTS_TOTAL metric - this should never happen")
});

static REQUEST_RETRIES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vault_unsealer_request_retries_total",
            "Total number of retried Vault API requests by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create REQUEST_RETRIES_TOTAL metric - this should never happen")
});

/// Register Vault request metrics with the registry
pub(crate) fn register_vault_metrics() -> Result<()> {
    REGISTRY.register(Box::new(VAULT_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEST_RETRIES_TOTAL.clone()))?;
    Ok(())
}

pub fn record_vault_request(operation: &str, success: bool) {
    let result = if success { "success" } else { "error" };
    VAULT_REQUESTS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

pub fn increment_request_retries(operation: &str) {
    REQUEST_RETRIES_TOTAL.with_label_values(&[operation]).inc();
}
