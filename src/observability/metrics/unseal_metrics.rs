//! # Unseal Metrics
//!
//! Metrics for unseal cycles: cycle counts and duration, discovery, and
//! per-instance outcomes.

use crate::observability::metrics::registry::REGISTRY;
use crate::unsealer::UnsealOutcome;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge};
use std::sync::LazyLock;

static CYCLES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("vault_unsealer_cycles_total", "Total number of unseal cycles")
        .expect("Failed to create CYCLES_TOTAL metric - this should never happen")
});

static CYCLE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "vault_unsealer_cycle_duration_seconds",
            "Duration of an unseal cycle in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("Failed to create CYCLE_DURATION metric - this should never happen")
});

static INSTANCES_DISCOVERED: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "vault_unsealer_instances_discovered",
        "Number of running Vault pods found by the last discovery",
    )
    .expect("Failed to create INSTANCES_DISCOVERED metric - this should never happen")
});

static DISCOVERY_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vault_unsealer_discovery_errors_total",
        "Total number of failed pod list calls",
    )
    .expect("Failed to create DISCOVERY_ERRORS_TOTAL metric - this should never happen")
});

static UNSEAL_ATTEMPTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vault_unsealer_unseal_attempts_total",
            "Total number of per-instance unseal attempts by result",
        ),
        &["result"],
    )
    .expect("Failed to create UNSEAL_ATTEMPTS_TOTAL metric - this should never happen")
});

static KEYS_SUBMITTED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vault_unsealer_keys_submitted_total",
        "Total number of key shares submitted to Vault",
    )
    .expect("Failed to create KEYS_SUBMITTED_TOTAL metric - this should never happen")
});

/// Register unseal metrics with the registry
pub(crate) fn register_unseal_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CYCLES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CYCLE_DURATION.clone()))?;
    REGISTRY.register(Box::new(INSTANCES_DISCOVERED.clone()))?;
    REGISTRY.register(Box::new(DISCOVERY_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(UNSEAL_ATTEMPTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(KEYS_SUBMITTED_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_cycles() {
    CYCLES_TOTAL.inc();
}

pub fn observe_cycle_duration(duration: f64) {
    CYCLE_DURATION.observe(duration);
}

pub fn set_instances_discovered(count: usize) {
    INSTANCES_DISCOVERED.set(i64::try_from(count).unwrap_or(i64::MAX));
}

pub fn increment_discovery_errors() {
    DISCOVERY_ERRORS_TOTAL.inc();
}

pub fn record_unseal_outcome(outcome: &UnsealOutcome) {
    let result = outcome.reason().map_or("unsealed", |reason| reason.as_str());
    UNSEAL_ATTEMPTS_TOTAL.with_label_values(&[result]).inc();
    KEYS_SUBMITTED_TOTAL.inc_by(outcome.keys_submitted() as u64);
}
