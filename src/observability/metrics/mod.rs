//! # Metrics Module
//!
//! Prometheus metrics for monitoring the unsealer, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text exposition
//! - `unseal_metrics` - Cycle, discovery and per-instance outcome metrics
//! - `vault_metrics` - Vault API request and retry metrics

pub mod registry;
pub mod unseal_metrics;
pub mod vault_metrics;

pub use registry::*;
pub use unseal_metrics::*;
pub use vault_metrics::*;
