//! Vault Kubernetes Unsealer Library
//!
//! Discovery of Vault pods, the Vault unseal protocol client, the unseal
//! orchestrator and the watch runtime. Tests are included in the module files
//! and under `tests/`.

pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod observability;
pub mod report;
pub mod runtime;
pub mod unsealer;
pub mod vault;
