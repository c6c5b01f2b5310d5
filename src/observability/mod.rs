//! # Observability
//!
//! Prometheus metrics for the unsealer. Logging uses `tracing` directly; the
//! subscriber is installed by the binary (see [`crate::runtime::initialization`]).

pub mod metrics;
