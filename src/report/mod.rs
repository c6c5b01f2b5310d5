//! # Reporting
//!
//! Turns cycle and health reports into user-facing output. The runtime talks
//! to a [`Reporter`] it is handed, so the output format (log lines or JSON on
//! stdout) is chosen once in `main` and tests can capture output directly.

mod json;
mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::unsealer::{CycleReport, HealthReport};
use serde::Serialize;

/// Process exit status for success
pub const EXIT_OK: u8 = 0;
/// Process exit status when any instance failed or configuration is missing
pub const EXIT_FAILURE: u8 = 1;

/// Sink for run results
pub trait Reporter: Send + Sync {
    /// Result of a one-shot unseal run
    fn unseal_report(&self, namespace: &str, report: &CycleReport) -> std::io::Result<()>;

    /// Result of a health check run
    fn health_report(&self, namespace: &str, report: &HealthReport) -> std::io::Result<()>;

    /// Result of one watch cycle
    fn watch_cycle(&self, namespace: &str, cycle: u64, report: &CycleReport)
        -> std::io::Result<()>;
}

/// Summary document of an unseal run
#[derive(Debug, Serialize)]
pub struct UnsealSummary<'a> {
    pub timestamp: String,
    pub namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u64>,
    pub total_pods: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: &'a CycleReport,
}

impl<'a> UnsealSummary<'a> {
    pub fn new(namespace: &'a str, report: &'a CycleReport) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            namespace,
            cycle: None,
            total_pods: report.len(),
            successful: report.successful(),
            failed: report.failed(),
            results: report,
        }
    }

    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }
}

/// Exit status of a one-shot unseal run
///
/// An empty report is a failure: nothing was unsealed.
pub fn unseal_exit_status(report: &CycleReport) -> u8 {
    if report.all_succeeded() {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

/// Exit status of a health check run
pub fn health_exit_status(report: &HealthReport) -> u8 {
    if report.all_healthy() {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}
