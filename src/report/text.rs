//! Human-readable reporting through the log output.

use super::Reporter;
use crate::unsealer::{CycleReport, HealthReport, UnsealOutcome};
use tracing::{info, warn};

/// Writes summaries as log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReporter;

impl TextReporter {
    fn outcome_line(name: &str, outcome: &UnsealOutcome, ok_label: &str) {
        match outcome.reason() {
            None => info!("  [{}]: ✅ {}", name, ok_label),
            Some(reason) => info!("  [{}]: ❌ FAILED ({})", name, reason),
        }
    }
}

impl Reporter for TextReporter {
    fn unseal_report(&self, _namespace: &str, report: &CycleReport) -> std::io::Result<()> {
        info!("{}", "=".repeat(60));
        info!(
            "Result: {}/{} pods unsealed successfully",
            report.successful(),
            report.len()
        );
        for (name, outcome) in report.iter() {
            Self::outcome_line(name, outcome, "SUCCESS");
        }
        Ok(())
    }

    fn health_report(&self, _namespace: &str, report: &HealthReport) -> std::io::Result<()> {
        let healthy = report.iter().filter(|(_, h)| h.healthy).count();
        info!("Health: {}/{} pods healthy", healthy, report.len());
        Ok(())
    }

    fn watch_cycle(
        &self,
        _namespace: &str,
        cycle: u64,
        report: &CycleReport,
    ) -> std::io::Result<()> {
        if report.is_empty() {
            warn!("Cycle {}: no pods were processed", cycle);
            return Ok(());
        }

        info!(
            "Cycle {} result: {}/{} pods unsealed",
            cycle,
            report.successful(),
            report.len()
        );
        for (name, outcome) in report.iter() {
            Self::outcome_line(name, outcome, "OK");
        }
        Ok(())
    }
}
