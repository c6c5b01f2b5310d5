//! # Watch Loop
//!
//! Re-runs the unseal cycle on a fixed interval until cancelled. A cycle always
//! completes (or is cancelled) before the next sleep starts, so cycles never
//! overlap. Failed cycles are reported and the loop keeps going.

use crate::config::UnsealKey;
use crate::observability::metrics;
use crate::report::Reporter;
use crate::unsealer::Unsealer;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Target and pacing of the watch loop
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub namespace: String,
    pub label_selector: String,
    pub interval: Duration,
}

/// Run unseal cycles every `settings.interval` until `cancel` fires
///
/// Cancellation interrupts both the in-flight cycle and the sleep between
/// cycles. Returns the number of cycles that ran to completion.
pub async fn run_watch_loop(
    unsealer: &Unsealer,
    settings: &WatchSettings,
    keys: &[UnsealKey],
    reporter: &dyn Reporter,
    cancel: CancellationToken,
) -> u64 {
    info!(
        "Starting watch mode - checking every {}s",
        settings.interval.as_secs()
    );
    info!("Press Ctrl+C to stop");

    let mut completed = 0u64;
    loop {
        let cycle = completed + 1;
        info!("{}", "=".repeat(60));
        info!(
            "Cycle {} at {}",
            cycle,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let start = Instant::now();
        let report = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            report = unsealer.unseal_all(&settings.namespace, &settings.label_selector, keys) => report,
        };
        completed = cycle;

        metrics::increment_cycles();
        metrics::observe_cycle_duration(start.elapsed().as_secs_f64());

        if let Err(e) = reporter.watch_cycle(&settings.namespace, cycle, &report) {
            warn!(error = %e, "Failed to write report for cycle {}", cycle);
        }

        info!(
            "Waiting {}s before the next check...",
            settings.interval.as_secs()
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(settings.interval) => {}
        }
    }

    info!("Stopping watch mode after {} completed cycle(s)", completed);
    completed
}
