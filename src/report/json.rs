//! Machine-readable reporting as JSON documents.

use super::{Reporter, UnsealSummary};
use crate::unsealer::{CycleReport, HealthReport};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

/// Writes one JSON document per report to `writer`
///
/// One-shot and health reports are pretty-printed; watch cycles are written
/// as one compact line each so the stream can be consumed line by line.
#[derive(Debug)]
pub struct JsonReporter<W> {
    writer: Mutex<W>,
}

impl JsonReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_document<T: Serialize>(&self, document: &T, pretty: bool) -> std::io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, document)?;
        } else {
            serde_json::to_writer(&mut *writer, document)?;
        }
        writeln!(writer)?;
        writer.flush()
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn unseal_report(&self, namespace: &str, report: &CycleReport) -> std::io::Result<()> {
        self.write_document(&UnsealSummary::new(namespace, report), true)
    }

    fn health_report(&self, _namespace: &str, report: &HealthReport) -> std::io::Result<()> {
        self.write_document(report, true)
    }

    fn watch_cycle(
        &self,
        namespace: &str,
        cycle: u64,
        report: &CycleReport,
    ) -> std::io::Result<()> {
        self.write_document(&UnsealSummary::new(namespace, report).with_cycle(cycle), false)
    }
}
