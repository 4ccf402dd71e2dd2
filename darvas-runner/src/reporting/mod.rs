//! Report sinks: trade report, raw signal report, run manifest.

mod manifest;
mod signals;
mod trades;

use anyhow::{Context, Result};
use darvas_core::domain::TradeRecord;
use darvas_core::engine::{refine, RefineStats};
use std::path::{Path, PathBuf};

use crate::config::OutputSection;
use crate::pipeline::{ScanOptions, ScanOutcome};

pub use manifest::{hash_file, write_manifest, RunManifest};
pub use signals::{write_signals_csv, SignalRow};
pub use trades::{
    read_trades_csv, write_trades_csv, write_trades_json, ReportError, ReportRow, REPORT_COLUMNS,
};

/// Persists the final trade table.
pub trait ReportSink {
    /// Write the table; returns the path of the primary file.
    fn write_report(&self, trades: &[TradeRecord]) -> Result<PathBuf>;
}

/// CSV trade report, with an optional pretty JSON copy alongside.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    path: PathBuf,
    write_json: bool,
}

impl CsvReportSink {
    pub fn new(path: impl Into<PathBuf>, write_json: bool) -> Self {
        Self {
            path: path.into(),
            write_json,
        }
    }

    pub fn json_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }
}

impl ReportSink for CsvReportSink {
    fn write_report(&self, trades: &[TradeRecord]) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        write_trades_csv(&self.path, trades)?;
        if self.write_json {
            write_trades_json(&self.json_path(), trades)?;
        }
        tracing::info!(path = %self.path.display(), rows = trades.len(), "trade report written");
        Ok(self.path.clone())
    }
}

/// Paths produced by [`ReportWriter::save_scan`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub report: PathBuf,
    pub report_json: Option<PathBuf>,
    pub manifest: PathBuf,
}

/// Writes every output of a scan into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    report_name: String,
    signals_name: String,
    write_json: bool,
}

impl ReportWriter {
    pub fn new(output: &OutputSection) -> Result<Self> {
        std::fs::create_dir_all(&output.dir).with_context(|| {
            format!("Failed to create report directory {}", output.dir.display())
        })?;
        Ok(Self {
            output_dir: output.dir.clone(),
            report_name: output.report_name.clone(),
            signals_name: output.signals_name.clone(),
            write_json: output.write_json,
        })
    }

    /// Trade report (plus JSON copy if enabled) followed by `manifest.json`.
    pub fn save_scan(
        &self,
        outcome: &ScanOutcome,
        opts: &ScanOptions,
        source: &str,
    ) -> Result<ReportPaths> {
        let sink = CsvReportSink::new(self.output_dir.join(&self.report_name), self.write_json);
        let report = sink.write_report(&outcome.trades)?;
        let report_json = self.write_json.then(|| sink.json_path());

        let manifest_path = self.output_dir.join("manifest.json");
        let manifest = RunManifest::for_report(outcome, opts, source, &report)?;
        write_manifest(&manifest_path, &manifest)?;

        Ok(ReportPaths {
            report,
            report_json,
            manifest: manifest_path,
        })
    }

    pub fn save_signals(&self, rows: &[SignalRow]) -> Result<PathBuf> {
        let path = self.output_dir.join(&self.signals_name);
        write_signals_csv(&path, rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "signal report written");
        Ok(path)
    }
}

/// Re-refine an existing (possibly combined) trade report into `output`.
pub fn refine_report(input: &Path, output: &Path) -> Result<RefineStats> {
    let records = read_trades_csv(input)?;
    let (refined, stats) = refine(records);
    CsvReportSink::new(output, false).write_report(&refined)?;
    Ok(stats)
}
