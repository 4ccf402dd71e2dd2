//! Run manifest export (JSON).

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pipeline::{ScanOptions, ScanOutcome, SkippedInstrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub window: usize,
    pub workers: usize,
    pub processed: usize,
    pub skipped: Vec<SkippedInstrument>,
    pub rows: usize,
    pub open_positions: usize,
    pub dedup_collisions: usize,
    pub report_file: String,
    pub report_blake3: String,
}

impl RunManifest {
    /// Describe a finished scan whose report has already been written to `report`.
    pub fn for_report(
        outcome: &ScanOutcome,
        opts: &ScanOptions,
        source: &str,
        report: &Path,
    ) -> Result<Self> {
        Ok(Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            start_date: opts.start,
            end_date: opts.end,
            window: opts.window,
            workers: opts.workers,
            processed: outcome.processed,
            skipped: outcome.skipped.clone(),
            rows: outcome.trades.len(),
            open_positions: outcome.open_count(),
            dedup_collisions: outcome.refine_stats.collisions,
            report_file: report
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            report_blake3: hash_file(report)?,
        })
    }
}

/// BLAKE3 hex digest of a file's contents.
pub fn hash_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {} for hashing", path.display()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)
        .context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
