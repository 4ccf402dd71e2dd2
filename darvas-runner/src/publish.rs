//! Post-report hooks: publish the written report, notify a summary.
//!
//! Both run only once the report is on disk. A failure in either is logged
//! and recorded in [`PostReportStatus`]; the report itself stays as written.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use darvas_core::domain::TradeRecord;
use std::path::{Path, PathBuf};

pub trait Publisher {
    /// Make the report available elsewhere; returns where it landed.
    fn publish(&self, report: &Path) -> Result<PathBuf>;
}

/// Copies the report into an existing directory (e.g. a synced drive folder).
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    target_dir: PathBuf,
}

impl DirectoryPublisher {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }
}

impl Publisher for DirectoryPublisher {
    fn publish(&self, report: &Path) -> Result<PathBuf> {
        if !self.target_dir.is_dir() {
            bail!("publish target {} is not a directory", self.target_dir.display());
        }
        let file_name = report
            .file_name()
            .with_context(|| format!("report path {} has no file name", report.display()))?;
        let dest = self.target_dir.join(file_name);
        std::fs::copy(report, &dest).with_context(|| {
            format!("Failed to copy {} to {}", report.display(), dest.display())
        })?;
        Ok(dest)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub instrument: String,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
}

/// Notification payload: a date-stamped subject plus one row per trade.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub subject: String,
    pub rows: Vec<SummaryRow>,
}

impl ReportSummary {
    pub fn new(as_of: NaiveDate, trades: &[TradeRecord]) -> Self {
        Self {
            subject: format!("Darvas Box Trade Report - {}", as_of.format("%Y-%m-%d")),
            rows: trades
                .iter()
                .map(|t| SummaryRow {
                    instrument: t.instrument.clone(),
                    entry_date: t.entry_date,
                    exit_date: t.exit_date,
                })
                .collect(),
        }
    }

    /// Plain-text body, one `instrument  entry  exit` line per row.
    pub fn body(&self) -> String {
        let mut out = String::from("instrument\tentry_date\texit_date\n");
        for row in &self.rows {
            let exit = row
                .exit_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "OPEN".to_string());
            out.push_str(&format!("{}\t{}\t{}\n", row.instrument, row.entry_date, exit));
        }
        out
    }
}

pub trait Notifier {
    fn notify(&self, summary: &ReportSummary) -> Result<()>;
}

/// Emits the summary through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, summary: &ReportSummary) -> Result<()> {
        tracing::info!(subject = %summary.subject, rows = summary.rows.len(), "report notification");
        for row in &summary.rows {
            tracing::info!(
                instrument = %row.instrument,
                entry_date = %row.entry_date,
                exit_date = ?row.exit_date,
                "trade"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostReportStatus {
    pub published_to: Option<PathBuf>,
    pub publish_error: Option<String>,
    pub notified: bool,
    pub notify_error: Option<String>,
}

impl PostReportStatus {
    pub fn has_errors(&self) -> bool {
        self.publish_error.is_some() || self.notify_error.is_some()
    }
}

/// Run whichever hooks are configured against an already-written report.
pub fn publish_and_notify(
    report: &Path,
    summary: &ReportSummary,
    publisher: Option<&dyn Publisher>,
    notifier: Option<&dyn Notifier>,
) -> PostReportStatus {
    let mut status = PostReportStatus::default();

    if let Some(publisher) = publisher {
        match publisher.publish(report) {
            Ok(dest) => {
                tracing::info!(dest = %dest.display(), "report published");
                status.published_to = Some(dest);
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "publish failed");
                status.publish_error = Some(format!("{e:#}"));
            }
        }
    }

    if let Some(notifier) = notifier {
        match notifier.notify(summary) {
            Ok(()) => status.notified = true,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "notification failed");
                status.notify_error = Some(format!("{e:#}"));
            }
        }
    }

    status
}
