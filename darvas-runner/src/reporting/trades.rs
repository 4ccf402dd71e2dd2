//! Trade report table (CSV/JSON).
//!
//! Columns, in order: instrument, entry_date, entry_price, channel_high,
//! channel_low, entry_signal_label, exit_date, exit_price, exit_signal_label,
//! live_quote, return_pct. Absent values are empty cells.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use darvas_core::domain::{Entry, ExitReason, TradeRecord};
use darvas_core::signal::SignalSide;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const REPORT_COLUMNS: [&str; 11] = [
    "instrument",
    "entry_date",
    "entry_price",
    "channel_high",
    "channel_low",
    "entry_signal_label",
    "exit_date",
    "exit_price",
    "exit_signal_label",
    "live_quote",
    "return_pct",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("row {row} ({instrument}): {reason}")]
    InvalidRow {
        row: usize,
        instrument: String,
        reason: String,
    },
}

/// One report line. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub instrument: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub channel_high: f64,
    pub channel_low: f64,
    pub entry_signal_label: String,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub exit_signal_label: Option<String>,
    pub live_quote: Option<f64>,
    pub return_pct: Option<f64>,
}

impl From<&TradeRecord> for ReportRow {
    fn from(t: &TradeRecord) -> Self {
        let exit_signal_label = match t.exit_reason {
            ExitReason::Sold => Some(SignalSide::Sell.label().to_string()),
            ExitReason::Open => None,
        };
        Self {
            instrument: t.instrument.clone(),
            entry_date: t.entry_date,
            entry_price: t.entry_price,
            channel_high: t.channel_high_at_entry,
            channel_low: t.channel_low_at_entry,
            entry_signal_label: SignalSide::Buy.label().to_string(),
            exit_date: t.exit_date,
            exit_price: t.exit_price,
            exit_signal_label,
            live_quote: t.live_quote,
            return_pct: t.return_pct,
        }
    }
}

impl ReportRow {
    /// Rebuild the trade record, re-checking the record invariants.
    ///
    /// `return_pct` is recomputed from the prices rather than trusted.
    pub fn into_record(self, row: usize) -> Result<TradeRecord, ReportError> {
        let invalid = |instrument: &str, reason: &str| ReportError::InvalidRow {
            row,
            instrument: instrument.to_string(),
            reason: reason.to_string(),
        };

        if !(self.entry_price.is_finite() && self.entry_price > 0.0) {
            return Err(invalid(&self.instrument, "entry_price must be a positive number"));
        }

        let entry = Entry {
            instrument: self.instrument.clone(),
            date: self.entry_date,
            price: self.entry_price,
            channel_high: self.channel_high,
            channel_low: self.channel_low,
        };

        match (self.exit_date, self.exit_price) {
            (Some(exit_date), Some(exit_price)) => {
                if exit_date <= self.entry_date {
                    return Err(invalid(&self.instrument, "exit_date is not after entry_date"));
                }
                Ok(TradeRecord::sold(entry, exit_date, exit_price))
            }
            (None, None) => Ok(TradeRecord::open(entry, self.live_quote)),
            _ => Err(invalid(
                &self.instrument,
                "exit_date and exit_price must both be present or both empty",
            )),
        }
    }
}

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create trade report {}", path.display()))?;

    if trades.is_empty() {
        // serde only emits a header alongside the first row
        writer.write_record(REPORT_COLUMNS)?;
    }
    for trade in trades {
        writer.serialize(ReportRow::from(trade))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush trade report {}", path.display()))?;
    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let rows: Vec<ReportRow> = trades.iter().map(ReportRow::from).collect();
    let json = serde_json::to_string_pretty(&rows).context("Failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write trades JSON {}", path.display()))?;
    Ok(())
}

/// Read a trade report back into records (e.g. to re-refine a combined report).
pub fn read_trades_csv(path: &Path) -> Result<Vec<TradeRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open trade report {}", path.display()))?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<ReportRow>().enumerate() {
        let line = i + 2;
        let row = row.with_context(|| format!("{}: unreadable row {line}", path.display()))?;
        records.push(row.into_record(line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn entry(date: NaiveDate) -> Entry {
        Entry {
            instrument: "HDFCBANK.NS".into(),
            date,
            price: 1500.0,
            channel_high: 1490.25,
            channel_low: 1402.5,
        }
    }

    #[test]
    fn header_matches_column_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_trades_csv(&path, &[TradeRecord::open(entry(d(1, 5)), None)]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, REPORT_COLUMNS.join(","));
    }

    #[test]
    fn empty_report_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_trades_csv(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), REPORT_COLUMNS.join(","));
        assert!(read_trades_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn labels_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let trades = vec![
            TradeRecord::sold(entry(d(1, 5)), d(2, 1), 1650.0),
            TradeRecord::open(entry(d(3, 1)), Some(1575.0)),
        ];
        write_trades_csv(&path, &trades).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[1],
            "HDFCBANK.NS,2024-01-05,1500.0,1490.25,1402.5,Buy,2024-02-01,1650.0,Sell,,10.0"
        );
        assert_eq!(
            lines[2],
            "HDFCBANK.NS,2024-03-01,1500.0,1490.25,1402.5,Buy,,,,1575.0,5.0"
        );
    }

    #[test]
    fn csv_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let trades = vec![
            TradeRecord::sold(entry(d(1, 5)), d(2, 1), 1617.3),
            TradeRecord::open(entry(d(3, 1)), None),
        ];
        write_trades_csv(&path, &trades).unwrap();
        assert_eq!(read_trades_csv(&path).unwrap(), trades);
    }

    #[test]
    fn half_filled_exit_is_rejected() {
        let row = ReportRow {
            exit_price: None,
            ..ReportRow::from(&TradeRecord::sold(entry(d(1, 5)), d(2, 1), 1650.0))
        };
        let err = row.into_record(7).unwrap_err();
        assert!(err.to_string().starts_with("row 7 (HDFCBANK.NS)"));
    }

    #[test]
    fn non_positive_entry_price_is_rejected() {
        let row = ReportRow {
            entry_price: 0.0,
            ..ReportRow::from(&TradeRecord::sold(entry(d(1, 5)), d(2, 1), 1650.0))
        };
        let err = row.into_record(3).unwrap_err();
        assert!(err.to_string().contains("entry_price"), "{err}");
    }

    #[test]
    fn json_copy_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_trades_json(&path, &[TradeRecord::open(entry(d(1, 5)), Some(1600.0))]).unwrap();
        let rows: Vec<ReportRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows[0].live_quote, Some(1600.0));
        assert_eq!(rows[0].exit_signal_label, None);
    }
}
