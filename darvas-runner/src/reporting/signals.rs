//! Raw signal report: every buy/sell bar, one row each.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use darvas_core::domain::SignalBar;
use darvas_core::signal::SignalSide;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SIGNAL_COLUMNS: [&str; 4] = ["instrument", "date", "price", "signal"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub instrument: String,
    pub date: NaiveDate,
    pub price: f64,
    /// `Buy` or `Sell`.
    pub signal: String,
}

impl SignalRow {
    pub fn new(side: SignalSide, bar: &SignalBar) -> Self {
        Self {
            instrument: bar.symbol().to_string(),
            date: bar.date(),
            price: bar.close(),
            signal: side.label().to_string(),
        }
    }
}

pub fn write_signals_csv(path: &Path, rows: &[SignalRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create signal report {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(SIGNAL_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush signal report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use darvas_core::domain::Bar;

    fn signal_bar(day: u32, close: f64, is_buy: bool, is_sell: bool) -> SignalBar {
        SignalBar {
            bar: Bar {
                symbol: "INFY.NS".into(),
                date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            },
            channel_high: Some(close - 2.0),
            channel_low: Some(close - 5.0),
            is_buy,
            is_sell,
        }
    }

    #[test]
    fn rows_carry_close_and_label() {
        let buy = SignalRow::new(SignalSide::Buy, &signal_bar(2, 1420.5, true, false));
        assert_eq!(buy.instrument, "INFY.NS");
        assert_eq!(buy.price, 1420.5);
        assert_eq!(buy.signal, "Buy");

        let sell = SignalRow::new(SignalSide::Sell, &signal_bar(9, 1380.0, false, true));
        assert_eq!(sell.signal, "Sell");
    }

    #[test]
    fn csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.csv");
        let rows = vec![SignalRow::new(SignalSide::Buy, &signal_bar(2, 1420.5, true, false))];
        write_signals_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "instrument,date,price,signal");
        assert_eq!(lines[1], "INFY.NS,2024-04-02,1420.5,Buy");
    }
}
