//! TradeRecord: one matched (or still open) breakout trade.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a trade record was finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Closed by a later sell signal.
    Sold,
    /// No sell signal yet; valued against a live quote if one was available.
    Open,
}

/// A single entry → exit trade for one instrument.
///
/// Invariants upheld by the constructors:
/// - `exit_date.is_some()` ⇔ `exit_reason == Sold`, and then `entry_date < exit_date`
/// - `live_quote` is only ever set on `Open` records
/// - `return_pct` is `None` only for an `Open` record without a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    pub instrument: String,

    // ── Entry ──
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub channel_high_at_entry: f64,
    pub channel_low_at_entry: f64,

    // ── Exit ──
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub exit_reason: ExitReason,

    // ── Valuation ──
    pub live_quote: Option<f64>,
    pub return_pct: Option<f64>,
}

/// Entry-side fields shared by sold and open records.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub instrument: String,
    pub date: NaiveDate,
    pub price: f64,
    pub channel_high: f64,
    pub channel_low: f64,
}

impl TradeRecord {
    /// A position closed by a sell signal on `exit_date` at `exit_price`.
    pub fn sold(entry: Entry, exit_date: NaiveDate, exit_price: f64) -> Self {
        debug_assert!(entry.date < exit_date, "exit must come after entry");
        let return_pct = Some(percent_change(entry.price, exit_price));
        Self {
            instrument: entry.instrument,
            entry_date: entry.date,
            entry_price: entry.price,
            channel_high_at_entry: entry.channel_high,
            channel_low_at_entry: entry.channel_low,
            exit_date: Some(exit_date),
            exit_price: Some(exit_price),
            exit_reason: ExitReason::Sold,
            live_quote: None,
            return_pct,
        }
    }

    /// A position still held at the end of the series, valued at `quote` if known.
    pub fn open(entry: Entry, quote: Option<f64>) -> Self {
        let return_pct = quote.map(|q| percent_change(entry.price, q));
        Self {
            instrument: entry.instrument,
            entry_date: entry.date,
            entry_price: entry.price,
            channel_high_at_entry: entry.channel_high,
            channel_low_at_entry: entry.channel_low,
            exit_date: None,
            exit_price: None,
            exit_reason: ExitReason::Open,
            live_quote: quote,
            return_pct,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_reason == ExitReason::Open
    }
}

/// Percentage move from `from` to `to`: (to − from) / from × 100.
///
/// `from` must be a positive price; validated series guarantee this.
pub fn percent_change(from: f64, to: f64) -> f64 {
    debug_assert!(from > 0.0, "percent change from non-positive price {from}");
    (to - from) / from * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry {
            instrument: "TCS.NS".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            price: 100.0,
            channel_high: 98.0,
            channel_low: 90.0,
        }
    }

    #[test]
    fn sold_record_computes_return() {
        let rec = TradeRecord::sold(entry(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 110.0);
        assert_eq!(rec.exit_reason, ExitReason::Sold);
        assert!((rec.return_pct.unwrap() - 10.0).abs() < 1e-10);
        assert!(rec.live_quote.is_none());
    }

    #[test]
    fn open_record_with_quote() {
        let rec = TradeRecord::open(entry(), Some(105.0));
        assert!(rec.is_open());
        assert!(rec.exit_date.is_none());
        assert!((rec.return_pct.unwrap() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn open_record_without_quote_has_no_return() {
        let rec = TradeRecord::open(entry(), None);
        assert!(rec.return_pct.is_none());
    }

    #[test]
    fn losing_trade_is_negative() {
        assert!((percent_change(100.0, 92.5) + 7.5).abs() < 1e-10);
    }
}
