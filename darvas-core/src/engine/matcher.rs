//! Sequential trade matcher: a two-state (Flat / Long) machine per instrument.
//!
//! Walks one instrument's signal series in date order:
//! - Flat + buy signal → Long, capturing entry price and channel bounds.
//! - Long + sell signal (necessarily on a later bar) → emit a Sold record, Flat.
//! - Buy signals while Long are ignored: one position per instrument.
//! - Still Long when the series ends → emit a single Open record valued at
//!   the live quote, if one can be obtained.
//!
//! Records come out in ascending entry date; an Open record, if any, is last.

use crate::data::provider::QuoteSource;
use crate::domain::{Entry, SignalBar, TradeRecord};

/// Position state for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    Long(Entry),
}

impl PositionState {
    /// Apply one bar. Returns the next state and a finalized record, if any.
    pub fn on_bar(self, instrument: &str, bar: &SignalBar) -> (PositionState, Option<TradeRecord>) {
        match self {
            PositionState::Flat => {
                if bar.is_buy {
                    if let (Some(channel_high), Some(channel_low)) =
                        (bar.channel_high, bar.channel_low)
                    {
                        let entry = Entry {
                            instrument: instrument.to_string(),
                            date: bar.date(),
                            price: bar.close(),
                            channel_high,
                            channel_low,
                        };
                        return (PositionState::Long(entry), None);
                    }
                }
                (PositionState::Flat, None)
            }
            PositionState::Long(entry) => {
                if bar.is_sell && bar.date() > entry.date {
                    let record = TradeRecord::sold(entry, bar.date(), bar.close());
                    (PositionState::Flat, Some(record))
                } else {
                    (PositionState::Long(entry), None)
                }
            }
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

/// Pairs entries with exits for a single instrument.
pub struct TradeMatcher<'a> {
    quotes: &'a dyn QuoteSource,
}

impl<'a> TradeMatcher<'a> {
    pub fn new(quotes: &'a dyn QuoteSource) -> Self {
        Self { quotes }
    }

    /// Match trades over a chronological signal series.
    pub fn match_trades(&self, instrument: &str, signals: &[SignalBar]) -> Vec<TradeRecord> {
        debug_assert!(
            signals.windows(2).all(|w| w[0].date() < w[1].date()),
            "signal series must be strictly ascending by date"
        );

        let mut state = PositionState::Flat;
        let mut records = Vec::new();

        for bar in signals {
            let (next, finalized) = state.on_bar(instrument, bar);
            if let Some(record) = finalized {
                tracing::trace!(
                    instrument,
                    entry = %record.entry_date,
                    exit = ?record.exit_date,
                    "trade closed"
                );
                records.push(record);
            }
            state = next;
        }

        if let PositionState::Long(entry) = state {
            let quote = self.resolve_quote(instrument);
            records.push(TradeRecord::open(entry, quote));
        }

        records
    }

    /// Best-effort live price. Errors and unusable prices both mean "no price".
    fn resolve_quote(&self, instrument: &str) -> Option<f64> {
        match self.quotes.latest_price(instrument) {
            Ok(Some(price)) if price.is_finite() && price > 0.0 => Some(price),
            Ok(Some(price)) => {
                tracing::warn!(instrument, price, "ignoring unusable live quote");
                None
            }
            Ok(None) => {
                tracing::debug!(instrument, "no live quote available");
                None
            }
            Err(e) => {
                tracing::warn!(instrument, error = %e, "live quote failed; open position left unvalued");
                None
            }
        }
    }
}
