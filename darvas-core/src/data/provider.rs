//! Price source traits and structured error types.
//!
//! `DataProvider` abstracts over historical sources (Yahoo Finance, a CSV
//! directory, synthetic data) and `QuoteSource` over live prices, so the scan
//! pipeline can swap implementations and mock them in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Raw daily OHLCV bar from a provider (before validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Structured error types for data operations.
///
/// Displayable as-is in CLI output and log lines.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("malformed series for '{symbol}': {reason}")]
    MalformedSeries { symbol: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Csv(e.to_string())
    }
}

/// Result of a successful history fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvDir,
    Synthetic,
}

/// Historical OHLCV source.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}

/// Best-effort live price source for valuing open positions.
///
/// `Ok(None)` means the source has no price for the symbol. Callers treat
/// errors the same way; a quote is never required.
pub trait QuoteSource: Send + Sync {
    fn latest_price(&self, symbol: &str) -> Result<Option<f64>, DataError>;
}

impl<T: QuoteSource + ?Sized> QuoteSource for &T {
    fn latest_price(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        (**self).latest_price(symbol)
    }
}

/// Quote source that never has a price (offline runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuotes;

impl QuoteSource for NoQuotes {
    fn latest_price(&self, _symbol: &str) -> Result<Option<f64>, DataError> {
        Ok(None)
    }
}

/// Fixed symbol → price table.
#[derive(Debug, Clone, Default)]
pub struct StaticQuotes {
    prices: HashMap<String, f64>,
}

impl StaticQuotes {
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            prices: pairs.into_iter().map(|(s, p)| (s.into(), p)).collect(),
        }
    }
}

impl QuoteSource for StaticQuotes {
    fn latest_price(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        Ok(self.prices.get(symbol).copied())
    }
}

/// Uses the last close of the fetched history as the "live" price.
///
/// Handy for replaying a CSV directory where no live feed exists.
pub struct LastCloseQuotes<'a> {
    provider: &'a dyn DataProvider,
    start: NaiveDate,
    end: NaiveDate,
}

impl<'a> LastCloseQuotes<'a> {
    pub fn new(provider: &'a dyn DataProvider, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            provider,
            start,
            end,
        }
    }
}

impl QuoteSource for LastCloseQuotes<'_> {
    fn latest_price(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        let fetched = self.provider.fetch(symbol, self.start, self.end)?;
        Ok(fetched
            .bars
            .iter()
            .rev()
            .map(|b| b.close)
            .find(|c| c.is_finite()))
    }
}
