//! Provider and quote-source selection from configuration.
//!
//! History and live quotes come from the same place:
//! - `yahoo`: one circuit breaker shared by the history and quote clients
//! - `csv_dir`: open positions are valued at the last close on file
//! - `synthetic`: no quotes, open positions stay unvalued
//!
//! `[quote] enabled = false` forces "no quotes" for every source.

use chrono::NaiveDate;
use darvas_core::data::{
    CircuitBreaker, CsvDirProvider, DataError, DataProvider, LastCloseQuotes, NoQuotes,
    QuoteSource, SyntheticProvider, YahooProvider, YahooSettings,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ScanConfig, SourceKind};

pub struct DataSources {
    kind: SourceKind,
    provider: Box<dyn DataProvider>,
    yahoo_quotes: Option<YahooProvider>,
}

impl DataSources {
    pub fn from_config(config: &ScanConfig) -> Result<Self, DataError> {
        let kind = config.data.source;
        let (provider, yahoo_quotes): (Box<dyn DataProvider>, Option<YahooProvider>) = match kind
        {
            SourceKind::Yahoo => {
                let breaker = Arc::new(CircuitBreaker::default_provider());
                let settings = YahooSettings {
                    quote_timeout: Duration::from_secs(config.quote.timeout_secs.max(1)),
                    ..YahooSettings::default()
                };
                let history = YahooProvider::new(Arc::clone(&breaker), settings.clone())?;
                let quotes = if config.quote.enabled {
                    Some(YahooProvider::new(breaker, settings)?)
                } else {
                    None
                };
                (Box::new(history), quotes)
            }
            SourceKind::CsvDir => (Box::new(CsvDirProvider::new(&config.data.csv_dir)), None),
            SourceKind::Synthetic => (Box::new(SyntheticProvider), None),
        };

        tracing::debug!(source = kind.as_str(), quotes = config.quote.enabled, "data sources ready");
        Ok(Self {
            kind,
            provider,
            yahoo_quotes,
        })
    }

    pub fn provider(&self) -> &dyn DataProvider {
        self.provider.as_ref()
    }

    /// Quote source for open positions over `[start, end]`.
    pub fn quotes(
        &self,
        enabled: bool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Box<dyn QuoteSource + '_> {
        if !enabled {
            return Box::new(NoQuotes);
        }
        match (self.kind, &self.yahoo_quotes) {
            (SourceKind::Yahoo, Some(yahoo)) => Box::new(yahoo),
            (SourceKind::CsvDir, _) => {
                Box::new(LastCloseQuotes::new(self.provider.as_ref(), start, end))
            }
            _ => Box::new(NoQuotes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn csv_dir_values_open_positions_at_last_close() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ACME.csv"),
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02,10,11,9,10.5,100\n\
             2024-01-03,10.5,12,10,11.5,120\n",
        )
        .unwrap();

        let mut config = ScanConfig::default();
        config.data.source = SourceKind::CsvDir;
        config.data.csv_dir = dir.path().to_path_buf();

        let sources = DataSources::from_config(&config).unwrap();
        assert_eq!(sources.provider().name(), "csv_dir");
        let quotes = sources.quotes(true, d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(quotes.latest_price("ACME").unwrap(), Some(11.5));

        let disabled = sources.quotes(false, d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(disabled.latest_price("ACME").unwrap(), None);
    }

    #[test]
    fn synthetic_has_no_quotes() {
        let mut config = ScanConfig::default();
        config.data.source = SourceKind::Synthetic;
        let sources = DataSources::from_config(&config).unwrap();
        let quotes = sources.quotes(true, d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(quotes.latest_price("ANY").unwrap(), None);
    }
}
