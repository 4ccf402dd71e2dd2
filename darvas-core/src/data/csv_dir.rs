//! CSV directory provider, one `<SYMBOL>.csv` per instrument.
//!
//! Expected header: `Date,Open,High,Low,Close,Volume` (lower-case accepted,
//! extra columns such as `Adj Close` ignored). Rows outside the requested
//! range are dropped. A cell that does not parse fails the whole symbol.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: NaiveDate,
    #[serde(rename = "Open", alias = "open")]
    open: f64,
    #[serde(rename = "High", alias = "high")]
    high: f64,
    #[serde(rename = "Low", alias = "low")]
    low: f64,
    #[serde(rename = "Close", alias = "close")]
    close: f64,
    #[serde(rename = "Volume", alias = "volume")]
    volume: f64,
}

#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_file(symbol: &str, path: &Path) -> Result<Vec<RawBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| DataError::MalformedSeries {
                symbol: symbol.to_string(),
                // +2: one for the header, one for 1-based numbering
                reason: format!("row {}: {e}", line + 2),
            })?;
            bars.push(RawBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

impl DataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars: Vec<RawBar> = Self::read_file(symbol, &path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvDir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reads_and_filters_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AAA.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,10,11,9,10.5,10.5,1000\n\
             2024-01-03,10.5,12,10,11.5,11.5,1500\n\
             2024-01-04,11.5,12,11,11.8,11.8,900\n",
        )
        .unwrap();

        let provider = CsvDirProvider::new(dir.path());
        let result = provider.fetch("AAA", d(2024, 1, 3), d(2024, 1, 31)).unwrap();
        assert_eq!(result.source, DataSource::CsvDir);
        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.bars[0].date, d(2024, 1, 3));
        assert_eq!(result.bars[1].volume, 900.0);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvDirProvider::new(dir.path())
            .fetch("NOPE", d(2024, 1, 1), d(2024, 12, 31))
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn non_numeric_cell_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("BAD.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-01-02,10,11,9,abc,1000\n",
        )
        .unwrap();
        let err = CsvDirProvider::new(dir.path())
            .fetch("BAD", d(2024, 1, 1), d(2024, 12, 31))
            .unwrap_err();
        match err {
            DataError::MalformedSeries { symbol, reason } => {
                assert_eq!(symbol, "BAD");
                assert!(reason.starts_with("row 2"), "reason: {reason}");
            }
            other => panic!("expected MalformedSeries, got {other}"),
        }
    }
}
