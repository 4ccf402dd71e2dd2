//! Serializable scan configuration (TOML).
//!
//! Every field has a default, so an empty file is a valid config and the CLI
//! can run without one. CLI flags are applied on top after loading.

use chrono::NaiveDate;
use darvas_core::data::DEFAULT_SYMBOL_COLUMN;
use darvas_core::signal::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::ScanOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where historical bars come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Yahoo,
    CsvDir,
    Synthetic,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Yahoo => "yahoo",
            SourceKind::CsvDir => "csv_dir",
            SourceKind::Synthetic => "synthetic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSection,
    pub data: DataSection,
    pub quote: QuoteSection,
    pub output: OutputSection,
    pub publish: PublishSection,
    pub notify: NotifySection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub symbols_file: PathBuf,
    pub symbol_column: String,
    pub start_date: NaiveDate,
    /// Inclusive; `None` means today.
    pub end_date: Option<NaiveDate>,
    pub window: usize,
    pub workers: usize,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            symbols_file: PathBuf::from("stock_symbols.csv"),
            symbol_column: DEFAULT_SYMBOL_COLUMN.to_string(),
            start_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
            end_date: None,
            window: DEFAULT_WINDOW,
            workers: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub source: SourceKind,
    pub csv_dir: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            source: SourceKind::Yahoo,
            csv_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSection {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for QuoteSection {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub report_name: String,
    pub signals_name: String,
    pub write_json: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Reports"),
            report_name: "darvas_box_trade_report.csv".into(),
            signals_name: "darvas_box_signal_report.csv".into(),
            write_json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSection {
    pub target_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.window == 0 {
            return Err(ConfigError::Invalid("scan.window must be >= 1".into()));
        }
        if self.scan.workers == 0 {
            return Err(ConfigError::Invalid("scan.workers must be >= 1".into()));
        }
        if let Some(end) = self.scan.end_date {
            if self.scan.start_date > end {
                return Err(ConfigError::Invalid(format!(
                    "scan.start_date {} is after scan.end_date {end}",
                    self.scan.start_date
                )));
            }
        }
        Ok(())
    }

    /// End date with `None` resolved against `today`.
    pub fn end_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.scan.end_date.unwrap_or(today)
    }

    pub fn scan_options(&self, today: NaiveDate) -> ScanOptions {
        ScanOptions {
            start: self.scan.start_date,
            end: self.end_date_or(today),
            window: self.scan.window,
            workers: self.scan.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ScanConfig::from_toml("").unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.scan.window, 20);
        assert_eq!(config.scan.symbol_column, "stock_symbol");
        assert!(config.quote.enabled);
        assert_eq!(config.data.source, SourceKind::Yahoo);
    }

    #[test]
    fn parses_full_config() {
        let toml = r#"
[scan]
symbols_file = "roster.csv"
start_date = "2020-01-01"
end_date = "2024-09-08"
window = 60
workers = 8

[data]
source = "csv_dir"
csv_dir = "prices"

[quote]
enabled = false

[output]
dir = "out"
write_json = true

[publish]
target_dir = "shared/Market Tracker"

[logging]
level = "debug"
json = true
"#;
        let config = ScanConfig::from_toml(toml).unwrap();
        assert_eq!(config.scan.window, 60);
        assert_eq!(config.scan.workers, 8);
        assert_eq!(
            config.scan.end_date,
            NaiveDate::from_ymd_opt(2024, 9, 8)
        );
        assert_eq!(config.data.source, SourceKind::CsvDir);
        assert!(!config.quote.enabled);
        assert_eq!(config.quote.timeout_secs, 10);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(config.output.write_json);
        assert_eq!(
            config.publish.target_dir,
            Some(PathBuf::from("shared/Market Tracker"))
        );
        assert!(config.logging.json);
    }

    #[test]
    fn rejects_zero_window() {
        let err = ScanConfig::from_toml("[scan]\nwindow = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_dates() {
        let err = ScanConfig::from_toml(
            "[scan]\nstart_date = \"2024-01-01\"\nend_date = \"2023-01-01\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("after"));
    }

    #[test]
    fn rejects_unknown_source() {
        assert!(matches!(
            ScanConfig::from_toml("[data]\nsource = \"bloomberg\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn end_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(ScanConfig::default().end_date_or(today), today);
    }

    #[test]
    fn sample_config_parses() {
        let config = ScanConfig::from_toml(include_str!("../../darvas.toml")).unwrap();
        assert!(config.notify.enabled);
        assert_eq!(config.publish.target_dir, None);

        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let opts = config.scan_options(today);
        assert_eq!(opts.window, 20);
        assert_eq!(opts.end, today);
    }
}
