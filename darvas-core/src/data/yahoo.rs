//! Yahoo Finance provider for daily history and live quotes.
//!
//! Uses the v8 chart API. History requests retry with exponential backoff;
//! quote requests make a single attempt under a shorter timeout, since a
//! missing quote only leaves an open position unvalued. Both share one
//! circuit breaker so a ban stops all traffic.
//!
//! Yahoo has no official API and changes format without notice; the CSV
//! directory provider is the offline fallback.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource, FetchResult, QuoteSource, RawBar};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Exchange metadata. `gmtoffset` is seconds east of UTC.
#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

/// First series of a chart response, with the exchange's UTC offset.
struct Series {
    timestamps: Vec<i64>,
    quote: QuoteData,
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Timeouts and retry policy.
#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub history_timeout: Duration,
    pub quote_timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            history_timeout: Duration::from_secs(30),
            quote_timeout: Duration::from_secs(10),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    settings: YahooSettings,
}

impl YahooProvider {
    pub fn new(
        circuit_breaker: Arc<CircuitBreaker>,
        settings: YahooSettings,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.history_timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            settings,
        })
    }

    /// Chart URL for an inclusive date range.
    fn history_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(NaiveTime::default()).and_utc().timestamp();
        let end_ts = (end + chrono::Duration::days(1))
            .and_time(NaiveTime::default())
            .and_utc()
            .timestamp();
        format!("{CHART_BASE}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d")
    }

    /// Chart URL covering the last few sessions, for the latest close.
    fn quote_url(symbol: &str) -> String {
        format!("{CHART_BASE}/{symbol}?range=5d&interval=1d")
    }

    fn first_series(symbol: &str, resp: ChartResponse) -> Result<Series, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::ResponseFormatChanged("no timestamps".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        Ok(Series {
            timestamps,
            quote,
            gmtoffset,
        })
    }

    /// Parse the chart response into RawBars.
    ///
    /// Dates are taken in exchange-local time. Rows where every field is
    /// missing (holidays) are dropped; partially missing rows become NaN and
    /// are rejected later by validation.
    fn parse_history(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let Series {
            timestamps,
            quote,
            gmtoffset,
        } = Self::first_series(symbol, resp)?;
        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = ts
                .checked_add(gmtoffset)
                .and_then(|local| chrono::DateTime::from_timestamp(local, 0))
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
            let (open, high, low, close, volume) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
                field(&quote.volume),
            );

            if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none()
            {
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(f64::NAN),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    /// Last non-null close in the response.
    fn parse_last_close(symbol: &str, resp: ChartResponse) -> Result<Option<f64>, DataError> {
        let quote = Self::first_series(symbol, resp)?.quote;
        Ok(quote.close.iter().rev().flatten().copied().find(|c| c.is_finite()))
    }

    /// Send one request, translating HTTP status into breaker updates and errors.
    fn request(
        &self,
        symbol: &str,
        url: &str,
        timeout: Duration,
    ) -> Result<ChartResponse, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            self.circuit_breaker.trip();
            return Err(DataError::CircuitBreakerTripped);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.circuit_breaker.record_failure();
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DataError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        if !status.is_success() {
            self.circuit_breaker.record_failure();
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        self.circuit_breaker.record_success();
        Ok(chart)
    }

    fn is_retryable(err: &DataError) -> bool {
        matches!(
            err,
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. } | DataError::Other(_)
        )
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let url = Self::history_url(symbol, start, end);
        let mut last_error = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = self.settings.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying history fetch");
                std::thread::sleep(delay);
            }

            match self.request(symbol, &url, self.settings.history_timeout) {
                Ok(chart) => return Self::parse_history(symbol, chart),
                Err(e) if Self::is_retryable(&e) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol, start, end)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }
}

impl QuoteSource for YahooProvider {
    fn latest_price(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        let chart = self.request(symbol, &Self::quote_url(symbol), self.settings.quote_timeout)?;
        Self::parse_last_close(symbol, chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, null, 102.0],
                        "high":   [101.0, null, 103.5],
                        "low":    [99.0,  null, 101.0],
                        "close":  [100.5, null, 103.0],
                        "volume": [12000, null, 15000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_history_and_skips_empty_rows() {
        let resp: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let bars = YahooProvider::parse_history("AAA", resp).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 103.0);
        assert_eq!(bars[1].volume, 15000.0);
    }

    #[test]
    fn dates_follow_exchange_offset() {
        // 2024-01-01 23:00 UTC is the 2024-01-02 session in Sydney (UTC+10).
        let json = SAMPLE
            .replace("[1704205800, 1704292200, 1704378600]", "[1704150000, 1704236400, 1704322800]")
            .replace(r#""result": [{"#, r#""result": [{ "meta": { "gmtoffset": 36000 },"#);
        let resp: ChartResponse = serde_json::from_str(&json).unwrap();
        let bars = YahooProvider::parse_history("BHP.AX", resp).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn missing_offset_means_utc() {
        let json = SAMPLE.replace(r#""result": [{"#, r#""result": [{ "meta": { "currency": "USD" },"#);
        let resp: ChartResponse = serde_json::from_str(&json).unwrap();
        let bars = YahooProvider::parse_history("AAA", resp).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn last_close_skips_trailing_nulls() {
        let json = SAMPLE.replace("[100.5, null, 103.0]", "[100.5, 101.0, null]");
        let resp: ChartResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(YahooProvider::parse_last_close("AAA", resp).unwrap(), Some(101.0));
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let err = YahooProvider::parse_history("ZZZ", resp).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { symbol } if symbol == "ZZZ"));
    }

    #[test]
    fn history_url_covers_end_date() {
        let url = YahooProvider::history_url(
            "AAA",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704153600"));
    }
}
