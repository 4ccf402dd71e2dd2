//! Indicators used by the channel breakout detector.
//!
//! Indicators are pure functions: bar history in, numeric series out. Each
//! returns a series of the same length as the input with `f64::NAN` for bars
//! where the value is not yet defined.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod channel;
pub mod volume_mean;

pub use channel::TrailingChannel;
pub use volume_mean::RunningVolumeMean;

use crate::domain::Bar;

/// Trait for indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "channel_high_20").
    fn name(&self) -> &str;

    /// Number of leading bars for which the output is `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Converts an indicator value into `Some` only when it is defined.
pub fn defined(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high/low = ±1.0 around the
/// open/close range, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
