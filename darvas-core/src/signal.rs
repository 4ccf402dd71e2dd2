//! Channel breakout signal detector.
//!
//! Buy when the close breaks above the trailing channel high on above-average
//! volume; sell when the close breaks below the trailing channel low:
//!
//! - `is_buy[i]  = close[i] > channel_high[i] && volume[i] > mean(volume[0..=i])`
//! - `is_sell[i] = close[i] < channel_low[i]`
//!
//! Bars without a full window of history carry no channel and no signal.

use crate::domain::{Bar, SignalBar};
use crate::indicators::{defined, Indicator, RunningVolumeMean, TrailingChannel};
use serde::{Deserialize, Serialize};

/// Default channel window (trading days).
pub const DEFAULT_WINDOW: usize = 20;

/// Which side a detected signal is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalSide {
    Buy,
    Sell,
}

impl SignalSide {
    pub fn label(self) -> &'static str {
        match self {
            SignalSide::Buy => "Buy",
            SignalSide::Sell => "Sell",
        }
    }
}

/// Pure detector: bar series in, annotated signal series out.
#[derive(Debug, Clone)]
pub struct ChannelSignalDetector {
    upper: TrailingChannel,
    lower: TrailingChannel,
    volume_mean: RunningVolumeMean,
}

impl ChannelSignalDetector {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "window must be >= 1");
        Self {
            upper: TrailingChannel::upper(window),
            lower: TrailingChannel::lower(window),
            volume_mean: RunningVolumeMean::new(),
        }
    }

    /// Annotate every bar with its channel bounds and breakout flags.
    ///
    /// The output has the same length and order as `bars`.
    pub fn detect(&self, bars: &[Bar]) -> Vec<SignalBar> {
        let highs = self.upper.compute(bars);
        let lows = self.lower.compute(bars);
        let volume_means = self.volume_mean.compute(bars);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let channel_high = defined(highs[i]);
                let channel_low = defined(lows[i]);
                let (is_buy, is_sell) = match (channel_high, channel_low) {
                    (Some(high), Some(low)) => (
                        bar.close > high && bar.volume > volume_means[i],
                        bar.close < low,
                    ),
                    _ => (false, false),
                };
                SignalBar {
                    bar: bar.clone(),
                    channel_high,
                    channel_low,
                    is_buy,
                    is_sell,
                }
            })
            .collect()
    }
}

impl Default for ChannelSignalDetector {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Flatten a signal series into (side, bar) pairs in series order.
pub fn signal_events(signals: &[SignalBar]) -> impl Iterator<Item = (SignalSide, &SignalBar)> {
    signals.iter().filter_map(|s| {
        if s.is_buy {
            Some((SignalSide::Buy, s))
        } else if s.is_sell {
            Some((SignalSide::Sell, s))
        } else {
            None
        }
    })
}
