//! Trailing price channel: the "box" a breakout is measured against.
//!
//! Produces two series (exposed as separate Indicator instances):
//! - Upper: max(high[t-window..t-1])
//! - Lower: min(low[t-window..t-1])
//!
//! The window strictly precedes bar t, so a bar never sits inside its own
//! channel. Lookback: window.

use super::Indicator;
use crate::domain::Bar;

/// Which bound of the channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct TrailingChannel {
    window: usize,
    band: ChannelBand,
    name: String,
}

impl TrailingChannel {
    pub fn upper(window: usize) -> Self {
        Self::new(window, ChannelBand::Upper)
    }

    pub fn lower(window: usize) -> Self {
        Self::new(window, ChannelBand::Lower)
    }

    fn new(window: usize, band: ChannelBand) -> Self {
        assert!(window >= 1, "channel window must be >= 1");
        let prefix = match band {
            ChannelBand::Upper => "channel_high",
            ChannelBand::Lower => "channel_low",
        };
        Self {
            window,
            band,
            name: format!("{prefix}_{window}"),
        }
    }
}

impl Indicator for TrailingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for (i, slot) in result.iter_mut().enumerate().skip(self.window) {
            let window = &bars[i - self.window..i];
            *slot = match self.band {
                ChannelBand::Upper => fold_extreme(window.iter().map(|b| b.high), f64::max),
                ChannelBand::Lower => fold_extreme(window.iter().map(|b| b.low), f64::min),
            };
        }

        result
    }
}

/// Folds a window with `pick`, poisoning the result if any value is NaN.
fn fold_extreme(values: impl Iterator<Item = f64>, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc: Option<f64> = None;
    for v in values {
        if v.is_nan() {
            return f64::NAN;
        }
        acc = Some(match acc {
            Some(a) => pick(a, v),
            None => v,
        });
    }
    acc.unwrap_or(f64::NAN)
}
