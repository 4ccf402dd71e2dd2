//! Running mean of volume over the whole history observed so far.
//!
//! value[t] = mean(volume[0..=t]). Cumulative, not windowed: the breakout
//! volume filter compares each bar against everything seen up to and
//! including that bar.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct RunningVolumeMean;

impl RunningVolumeMean {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for RunningVolumeMean {
    fn name(&self) -> &str {
        "volume_running_mean"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut sum = 0.0;
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                sum += bar.volume;
                sum / (i + 1) as f64
            })
            .collect()
    }
}
