//! SignalBar: a bar annotated with its trailing channel and breakout flags.

use super::bar::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Output of the channel signal detector for one bar.
///
/// `channel_high`/`channel_low` are `None` until a full window of history
/// precedes the bar. Both flags are false whenever either bound is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBar {
    pub bar: Bar,
    pub channel_high: Option<f64>,
    pub channel_low: Option<f64>,
    pub is_buy: bool,
    pub is_sell: bool,
}

impl SignalBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    pub fn symbol(&self) -> &str {
        &self.bar.symbol
    }

    pub fn has_channel(&self) -> bool {
        self.channel_high.is_some() && self.channel_low.is_some()
    }
}
