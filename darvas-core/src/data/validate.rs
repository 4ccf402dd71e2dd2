//! Series validation: raw provider bars → ordered, finite, positive-priced `Bar`s.
//!
//! Fails fast for the whole instrument on the first problem so a malformed
//! series never reaches the detector.

use super::provider::{DataError, RawBar};
use crate::domain::Bar;

pub fn validate_series(symbol: &str, raw: Vec<RawBar>) -> Result<Vec<Bar>, DataError> {
    let malformed = |reason: String| DataError::MalformedSeries {
        symbol: symbol.to_string(),
        reason,
    };

    let mut bars: Vec<Bar> = Vec::with_capacity(raw.len());
    for r in raw {
        let fields = [
            ("open", r.open),
            ("high", r.high),
            ("low", r.low),
            ("close", r.close),
            ("volume", r.volume),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(malformed(format!("{name} is {value} on {}", r.date)));
        }
        if let Some((name, value)) = fields[..4].iter().find(|(_, v)| *v <= 0.0) {
            return Err(malformed(format!("{name} is non-positive ({value}) on {}", r.date)));
        }
        if r.volume < 0.0 {
            return Err(malformed(format!("negative volume on {}", r.date)));
        }
        if let Some(prev) = bars.last() {
            if r.date <= prev.date {
                return Err(malformed(format!(
                    "dates not strictly ascending: {} follows {}",
                    r.date, prev.date
                )));
            }
        }
        bars.push(Bar {
            symbol: symbol.to_string(),
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        });
    }

    Ok(bars)
}
