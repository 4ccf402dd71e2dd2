//! Report refinement: dedup by exit event, then re-sort for presentation.
//!
//! Two independent passes:
//! 1. [`dedup_by_exit`]: order by (instrument, exit_date with Open last,
//!    entry_date) and keep the first record of each (instrument, exit_date)
//!    group, i.e. the oldest entry. Open records share the `None` exit key, so
//!    at most one Open record per instrument survives.
//! 2. [`sort_for_presentation`]: instrument ascending, entry_date descending.
//!
//! Both sorts are stable, so exact ties keep their original scan order.
//! `refine(refine(x)) == refine(x)`.

use crate::domain::TradeRecord;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Counters from a refinement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineStats {
    pub input: usize,
    pub output: usize,
    /// Records dropped because an older entry closed on the same exit event.
    pub collisions: usize,
}

/// Orders exit dates ascending with `None` (still open) after every date.
fn cmp_exit(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Keep only the oldest-entry record per (instrument, exit_date).
///
/// Output is ordered by (instrument, exit_date, entry_date).
pub fn dedup_by_exit(mut records: Vec<TradeRecord>) -> (Vec<TradeRecord>, RefineStats) {
    let input = records.len();
    records.sort_by(|a, b| {
        a.instrument
            .cmp(&b.instrument)
            .then_with(|| cmp_exit(a.exit_date, b.exit_date))
            .then_with(|| a.entry_date.cmp(&b.entry_date))
    });

    let mut kept: Vec<TradeRecord> = Vec::with_capacity(records.len());
    for record in records {
        if let Some(last) = kept.last() {
            if last.instrument == record.instrument && last.exit_date == record.exit_date {
                tracing::debug!(
                    instrument = %record.instrument,
                    exit = ?record.exit_date,
                    kept_entry = %last.entry_date,
                    dropped_entry = %record.entry_date,
                    "duplicate exit event"
                );
                continue;
            }
        }
        kept.push(record);
    }

    let stats = RefineStats {
        input,
        output: kept.len(),
        collisions: input - kept.len(),
    };
    (kept, stats)
}

/// Sort by instrument ascending, most recent entry first.
///
/// Exact (instrument, entry_date) ties fall back to exit date ascending with
/// Open last, keeping the order deterministic.
pub fn sort_for_presentation(records: &mut [TradeRecord]) {
    records.sort_by(|a, b| {
        a.instrument
            .cmp(&b.instrument)
            .then_with(|| b.entry_date.cmp(&a.entry_date))
            .then_with(|| cmp_exit(a.exit_date, b.exit_date))
    });
}

/// Full refinement: dedup, then presentation sort.
pub fn refine(records: Vec<TradeRecord>) -> (Vec<TradeRecord>, RefineStats) {
    let (mut kept, stats) = dedup_by_exit(records);
    sort_for_presentation(&mut kept);
    if stats.collisions > 0 {
        tracing::info!(
            collisions = stats.collisions,
            kept = stats.output,
            "resolved duplicate exit events (oldest entry kept)"
        );
    }
    (kept, stats)
}
