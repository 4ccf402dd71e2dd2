//! Scan pipeline: fetch → validate → detect → match per instrument, then refine.
//!
//! Instruments are independent, so they run on a private rayon pool of
//! `workers` threads. Each worker returns an immutable per-instrument result;
//! results are collected in roster order and only then handed to the
//! single-threaded refiner. A failing instrument is logged and skipped and
//! contributes no trades.

use chrono::NaiveDate;
use darvas_core::data::{validate_series, DataError, DataProvider, QuoteSource};
use darvas_core::domain::{SignalBar, TradeRecord};
use darvas_core::engine::{refine, RefineStats, TradeMatcher};
use darvas_core::signal::{signal_events, ChannelSignalDetector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reporting::SignalRow;

/// Why one instrument contributed nothing.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] DataError),

    #[error("invalid series: {0}")]
    Validation(#[source] DataError),
}

/// Errors that stop the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub window: usize,
    pub workers: usize,
}

/// Output of one instrument's detect + match pass.
#[derive(Debug, Clone)]
pub struct InstrumentScan {
    pub symbol: String,
    pub bar_count: usize,
    pub signals: Vec<SignalBar>,
    pub trades: Vec<TradeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: String,
}

/// Result of a full scan across the roster.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Refined, presentation-sorted trade table.
    pub trades: Vec<TradeRecord>,
    /// Every buy/sell signal bar, by instrument then date.
    pub signals: Vec<SignalRow>,
    pub refine_stats: RefineStats,
    pub processed: usize,
    pub skipped: Vec<SkippedInstrument>,
}

impl ScanOutcome {
    pub fn open_count(&self) -> usize {
        self.trades.iter().filter(|t| t.is_open()).count()
    }
}

/// Run one instrument through the pipeline.
pub fn scan_instrument(
    symbol: &str,
    provider: &dyn DataProvider,
    quotes: &dyn QuoteSource,
    opts: &ScanOptions,
) -> Result<InstrumentScan, ScanError> {
    let fetched = provider
        .fetch(symbol, opts.start, opts.end)
        .map_err(ScanError::Fetch)?;
    let bars = validate_series(symbol, fetched.bars).map_err(ScanError::Validation)?;

    let signals = ChannelSignalDetector::new(opts.window).detect(&bars);
    let trades = TradeMatcher::new(quotes).match_trades(symbol, &signals);

    Ok(InstrumentScan {
        symbol: symbol.to_string(),
        bar_count: bars.len(),
        signals,
        trades,
    })
}

/// Scan every symbol, collect, refine.
pub fn run_scan(
    symbols: &[String],
    provider: &dyn DataProvider,
    quotes: &dyn QuoteSource,
    opts: &ScanOptions,
) -> Result<ScanOutcome, RunError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.workers.max(1))
        .build()?;

    tracing::info!(
        instruments = symbols.len(),
        workers = opts.workers,
        window = opts.window,
        start = %opts.start,
        end = %opts.end,
        provider = provider.name(),
        "starting scan"
    );

    let results: Vec<(String, Result<InstrumentScan, ScanError>)> = pool.install(|| {
        symbols
            .par_iter()
            .map(|symbol| {
                let result = scan_instrument(symbol, provider, quotes, opts);
                match &result {
                    Ok(scan) => tracing::info!(
                        symbol = %symbol,
                        bars = scan.bar_count,
                        trades = scan.trades.len(),
                        "instrument scanned"
                    ),
                    Err(e) => tracing::warn!(symbol = %symbol, error = %e, "instrument skipped"),
                }
                (symbol.clone(), result)
            })
            .collect()
    });

    Ok(collect_outcome(results))
}

/// Fold per-instrument results into the refined outcome.
pub fn collect_outcome(results: Vec<(String, Result<InstrumentScan, ScanError>)>) -> ScanOutcome {
    let mut raw_trades = Vec::new();
    let mut signals = Vec::new();
    let mut processed = 0;
    let mut skipped = Vec::new();

    for (symbol, result) in results {
        match result {
            Ok(scan) => {
                processed += 1;
                signals.extend(
                    signal_events(&scan.signals).map(|(side, bar)| SignalRow::new(side, bar)),
                );
                raw_trades.extend(scan.trades);
            }
            Err(e) => skipped.push(SkippedInstrument {
                symbol,
                reason: e.to_string(),
            }),
        }
    }

    signals.sort_by(|a, b| a.instrument.cmp(&b.instrument).then(a.date.cmp(&b.date)));
    let (trades, refine_stats) = refine(raw_trades);

    tracing::info!(
        processed,
        skipped = skipped.len(),
        trades = trades.len(),
        "scan complete"
    );

    ScanOutcome {
        trades,
        signals,
        refine_stats,
        processed,
        skipped,
    }
}
