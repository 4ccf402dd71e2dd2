//! End-to-end scenarios: bars → signals → trades → refined table.

use chrono::NaiveDate;
use darvas_core::data::{DataError, NoQuotes, QuoteSource, StaticQuotes};
use darvas_core::domain::{Bar, Entry, ExitReason, TradeRecord};
use darvas_core::engine::{refine, TradeMatcher};
use darvas_core::signal::ChannelSignalDetector;

const WINDOW: usize = 20;

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

fn bar(i: usize, close: f64, high: f64, low: f64, volume: f64) -> Bar {
    Bar {
        symbol: "X".into(),
        date: day(i),
        open: close,
        high,
        low,
        close,
        volume,
    }
}

/// 22 quiet bars around 90, a high-volume breakout to 100 on bar 22, then
/// drift just under the breakout. `breakdown_at` injects a close at 80.
fn breakout_series(len: usize, breakdown_at: Option<usize>) -> Vec<Bar> {
    (0..len)
        .map(|i| match i {
            0..=21 => bar(i, 90.0, 91.0, 89.0, 1000.0),
            22 => bar(i, 100.0, 101.0, 90.0, 5000.0),
            _ if Some(i) == breakdown_at => bar(i, 80.0, 99.0, 79.0, 1000.0),
            _ => bar(i, 99.0, 100.0, 98.0, 1000.0),
        })
        .collect()
}

fn run(bars: &[Bar], quotes: &dyn QuoteSource) -> Vec<TradeRecord> {
    let signals = ChannelSignalDetector::new(WINDOW).detect(bars);
    TradeMatcher::new(quotes).match_trades("X", &signals)
}

struct FailingQuotes;

impl QuoteSource for FailingQuotes {
    fn latest_price(&self, _symbol: &str) -> Result<Option<f64>, DataError> {
        Err(DataError::NetworkUnreachable("timed out".into()))
    }
}

#[test]
fn breakout_then_breakdown_yields_one_sold_trade() {
    let bars = breakout_series(35, Some(32));
    let signals = ChannelSignalDetector::new(WINDOW).detect(&bars);

    let buys: Vec<usize> = (0..signals.len()).filter(|&i| signals[i].is_buy).collect();
    let sells: Vec<usize> = (0..signals.len()).filter(|&i| signals[i].is_sell).collect();
    assert_eq!(buys, vec![22]);
    assert_eq!(sells, vec![32]);

    let records = run(&bars, &NoQuotes);
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.exit_reason, ExitReason::Sold);
    assert_eq!(rec.entry_date, day(22));
    assert_eq!(rec.exit_date, Some(day(32)));
    assert_eq!(rec.entry_price, 100.0);
    assert_eq!(rec.exit_price, Some(80.0));
    assert_eq!(rec.channel_high_at_entry, 91.0);
    assert_eq!(rec.channel_low_at_entry, 89.0);
    assert!((rec.return_pct.unwrap() + 20.0).abs() < 1e-10);
}

#[test]
fn unmatched_breakout_is_open_at_live_quote() {
    let bars = breakout_series(35, None);
    let quotes = StaticQuotes::from_pairs([("X", 105.0)]);
    let records = run(&bars, &quotes);

    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.exit_reason, ExitReason::Open);
    assert_eq!(rec.entry_price, 100.0);
    assert!(rec.exit_date.is_none());
    assert_eq!(rec.live_quote, Some(105.0));
    assert!((rec.return_pct.unwrap() - 5.0).abs() < 1e-10);
}

#[test]
fn failed_quote_leaves_open_trade_unvalued() {
    let bars = breakout_series(35, None);
    let records = run(&bars, &FailingQuotes);

    assert_eq!(records.len(), 1);
    assert!(records[0].is_open());
    assert!(records[0].return_pct.is_none());
    assert!(records[0].live_quote.is_none());
}

#[test]
fn series_shorter_than_window_has_no_trades() {
    let bars = breakout_series(WINDOW, None);
    let signals = ChannelSignalDetector::new(WINDOW).detect(&bars);
    assert!(signals.iter().all(|s| !s.is_buy && !s.is_sell));
    assert!(run(&bars, &NoQuotes).is_empty());
}

#[test]
fn refined_table_keeps_oldest_entry_per_exit() {
    let d = |m: u32, dd: u32| NaiveDate::from_ymd_opt(2024, m, dd).unwrap();
    let entry = |date: NaiveDate| Entry {
        instrument: "X".into(),
        date,
        price: 100.0,
        channel_high: 99.0,
        channel_low: 95.0,
    };
    let raw = vec![
        TradeRecord::sold(entry(d(2, 1)), d(3, 1), 104.0),
        TradeRecord::sold(entry(d(1, 1)), d(3, 1), 104.0),
    ];

    let (refined, stats) = refine(raw);
    assert_eq!(refined.len(), 1);
    assert_eq!(refined[0].entry_date, d(1, 1));
    assert_eq!(stats.collisions, 1);
}

#[test]
fn multi_instrument_table_is_grouped_and_recent_first() {
    let mut all = Vec::new();
    for symbol in ["BBB", "AAA"] {
        let mut bars = breakout_series(60, Some(32));
        // second breakout after the first trade closed
        bars[50] = bar(50, 120.0, 121.0, 99.0, 9000.0);
        for b in &mut bars {
            b.symbol = symbol.to_string();
        }
        let signals = ChannelSignalDetector::new(WINDOW).detect(&bars);
        all.extend(TradeMatcher::new(&NoQuotes).match_trades(symbol, &signals));
    }

    let (refined, _) = refine(all);
    let keys: Vec<(&str, NaiveDate)> = refined
        .iter()
        .map(|r| (r.instrument.as_str(), r.entry_date))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("AAA", day(50)),
            ("AAA", day(22)),
            ("BBB", day(50)),
            ("BBB", day(22)),
        ]
    );
    assert!(refined[0].is_open());
    assert!(!refined[1].is_open());
}
