//! Darvas Core — channel breakout signals, trade matching, report refinement.
//!
//! This crate contains the algorithmic heart of the scanner:
//! - Domain types (bars, signal bars, trade records)
//! - Trailing channel and running volume mean indicators
//! - `ChannelSignalDetector`: bars → per-bar breakout flags
//! - `TradeMatcher`: Flat/Long state machine pairing entries with exits
//! - Report refinement: dedup by exit event, presentation sort
//! - Price sources (Yahoo Finance, CSV directory, synthetic), roster loading,
//!   series validation

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;

pub use domain::{Bar, ExitReason, SignalBar, TradeRecord};
pub use engine::{refine, TradeMatcher};
pub use signal::{ChannelSignalDetector, SignalSide, DEFAULT_WINDOW};
