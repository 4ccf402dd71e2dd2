//! Domain types for the breakout scanner.

pub mod bar;
pub mod signal_bar;
pub mod trade;

pub use bar::Bar;
pub use signal_bar::SignalBar;
pub use trade::{percent_change, Entry, ExitReason, TradeRecord};
