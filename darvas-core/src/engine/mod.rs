//! Trade construction: signal series → trade records → canonical report.

pub mod matcher;
pub mod refine;

pub use matcher::{PositionState, TradeMatcher};
pub use refine::{dedup_by_exit, refine, sort_for_presentation, RefineStats};
