//! Darvas Runner — scan orchestration on top of `darvas-core`.
//!
//! - TOML configuration with defaults for every field
//! - Provider/quote selection from config
//! - Per-instrument scan pipeline on a bounded rayon pool, then refinement
//! - Report sinks: trade report (CSV/JSON), raw signal report, run manifest
//! - Publish/notify hooks run after the report is written
//! - `tracing` subscriber setup

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod reporting;
pub mod sources;

pub use config::{ConfigError, ScanConfig, SourceKind};
pub use logging::{init_from_config, init_logging};
pub use pipeline::{
    collect_outcome, run_scan, scan_instrument, InstrumentScan, RunError, ScanError, ScanOptions,
    ScanOutcome, SkippedInstrument,
};
pub use publish::{
    publish_and_notify, DirectoryPublisher, LogNotifier, Notifier, PostReportStatus, Publisher,
    ReportSummary,
};
pub use reporting::{CsvReportSink, ReportPaths, ReportSink, ReportWriter, RunManifest, SignalRow};
pub use sources::DataSources;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn outcome_types_are_send_sync() {
        assert_send::<ScanOutcome>();
        assert_sync::<ScanOutcome>();
        assert_send::<InstrumentScan>();
        assert_sync::<InstrumentScan>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<ScanError>();
        assert_sync::<ScanError>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
        assert_send::<ScanOptions>();
        assert_sync::<ScanOptions>();
    }
}
