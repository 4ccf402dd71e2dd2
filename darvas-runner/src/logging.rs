//! Logging setup: `tracing` subscriber with env-filter and text/JSON output.

use crate::config::LoggingSection;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// Logs go to stderr so stdout stays free for the run summary. Calling this
/// twice is harmless; the second call reports an error that callers may ignore.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

pub fn init_from_config(config: &LoggingSection) -> anyhow::Result<()> {
    init_logging(&config.level, config.json)
}
