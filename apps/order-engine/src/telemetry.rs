//! Tracing Setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level; the format is JSON lines or human-readable output.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::telemetry::init_tracing;
//!
//! init_tracing(&config.observability.logging)?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the global subscriber.
///
/// Logs go to stderr so stdout stays free for command responses.
///
/// # Errors
///
/// Returns error if the level directive is invalid or a global subscriber
/// is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let result = match logging.format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
