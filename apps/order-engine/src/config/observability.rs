//! Log output settings.

use serde::{Deserialize, Serialize};

/// Observability section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Encoding of log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable lines for local runs.
    Pretty,
}

/// Subscriber settings applied by [`crate::telemetry::init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `order_engine=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Line encoding.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
