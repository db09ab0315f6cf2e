//! Configuration module for the order engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before the engine is wired.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Access configuration values
//! println!("book depth: {}", config.market.book_depth);
//! ```

mod engine;
mod market;
mod observability;
mod orders;
mod scheduler;

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::EngineConfig;
pub use market::{InstrumentConfig, MarketConfig};
pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use orders::OrdersConfig;
pub use scheduler::SchedulerConfig;

use crate::application::EngineSettings;
use crate::domain::order_execution::FeeSchedule;
use crate::domain::shared::Symbol;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maker/taker fee schedule.
    #[serde(default)]
    pub fees: FeeSchedule,
    /// Order admission settings.
    #[serde(default)]
    pub orders: OrdersConfig,
    /// Algorithmic scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Market data settings.
    #[serde(default)]
    pub market: MarketConfig,
    /// Background task settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Engine tuning derived from this configuration.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            fees: self.fees.clone(),
            day_cutoff: self.orders.day_cutoff,
            scheduler: self.scheduler.to_settings(),
            book_depth: self.market.book_depth,
        }
    }

    /// Instruments and seed prices for the market data source.
    #[must_use]
    pub fn seed_instruments(&self) -> Vec<(Symbol, Decimal)> {
        self.market
            .instruments
            .iter()
            .map(|instrument| (instrument.symbol.clone(), instrument.price))
            .collect()
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Constant pattern.
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let var_name = cap.get(1).map_or("", |m| m.as_str());
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let fees = &config.fees;
    for (name, rate) in [("maker_rate", fees.maker_rate), ("taker_rate", fees.taker_rate)] {
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "fees.{name} must be in [0, 1), got {rate}"
            )));
        }
    }
    if fees.default_currency.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "fees.default_currency must not be empty".to_string(),
        ));
    }

    let scheduler = &config.scheduler;
    if scheduler.twap_max_slices == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.twap_max_slices must be at least 1".to_string(),
        ));
    }
    if scheduler.vwap_bucket_interval_seconds == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.vwap_bucket_interval_seconds must be positive".to_string(),
        ));
    }
    scheduler
        .volume_profile
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("scheduler.volume_profile: {e}")))?;
    if scheduler.retry.backoff_multiplier < 1.0
        || !(0.0..=1.0).contains(&scheduler.retry.jitter_factor)
    {
        return Err(ConfigError::ValidationError(
            "scheduler.retry needs backoff_multiplier >= 1 and jitter_factor in [0, 1]".to_string(),
        ));
    }

    if config.market.book_depth == 0 {
        return Err(ConfigError::ValidationError(
            "market.book_depth must be at least 1".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for instrument in &config.market.instruments {
        if instrument.price <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "market.instruments: price for {} must be positive",
                instrument.symbol
            )));
        }
        if !seen.insert(&instrument.symbol) {
            return Err(ConfigError::ValidationError(format!(
                "market.instruments: duplicate symbol {}",
                instrument.symbol
            )));
        }
    }

    if config.engine.housekeeping_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "engine.housekeeping_interval_ms must be positive".to_string(),
        ));
    }

    if config.observability.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "observability.logging.level must not be empty".to_string(),
        ));
    }

    Ok(())
}
