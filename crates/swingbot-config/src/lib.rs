//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, GatewaySettings, LoggingConfig, StrategySettings, TradingSettings,
    ValidationError,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables use the `SWINGBOT__` prefix with `__` as the
/// section separator, e.g. `SWINGBOT__LOGGING__LEVEL=debug`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("SWINGBOT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Load defaults overlaid with environment variables only.
pub fn load_default_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(
            Environment::with_prefix("SWINGBOT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
