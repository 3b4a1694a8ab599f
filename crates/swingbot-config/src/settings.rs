//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub trading: TradingSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "swingbot".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Broker gateway session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    pub host: String,
    pub port: u16,
    pub client_id: i32,
    pub reconnect_timeout_secs: u64,
    pub history_timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4002,
            client_id: 1,
            reconnect_timeout_secs: 15,
            history_timeout_secs: 30,
        }
    }
}

/// Strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySettings {
    pub ma_period: usize,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            ma_period: 50,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

/// Trading loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSettings {
    pub symbols: Vec<String>,
    pub position_size: i64,
    pub limit_offset: Decimal,
    pub poll_interval_secs: u64,
    pub history_days: u32,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string()],
            position_size: 10,
            limit_offset: dec!(0.02),
            poll_interval_secs: 60,
            history_days: 60,
        }
    }
}

/// A configuration value that cannot drive the trading loop.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no symbols configured")]
    NoSymbols,

    #[error("{name} must be greater than zero")]
    NonPositive { name: &'static str },

    #[error("limit_offset {0} must be between 0 and 1")]
    LimitOffsetOutOfRange(Decimal),

    #[error("rsi_oversold {oversold} must be below rsi_overbought {overbought}")]
    RsiThresholdsInverted { oversold: f64, overbought: f64 },
}

impl AppConfig {
    /// Check cross-field constraints the type system cannot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trading.symbols.is_empty() {
            return Err(ValidationError::NoSymbols);
        }
        for (name, value) in [
            ("strategy.ma_period", self.strategy.ma_period as i64),
            ("strategy.rsi_period", self.strategy.rsi_period as i64),
            ("trading.position_size", self.trading.position_size),
            ("trading.history_days", self.trading.history_days as i64),
            (
                "trading.poll_interval_secs",
                self.trading.poll_interval_secs as i64,
            ),
        ] {
            if value <= 0 {
                return Err(ValidationError::NonPositive { name });
            }
        }
        if self.trading.limit_offset <= Decimal::ZERO || self.trading.limit_offset >= Decimal::ONE
        {
            return Err(ValidationError::LimitOffsetOutOfRange(
                self.trading.limit_offset,
            ));
        }
        if self.strategy.rsi_oversold >= self.strategy.rsi_overbought {
            return Err(ValidationError::RsiThresholdsInverted {
                oversold: self.strategy.rsi_oversold,
                overbought: self.strategy.rsi_overbought,
            });
        }
        Ok(())
    }
}
