//! CLI command implementations.

pub mod check;
pub mod run;
pub mod validate;

use swingbot_config::StrategySettings;
use swingbot_signals::SignalConfig;

/// Map strategy settings onto signal engine parameters.
pub(crate) fn signal_config(settings: &StrategySettings) -> SignalConfig {
    SignalConfig {
        ma_period: settings.ma_period,
        rsi_period: settings.rsi_period,
        rsi_overbought: settings.rsi_overbought,
        rsi_oversold: settings.rsi_oversold,
    }
}
