//! Signal evaluation over SMA/RSI series.

use serde::{Deserialize, Serialize};
use swingbot_core::error::SignalError;
use swingbot_core::types::{BarSeries, PositionSide, Signal, TradeAction};
use swingbot_indicators::{rsi, sma};

/// Strategy parameters for the signal engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Moving average period
    pub ma_period: usize,
    /// RSI period
    pub rsi_period: usize,
    /// RSI level considered overbought
    pub rsi_overbought: f64,
    /// RSI level considered oversold
    pub rsi_oversold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ma_period: 50,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

/// Per-bar boolean conditions derived from the indicator series.
///
/// Comparisons against a NaN indicator value are false, so nothing fires
/// inside the warm-up window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarFlags {
    /// Close above the moving average
    pub above_ma: bool,
    /// Close crossed above the moving average on this bar
    pub crossed_above: bool,
    /// Close crossed below the moving average on this bar
    pub crossed_below: bool,
    /// RSI below the oversold threshold
    pub rsi_low: bool,
    /// RSI at or above the overbought threshold
    pub rsi_high: bool,
    /// Moving average value (NaN during warm-up)
    pub sma: f64,
    /// RSI value (NaN during warm-up)
    pub rsi: f64,
}

/// Converts bar series into signal events for the latest bar.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    /// Create a signal engine with the given parameters.
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Number of bars required before any signal can be produced.
    pub fn warmup_period(&self) -> usize {
        self.config.ma_period
    }

    /// Compute per-bar condition flags for a close series.
    pub fn flags(&self, closes: &[f64]) -> Result<Vec<BarFlags>, SignalError> {
        if closes.len() < self.config.ma_period {
            return Err(SignalError::InsufficientHistory {
                required: self.config.ma_period,
                available: closes.len(),
            });
        }

        // InvalidPeriod cannot occur for the validated config defaults,
        // but a zero period from hand-built configs still fails loudly.
        let sma_series =
            sma(closes, self.config.ma_period).expect("ma_period validated to be non-zero");
        let rsi_series =
            rsi(closes, self.config.rsi_period).expect("rsi_period validated to be non-zero");

        let mut flags = Vec::with_capacity(closes.len());
        let mut prev_above = false;
        for i in 0..closes.len() {
            let above_ma = sma_series[i].is_finite() && closes[i] > sma_series[i];
            let rsi_v = rsi_series[i];
            flags.push(BarFlags {
                above_ma,
                crossed_above: above_ma && !prev_above,
                crossed_below: !above_ma && prev_above,
                rsi_low: rsi_v.is_finite() && rsi_v < self.config.rsi_oversold,
                rsi_high: rsi_v.is_finite() && rsi_v >= self.config.rsi_overbought,
                sma: sma_series[i],
                rsi: rsi_v,
            });
            prev_above = above_ma;
        }

        Ok(flags)
    }

    /// Evaluate the latest bar of a series against the current position
    /// side and produce at most one signal.
    pub fn evaluate(
        &self,
        series: &BarSeries,
        side: PositionSide,
    ) -> Result<Option<Signal>, SignalError> {
        let closes = series.closes();
        let flags = self.flags(&closes)?;

        // flags() guarantees at least ma_period bars, so last() holds.
        let latest = *flags.last().expect("non-empty flag series");
        let bar = series.last().expect("non-empty bar series");

        tracing::debug!(
            symbol = %series.symbol,
            close = bar.close,
            sma = latest.sma,
            rsi = latest.rsi,
            %side,
            "signal analysis"
        );

        let action = match side {
            PositionSide::Flat => {
                if latest.crossed_above && latest.rsi_low {
                    Some(TradeAction::Buy)
                } else if latest.crossed_below || latest.rsi_high {
                    Some(TradeAction::Short)
                } else {
                    None
                }
            }
            PositionSide::Long => {
                if latest.crossed_below || latest.rsi_high {
                    Some(TradeAction::Sell)
                } else {
                    None
                }
            }
            PositionSide::Short => {
                if latest.crossed_above || latest.rsi_low {
                    Some(TradeAction::Cover)
                } else {
                    None
                }
            }
        };

        Ok(action.map(|action| Signal {
            symbol: series.symbol.clone(),
            action,
            timestamp: bar.timestamp,
            price: bar.close,
            reason: self.build_reason(&latest, action),
        }))
    }

    /// Build the trigger description carried on the signal.
    fn build_reason(&self, flags: &BarFlags, action: TradeAction) -> String {
        let mut parts = Vec::new();
        match action {
            TradeAction::Buy | TradeAction::Cover => {
                if flags.crossed_above {
                    parts.push("Price crossed above SMA".to_string());
                }
                if flags.rsi_low {
                    parts.push(format!(
                        "RSI at {:.1} (below {})",
                        flags.rsi, self.config.rsi_oversold
                    ));
                }
            }
            TradeAction::Sell | TradeAction::Short => {
                if flags.crossed_below {
                    parts.push("Price crossed below SMA".to_string());
                }
                if flags.rsi_high {
                    parts.push(format!(
                        "RSI at {:.1} (above {})",
                        flags.rsi, self.config.rsi_overbought
                    ));
                }
            }
        }
        parts.join(" with ")
    }
}
