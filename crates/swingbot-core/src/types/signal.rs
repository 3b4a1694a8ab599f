//! Trading signal and trade notification types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradeAction;

/// A discrete trading signal for the latest bar of a series.
///
/// At most one signal is produced per symbol per cycle; "no signal" is
/// represented as `None` at the call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Symbol the signal applies to
    pub symbol: String,
    /// Action suggested by the signal policy
    pub action: TradeAction,
    /// Timestamp of the triggering bar (unix ms)
    pub timestamp: i64,
    /// Close price of the triggering bar
    pub price: f64,
    /// Human-readable trigger description
    pub reason: String,
}

/// Notification emitted after a fill is applied to the ledger.
///
/// Consumed by the reporting sink; carries everything a narrative
/// summary needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExecuted {
    /// Symbol traded
    pub symbol: String,
    /// Action taken
    pub action: TradeAction,
    /// Filled quantity
    pub quantity: i64,
    /// Average fill price
    pub price: Decimal,
    /// Trigger description carried over from the signal
    pub reason: String,
}
