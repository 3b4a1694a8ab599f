//! Order intent types and lifecycle states.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trading action carried by signals, intents, and trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    /// Open or add to a long position
    Buy,
    /// Close a long position
    Sell,
    /// Open or add to a short position (sell shares not owned)
    Short,
    /// Buy back a short position
    Cover,
}

impl TradeAction {
    /// Signed position delta for a fill of `quantity` shares.
    /// BUY/COVER add, SELL/SHORT subtract.
    pub fn signed_quantity(&self, quantity: i64) -> i64 {
        match self {
            TradeAction::Buy | TradeAction::Cover => quantity,
            TradeAction::Sell | TradeAction::Short => -quantity,
        }
    }

    /// Whether this action opens exposure (as opposed to closing it).
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeAction::Buy | TradeAction::Short)
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Short => write!(f, "SHORT"),
            TradeAction::Cover => write!(f, "COVER"),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Intent created but not yet submitted
    Created,
    /// Submitted to the broker, awaiting fill
    Submitted,
    /// Partially filled, still working
    PartiallyFilled,
    /// Completely filled
    Filled,
    /// Rejected by the broker
    Rejected,
    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Check if the order reached a terminal state. No further status
    /// transitions are expected after this.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }

    /// Check if the order is still working.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// A single order decision, owned by the lifecycle coordinator until it
/// reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Client-side intent id
    pub id: Uuid,
    /// Symbol to trade
    pub symbol: String,
    /// Action to take
    pub action: TradeAction,
    /// Quantity, always positive
    pub quantity: i64,
    /// Cross-the-spread limit price
    pub limit_price: Decimal,
    /// Current status
    pub status: OrderStatus,
    /// Broker-assigned order id, set after submission
    pub broker_order_id: Option<i64>,
    /// When the intent was created
    pub created_at: DateTime<Utc>,
    /// When the intent was submitted
    pub submitted_at: Option<DateTime<Utc>>,
}

impl OrderIntent {
    /// Create a new unsubmitted intent.
    pub fn new(
        symbol: impl Into<String>,
        action: TradeAction,
        quantity: i64,
        limit_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            action,
            quantity,
            limit_price,
            status: OrderStatus::Created,
            broker_order_id: None,
            created_at: Utc::now(),
            submitted_at: None,
        }
    }

    /// Record a successful submission.
    pub fn mark_submitted(&mut self, broker_order_id: i64) {
        self.broker_order_id = Some(broker_order_id);
        self.status = OrderStatus::Submitted;
        self.submitted_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_quantity() {
        assert_eq!(TradeAction::Buy.signed_quantity(10), 10);
        assert_eq!(TradeAction::Cover.signed_quantity(8), 8);
        assert_eq!(TradeAction::Sell.signed_quantity(10), -10);
        assert_eq!(TradeAction::Short.signed_quantity(5), -5);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Submitted.is_active());
        assert!(OrderStatus::PartiallyFilled.is_active());
    }

    #[test]
    fn test_mark_submitted() {
        let mut intent = OrderIntent::new("AAPL", TradeAction::Buy, 10, dec!(102.00));
        assert_eq!(intent.status, OrderStatus::Created);
        assert!(intent.broker_order_id.is_none());

        intent.mark_submitted(42);
        assert_eq!(intent.status, OrderStatus::Submitted);
        assert_eq!(intent.broker_order_id, Some(42));
        assert!(intent.submitted_at.is_some());
    }
}
