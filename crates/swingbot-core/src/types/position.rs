//! Position and trade types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradeAction;

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Flat => write!(f, "FLAT"),
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// A net position in a single symbol.
///
/// Quantity is a signed share count: positive long, negative short, zero
/// flat. Owned exclusively by the position ledger; all other components
/// only ever read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Signed share count
    pub quantity: i64,
    /// Volume-weighted average entry price
    pub avg_entry_price: Decimal,
    /// When the position was opened (reset on a flip)
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Create a new position.
    pub fn new(
        symbol: impl Into<String>,
        quantity: i64,
        avg_entry_price: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            avg_entry_price,
            opened_at,
        }
    }

    /// A flat (empty) position for a symbol.
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0, Decimal::ZERO, Utc::now())
    }

    /// Which side the position is on.
    pub fn side(&self) -> PositionSide {
        match self.quantity {
            q if q > 0 => PositionSide::Long,
            q if q < 0 => PositionSide::Short,
            _ => PositionSide::Flat,
        }
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    /// Absolute share count.
    pub fn abs_quantity(&self) -> i64 {
        self.quantity.abs()
    }

    /// Unrealized P&L against a market price.
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        Decimal::from(self.quantity) * (price - self.avg_entry_price)
    }
}

/// Immutable record of one applied fill. Never rewritten or deleted;
/// used for audit and P&L reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Symbol traded
    pub symbol: String,
    /// Action taken
    pub action: TradeAction,
    /// Filled quantity, always positive
    pub quantity: i64,
    /// Fill price
    pub price: Decimal,
    /// When the fill was applied
    pub timestamp: DateTime<Utc>,
    /// Broker order id the fill belongs to
    pub broker_order_id: i64,
}

impl Trade {
    /// Signed position delta contributed by this trade.
    pub fn signed_quantity(&self) -> i64 {
        self.action.signed_quantity(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_position_side() {
        let mut pos = Position::flat("AAPL");
        assert_eq!(pos.side(), PositionSide::Flat);
        assert!(pos.is_flat());

        pos.quantity = 10;
        assert_eq!(pos.side(), PositionSide::Long);

        pos.quantity = -5;
        assert_eq!(pos.side(), PositionSide::Short);
        assert_eq!(pos.abs_quantity(), 5);
    }

    #[test]
    fn test_unrealized_pnl() {
        let long = Position::new("AAPL", 10, dec!(100), Utc::now());
        assert_eq!(long.unrealized_pnl(dec!(110)), dec!(100));

        let short = Position::new("AAPL", -5, dec!(50), Utc::now());
        assert_eq!(short.unrealized_pnl(dec!(40)), dec!(50));
        assert_eq!(short.unrealized_pnl(dec!(60)), dec!(-50));
    }

    #[test]
    fn test_trade_signed_quantity() {
        let trade = Trade {
            symbol: "AAPL".to_string(),
            action: TradeAction::Short,
            quantity: 5,
            price: dec!(50),
            timestamp: Utc::now(),
            broker_order_id: 1,
        };
        assert_eq!(trade.signed_quantity(), -5);
    }
}
