//! Authoritative in-memory position ledger.
//!
//! The ledger is the only writer of positions. Signal and order
//! components read it; every mutation goes through [`PositionLedger::apply_fill`],
//! which also appends exactly one immutable [`Trade`] record per applied
//! fill. This single-writer rule is what keeps two stale views of a
//! position from authorizing conflicting orders in the same cycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use swingbot_core::error::LedgerError;
use swingbot_core::types::{Position, PositionSide, Trade, TradeAction};
use tracing::info;

/// Per-symbol net positions plus the append-only trade log.
#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<String, Position>,
    trades: Vec<Trade>,
}

impl PositionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position for a symbol; flat if none is tracked.
    pub fn position(&self, symbol: &str) -> Position {
        self.positions
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Position::flat(symbol))
    }

    /// Current side for a symbol.
    pub fn side(&self, symbol: &str) -> PositionSide {
        self.positions
            .get(symbol)
            .map(|p| p.side())
            .unwrap_or(PositionSide::Flat)
    }

    /// Snapshot of all open positions.
    pub fn positions(&self) -> Vec<Position> {
        self.positions.values().cloned().collect()
    }

    /// The full trade log, oldest first.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Signed sum of all recorded trade quantities for a symbol.
    ///
    /// Reconciliation invariant: this always equals the tracked position
    /// quantity for symbols that were never traded outside this ledger.
    pub fn traded_quantity(&self, symbol: &str) -> i64 {
        self.trades
            .iter()
            .filter(|t| t.symbol == symbol)
            .map(|t| t.signed_quantity())
            .sum()
    }

    /// Apply a confirmed fill. The single state-transition entry point.
    ///
    /// Legal transitions:
    /// - BUY on flat/long: grows the long, volume-weighted average entry.
    /// - SELL on long: shrinks the long; a result at or below zero
    ///   removes the position; partial sells keep the average.
    /// - SHORT on flat/short: grows the short magnitude, volume-weighted
    ///   average entry.
    /// - COVER on short: shrinks the short; overshooting zero flips the
    ///   position to a long opened at the cover price.
    ///
    /// Anything else is an `InvalidTransition` and mutates nothing.
    pub fn apply_fill(
        &mut self,
        symbol: &str,
        action: TradeAction,
        quantity: i64,
        price: Decimal,
        broker_order_id: i64,
        timestamp: DateTime<Utc>,
    ) -> Result<Position, LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity {
                symbol: symbol.to_string(),
                quantity,
            });
        }

        let side = self.side(symbol);
        let invalid = || LedgerError::InvalidTransition {
            symbol: symbol.to_string(),
            action: action.to_string(),
            side: side.to_string(),
        };

        match (action, side) {
            (TradeAction::Buy, PositionSide::Flat) => {
                self.positions.insert(
                    symbol.to_string(),
                    Position::new(symbol, quantity, price, timestamp),
                );
            }
            (TradeAction::Buy, PositionSide::Long) => {
                let pos = self.positions.get_mut(symbol).expect("long position");
                let new_qty = pos.quantity + quantity;
                pos.avg_entry_price = (Decimal::from(pos.quantity) * pos.avg_entry_price
                    + Decimal::from(quantity) * price)
                    / Decimal::from(new_qty);
                pos.quantity = new_qty;
            }
            (TradeAction::Sell, PositionSide::Long) => {
                let pos = self.positions.get_mut(symbol).expect("long position");
                if quantity >= pos.quantity {
                    self.positions.remove(symbol);
                } else {
                    // Partial sell keeps the existing average.
                    pos.quantity -= quantity;
                }
            }
            (TradeAction::Short, PositionSide::Flat) => {
                self.positions.insert(
                    symbol.to_string(),
                    Position::new(symbol, -quantity, price, timestamp),
                );
            }
            (TradeAction::Short, PositionSide::Short) => {
                let pos = self.positions.get_mut(symbol).expect("short position");
                let old_abs = pos.abs_quantity();
                let new_abs = old_abs + quantity;
                pos.avg_entry_price = (Decimal::from(old_abs) * pos.avg_entry_price
                    + Decimal::from(quantity) * price)
                    / Decimal::from(new_abs);
                pos.quantity = -new_abs;
            }
            (TradeAction::Cover, PositionSide::Short) => {
                let pos = self.positions.get_mut(symbol).expect("short position");
                let new_qty = pos.quantity + quantity;
                if new_qty == 0 {
                    self.positions.remove(symbol);
                } else if new_qty > 0 {
                    // Overshoot: the short closes and a long opens at the
                    // cover price.
                    *pos = Position::new(symbol, new_qty, price, timestamp);
                } else {
                    // Partial cover keeps the existing average.
                    pos.quantity = new_qty;
                }
            }
            _ => return Err(invalid()),
        }

        self.trades.push(Trade {
            symbol: symbol.to_string(),
            action,
            quantity,
            price,
            timestamp,
            broker_order_id,
        });

        info!(
            symbol,
            %action,
            quantity,
            %price,
            broker_order_id,
            "ledger updated"
        );

        Ok(self.position(symbol))
    }
}
