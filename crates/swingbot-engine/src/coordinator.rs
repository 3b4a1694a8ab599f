//! Order lifecycle coordination.
//!
//! Signals are advisory; only the coordinator turns them into orders. It
//! enforces one outstanding intent per symbol, sizes entries and exits,
//! prices the cross-the-spread limit, and applies terminal fills to the
//! ledger exactly once no matter how many times the gateway re-delivers
//! a status update.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use swingbot_core::error::OrderError;
use swingbot_core::gateway::{BrokerGateway, GatewayEvent};
use swingbot_core::types::{
    OrderIntent, OrderStatus, Position, PositionSide, Signal, TradeAction, TradeExecuted,
};
use swingbot_ledger::PositionLedger;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Sizing and pricing parameters.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Shares per entry order
    pub position_size: i64,
    /// Fractional limit offset past the signal price (0.02 = 2%)
    pub limit_offset: Decimal,
}

/// An intent awaiting its terminal update, plus the signal reason that
/// produced it.
#[derive(Debug)]
struct InFlight {
    intent: OrderIntent,
    reason: String,
}

/// Owns every order from decision to terminal state.
pub struct OrderLifecycleCoordinator {
    config: CoordinatorConfig,
    in_flight: HashMap<i64, InFlight>,
    open_symbols: HashSet<String>,
    applied: HashSet<i64>,
    executed_tx: mpsc::UnboundedSender<TradeExecuted>,
}

impl OrderLifecycleCoordinator {
    /// Create a coordinator. Applied fills are announced on `executed_tx`.
    pub fn new(
        config: CoordinatorConfig,
        executed_tx: mpsc::UnboundedSender<TradeExecuted>,
    ) -> Self {
        Self {
            config,
            in_flight: HashMap::new(),
            open_symbols: HashSet::new(),
            applied: HashSet::new(),
            executed_tx,
        }
    }

    /// Whether a symbol has an intent that has not reached a terminal
    /// state. Such symbols are skipped by the evaluation cycle.
    pub fn has_open_intent(&self, symbol: &str) -> bool {
        self.open_symbols.contains(symbol)
    }

    /// Turn a signal into an order intent, or decline it.
    ///
    /// Entries are sized from config; exits always flatten the full
    /// position. A signal that no longer matches the position it was
    /// evaluated against is stale and produces nothing.
    pub fn decide(&self, signal: &Signal, position: &Position) -> Option<OrderIntent> {
        if self.has_open_intent(&signal.symbol) {
            debug!(symbol = %signal.symbol, "intent already outstanding, signal dropped");
            return None;
        }

        let quantity = match (signal.action, position.side()) {
            (TradeAction::Buy, PositionSide::Flat) => self.config.position_size,
            (TradeAction::Short, PositionSide::Flat) => self.config.position_size,
            (TradeAction::Sell, PositionSide::Long) => position.quantity,
            (TradeAction::Cover, PositionSide::Short) => position.abs_quantity(),
            (action, side) => {
                warn!(symbol = %signal.symbol, %action, %side, "stale signal, no order");
                return None;
            }
        };
        if quantity <= 0 {
            return None;
        }

        let limit_price = match self.limit_price(signal.price, signal.action) {
            Some(p) => p,
            None => {
                warn!(symbol = %signal.symbol, price = signal.price, "unpriceable signal");
                return None;
            }
        };

        Some(OrderIntent::new(
            &signal.symbol,
            signal.action,
            quantity,
            limit_price,
        ))
    }

    /// Limit price that crosses the spread: pay up on BUY/COVER, reach
    /// down on SELL/SHORT. Rounded to cents.
    fn limit_price(&self, price: f64, action: TradeAction) -> Option<Decimal> {
        let price = Decimal::try_from(price).ok()?;
        if price <= Decimal::ZERO {
            return None;
        }
        let multiplier = match action {
            TradeAction::Buy | TradeAction::Cover => Decimal::ONE + self.config.limit_offset,
            TradeAction::Sell | TradeAction::Short => Decimal::ONE - self.config.limit_offset,
        };
        Some((price * multiplier).round_dp(2))
    }

    /// Submit an intent and start tracking it.
    ///
    /// On failure the intent is discarded and the symbol stays free; the
    /// next cycle decides afresh.
    pub async fn submit(
        &mut self,
        gateway: &dyn BrokerGateway,
        mut intent: OrderIntent,
        reason: &str,
    ) -> Result<i64, OrderError> {
        let order_id = gateway
            .submit_order(&intent)
            .await
            .map_err(|e| OrderError::SubmissionFailed(e.to_string()))?;

        intent.mark_submitted(order_id);
        info!(
            symbol = %intent.symbol,
            action = %intent.action,
            quantity = intent.quantity,
            limit_price = %intent.limit_price,
            order_id,
            reason,
            "order submitted"
        );

        self.open_symbols.insert(intent.symbol.clone());
        self.in_flight.insert(
            order_id,
            InFlight {
                intent,
                reason: reason.to_string(),
            },
        );
        Ok(order_id)
    }

    /// Feed one gateway event through the coordinator.
    pub fn on_event(&mut self, event: GatewayEvent, ledger: &mut PositionLedger) {
        match event {
            GatewayEvent::OrderUpdate {
                broker_order_id,
                status,
                filled_quantity,
                avg_fill_price,
            } => self.on_order_update(broker_order_id, status, filled_quantity, avg_fill_price, ledger),
            GatewayEvent::PositionReport {
                symbol,
                quantity,
                avg_cost,
            } => {
                let tracked = ledger.position(&symbol);
                if tracked.quantity == quantity {
                    debug!(symbol, quantity, %avg_cost, "broker position reconciled");
                } else {
                    warn!(
                        symbol,
                        broker_quantity = quantity,
                        tracked_quantity = tracked.quantity,
                        "broker position disagrees with ledger"
                    );
                }
            }
            GatewayEvent::Error { code, message } => {
                warn!(code, message, "gateway error");
            }
            GatewayEvent::Disconnected => {
                info!("gateway reported disconnect");
            }
        }
    }

    fn on_order_update(
        &mut self,
        order_id: i64,
        status: OrderStatus,
        filled_quantity: i64,
        avg_fill_price: Decimal,
        ledger: &mut PositionLedger,
    ) {
        if self.applied.contains(&order_id) {
            debug!(order_id, "duplicate terminal update ignored");
            return;
        }

        if status.is_active() {
            // filled_quantity is cumulative; only the terminal update
            // touches the ledger.
            if let Some(tracked) = self.in_flight.get_mut(&order_id) {
                tracked.intent.status = status;
                debug!(order_id, ?status, filled_quantity, "order working");
            }
            return;
        }

        let Some(InFlight { intent, reason }) = self.in_flight.remove(&order_id) else {
            debug!(order_id, "terminal update for unknown order");
            return;
        };
        self.applied.insert(order_id);
        self.open_symbols.remove(&intent.symbol);

        match status {
            OrderStatus::Filled if filled_quantity > 0 => {
                match ledger.apply_fill(
                    &intent.symbol,
                    intent.action,
                    filled_quantity,
                    avg_fill_price,
                    order_id,
                    Utc::now(),
                ) {
                    Ok(position) => {
                        debug!(
                            symbol = %intent.symbol,
                            quantity = position.quantity,
                            "fill applied"
                        );
                        let _ = self.executed_tx.send(TradeExecuted {
                            symbol: intent.symbol,
                            action: intent.action,
                            quantity: filled_quantity,
                            price: avg_fill_price,
                            reason,
                        });
                    }
                    Err(e) => {
                        warn!(order_id, symbol = %intent.symbol, error = %e, "fill not applied");
                    }
                }
            }
            OrderStatus::Filled => {
                warn!(order_id, symbol = %intent.symbol, "terminal fill with zero quantity");
            }
            _ => {
                warn!(
                    order_id,
                    symbol = %intent.symbol,
                    ?status,
                    "order ended without a fill"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use swingbot_broker::SimGateway;

    fn config() -> CoordinatorConfig {
        CoordinatorConfig {
            position_size: 10,
            limit_offset: dec!(0.02),
        }
    }

    fn coordinator() -> (
        OrderLifecycleCoordinator,
        mpsc::UnboundedReceiver<TradeExecuted>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OrderLifecycleCoordinator::new(config(), tx), rx)
    }

    fn signal(symbol: &str, action: TradeAction, price: f64) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            action,
            timestamp: 0,
            price,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_entries_sized_from_config_exits_flatten() {
        let (coord, _rx) = coordinator();

        let intent = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &Position::flat("AAPL"))
            .unwrap();
        assert_eq!(intent.quantity, 10);

        let long = Position::new("AAPL", 7, dec!(95), Utc::now());
        let intent = coord
            .decide(&signal("AAPL", TradeAction::Sell, 100.0), &long)
            .unwrap();
        assert_eq!(intent.quantity, 7);

        let short = Position::new("NET", -5, dec!(60), Utc::now());
        let intent = coord
            .decide(&signal("NET", TradeAction::Cover, 55.0), &short)
            .unwrap();
        assert_eq!(intent.quantity, 5);
    }

    #[test]
    fn test_limit_price_crosses_the_spread() {
        let (coord, _rx) = coordinator();
        let flat = Position::flat("AAPL");

        let buy = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &flat)
            .unwrap();
        assert_eq!(buy.limit_price, dec!(102.00));

        let short = coord
            .decide(&signal("AAPL", TradeAction::Short, 100.0), &flat)
            .unwrap();
        assert_eq!(short.limit_price, dec!(98.00));

        // 123.456 * 1.02 = 125.92512, rounded to cents.
        let buy = coord
            .decide(&signal("AAPL", TradeAction::Buy, 123.456), &flat)
            .unwrap();
        assert_eq!(buy.limit_price, dec!(125.93));
    }

    #[test]
    fn test_stale_signal_produces_nothing() {
        let (coord, _rx) = coordinator();

        // SELL needs a long, COVER needs a short, entries need flat.
        assert!(coord
            .decide(&signal("AAPL", TradeAction::Sell, 100.0), &Position::flat("AAPL"))
            .is_none());
        let long = Position::new("AAPL", 10, dec!(95), Utc::now());
        assert!(coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &long)
            .is_none());
        assert!(coord
            .decide(&signal("AAPL", TradeAction::Cover, 100.0), &long)
            .is_none());

        // No doubling down in the same direction.
        let short = Position::new("NET", -5, dec!(60), Utc::now());
        assert!(coord
            .decide(&signal("NET", TradeAction::Short, 55.0), &short)
            .is_none());
    }

    #[tokio::test]
    async fn test_one_outstanding_intent_per_symbol() {
        let gateway = SimGateway::new();
        gateway.connect().await.unwrap();
        let (mut coord, _rx) = coordinator();
        let mut ledger = PositionLedger::new();
        let flat = Position::flat("AAPL");

        let intent = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &flat)
            .unwrap();
        let order_id = coord.submit(&gateway, intent, "test").await.unwrap();

        // The symbol is locked until the intent resolves.
        assert!(coord.has_open_intent("AAPL"));
        assert!(coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &flat)
            .is_none());

        coord.on_event(
            GatewayEvent::OrderUpdate {
                broker_order_id: order_id,
                status: OrderStatus::Filled,
                filled_quantity: 10,
                avg_fill_price: dec!(102.00),
            },
            &mut ledger,
        );

        assert!(!coord.has_open_intent("AAPL"));
        assert_eq!(ledger.position("AAPL").quantity, 10);
    }

    #[tokio::test]
    async fn test_duplicate_terminal_update_applied_once() {
        let gateway = SimGateway::new();
        gateway.connect().await.unwrap();
        let (mut coord, mut rx) = coordinator();
        let mut ledger = PositionLedger::new();

        let intent = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &Position::flat("AAPL"))
            .unwrap();
        let order_id = coord.submit(&gateway, intent, "test").await.unwrap();

        let update = GatewayEvent::OrderUpdate {
            broker_order_id: order_id,
            status: OrderStatus::Filled,
            filled_quantity: 10,
            avg_fill_price: dec!(102.00),
        };
        coord.on_event(update.clone(), &mut ledger);
        coord.on_event(update, &mut ledger);

        assert_eq!(ledger.trades().len(), 1);
        assert_eq!(ledger.position("AAPL").quantity, 10);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_partial_updates_do_not_touch_ledger() {
        let gateway = SimGateway::new();
        gateway.connect().await.unwrap();
        let (mut coord, _rx) = coordinator();
        let mut ledger = PositionLedger::new();

        let intent = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &Position::flat("AAPL"))
            .unwrap();
        let order_id = coord.submit(&gateway, intent, "test").await.unwrap();

        coord.on_event(
            GatewayEvent::OrderUpdate {
                broker_order_id: order_id,
                status: OrderStatus::PartiallyFilled,
                filled_quantity: 4,
                avg_fill_price: dec!(102.00),
            },
            &mut ledger,
        );
        assert!(ledger.trades().is_empty());
        assert!(coord.has_open_intent("AAPL"));

        // Terminal update carries the cumulative fill.
        coord.on_event(
            GatewayEvent::OrderUpdate {
                broker_order_id: order_id,
                status: OrderStatus::Filled,
                filled_quantity: 10,
                avg_fill_price: dec!(101.95),
            },
            &mut ledger,
        );
        assert_eq!(ledger.position("AAPL").quantity, 10);
        assert_eq!(ledger.trades().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_frees_symbol_without_ledger_mutation() {
        let gateway = SimGateway::new();
        gateway.connect().await.unwrap();
        let (mut coord, mut rx) = coordinator();
        let mut ledger = PositionLedger::new();

        let intent = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &Position::flat("AAPL"))
            .unwrap();
        let order_id = coord.submit(&gateway, intent, "test").await.unwrap();

        coord.on_event(
            GatewayEvent::OrderUpdate {
                broker_order_id: order_id,
                status: OrderStatus::Rejected,
                filled_quantity: 0,
                avg_fill_price: Decimal::ZERO,
            },
            &mut ledger,
        );

        assert!(!coord.has_open_intent("AAPL"));
        assert!(ledger.trades().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_submission_leaves_symbol_free() {
        let gateway = SimGateway::new();
        gateway.connect().await.unwrap();
        gateway.set_reject_orders(true);
        let (mut coord, _rx) = coordinator();

        let intent = coord
            .decide(&signal("AAPL", TradeAction::Buy, 100.0), &Position::flat("AAPL"))
            .unwrap();
        let err = coord.submit(&gateway, intent, "test").await.unwrap_err();
        assert!(matches!(err, OrderError::SubmissionFailed(_)));
        assert!(!coord.has_open_intent("AAPL"));
    }
}
