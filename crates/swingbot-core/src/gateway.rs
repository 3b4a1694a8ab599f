//! Broker gateway capability interface.
//!
//! The trading core never inherits broker internals; it consumes this
//! narrow trait plus an asynchronous event stream. Adapters (a real
//! brokerage session, or the in-process simulator) implement it outside
//! the core.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::types::{Bar, OrderIntent, OrderStatus};

/// Asynchronous events pushed by the broker session.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Order status update. `filled_quantity` and `avg_fill_price` are
    /// cumulative for the order.
    OrderUpdate {
        broker_order_id: i64,
        status: OrderStatus,
        filled_quantity: i64,
        avg_fill_price: Decimal,
    },
    /// Broker-side position report.
    PositionReport {
        symbol: String,
        quantity: i64,
        avg_cost: Decimal,
    },
    /// Broker error message.
    Error { code: i32, message: String },
    /// Transport dropped; the supervisor will attempt a reconnect.
    Disconnected,
}

/// Capability interface to the broker session.
///
/// Order submission is fire-and-forget: completion is observed through
/// the event stream, never by blocking on the fill.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Establish the broker session.
    async fn connect(&self) -> Result<(), GatewayError>;

    /// Check session health.
    fn is_connected(&self) -> bool;

    /// Tear down the session.
    async fn disconnect(&self);

    /// Fetch historical bars, oldest first. May time out, returning
    /// partial or empty data.
    async fn request_historical_bars(
        &self,
        symbol: &str,
        duration_days: u32,
        timeout: Duration,
    ) -> Result<Vec<Bar>, GatewayError>;

    /// Submit an order and return the broker-assigned order id.
    async fn submit_order(&self, intent: &OrderIntent) -> Result<i64, GatewayError>;

    /// Subscribe to the session event stream. Single consumer.
    async fn subscribe(&self) -> Result<mpsc::Receiver<GatewayEvent>, GatewayError>;

    /// Get the gateway name.
    fn name(&self) -> &str;
}
