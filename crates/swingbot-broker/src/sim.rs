//! Simulated broker gateway.
//!
//! Fills every submitted order immediately at its limit price and pushes
//! the terminal status through the event stream, mimicking the
//! asynchronous confirmation path of a real session. Connect and submit
//! failures can be injected for supervisor and coordinator tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use swingbot_core::error::GatewayError;
use swingbot_core::gateway::{BrokerGateway, GatewayEvent};
use swingbot_core::types::{Bar, OrderIntent, OrderStatus};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::csv_bars::load_bars_csv;

/// In-process paper gateway.
pub struct SimGateway {
    connected: AtomicBool,
    fail_connect: AtomicBool,
    reject_orders: AtomicBool,
    next_order_id: AtomicI64,
    bars: Mutex<HashMap<String, Vec<Bar>>>,
    event_tx: Mutex<Option<mpsc::Sender<GatewayEvent>>>,
}

impl SimGateway {
    /// Create a disconnected gateway with no seeded data.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            reject_orders: AtomicBool::new(false),
            next_order_id: AtomicI64::new(1),
            bars: Mutex::new(HashMap::new()),
            event_tx: Mutex::new(None),
        }
    }

    /// Seed historical bars for a symbol.
    pub fn seed_bars(&self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.bars.lock().unwrap().insert(symbol.into(), bars);
    }

    /// Seed historical bars for a symbol from a CSV file.
    pub fn seed_bars_csv(&self, symbol: impl Into<String>, path: &Path) -> Result<usize, GatewayError> {
        let bars = load_bars_csv(path)?;
        let count = bars.len();
        self.seed_bars(symbol, bars);
        Ok(count)
    }

    /// Make subsequent connect attempts fail.
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent submissions be rejected.
    pub fn set_reject_orders(&self, reject: bool) {
        self.reject_orders.store(reject, Ordering::SeqCst);
    }

    /// Drop the transport and notify the listener.
    pub fn simulate_disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.push_event(GatewayEvent::Disconnected);
    }

    /// Re-deliver a terminal order event, as a flaky session would.
    pub fn replay_order_update(&self, event: GatewayEvent) {
        self.push_event(event);
    }

    fn push_event(&self, event: GatewayEvent) {
        let tx = self.event_tx.lock().unwrap();
        if let Some(tx) = tx.as_ref() {
            // A full or closed channel means the listener is gone; the
            // event is dropped, matching a dead session.
            let _ = tx.try_send(event);
        }
    }
}

impl Default for SimGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerGateway for SimGateway {
    async fn connect(&self) -> Result<(), GatewayError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(GatewayError::ConnectionLost(
                "simulated connect failure".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        info!(gateway = self.name(), "session connected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!(gateway = self.name(), "session closed");
    }

    async fn request_historical_bars(
        &self,
        symbol: &str,
        duration_days: u32,
        _timeout: Duration,
    ) -> Result<Vec<Bar>, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }

        let bars = self.bars.lock().unwrap();
        let all = match bars.get(symbol) {
            Some(all) => all,
            None => return Ok(Vec::new()),
        };

        // Daily bars: the duration window is a bar count from the tail.
        let start = all.len().saturating_sub(duration_days as usize);
        Ok(all[start..].to_vec())
    }

    async fn submit_order(&self, intent: &OrderIntent) -> Result<i64, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }
        if self.reject_orders.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected("simulated rejection".to_string()));
        }

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        debug!(
            symbol = %intent.symbol,
            action = %intent.action,
            quantity = intent.quantity,
            limit_price = %intent.limit_price,
            order_id,
            "paper order accepted"
        );

        // Immediate fill at the limit price, delivered asynchronously.
        self.push_event(GatewayEvent::OrderUpdate {
            broker_order_id: order_id,
            status: OrderStatus::Filled,
            filled_quantity: intent.quantity,
            avg_fill_price: intent.limit_price,
        });

        Ok(order_id)
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<GatewayEvent>, GatewayError> {
        let (tx, rx) = mpsc::channel(64);
        *self.event_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn name(&self) -> &str {
        "Sim Gateway"
    }
}
