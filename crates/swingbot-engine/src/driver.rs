//! Cycle driver.
//!
//! One evaluation cycle per poll interval: ensure the session is up,
//! then for each configured symbol fetch history, evaluate the latest
//! bar against the current position, and hand any resulting intent to
//! the coordinator. Gateway events are drained by a listener task so
//! fills land in the ledger without blocking the cycle.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use swingbot_core::error::{SignalError, TradingError, TradingResult};
use swingbot_core::gateway::BrokerGateway;
use swingbot_core::types::{BarSeries, TradeExecuted};
use swingbot_ledger::PositionLedger;
use swingbot_signals::{SignalConfig, SignalEngine};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::coordinator::{CoordinatorConfig, OrderLifecycleCoordinator};
use crate::supervisor::ConnectionSupervisor;

/// Engine parameters, assembled from settings by the caller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Symbols evaluated each cycle
    pub symbols: Vec<String>,
    /// Strategy parameters
    pub signal: SignalConfig,
    /// Shares per entry order
    pub position_size: i64,
    /// Fractional limit offset past the signal price
    pub limit_offset: Decimal,
    /// History window requested per symbol, in daily bars
    pub history_days: u32,
    /// Upper bound on a single history request
    pub history_timeout: Duration,
    /// Upper bound on a reconnect attempt
    pub reconnect_timeout: Duration,
    /// Time between evaluation cycles
    pub poll_interval: Duration,
    /// Stop after this many cycles; None runs until shutdown
    pub max_cycles: Option<u64>,
}

/// Mutable trading state shared between the cycle loop and the event
/// listener.
pub struct EngineState {
    pub coordinator: OrderLifecycleCoordinator,
    pub ledger: PositionLedger,
}

/// Drives evaluation cycles against a broker gateway.
pub struct Engine {
    gateway: Arc<dyn BrokerGateway>,
    signals: SignalEngine,
    supervisor: ConnectionSupervisor,
    state: Arc<Mutex<EngineState>>,
    executions: Option<mpsc::UnboundedReceiver<TradeExecuted>>,
    last_closes: HashMap<String, Decimal>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(gateway: Arc<dyn BrokerGateway>, config: EngineConfig) -> Self {
        let (executed_tx, executed_rx) = mpsc::unbounded_channel();
        let coordinator = OrderLifecycleCoordinator::new(
            CoordinatorConfig {
                position_size: config.position_size,
                limit_offset: config.limit_offset,
            },
            executed_tx,
        );

        Self {
            gateway,
            signals: SignalEngine::new(config.signal.clone()),
            supervisor: ConnectionSupervisor::new(config.reconnect_timeout),
            state: Arc::new(Mutex::new(EngineState {
                coordinator,
                ledger: PositionLedger::new(),
            })),
            executions: Some(executed_rx),
            last_closes: HashMap::new(),
            config,
        }
    }

    /// Handle to the shared trading state. Survives `run`.
    pub fn state(&self) -> Arc<Mutex<EngineState>> {
        self.state.clone()
    }

    /// Take the execution notification stream. Yields once.
    pub fn take_executions(&mut self) -> Option<mpsc::UnboundedReceiver<TradeExecuted>> {
        self.executions.take()
    }

    /// Run the trading loop until shutdown is signalled or the cycle
    /// limit is reached.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> TradingResult<()> {
        let mut events = self.gateway.subscribe().await?;
        let state = self.state.clone();
        let listener = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let mut state = state.lock().await;
                let EngineState { coordinator, ledger } = &mut *state;
                coordinator.on_event(event, ledger);
            }
        });

        info!(
            gateway = self.gateway.name(),
            symbols = ?self.config.symbols,
            poll_secs = self.config.poll_interval.as_secs(),
            "trading loop started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles: u64 = 0;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested");
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.run_once().await;
                    cycles += 1;
                    if let Some(max) = self.config.max_cycles {
                        if cycles >= max {
                            info!(cycles, "cycle limit reached");
                            break;
                        }
                    }
                }
            }
        }

        self.drain_open_intents().await;
        self.gateway.disconnect().await;
        listener.abort();
        info!("trading loop stopped");
        Ok(())
    }

    /// One evaluation cycle over all configured symbols. A failure for
    /// one symbol never stops the others.
    pub async fn run_once(&mut self) {
        if !self.supervisor.ensure_connected(self.gateway.as_ref()).await {
            warn!("no broker session, skipping cycle");
            return;
        }

        let symbols = self.config.symbols.clone();
        for symbol in &symbols {
            if let Err(e) = self.evaluate_symbol(symbol).await {
                warn!(symbol, error = %e, "symbol evaluation failed");
            }
        }

        self.log_portfolio().await;
    }

    async fn evaluate_symbol(&mut self, symbol: &str) -> TradingResult<()> {
        {
            let state = self.state.lock().await;
            if state.coordinator.has_open_intent(symbol) {
                debug!(symbol, "order outstanding, skipping");
                return Ok(());
            }
        }

        let bars = self
            .gateway
            .request_historical_bars(symbol, self.config.history_days, self.config.history_timeout)
            .await?;
        if bars.is_empty() {
            debug!(symbol, "no bars returned");
            return Ok(());
        }
        let series = BarSeries::from_bars(symbol, bars);
        if let Some(bar) = series.last() {
            if let Ok(close) = Decimal::try_from(bar.close) {
                self.last_closes.insert(symbol.to_string(), close);
            }
        }

        let mut state = self.state.lock().await;
        let side = state.ledger.side(symbol);
        let signal = match self.signals.evaluate(&series, side) {
            Ok(Some(signal)) => signal,
            Ok(None) => return Ok(()),
            Err(SignalError::InsufficientHistory {
                required,
                available,
            }) => {
                debug!(symbol, required, available, "insufficient history");
                return Ok(());
            }
        };
        info!(
            symbol,
            action = %signal.action,
            price = signal.price,
            reason = %signal.reason,
            "signal"
        );

        let position = state.ledger.position(symbol);
        let Some(intent) = state.coordinator.decide(&signal, &position) else {
            return Ok(());
        };

        // The state lock is held across submission so the fill update
        // cannot arrive before the intent is registered.
        state
            .coordinator
            .submit(self.gateway.as_ref(), intent, &signal.reason)
            .await
            .map_err(TradingError::from)?;
        Ok(())
    }

    async fn log_portfolio(&self) {
        let state = self.state.lock().await;
        let positions = state.ledger.positions();
        for p in &positions {
            let unrealized = self
                .last_closes
                .get(&p.symbol)
                .map(|close| p.unrealized_pnl(*close).round_dp(2).to_string())
                .unwrap_or_else(|| "n/a".to_string());
            info!(
                symbol = %p.symbol,
                quantity = p.quantity,
                side = %p.side(),
                avg_entry = %p.avg_entry_price,
                unrealized,
                "open position"
            );
        }
        info!(
            open_positions = positions.len(),
            trades = state.ledger.trades().len(),
            "portfolio"
        );
    }

    /// Wait briefly for outstanding intents to reach a terminal state
    /// before tearing the session down.
    async fn drain_open_intents(&self) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            {
                let state = self.state.lock().await;
                if self
                    .config
                    .symbols
                    .iter()
                    .all(|s| !state.coordinator.has_open_intent(s))
                {
                    return;
                }
            }
            if tokio::time::Instant::now() >= deadline {
                warn!("intents still outstanding at shutdown");
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use swingbot_broker::SimGateway;
    use swingbot_core::types::{Bar, TradeAction};

    fn engine_config(symbols: &[&str]) -> EngineConfig {
        EngineConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            signal: SignalConfig {
                ma_period: 5,
                rsi_period: 5,
                rsi_overbought: 70.0,
                rsi_oversold: 30.0,
            },
            position_size: 10,
            limit_offset: dec!(0.02),
            history_days: 60,
            history_timeout: Duration::from_secs(5),
            reconnect_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
            max_cycles: Some(2),
        }
    }

    fn rising_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar::new(i as i64 * 86_400_000, close, close + 1.0, close - 1.0, close, 1000.0)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_loop_shorts_overbought_symbol_end_to_end() {
        let gateway = Arc::new(SimGateway::new());
        gateway.seed_bars("AAPL", rising_bars(30));

        let mut engine = Engine::new(gateway.clone(), engine_config(&["AAPL"]));
        let state = engine.state();
        let mut executions = engine.take_executions().unwrap();

        // A steadily rising series pins RSI at 100; a flat book shorts.
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        engine.run(shutdown_rx).await.unwrap();

        let state = state.lock().await;
        let position = state.ledger.position("AAPL");
        assert_eq!(position.quantity, -10);
        // Last close 129, shorted at 129 * 0.98.
        assert_eq!(position.avg_entry_price, dec!(126.42));
        assert_eq!(state.ledger.trades().len(), 1);

        let executed = executions.try_recv().unwrap();
        assert_eq!(executed.action, TradeAction::Short);
        assert_eq!(executed.quantity, 10);
        assert!(executions.try_recv().is_err());

        assert!(!gateway.is_connected());
    }

    #[tokio::test]
    async fn test_cycle_skipped_when_session_unavailable() {
        let gateway = Arc::new(SimGateway::new());
        gateway.set_fail_connect(true);
        gateway.seed_bars("AAPL", rising_bars(30));

        let mut engine = Engine::new(gateway.clone(), engine_config(&["AAPL"]));
        let state = engine.state();
        engine.run_once().await;

        assert!(state.lock().await.ledger.trades().is_empty());
    }

    #[tokio::test]
    async fn test_symbol_without_data_is_skipped() {
        let gateway = Arc::new(SimGateway::new());
        gateway.seed_bars("AAPL", rising_bars(30));

        // MSFT has no bars and NET has too few; AAPL still trades.
        gateway.seed_bars("NET", rising_bars(3));
        let mut engine = Engine::new(gateway.clone(), engine_config(&["MSFT", "NET", "AAPL"]));
        let state = engine.state();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        engine.run(shutdown_rx).await.unwrap();

        let state = state.lock().await;
        assert_eq!(state.ledger.trades().len(), 1);
        assert_eq!(state.ledger.position("AAPL").quantity, -10);
        assert!(state.ledger.position("MSFT").is_flat());
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_loop() {
        let gateway = Arc::new(SimGateway::new());
        let mut config = engine_config(&["AAPL"]);
        config.max_cycles = None;
        config.poll_interval = Duration::from_millis(5);
        let engine = Engine::new(gateway, config);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(engine.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("loop did not stop")
            .unwrap()
            .unwrap();
    }
}
