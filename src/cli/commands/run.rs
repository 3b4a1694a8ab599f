//! Paper trading loop command.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use swingbot_broker::SimGateway;
use swingbot_config::AppConfig;
use swingbot_engine::{Engine, EngineConfig};
use swingbot_monitor::TradeReporter;
use tokio::sync::watch;
use tracing::{info, warn};

use super::signal_config;
use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;

    let symbols = if args.symbols.is_empty() {
        config.trading.symbols.clone()
    } else {
        args.symbols.clone()
    };

    let gateway = Arc::new(SimGateway::new());
    for symbol in &symbols {
        let path = args.data_dir.join(format!("{symbol}.csv"));
        if path.exists() {
            let bars = gateway
                .seed_bars_csv(symbol, &path)
                .with_context(|| format!("loading {}", path.display()))?;
            info!(symbol, bars, "seeded history");
        } else {
            warn!(symbol, path = %path.display(), "no data file, symbol will idle");
        }
    }

    let poll_secs = args.interval.unwrap_or(config.trading.poll_interval_secs);
    let engine_config = EngineConfig {
        symbols,
        signal: signal_config(&config.strategy),
        position_size: config.trading.position_size,
        limit_offset: config.trading.limit_offset,
        history_days: config.trading.history_days,
        history_timeout: Duration::from_secs(config.gateway.history_timeout_secs),
        reconnect_timeout: Duration::from_secs(config.gateway.reconnect_timeout_secs),
        poll_interval: Duration::from_secs(poll_secs),
        max_cycles: args.cycles,
    };

    let mut engine = Engine::new(gateway, engine_config);
    let executions = engine
        .take_executions()
        .context("execution stream already taken")?;
    tokio::spawn(TradeReporter::new(executions).run());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            let _ = shutdown_tx.send(true);
        }
    });

    let state = engine.state();
    engine.run(shutdown_rx).await?;

    let state = state.lock().await;
    println!("Session summary");
    println!("  Trades applied: {}", state.ledger.trades().len());
    for trade in state.ledger.trades() {
        println!(
            "  {} {} {} @ {}",
            trade.action, trade.quantity, trade.symbol, trade.price
        );
    }
    for position in state.ledger.positions() {
        println!(
            "  Open: {} {} @ {} ({})",
            position.quantity,
            position.symbol,
            position.avg_entry_price,
            position.side()
        );
    }

    Ok(())
}
