//! One-shot signal check against a CSV file.

use anyhow::{Context, Result};
use swingbot_broker::load_bars_csv;
use swingbot_config::AppConfig;
use swingbot_core::error::SignalError;
use swingbot_core::types::{BarSeries, PositionSide};
use swingbot_signals::SignalEngine;

use super::signal_config;
use crate::cli::CheckArgs;

pub async fn run(args: CheckArgs, config: AppConfig) -> Result<()> {
    let bars =
        load_bars_csv(&args.data).with_context(|| format!("loading {}", args.data.display()))?;
    let series = BarSeries::from_bars(args.symbol.as_str(), bars);
    let engine = SignalEngine::new(signal_config(&config.strategy));

    let closes = series.closes();
    let flags = match engine.flags(&closes) {
        Ok(flags) => flags,
        Err(SignalError::InsufficientHistory {
            required,
            available,
        }) => {
            println!(
                "Not enough history for {}: need {required} bars, have {available}",
                args.symbol
            );
            return Ok(());
        }
    };

    // flags() guarantees a non-empty series here.
    let latest = flags.last().context("empty flag series")?;
    let bar = series.last().context("empty bar series")?;

    println!("{}: {} bars", args.symbol, series.len());
    println!("  Close: {:.2}", bar.close);
    println!("  SMA({}): {:.2}", config.strategy.ma_period, latest.sma);
    println!("  RSI({}): {:.1}", config.strategy.rsi_period, latest.rsi);
    println!(
        "  Crossed above: {}  Crossed below: {}",
        latest.crossed_above, latest.crossed_below
    );

    for side in [PositionSide::Flat, PositionSide::Long, PositionSide::Short] {
        match engine.evaluate(&series, side)? {
            Some(signal) => println!("  If {side}: {} ({})", signal.action, signal.reason),
            None => println!("  If {side}: no action"),
        }
    }

    Ok(())
}
