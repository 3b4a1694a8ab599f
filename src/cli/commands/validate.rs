//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use swingbot_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!(
        "Gateway: {}:{} (client id {})",
        config.gateway.host, config.gateway.port, config.gateway.client_id
    );
    println!("Symbols: {}", config.trading.symbols.join(", "));
    println!(
        "Strategy: SMA({}) / RSI({}) {}-{}",
        config.strategy.ma_period,
        config.strategy.rsi_period,
        config.strategy.rsi_oversold,
        config.strategy.rsi_overbought
    );
    println!("Position size: {} shares", config.trading.position_size);
    println!("Limit offset: {}", config.trading.limit_offset);

    Ok(())
}
