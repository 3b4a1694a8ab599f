//! Swingbot CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use swingbot_config::{load_config, load_default_config};
use swingbot_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config).context("loading configuration")?
    } else {
        load_default_config().context("loading configuration")?
    };

    // Setup logging
    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    let json = cli.json_logs || config.logging.format == "json";
    let _log_guard = setup_logging(
        log_level,
        json,
        config.logging.file.as_deref().map(Path::new),
    );

    // Execute command
    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, config).await,
        Commands::Check(args) => cli::commands::check::run(args, config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
