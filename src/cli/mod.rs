//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "swingbot")]
#[command(author, version, about = "Long/short swing trading bot driven by SMA/RSI signals")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the paper trading loop against CSV-seeded history
    Run(RunArgs),
    /// Evaluate the latest bar of a CSV file and print the signal
    Check(CheckArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Directory holding one <SYMBOL>.csv file per symbol
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Symbols to trade (comma-separated); overrides configuration
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Seconds between evaluation cycles; overrides configuration
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    pub cycles: Option<u64>,
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// CSV file of daily bars
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol label for the series
    #[arg(short = 'S', long, default_value = "TEST")]
    pub symbol: String,
}
