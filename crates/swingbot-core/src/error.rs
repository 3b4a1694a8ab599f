//! Error types for the trading bot.

use thiserror::Error;

/// Top-level trading error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Indicator calculation errors. Fail fast, never retried.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Signal evaluation errors.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Not enough bars to evaluate. Callers treat this as "no signal"
    /// and skip the cycle for the symbol, never as a fatal error.
    #[error("Insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },
}

/// Position ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The requested fill is not legal against the current position
    /// (e.g. SHORT while long). Nothing is mutated.
    #[error("Invalid transition: {action} {symbol} while {side}")]
    InvalidTransition {
        symbol: String,
        action: String,
        side: String,
    },

    #[error("Invalid fill quantity {quantity} for {symbol}")]
    InvalidQuantity { symbol: String, quantity: i64 },
}

/// Order lifecycle errors.
#[derive(Error, Debug)]
pub enum OrderError {
    /// Submission did not yield a broker order id. The intent is
    /// discarded; the next cycle may retry from a clean decision.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
}

/// Broker gateway errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Gateway error: {0}")]
    Internal(String),
}

/// Result type alias for trading operations.
pub type TradingResult<T> = Result<T, TradingError>;
