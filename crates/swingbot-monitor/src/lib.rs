//! Observability: logging setup and the trade report sink.

mod logging;
mod reporter;

pub use logging::setup_logging;
pub use reporter::TradeReporter;
