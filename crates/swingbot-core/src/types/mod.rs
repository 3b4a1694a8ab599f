//! Core data types for the trading bot.

mod bar;
mod order;
mod position;
mod signal;

pub use bar::{Bar, BarSeries};
pub use order::{OrderIntent, OrderStatus, TradeAction};
pub use position::{Position, PositionSide, Trade};
pub use signal::{Signal, TradeExecuted};
