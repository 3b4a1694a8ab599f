//! Core types and traits for the trading bot.
//!
//! This crate provides the foundational building blocks:
//! - Market data types (`Bar`, `BarSeries`)
//! - Order, position, and trade types
//! - The `BrokerGateway` capability interface and its event stream
//! - The error taxonomy

pub mod error;
pub mod gateway;
pub mod types;

pub use error::{TradingError, TradingResult};
pub use gateway::{BrokerGateway, GatewayEvent};
pub use types::*;
