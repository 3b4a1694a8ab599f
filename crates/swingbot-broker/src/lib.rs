//! Broker gateway adapters.
//!
//! The core trades against the `BrokerGateway` capability interface; this
//! crate provides the in-process simulator used for paper runs and tests,
//! plus the CSV bar loader that seeds it.

mod csv_bars;
mod sim;

pub use csv_bars::load_bars_csv;
pub use sim::SimGateway;
