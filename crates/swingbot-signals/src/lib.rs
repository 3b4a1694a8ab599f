//! Signal engine: converts an indicator-augmented bar series into at
//! most one discrete signal for the latest bar.
//!
//! The same MA/RSI conditions drive both sides of the book: "price weak"
//! closes a long or opens a short, "price strong" closes a short or
//! opens a long. Which action fires is disambiguated only by the current
//! position side, which the caller reads from the ledger.

mod engine;

pub use engine::{BarFlags, SignalConfig, SignalEngine};
