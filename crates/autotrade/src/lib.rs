//! # Papertrade Auto-Trade Crate
//!
//! The decision engine behind automatic trading: given an account snapshot,
//! live prices, and a strategy configuration, it decides whether to buy or
//! sell, which symbol, and how much, then hands the order to the execution
//! engine.
//!
//! "Nothing to do" is a first-class, benign outcome — an empty candidate
//! list or a zero-share sizing produces a `NoOp`, never an error.

pub mod engine;

// Re-export the key components to provide a clean, public-facing API.
pub use engine::{AutoTradeOutcome, AutoTrader, Recommendation};
