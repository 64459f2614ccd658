//! # Papertrade Pricing Crate
//!
//! Turns a market price into an execution price and a trading fee. This is
//! the "virtual exchange" of the simulation: a fill always lands on the
//! unfavorable side of the market price, by a spread drawn from a
//! configured range plus a small symmetric slippage term.
//!
//! The random source is an explicit parameter, never ambient state, so
//! backtests and unit tests are exactly reproducible under a fixed seed.

pub mod model;

// Re-export the key component to provide a clean, public-facing API.
pub use model::FillModel;
