//! # Papertrade Backtester Crate
//!
//! Replays historical daily bars through a moving-average-crossover rule,
//! driving the same execution engine live trading uses, and reports an
//! equity curve plus performance metrics.
//!
//! ## Architectural Principles
//!
//! - **Pure simulation:** a run is a function of (price series, strategy,
//!   date range, initial capital, seed). No wall-clock reads, no shared
//!   mutable state; the same inputs always produce the same report.
//! - **Boundary traits:** historical data arrives through the
//!   `HistoricalPriceProvider` trait; the simulator never fetches anything
//!   itself.
//! - **Caller-owned results:** the simulator returns its report; the
//!   bounded, TTL'd `ResultStore` is a separate component the caller owns.

pub mod data;
pub mod error;
pub mod report;
pub mod result_store;
pub mod simulator;

// Re-export the key components to provide a clean, public-facing API.
pub use data::{HistoricalPriceProvider, InMemoryPriceProvider};
pub use error::BacktestError;
pub use report::BacktestReport;
pub use result_store::ResultStore;
pub use simulator::BacktestSimulator;
