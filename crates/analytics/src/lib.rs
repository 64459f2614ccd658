//! # Papertrade Analytics Crate
//!
//! A stateless calculator that turns a finished equity curve and trade log
//! into performance metrics. It never looks at live account state; the
//! backtester hands it immutable inputs after the simulation completes.

pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to provide a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::BacktestMetrics;
