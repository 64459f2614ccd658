use analytics::AnalyticsError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("No market data available for any requested symbol")]
    NoMarketData,

    #[error("No trading days in the requested range")]
    NoTradingDays,

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Initial capital must be positive, got {0}")]
    InvalidInitialCapital(Decimal),

    #[error("Moving-average window must be at least 1")]
    InvalidMovingAverageWindow,

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] AnalyticsError),
}
