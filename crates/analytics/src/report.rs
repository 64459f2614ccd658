use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A standardized report of a backtest's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and travels
/// inside the `BacktestReport` returned to callers. Percentages are rounded
/// to presentation precision here and nowhere earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    /// (final - initial) / initial, as a percentage.
    pub total_return_pct: Decimal,
    /// Total return scaled to a 252-trading-day year.
    pub annualized_return_pct: Decimal,
    /// Annualized standard deviation of daily returns, as a percentage.
    pub volatility_pct: Decimal,
    /// Excess annualized return per unit of volatility; 0 when flat.
    pub sharpe_ratio: Decimal,
    /// Worst peak-to-trough decline, reported as a negative percentage.
    pub max_drawdown_pct: Decimal,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Share of matched sells that beat their entry price. Sells with no
    /// prior buy in the same symbol are excluded from the denominator.
    pub win_rate_pct: Decimal,
}

impl BacktestMetrics {
    /// Creates a new, zeroed-out metrics report.
    pub fn new() -> Self {
        Self {
            total_return_pct: Decimal::ZERO,
            annualized_return_pct: Decimal::ZERO,
            volatility_pct: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: Decimal::ZERO,
        }
    }
}

impl Default for BacktestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
