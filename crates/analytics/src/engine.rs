use crate::error::AnalyticsError;
use crate::report::BacktestMetrics;
use core_types::{EquityPoint, TradeRecord, TradeSide};
use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Trading days per year, the standard annualization base.
const TRADING_DAYS_PER_YEAR: u32 = 252;

/// A stateless calculator for deriving performance metrics from a finished
/// backtest.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the full metrics report from an equity curve and trade log.
    ///
    /// # Arguments
    ///
    /// * `equity_curve` - The portfolio's value per trading day, ascending.
    /// * `trades` - Every trade executed during the run, in order.
    /// * `initial_capital` - The starting capital of the run.
    /// * `risk_free_rate` - Annual risk-free rate for the Sharpe ratio.
    pub fn calculate(
        &self,
        equity_curve: &[EquityPoint],
        trades: &[TradeRecord],
        initial_capital: Decimal,
        risk_free_rate: Decimal,
    ) -> Result<BacktestMetrics, AnalyticsError> {
        let final_value = equity_curve
            .last()
            .ok_or_else(|| AnalyticsError::NotEnoughData("empty equity curve".to_string()))?
            .value;
        if initial_capital <= Decimal::ZERO {
            return Err(AnalyticsError::DivisionByZero("total_return".to_string()));
        }

        let mut report = BacktestMetrics::new();
        report.total_trades = trades.len();

        // --- Returns ---
        let total_return =
            (final_value - initial_capital) / initial_capital * Decimal::from(100);
        let trading_days = Decimal::from(equity_curve.len());
        let annualized_return =
            total_return * Decimal::from(TRADING_DAYS_PER_YEAR) / trading_days;

        // --- Volatility ---
        let daily_returns: Vec<Decimal> = equity_curve
            .windows(2)
            .filter(|w| w[0].value > Decimal::ZERO)
            .map(|w| (w[1].value - w[0].value) / w[0].value)
            .collect();
        let volatility = annualized_volatility(&daily_returns)?;

        // --- Sharpe ---
        let sharpe = if volatility > Decimal::ZERO {
            (annualized_return / Decimal::from(100) - risk_free_rate)
                / (volatility / Decimal::from(100))
        } else {
            Decimal::ZERO
        };

        report.total_return_pct = round2(total_return);
        report.annualized_return_pct = round2(annualized_return);
        report.volatility_pct = round2(volatility);
        report.sharpe_ratio = round2(sharpe);
        report.max_drawdown_pct = round2(max_drawdown_pct(equity_curve));

        self.calculate_win_rate(trades, &mut report);

        tracing::debug!(
            total_return = %report.total_return_pct,
            sharpe = %report.sharpe_ratio,
            win_rate = %report.win_rate_pct,
            "metrics calculated"
        );
        Ok(report)
    }

    /// Matches each sell to the most recent prior buy of the same symbol
    /// and counts it as a win when the exit beat the entry. Sells with no
    /// matching buy stay out of the denominator.
    fn calculate_win_rate(&self, trades: &[TradeRecord], report: &mut BacktestMetrics) {
        let mut last_buy_price: HashMap<&str, Decimal> = HashMap::new();

        for trade in trades {
            match trade.side {
                TradeSide::Buy => {
                    last_buy_price.insert(trade.symbol.as_str(), trade.price);
                }
                TradeSide::Sell => {
                    if let Some(&entry_price) = last_buy_price.get(trade.symbol.as_str()) {
                        if trade.price > entry_price {
                            report.winning_trades += 1;
                        } else {
                            report.losing_trades += 1;
                        }
                    }
                }
            }
        }

        let matched = report.winning_trades + report.losing_trades;
        if matched > 0 {
            report.win_rate_pct = (Decimal::from(report.winning_trades)
                / Decimal::from(matched)
                * Decimal::from(100))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        }
    }
}

/// Population standard deviation of daily returns, annualized by sqrt(252),
/// as a percentage.
fn annualized_volatility(daily_returns: &[Decimal]) -> Result<Decimal, AnalyticsError> {
    if daily_returns.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let count = Decimal::from(daily_returns.len());
    let mean: Decimal = daily_returns.iter().sum::<Decimal>() / count;
    let variance: Decimal = daily_returns
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / count;

    let daily_volatility = variance
        .sqrt()
        .ok_or_else(|| AnalyticsError::InternalError("sqrt of variance failed".to_string()))?;
    let annualization = Decimal::from(TRADING_DAYS_PER_YEAR)
        .sqrt()
        .ok_or_else(|| AnalyticsError::InternalError("sqrt of 252 failed".to_string()))?;

    Ok(daily_volatility * annualization * Decimal::from(100))
}

/// Worst peak-to-trough decline over the curve, as a negative percentage.
fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut max_drawdown = Decimal::ZERO;

    for point in equity_curve {
        if point.value > peak {
            peak = point.value;
        }
        if peak > Decimal::ZERO {
            let drawdown = (peak - point.value) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    -max_drawdown * Decimal::from(100)
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
