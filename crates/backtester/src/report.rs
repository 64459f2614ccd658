use analytics::BacktestMetrics;
use chrono::NaiveDate;
use core_types::{EquityPoint, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The complete result of one backtest run: the equity curve, every trade
/// the rule produced, and the derived performance metrics. A plain value
/// object; the simulator that produced it keeps nothing back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Number of dates the simulation visited (equity curve length).
    pub trading_days: usize,
    pub initial_capital: Decimal,
    /// Portfolio value at the last visited date.
    pub final_value: Decimal,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub metrics: BacktestMetrics,
}
