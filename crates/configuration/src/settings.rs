use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the simulation core.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub decision: Decision,
    #[serde(default)]
    pub backtest: Backtest,
}

/// Parameters for the execution-price and fee model.
#[derive(Debug, Clone, Deserialize)]
pub struct Simulation {
    /// Lower bound of the bid-ask spread drawn per fill. 0.001 is 0.1%.
    pub spread_min_frac: Decimal,

    /// Upper bound of the bid-ask spread drawn per fill. 0.003 is 0.3%.
    pub spread_max_frac: Decimal,

    /// Magnitude of the symmetric slippage term. 0.0005 means the fill can
    /// land up to 0.05% away from the spread-adjusted price in either
    /// direction.
    pub slippage_frac: Decimal,

    /// Flat trading fee charged on the notional value of every fill.
    pub fee_rate: Decimal,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            spread_min_frac: dec!(0.001),
            spread_max_frac: dec!(0.003),
            slippage_frac: dec!(0.0005),
            fee_rate: dec!(0.001),
        }
    }
}

/// Parameters for the auto-trade decision engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Decision {
    /// Probability of choosing to buy when the allocation sits in the
    /// neutral zone between the under- and over-invested thresholds.
    pub buy_bias: f64,

    /// Fraction of available cash a single buy may consume.
    pub max_cash_usage_frac: Decimal,

    /// Lower bound of the fraction of a position sold at once.
    pub min_sell_frac: f64,

    /// Upper bound of the fraction of a position sold at once.
    pub max_sell_frac: f64,
}

impl Default for Decision {
    fn default() -> Self {
        Self {
            buy_bias: 0.4,
            max_cash_usage_frac: dec!(0.95),
            min_sell_frac: 0.2,
            max_sell_frac: 0.8,
        }
    }
}

/// Parameters for the backtest simulator.
#[derive(Debug, Clone, Deserialize)]
pub struct Backtest {
    /// Window of the simple moving average driving entries and exits,
    /// in trading days.
    pub ma_window: usize,

    /// Annual risk-free rate used in the Sharpe ratio. 0.04 is 4%.
    pub risk_free_rate: Decimal,
}

impl Default for Backtest {
    fn default() -> Self {
        Self {
            ma_window: 20,
            risk_free_rate: dec!(0.04),
        }
    }
}
