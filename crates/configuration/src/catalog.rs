use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The per-strategy knobs the trading and backtest engines read.
///
/// Strategies are data, not code: the decision engine and the simulator both
/// take a `StrategyConfig` and never branch on its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub id: String,
    pub name: String,
    /// 1 (defensive) through 5 (speculative); scales buy sizing.
    pub risk_level: u8,
    /// The symbols this strategy is allowed to trade.
    pub symbol_pool: Vec<String>,
    /// Fraction of the portfolio the strategy wants invested.
    pub target_investment_ratio: Decimal,
    /// Cap on any single position as a fraction of portfolio value.
    pub max_position_pct: Decimal,
}

/// Boundary trait for strategy lookup. The in-memory catalog below is the
/// default implementation; a persistence-backed collaborator can supply its
/// own.
pub trait StrategyProvider {
    fn strategy(&self, strategy_id: &str) -> Option<StrategyConfig>;
}

/// An in-memory strategy table keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StrategyCatalog {
    strategies: HashMap<String, StrategyConfig>,
}

impl StrategyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five built-in strategies, from defensive to speculative.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(StrategyConfig {
            id: "conservative".to_string(),
            name: "Conservative".to_string(),
            risk_level: 1,
            symbol_pool: symbols(&[
                "JNJ", "PG", "KO", "PEP", "DUK", "NEE", "MRK", "CL", "KMB", "PEG",
            ]),
            target_investment_ratio: dec!(0.6),
            max_position_pct: dec!(0.15),
        });
        catalog.insert(StrategyConfig {
            id: "value".to_string(),
            name: "Value".to_string(),
            risk_level: 2,
            symbol_pool: symbols(&[
                "BLK", "JPM", "BAC", "GS", "MA", "PFE", "CVS", "IBM", "MET", "PRU",
            ]),
            target_investment_ratio: dec!(0.7),
            max_position_pct: dec!(0.18),
        });
        catalog.insert(StrategyConfig {
            id: "balanced".to_string(),
            name: "Balanced".to_string(),
            risk_level: 3,
            symbol_pool: symbols(&[
                "AAPL", "MSFT", "JNJ", "PG", "JPM", "KO", "CAT", "HON", "LMT", "MMM",
            ]),
            target_investment_ratio: dec!(0.7),
            max_position_pct: dec!(0.15),
        });
        catalog.insert(StrategyConfig {
            id: "growth".to_string(),
            name: "Growth".to_string(),
            risk_level: 4,
            symbol_pool: symbols(&[
                "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "AMD", "CRM", "NFLX", "NOW", "ADBE",
            ]),
            target_investment_ratio: dec!(0.8),
            max_position_pct: dec!(0.20),
        });
        catalog.insert(StrategyConfig {
            id: "aggressive".to_string(),
            name: "Aggressive".to_string(),
            risk_level: 5,
            symbol_pool: symbols(&["COIN", "PLTR", "NVDA", "AMD", "BA", "CRWD", "PANW", "ABNB"]),
            target_investment_ratio: dec!(0.9),
            max_position_pct: dec!(0.25),
        });
        catalog
    }

    /// Adds or replaces a strategy. User-defined strategies go through here.
    pub fn insert(&mut self, strategy: StrategyConfig) {
        self.strategies.insert(strategy.id.clone(), strategy);
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.strategies.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every symbol any catalogued strategy may trade. This is the universe
    /// the execution engine validates order symbols against.
    pub fn symbol_universe(&self) -> HashSet<String> {
        self.strategies
            .values()
            .flat_map(|s| s.symbol_pool.iter().cloned())
            .collect()
    }
}

impl StrategyProvider for StrategyCatalog {
    fn strategy(&self, strategy_id: &str) -> Option<StrategyConfig> {
        self.strategies.get(&strategy_id.to_lowercase()).cloned()
    }
}

fn symbols(tickers: &[&str]) -> Vec<String> {
    tickers.iter().map(|t| t.to_string()).collect()
}
