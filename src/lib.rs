//! # Papertrade
//!
//! A simulated-equity-trading core: one cash+positions ledger per account,
//! a spread/slippage/fee execution model, an auto-trade decision engine
//! working toward a target allocation, and a reproducible SMA-crossover
//! backtest simulator.
//!
//! This crate is the surface an outer layer (HTTP, CLI, scheduler — all
//! external collaborators) calls into. It owns no wire format and performs
//! no I/O; prices, strategies, and configuration arrive as already-resolved
//! values, results leave as plain serializable objects.
//!
//! Concurrency contract: one writer per ledger at a time. Every operation
//! here is synchronous and runs to completion; callers serialize trades
//! against the same account (one lock per account is enough) and may run
//! any number of independent backtests in parallel.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;

// Re-export the component crates' public types so callers depend on one
// crate only.
pub use analytics::{AnalyticsEngine, BacktestMetrics};
pub use autotrade::{AutoTradeOutcome, AutoTrader, Recommendation};
pub use backtester::{
    BacktestError, BacktestReport, BacktestSimulator, HistoricalPriceProvider,
    InMemoryPriceProvider, ResultStore,
};
pub use configuration::{
    Settings, StrategyCatalog, StrategyConfig, StrategyProvider, load_config,
};
pub use core_types::{
    EquityPoint, Position, PriceBar, TradeRecord, TradeSide, ValidationError,
};
pub use execution::{ExecutionEngine, ExecutionOutcome, RejectReason};
pub use ledger::{Ledger, LedgerError, LedgerSnapshot};
pub use pricing::FillModel;

/// Executes one trade against a ledger.
///
/// With `price` supplied the order fills at exactly that price (the fee is
/// still charged); without it the engine prices the fill off `market_price`
/// with spread and slippage drawn from `rng`.
pub fn execute_trade(
    engine: &ExecutionEngine,
    account: &mut Ledger,
    side: TradeSide,
    symbol: &str,
    quantity: Decimal,
    market_price: Decimal,
    price: Option<Decimal>,
    strategy_id: &str,
    rng: &mut impl Rng,
) -> ExecutionOutcome {
    match price {
        Some(price) => engine.execute_priced(
            account,
            side,
            symbol,
            quantity,
            price,
            strategy_id,
            Utc::now(),
        ),
        None => engine.execute(
            account,
            side,
            symbol,
            quantity,
            market_price,
            strategy_id,
            Utc::now(),
            rng,
        ),
    }
}

/// Runs one automatic trading pass for an account: decide a side from the
/// allocation gap, pick a symbol, size the order, execute it. Returns
/// `NoOp` when there is nothing sensible to do.
pub fn auto_trade(
    trader: &AutoTrader,
    engine: &ExecutionEngine,
    account: &mut Ledger,
    strategy: &StrategyConfig,
    current_prices: &HashMap<String, Decimal>,
    rng: &mut impl Rng,
) -> AutoTradeOutcome {
    trader.auto_trade(account, strategy, current_prices, engine, Utc::now(), rng)
}

/// Runs a backtest for a catalogued strategy.
///
/// The RNG seed is derived from the strategy id and start date, so
/// repeating a request reproduces its report exactly.
pub fn run_backtest(
    simulator: &BacktestSimulator,
    provider: &dyn HistoricalPriceProvider,
    strategies: &dyn StrategyProvider,
    strategy_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    initial_capital: Decimal,
) -> Result<BacktestReport, BacktestError> {
    let strategy = strategies
        .strategy(strategy_id)
        .ok_or_else(|| BacktestError::UnknownStrategy(strategy_id.to_string()))?;
    let seed = backtest_seed(strategy_id, start);
    simulator.run(provider, &strategy, start, end, initial_capital, seed)
}

/// Derives the deterministic per-request seed: an FNV-1a fold over the
/// strategy id and the ISO start date. Stable across builds and platforms.
pub fn backtest_seed(strategy_id: &str, start: NaiveDate) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in strategy_id.bytes().chain(start.to_string().bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
