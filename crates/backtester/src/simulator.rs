use crate::data::{HistoricalPriceProvider, SymbolSeries, load_series};
use crate::error::BacktestError;
use crate::report::BacktestReport;
use analytics::AnalyticsEngine;
use autotrade::AutoTrader;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use configuration::{Settings, StrategyConfig};
use core_types::{EquityPoint, TradeSide};
use execution::{ExecutionEngine, ExecutionOutcome};
use ledger::Ledger;
use pricing::FillModel;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Entry when the price clears the trailing SMA by 1%, exit when it falls
/// 1% below it. The band keeps the rule from churning on noise.
const ENTRY_BAND: Decimal = dec!(1.01);
const EXIT_BAND: Decimal = dec!(0.99);

/// Where a run currently is. Transitions are one-shot per invocation; a
/// finished run is either `Completed` or `Failed`, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Loading,
    Simulating(usize),
    Completed,
    Failed,
}

/// Replays daily bars through the SMA-crossover rule.
///
/// The simulator is stateless between runs: everything a run touches lives
/// on its own stack, so independent backtests can execute in parallel and
/// identical inputs produce identical reports.
pub struct BacktestSimulator {
    config: Settings,
    analytics: AnalyticsEngine,
}

impl BacktestSimulator {
    pub fn new(config: Settings) -> Self {
        Self {
            config,
            analytics: AnalyticsEngine::new(),
        }
    }

    /// Runs one backtest over `[start, end]`.
    ///
    /// `seed` drives every random draw in the run (spread and slippage);
    /// repeating the call with the same inputs reproduces the equity curve
    /// and metrics exactly.
    pub fn run(
        &self,
        provider: &dyn HistoricalPriceProvider,
        strategy: &StrategyConfig,
        start: NaiveDate,
        end: NaiveDate,
        initial_capital: Decimal,
        seed: u64,
    ) -> Result<BacktestReport, BacktestError> {
        let mut phase = Phase::Idle;
        tracing::debug!(?phase, strategy = %strategy.id, %start, %end, "backtest requested");

        if start >= end {
            return Err(BacktestError::InvalidDateRange { start, end });
        }
        if initial_capital <= Decimal::ZERO {
            return Err(BacktestError::InvalidInitialCapital(initial_capital));
        }
        let window = self.config.backtest.ma_window;
        if window == 0 {
            return Err(BacktestError::InvalidMovingAverageWindow);
        }

        // --- Loading ---
        phase = Phase::Loading;
        tracing::debug!(?phase, symbols = strategy.symbol_pool.len(), "loading price series");
        // Twice the window in calendar days covers the trading-day lookback
        // plus weekends and holidays.
        let lookback_days = window as u64 * 2;
        let series = load_series(provider, &strategy.symbol_pool, start, end, lookback_days);
        if series.is_empty() {
            phase = Phase::Failed;
            tracing::warn!(?phase, strategy = %strategy.id, "no market data for any symbol");
            return Err(BacktestError::NoMarketData);
        }

        let symbol_data: BTreeMap<String, SymbolData> = series
            .iter()
            .map(|s| (s.symbol.clone(), prepare(s, window)))
            .collect();

        // The union of dates with at least one bar, restricted to the
        // simulated range. Each date is visited exactly once, ascending.
        let trading_dates: BTreeSet<NaiveDate> = symbol_data
            .values()
            .flat_map(|data| data.prices.keys().copied())
            .filter(|date| *date >= start && *date <= end)
            .collect();
        if trading_dates.is_empty() {
            phase = Phase::Failed;
            tracing::warn!(?phase, strategy = %strategy.id, "no trading days in range");
            return Err(BacktestError::NoTradingDays);
        }

        // --- Simulating ---
        let engine = ExecutionEngine::new(
            FillModel::new(self.config.simulation.clone()),
            strategy.symbol_pool.iter().map(|s| s.to_uppercase()).collect(),
        );
        let trader = AutoTrader::new(self.config.decision.clone());
        let mut account = Ledger::new(initial_capital);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut latest_prices: HashMap<String, Decimal> = HashMap::new();
        let mut equity_curve = Vec::with_capacity(trading_dates.len());
        let mut trades = Vec::new();

        for (cursor, &date) in trading_dates.iter().enumerate() {
            phase = Phase::Simulating(cursor);
            tracing::trace!(?phase, %date, "simulating day");

            // Refresh the mark for every symbol trading today. Symbols
            // without a bar keep their last known price.
            for (symbol, data) in &symbol_data {
                if let Some(&price) = data.prices.get(&date) {
                    latest_prices.insert(symbol.clone(), price);
                }
            }

            // Mark to market before any trade of the day.
            let value = account.snapshot(&latest_prices).total_value;
            equity_curve.push(EquityPoint { date, value });

            // Evaluate the crossover rule, each symbol at most once per day.
            for (symbol, data) in &symbol_data {
                let Some(&price) = data.prices.get(&date) else {
                    continue;
                };
                let Some(&ma) = data.trailing_ma.get(&date) else {
                    continue;
                };
                let held = account.held_quantity(symbol);

                if price > ma * ENTRY_BAND && held.is_zero() {
                    let portfolio_value = account.snapshot(&latest_prices).total_value;
                    let quantity =
                        trader.buy_quantity(account.cash(), price, portfolio_value, strategy);
                    if quantity <= Decimal::ZERO {
                        continue;
                    }
                    match engine.execute(
                        &mut account,
                        TradeSide::Buy,
                        symbol,
                        quantity,
                        price,
                        &strategy.id,
                        timestamp(date),
                        &mut rng,
                    ) {
                        ExecutionOutcome::Executed { record, .. } => trades.push(record),
                        ExecutionOutcome::Rejected { reason } => {
                            tracing::debug!(%symbol, %date, %reason, "entry rejected");
                        }
                    }
                } else if price < ma * EXIT_BAND && held > Decimal::ZERO {
                    match engine.execute(
                        &mut account,
                        TradeSide::Sell,
                        symbol,
                        held,
                        price,
                        &strategy.id,
                        timestamp(date),
                        &mut rng,
                    ) {
                        ExecutionOutcome::Executed { record, .. } => trades.push(record),
                        ExecutionOutcome::Rejected { reason } => {
                            tracing::debug!(%symbol, %date, %reason, "exit rejected");
                        }
                    }
                }
            }
        }

        // --- Completed ---
        phase = Phase::Completed;
        tracing::debug!(
            ?phase,
            trading_days = equity_curve.len(),
            trades = trades.len(),
            "simulation finished"
        );

        let metrics = self.analytics.calculate(
            &equity_curve,
            &trades,
            initial_capital,
            self.config.backtest.risk_free_rate,
        )?;
        let final_value = equity_curve
            .last()
            .map(|point| point.value)
            .unwrap_or(initial_capital);

        Ok(BacktestReport {
            strategy_id: strategy.id.clone(),
            start,
            end,
            trading_days: equity_curve.len(),
            initial_capital,
            final_value,
            equity_curve,
            trades,
            metrics,
        })
    }
}

/// A symbol's per-date marks and trailing moving averages, precomputed for
/// the whole run.
struct SymbolData {
    /// adj_close by bar date, lookback window included.
    prices: BTreeMap<NaiveDate, Decimal>,
    /// SMA of the `window` bars strictly before each date. Absent until the
    /// window has filled.
    trailing_ma: HashMap<NaiveDate, Decimal>,
}

fn prepare(series: &SymbolSeries, window: usize) -> SymbolData {
    // Window validity is checked before any series is prepared.
    let mut sma = Sma::new(window).unwrap();
    let mut prices = BTreeMap::new();
    let mut trailing_ma = HashMap::new();
    let mut fed = 0usize;
    let mut trailing: Option<Decimal> = None;

    for bar in &series.bars {
        prices.insert(bar.date, bar.adj_close);
        if let Some(ma) = trailing {
            trailing_ma.insert(bar.date, ma);
        }
        // The `ta` crate uses `f64`. We must convert from our high-precision
        // `Decimal` type. This is a controlled and accepted precision
        // trade-off for using the library.
        let output = sma.next(bar.adj_close.to_f64().unwrap());
        fed += 1;
        if fed >= window {
            trailing = Some(Decimal::from_f64(output).unwrap());
        }
    }

    SymbolData {
        prices,
        trailing_ma,
    }
}

fn timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryPriceProvider;
    use chrono::Days;
    use core_types::PriceBar;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(n - 1)
    }

    fn bar(date: NaiveDate, close: Decimal) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: dec!(1000),
        }
    }

    fn one_symbol_strategy() -> StrategyConfig {
        StrategyConfig {
            id: "steady".to_string(),
            name: "Steady".to_string(),
            risk_level: 3,
            symbol_pool: vec!["AAPL".to_string()],
            target_investment_ratio: dec!(0.7),
            max_position_pct: dec!(0.15),
        }
    }

    fn simulator() -> BacktestSimulator {
        BacktestSimulator::new(Settings::default())
    }

    /// Price climbs half a point per day: the trailing 20-day SMA first
    /// exists on day 21, already more than 1% below the price.
    fn rising_provider(days: u64) -> InMemoryPriceProvider {
        let mut provider = InMemoryPriceProvider::new();
        let bars = (1..=days)
            .map(|n| bar(day(n), dec!(100) + Decimal::from(n - 1) * dec!(0.5)))
            .collect();
        provider.insert("AAPL", bars);
        provider
    }

    #[test]
    fn steady_rise_buys_exactly_once_on_day_21() {
        let report = simulator()
            .run(
                &rising_provider(30),
                &one_symbol_strategy(),
                day(1),
                day(30),
                dec!(100000),
                42,
            )
            .unwrap();

        assert_eq!(report.trades.len(), 1);
        let entry = &report.trades[0];
        assert_eq!(entry.side, TradeSide::Buy);
        assert_eq!(entry.symbol, "AAPL");
        assert_eq!(entry.timestamp.date_naive(), day(21));
        assert_eq!(report.trading_days, 30);
        assert!(report.final_value > dec!(100000));
    }

    #[test]
    fn crash_below_the_average_exits_the_whole_position() {
        let mut provider = InMemoryPriceProvider::new();
        // Climb for 30 days, then gap down hard for 10 more.
        let mut bars: Vec<PriceBar> = (1..=30)
            .map(|n| bar(day(n), dec!(100) + Decimal::from(n - 1) * dec!(0.5)))
            .collect();
        bars.extend((31..=40).map(|n| bar(day(n), dec!(80))));
        provider.insert("AAPL", bars);

        let report = simulator()
            .run(
                &provider,
                &one_symbol_strategy(),
                day(1),
                day(40),
                dec!(100000),
                42,
            )
            .unwrap();

        assert_eq!(report.trades.len(), 2);
        let (entry, exit) = (&report.trades[0], &report.trades[1]);
        assert_eq!(entry.side, TradeSide::Buy);
        assert_eq!(exit.side, TradeSide::Sell);
        // The exit liquidates everything the entry bought.
        assert_eq!(exit.quantity, entry.quantity);
        assert_eq!(exit.timestamp.date_naive(), day(31));
    }

    #[test]
    fn identical_inputs_reproduce_identical_reports() {
        let provider = rising_provider(30);
        let strategy = one_symbol_strategy();
        let run = || {
            simulator()
                .run(&provider, &strategy, day(1), day(30), dec!(100000), 7)
                .unwrap()
        };

        let (first, second) = (run(), run());
        assert_eq!(first.equity_curve, second.equity_curve);
        assert_eq!(first.metrics, second.metrics);
        assert_eq!(first.final_value, second.final_value);
        for (a, b) in first.trades.iter().zip(&second.trades) {
            assert_eq!(a.symbol, b.symbol);
            assert_eq!(a.quantity, b.quantity);
            assert_eq!(a.price, b.price);
            assert_eq!(a.fee, b.fee);
        }
    }

    #[test]
    fn different_seeds_still_trade_the_same_days() {
        let provider = rising_provider(30);
        let strategy = one_symbol_strategy();

        let first = simulator()
            .run(&provider, &strategy, day(1), day(30), dec!(100000), 1)
            .unwrap();
        let second = simulator()
            .run(&provider, &strategy, day(1), day(30), dec!(100000), 2)
            .unwrap();

        // The rule is deterministic; only the fill prices move with the seed.
        assert_eq!(first.trades.len(), second.trades.len());
        assert_eq!(
            first.trades[0].timestamp.date_naive(),
            second.trades[0].timestamp.date_naive()
        );
    }

    #[test]
    fn no_data_at_all_fails_with_no_market_data() {
        let provider = InMemoryPriceProvider::new();
        let err = simulator()
            .run(
                &provider,
                &one_symbol_strategy(),
                day(1),
                day(30),
                dec!(100000),
                42,
            )
            .unwrap_err();
        assert!(matches!(err, BacktestError::NoMarketData));
    }

    #[test]
    fn data_only_in_the_lookback_fails_with_no_trading_days() {
        let mut provider = InMemoryPriceProvider::new();
        // Bars exist, but all of them predate the simulated range.
        provider.insert(
            "AAPL",
            (1..=10).map(|n| bar(day(n), dec!(100))).collect(),
        );

        let err = simulator()
            .run(
                &provider,
                &one_symbol_strategy(),
                day(20),
                day(40),
                dec!(100000),
                42,
            )
            .unwrap_err();
        assert!(matches!(err, BacktestError::NoTradingDays));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let err = simulator()
            .run(
                &rising_provider(30),
                &one_symbol_strategy(),
                day(30),
                day(1),
                dec!(100000),
                42,
            )
            .unwrap_err();
        assert!(matches!(err, BacktestError::InvalidDateRange { .. }));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let err = simulator()
            .run(
                &rising_provider(30),
                &one_symbol_strategy(),
                day(1),
                day(30),
                dec!(0),
                42,
            )
            .unwrap_err();
        assert!(matches!(err, BacktestError::InvalidInitialCapital(_)));
    }

    #[test]
    fn flat_prices_never_trade() {
        let mut provider = InMemoryPriceProvider::new();
        provider.insert(
            "AAPL",
            (1..=40).map(|n| bar(day(n), dec!(100))).collect(),
        );

        let report = simulator()
            .run(
                &provider,
                &one_symbol_strategy(),
                day(1),
                day(40),
                dec!(100000),
                42,
            )
            .unwrap();

        // Price equals the average: inside the band, no entries.
        assert!(report.trades.is_empty());
        assert_eq!(report.final_value, dec!(100000));
        assert_eq!(report.metrics.total_return_pct, Decimal::ZERO);
    }

    #[test]
    fn equity_curve_covers_every_trading_date_once() {
        let report = simulator()
            .run(
                &rising_provider(30),
                &one_symbol_strategy(),
                day(1),
                day(30),
                dec!(100000),
                42,
            )
            .unwrap();

        assert_eq!(report.equity_curve.len(), 30);
        let dates: Vec<NaiveDate> = report.equity_curve.iter().map(|p| p.date).collect();
        let mut deduped = dates.clone();
        deduped.dedup();
        assert_eq!(dates, deduped, "each trading date appears exactly once");
        assert!(dates.windows(2).all(|w| w[0] < w[1]), "dates ascend");
    }
}
