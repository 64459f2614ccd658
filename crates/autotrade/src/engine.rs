use chrono::{DateTime, Utc};
use configuration::{Decision, StrategyConfig};
use core_types::{TradeRecord, TradeSide};
use execution::{ExecutionEngine, ExecutionOutcome, RejectReason};
use ledger::Ledger;
use pricing::FillModel;
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Allocation band around the target ratio: below 70% of target the engine
/// always buys, above 110% it always sells.
const UNDERINVESTED_FRAC: Decimal = dec!(0.7);
const OVERINVESTED_FRAC: Decimal = dec!(1.1);

/// The result of one auto-trade pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutoTradeOutcome {
    Executed {
        record: TradeRecord,
        resulting_cash: Decimal,
    },
    Rejected {
        reason: RejectReason,
    },
    /// Nothing to do: no candidate symbol, no price, or a zero sizing.
    NoOp,
}

impl From<ExecutionOutcome> for AutoTradeOutcome {
    fn from(outcome: ExecutionOutcome) -> Self {
        match outcome {
            ExecutionOutcome::Executed {
                record,
                resulting_cash,
            } => AutoTradeOutcome::Executed {
                record,
                resulting_cash,
            },
            ExecutionOutcome::Rejected { reason } => AutoTradeOutcome::Rejected { reason },
        }
    }
}

/// A dry-run answer: what the engine would trade right now, without
/// touching the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recommendation {
    Hold,
    Trade {
        side: TradeSide,
        symbol: String,
        quantity: Decimal,
        estimated_price: Decimal,
        market_price: Decimal,
        investment_ratio: Decimal,
        target_ratio: Decimal,
    },
}

/// Decides trades against a target allocation and drives the execution
/// engine. Stateless apart from its configured parameters.
#[derive(Debug, Clone)]
pub struct AutoTrader {
    params: Decision,
}

impl AutoTrader {
    pub fn new(params: Decision) -> Self {
        Self { params }
    }

    /// Runs one decision pass: pick a side from the allocation gap, sample
    /// a symbol, size the order, and execute it.
    pub fn auto_trade(
        &self,
        account: &mut Ledger,
        strategy: &StrategyConfig,
        current_prices: &HashMap<String, Decimal>,
        engine: &ExecutionEngine,
        timestamp: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> AutoTradeOutcome {
        let snapshot = account.snapshot(current_prices);
        let side = self.determine_side(
            snapshot.investment_ratio,
            strategy.target_investment_ratio,
            rng,
        );

        let Some(symbol) = self.select_symbol(side, strategy, account, &[], rng) else {
            tracing::debug!(?side, "no candidate symbol, skipping trade");
            return AutoTradeOutcome::NoOp;
        };
        let Some(&market_price) = current_prices.get(&symbol) else {
            tracing::debug!(%symbol, "no price available, skipping trade");
            return AutoTradeOutcome::NoOp;
        };

        let quantity = match side {
            TradeSide::Buy => self.buy_quantity(
                account.cash(),
                market_price,
                snapshot.total_value,
                strategy,
            ),
            TradeSide::Sell => self.sell_quantity(account.held_quantity(&symbol), rng),
        };
        if quantity <= Decimal::ZERO {
            tracing::debug!(?side, %symbol, "calculated quantity is zero, skipping trade");
            return AutoTradeOutcome::NoOp;
        }

        engine
            .execute(
                account,
                side,
                &symbol,
                quantity,
                market_price,
                &strategy.id,
                timestamp,
                rng,
            )
            .into()
    }

    /// Reports what `auto_trade` would do, without executing. The fill
    /// model provides the price estimate the caller displays.
    pub fn recommendation(
        &self,
        account: &Ledger,
        strategy: &StrategyConfig,
        current_prices: &HashMap<String, Decimal>,
        fill_model: &FillModel,
        rng: &mut impl Rng,
    ) -> Recommendation {
        let snapshot = account.snapshot(current_prices);
        let side = self.determine_side(
            snapshot.investment_ratio,
            strategy.target_investment_ratio,
            rng,
        );

        let Some(symbol) = self.select_symbol(side, strategy, account, &[], rng) else {
            return Recommendation::Hold;
        };
        let Some(&market_price) = current_prices.get(&symbol) else {
            return Recommendation::Hold;
        };

        let quantity = match side {
            TradeSide::Buy => self.buy_quantity(
                account.cash(),
                market_price,
                snapshot.total_value,
                strategy,
            ),
            TradeSide::Sell => self.sell_quantity(account.held_quantity(&symbol), rng),
        };

        Recommendation::Trade {
            side,
            symbol,
            quantity,
            estimated_price: fill_model.execution_price(market_price, side, rng),
            market_price,
            investment_ratio: snapshot.investment_ratio,
            target_ratio: strategy.target_investment_ratio,
        }
    }

    /// Buy when significantly under target, sell when significantly over,
    /// otherwise flip a biased coin.
    fn determine_side(
        &self,
        investment_ratio: Decimal,
        target_ratio: Decimal,
        rng: &mut impl Rng,
    ) -> TradeSide {
        if investment_ratio < target_ratio * UNDERINVESTED_FRAC {
            TradeSide::Buy
        } else if investment_ratio > target_ratio * OVERINVESTED_FRAC {
            TradeSide::Sell
        } else if rng.gen_bool(self.params.buy_bias) {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        }
    }

    /// Picks the symbol to trade.
    ///
    /// Buys sample from the strategy's pool; sells sample from the held
    /// symbols inside the pool, falling back to any held symbol when the
    /// pool and the holdings don't overlap (a strategy switch can leave
    /// positions behind). Candidates are sorted before sampling so a fixed
    /// seed reproduces the choice.
    fn select_symbol(
        &self,
        side: TradeSide,
        strategy: &StrategyConfig,
        account: &Ledger,
        exclude: &[String],
        rng: &mut impl Rng,
    ) -> Option<String> {
        let excluded = |symbol: &String| exclude.contains(symbol);

        let mut candidates: Vec<String> = match side {
            TradeSide::Buy => strategy
                .symbol_pool
                .iter()
                .filter(|s| !excluded(s))
                .cloned()
                .collect(),
            TradeSide::Sell => {
                let held: Vec<String> = account
                    .positions()
                    .values()
                    .filter(|p| p.quantity > Decimal::ZERO)
                    .map(|p| p.symbol.clone())
                    .collect();
                let mut sellable: Vec<String> = held
                    .iter()
                    .filter(|s| strategy.symbol_pool.contains(s) && !excluded(s))
                    .cloned()
                    .collect();
                if sellable.is_empty() {
                    sellable = held.into_iter().filter(|s| !excluded(s)).collect();
                }
                sellable
            }
        };

        candidates.sort();
        candidates.choose(rng).cloned()
    }

    /// Target 2-8% of the portfolio per buy, scaled by risk level, capped
    /// by the strategy's position limit and the cash-usage limit.
    ///
    /// Public because the backtest simulator sizes its entries with the
    /// same rule, using the day's price as the market price.
    pub fn buy_quantity(
        &self,
        available_cash: Decimal,
        price: Decimal,
        portfolio_value: Decimal,
        strategy: &StrategyConfig,
    ) -> Decimal {
        if price <= Decimal::ZERO || available_cash <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let base_frac =
            dec!(0.02) + dec!(0.06) * Decimal::from(strategy.risk_level) / dec!(5);
        let target_value = portfolio_value * base_frac;
        let max_value = portfolio_value * strategy.max_position_pct;
        let cash_limit = available_cash * self.params.max_cash_usage_frac;

        let trade_value = target_value.min(max_value).min(cash_limit);
        (trade_value / price).floor().max(Decimal::ZERO)
    }

    /// Sells a uniformly drawn 20-80% slice of the position, at least one
    /// share while anything is held.
    fn sell_quantity(&self, held_quantity: Decimal, rng: &mut impl Rng) -> Decimal {
        if held_quantity <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let fraction = rng.gen_range(self.params.min_sell_frac..self.params.max_sell_frac);
        // rand samples f64s; the share count is floored to a whole number
        // immediately, so the precision loss cannot reach the ledger.
        let shares = (held_quantity * Decimal::from_f64(fraction).unwrap()).floor();
        shares.max(Decimal::ONE)
    }
}
