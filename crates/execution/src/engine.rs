use crate::error::RejectReason;
use chrono::{DateTime, Utc};
use core_types::{TradeRecord, TradeSide, ValidationError, quantize_currency};
use ledger::Ledger;
use pricing::FillModel;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// The result of asking the engine to execute one trade.
///
/// A rejection is a first-class outcome: the ledger is guaranteed untouched
/// and the reason is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    Executed {
        record: TradeRecord,
        resulting_cash: Decimal,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl ExecutionOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, ExecutionOutcome::Executed { .. })
    }

    pub fn record(&self) -> Option<&TradeRecord> {
        match self {
            ExecutionOutcome::Executed { record, .. } => Some(record),
            ExecutionOutcome::Rejected { .. } => None,
        }
    }
}

/// Validates and atomically applies one trade to a ledger.
///
/// The engine is the only component expected to mutate a ledger. Its
/// validate-then-apply sequence has no interleaving point; callers serialize
/// trades against the same ledger.
pub struct ExecutionEngine {
    fill_model: FillModel,
    /// Symbols the engine will accept orders for.
    symbol_universe: HashSet<String>,
}

impl ExecutionEngine {
    pub fn new(fill_model: FillModel, symbol_universe: HashSet<String>) -> Self {
        Self {
            fill_model,
            symbol_universe,
        }
    }

    /// Executes a trade at the market: the fill model prices it with spread
    /// and slippage drawn from `rng`, then the fill is applied atomically.
    pub fn execute(
        &self,
        account: &mut Ledger,
        side: TradeSide,
        symbol: &str,
        quantity: Decimal,
        market_price: Decimal,
        strategy_id: &str,
        timestamp: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> ExecutionOutcome {
        if let Err(error) = self.validate(symbol, quantity, market_price) {
            return ExecutionOutcome::Rejected {
                reason: RejectReason::Validation(error),
            };
        }

        let price = self.fill_model.execution_price(market_price, side, rng);
        self.apply(account, side, symbol, quantity, price, strategy_id, timestamp)
    }

    /// Executes a trade at an explicitly supplied price, bypassing the
    /// spread model. Manual orders that name their own price come through
    /// here; the fee is still charged.
    pub fn execute_priced(
        &self,
        account: &mut Ledger,
        side: TradeSide,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        strategy_id: &str,
        timestamp: DateTime<Utc>,
    ) -> ExecutionOutcome {
        if let Err(error) = self.validate(symbol, quantity, price) {
            return ExecutionOutcome::Rejected {
                reason: RejectReason::Validation(error),
            };
        }

        self.apply(account, side, symbol, quantity, price, strategy_id, timestamp)
    }

    fn validate(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<(), ValidationError> {
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        if price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(price));
        }
        if !self.symbol_universe.contains(&symbol.to_uppercase()) {
            return Err(ValidationError::UnknownSymbol(symbol.to_string()));
        }
        Ok(())
    }

    /// Applies a priced fill to the ledger and issues the trade record.
    ///
    /// The ledger re-checks funds and share counts against the computed
    /// price before its first write, so any failure here surfaces as a
    /// rejection with the account unchanged.
    fn apply(
        &self,
        account: &mut Ledger,
        side: TradeSide,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        strategy_id: &str,
        timestamp: DateTime<Utc>,
    ) -> ExecutionOutcome {
        let symbol = symbol.to_uppercase();
        let total = quantize_currency(quantity * price);
        let fee = self.fill_model.fee(total);

        let applied = match side {
            TradeSide::Buy => account.apply_buy(&symbol, quantity, price, fee),
            TradeSide::Sell => account
                .apply_sell(&symbol, quantity, price, fee)
                .map(|_gain| ()),
        };

        match applied {
            Ok(()) => {
                tracing::info!(%side, %quantity, %symbol, %price, "executed trade");
                ExecutionOutcome::Executed {
                    record: TradeRecord {
                        trade_id: Uuid::new_v4(),
                        timestamp,
                        side,
                        symbol,
                        quantity,
                        price,
                        total,
                        fee,
                        strategy_id: strategy_id.to_string(),
                    },
                    resulting_cash: account.cash(),
                }
            }
            Err(error) => {
                tracing::warn!(%side, %quantity, %symbol, %error, "trade rejected");
                ExecutionOutcome::Rejected {
                    reason: error.into(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::Simulation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal_macros::dec;

    fn engine() -> ExecutionEngine {
        let universe = HashSet::from(["AAPL".to_string(), "MSFT".to_string()]);
        ExecutionEngine::new(FillModel::new(Simulation::default()), universe)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn buy_produces_record_and_debits_cash() {
        let engine = engine();
        let mut account = Ledger::new(dec!(100000));

        let outcome = engine.execute(
            &mut account,
            TradeSide::Buy,
            "AAPL",
            dec!(10),
            dec!(150),
            "balanced",
            Utc::now(),
            &mut rng(),
        );

        let ExecutionOutcome::Executed {
            record,
            resulting_cash,
        } = outcome
        else {
            panic!("expected execution");
        };
        assert_eq!(record.side, TradeSide::Buy);
        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.quantity, dec!(10));
        // The fill lands on the ask side of the market price.
        assert!(record.price >= dec!(150));
        assert_eq!(record.total, quantize_currency(record.quantity * record.price));
        assert_eq!(resulting_cash, account.cash());
        assert_eq!(account.held_quantity("AAPL"), dec!(10));
    }

    #[test]
    fn insufficient_funds_rejects_and_leaves_cash_untouched() {
        let engine = engine();
        let mut account = Ledger::new(dec!(1000));
        let before = account.clone();

        // 20 shares at 60 costs 1200 before fees.
        let outcome = engine.execute_priced(
            &mut account,
            TradeSide::Buy,
            "AAPL",
            dec!(20),
            dec!(60),
            "balanced",
            Utc::now(),
        );

        assert!(matches!(
            outcome,
            ExecutionOutcome::Rejected {
                reason: RejectReason::InsufficientFunds { .. }
            }
        ));
        assert_eq!(account, before);
        assert_eq!(account.cash(), dec!(1000));
    }

    #[test]
    fn validation_failures_never_touch_the_ledger() {
        let engine = engine();
        let mut account = Ledger::new(dec!(1000));
        let before = account.clone();

        let zero_qty = engine.execute(
            &mut account,
            TradeSide::Buy,
            "AAPL",
            dec!(0),
            dec!(100),
            "balanced",
            Utc::now(),
            &mut rng(),
        );
        assert!(matches!(
            zero_qty,
            ExecutionOutcome::Rejected {
                reason: RejectReason::Validation(ValidationError::NonPositiveQuantity(_))
            }
        ));

        let bad_price = engine.execute(
            &mut account,
            TradeSide::Buy,
            "AAPL",
            dec!(1),
            dec!(-5),
            "balanced",
            Utc::now(),
            &mut rng(),
        );
        assert!(matches!(
            bad_price,
            ExecutionOutcome::Rejected {
                reason: RejectReason::Validation(ValidationError::NonPositivePrice(_))
            }
        ));

        let bad_symbol = engine.execute(
            &mut account,
            TradeSide::Buy,
            "DOGE",
            dec!(1),
            dec!(100),
            "balanced",
            Utc::now(),
            &mut rng(),
        );
        assert!(matches!(
            bad_symbol,
            ExecutionOutcome::Rejected {
                reason: RejectReason::Validation(ValidationError::UnknownSymbol(_))
            }
        ));

        assert_eq!(account, before);
    }

    #[test]
    fn sell_without_position_is_insufficient_shares() {
        let engine = engine();
        let mut account = Ledger::new(dec!(1000));

        let outcome = engine.execute_priced(
            &mut account,
            TradeSide::Sell,
            "MSFT",
            dec!(5),
            dec!(300),
            "balanced",
            Utc::now(),
        );

        assert!(matches!(
            outcome,
            ExecutionOutcome::Rejected {
                reason: RejectReason::InsufficientShares { .. }
            }
        ));
    }

    #[test]
    fn explicit_price_is_used_verbatim() {
        let engine = engine();
        let mut account = Ledger::new(dec!(100000));

        let outcome = engine.execute_priced(
            &mut account,
            TradeSide::Buy,
            "aapl",
            dec!(10),
            dec!(175.50),
            "balanced",
            Utc::now(),
        );

        let record = outcome.record().expect("expected execution").clone();
        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.price, dec!(175.50));
        assert_eq!(record.total, dec!(1755.00));
        // 0.1% of 1755.00
        assert_eq!(record.fee, dec!(1.76));
    }

    #[test]
    fn round_trip_realizes_gain() {
        let engine = engine();
        let mut account = Ledger::new(dec!(100000));

        engine.execute_priced(
            &mut account,
            TradeSide::Buy,
            "AAPL",
            dec!(100),
            dec!(150),
            "balanced",
            Utc::now(),
        );
        let sell = engine.execute_priced(
            &mut account,
            TradeSide::Sell,
            "AAPL",
            dec!(40),
            dec!(160),
            "balanced",
            Utc::now(),
        );

        assert!(sell.is_executed());
        assert_eq!(account.realized_gains(), dec!(400));
        assert_eq!(account.held_quantity("AAPL"), dec!(60));
        assert_eq!(account.position("AAPL").unwrap().avg_cost, dec!(150));
    }
}
