use crate::error::LedgerError;
use core_types::{Position, quantize_currency, quantize_price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Manages the state of a trading account: cash, positions, and the
/// realized-gain accumulator. Its sole responsibility is to accurately
/// reflect account state as priced fills are applied to it.
///
/// Fields are private on purpose. Every write path runs its check before the
/// first mutation, which is what keeps the all-or-nothing invariant honest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    cash: Decimal,
    positions: HashMap<String, Position>,
    realized_gains: Decimal,
    initial_value: Decimal,
    initialized: bool,
}

/// A pure read of the account's value at a set of market prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub cash: Decimal,
    pub invested_value: Decimal,
    pub total_value: Decimal,
    pub unrealized_gain: Decimal,
    /// invested / total, 0 when the account is worthless.
    pub investment_ratio: Decimal,
}

impl Ledger {
    /// Creates a new `Ledger` holding its full starting capital as cash.
    pub fn new(initial_value: Decimal) -> Self {
        Self {
            cash: initial_value,
            positions: HashMap::new(),
            realized_gains: Decimal::ZERO,
            initial_value,
            initialized: false,
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn realized_gains(&self) -> Decimal {
        self.realized_gains
    }

    pub fn initial_value(&self) -> Decimal {
        self.initial_value
    }

    /// Whether any trade has ever been applied since creation or reset.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Held quantity for a symbol, zero when there is no open position.
    pub fn held_quantity(&self, symbol: &str) -> Decimal {
        self.positions
            .get(symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    /// Applies a buy fill: debits `quantity * price + fee` from cash and
    /// folds the fill into the position's weighted average cost.
    ///
    /// The caller guarantees `quantity > 0`, `price > 0` and `fee >= 0`;
    /// the ledger guarantees cash can never go negative.
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Result<(), LedgerError> {
        let cost = quantize_currency(quantity * price) + fee;
        if cost > self.cash {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }

        self.cash -= cost;

        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position {
                symbol: symbol.to_string(),
                quantity: Decimal::ZERO,
                avg_cost: Decimal::ZERO,
            });

        // new_avg = (old_avg * old_qty + price * qty) / (old_qty + qty).
        // Fees stay out of the cost basis.
        let existing_value = position.avg_cost * position.quantity;
        let fill_value = price * quantity;
        let total_quantity = position.quantity + quantity;
        position.avg_cost = quantize_price((existing_value + fill_value) / total_quantity);
        position.quantity = total_quantity;

        self.initialized = true;
        tracing::debug!(%symbol, %quantity, %price, %fee, cash = %self.cash, "applied buy");
        Ok(())
    }

    /// Applies a sell fill: credits `quantity * price - fee` to cash,
    /// recognizes `(price - avg_cost) * quantity` as realized gain, and
    /// removes the position entirely when its quantity reaches zero.
    ///
    /// The average cost is untouched — selling never rewrites the basis of
    /// the shares that remain. Returns the realized gain of this sale.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let position = match self.positions.get_mut(symbol) {
            Some(position) => position,
            None => {
                return Err(LedgerError::InsufficientShares {
                    requested: quantity,
                    available: Decimal::ZERO,
                });
            }
        };
        if quantity > position.quantity {
            return Err(LedgerError::InsufficientShares {
                requested: quantity,
                available: position.quantity,
            });
        }

        let gain = quantize_currency((price - position.avg_cost) * quantity);
        let proceeds = quantize_currency(quantity * price) - fee;

        self.cash += proceeds;
        self.realized_gains += gain;
        position.quantity -= quantity;
        if position.quantity.is_zero() {
            self.positions.remove(symbol);
        }

        self.initialized = true;
        tracing::debug!(%symbol, %quantity, %price, %gain, cash = %self.cash, "applied sell");
        Ok(gain)
    }

    /// Restores the creation state: full starting capital as cash, no
    /// positions, zero realized gains. Idempotent. Whether the trade log is
    /// kept is the caller's decision, not the ledger's.
    pub fn reset(&mut self) {
        self.cash = self.initial_value;
        self.positions.clear();
        self.realized_gains = Decimal::ZERO;
        self.initialized = false;
    }

    /// Values the account at the given market prices. Symbols without a
    /// quote contribute nothing to the invested value.
    pub fn snapshot(&self, current_prices: &HashMap<String, Decimal>) -> LedgerSnapshot {
        let mut invested = Decimal::ZERO;
        let mut unrealized = Decimal::ZERO;

        for (symbol, position) in &self.positions {
            if let Some(price) = current_prices.get(symbol) {
                invested += position.quantity * price;
                unrealized += (price - position.avg_cost) * position.quantity;
            }
        }

        let invested = quantize_currency(invested);
        let total = self.cash + invested;
        let ratio = if total.is_zero() {
            Decimal::ZERO
        } else {
            quantize_price(invested / total)
        };

        LedgerSnapshot {
            cash: self.cash,
            invested_value: invested,
            total_value: total,
            unrealized_gain: quantize_currency(unrealized),
            investment_ratio: ratio,
        }
    }
}
