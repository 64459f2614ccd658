use configuration::Simulation;
use core_types::{TradeSide, quantize_currency, quantize_price};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// The execution-price and fee model.
///
/// It holds the simulation parameters and prices one fill at a time. It
/// never mutates account state; the caller applies the price and fee it
/// computes.
#[derive(Debug, Clone)]
pub struct FillModel {
    params: Simulation,
}

impl FillModel {
    pub fn new(params: Simulation) -> Self {
        Self { params }
    }

    /// Calculates the execution price for one fill, modeling spread and
    /// slippage.
    ///
    /// A buyer pays the ask side: `market * (1 + spread/2 + slippage)`.
    /// A seller receives the bid side: `market * (1 - spread/2 + slippage)`.
    /// The spread is drawn uniformly from the configured range and the
    /// slippage term is symmetric around zero.
    pub fn execution_price(
        &self,
        market_price: Decimal,
        side: TradeSide,
        rng: &mut impl Rng,
    ) -> Decimal {
        let spread = draw(rng, self.params.spread_min_frac, self.params.spread_max_frac);
        let slippage = draw(rng, -self.params.slippage_frac, self.params.slippage_frac);
        let half_spread = spread / dec!(2);

        let price = match side {
            // For a buy, spread and slippage make the price HIGHER (worse).
            TradeSide::Buy => market_price * (Decimal::ONE + half_spread + slippage),
            // For a sell, the spread makes the price LOWER (worse).
            TradeSide::Sell => market_price * (Decimal::ONE - half_spread + slippage),
        };

        tracing::debug!(%market_price, ?side, %spread, %slippage, %price, "priced fill");
        quantize_price(price)
    }

    /// Calculates the trading fee on a fill's notional value, rounded to
    /// currency precision.
    pub fn fee(&self, notional: Decimal) -> Decimal {
        quantize_currency(notional * self.params.fee_rate)
    }
}

/// Draws a uniform value from `[low, high)` as a `Decimal`.
///
/// `rand` samples f64s. This is a controlled and accepted precision
/// trade-off for using the library; the result feeds a price that is
/// rounded to four decimal places anyway.
fn draw(rng: &mut impl Rng, low: Decimal, high: Decimal) -> Decimal {
    if high <= low {
        return low;
    }
    let sampled = rng.gen_range(low.to_f64().unwrap()..high.to_f64().unwrap());
    Decimal::from_f64(sampled).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::Simulation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn model() -> FillModel {
        FillModel::new(Simulation::default())
    }

    #[test]
    fn buy_fills_at_or_above_market() {
        let model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let price = model.execution_price(dec!(100), TradeSide::Buy, &mut rng);
            // Worst case: half-spread 0.15% plus slippage 0.05%.
            assert!(price >= dec!(100.00), "price {price} below market");
            assert!(price <= dec!(100.20), "price {price} above spread band");
        }
    }

    #[test]
    fn sell_fills_at_or_below_market() {
        let model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            let price = model.execution_price(dec!(100), TradeSide::Sell, &mut rng);
            assert!(price <= dec!(100.00), "price {price} above market");
            assert!(price >= dec!(99.80), "price {price} below spread band");
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_fills() {
        let model = model();
        let mut first = ChaCha8Rng::seed_from_u64(42);
        let mut second = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            assert_eq!(
                model.execution_price(dec!(175.50), TradeSide::Buy, &mut first),
                model.execution_price(dec!(175.50), TradeSide::Buy, &mut second),
            );
        }
    }

    #[test]
    fn fee_is_flat_rate_of_notional() {
        let model = model();
        assert_eq!(model.fee(dec!(1200)), dec!(1.20));
        assert_eq!(model.fee(dec!(10000)), dec!(10.00));
        // Rounded half-up to currency precision.
        assert_eq!(model.fee(dec!(1234.56)), dec!(1.23));
    }

    #[test]
    fn degenerate_spread_range_collapses_to_lower_bound() {
        let params = Simulation {
            spread_min_frac: dec!(0.002),
            spread_max_frac: dec!(0.002),
            slippage_frac: dec!(0),
            ..Simulation::default()
        };
        let model = FillModel::new(params);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // spread fixed at 0.2% -> buy exactly market * 1.001.
        assert_eq!(
            model.execution_price(dec!(100), TradeSide::Buy, &mut rng),
            dec!(100.1)
        );
    }
}
