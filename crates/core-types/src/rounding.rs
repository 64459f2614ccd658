use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to 2 decimal places, half away from zero, for currency amounts.
pub fn quantize_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to 4 decimal places, half away from zero, for prices and ratios.
pub fn quantize_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_rounds_half_up() {
        assert_eq!(quantize_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(quantize_currency(dec!(-1.005)), dec!(-1.01));
        assert_eq!(quantize_currency(dec!(2.444)), dec!(2.44));
    }

    #[test]
    fn price_keeps_four_places() {
        assert_eq!(quantize_price(dec!(175.50005)), dec!(175.5001));
        assert_eq!(quantize_price(dec!(0.66666)), dec!(0.6667));
    }
}
