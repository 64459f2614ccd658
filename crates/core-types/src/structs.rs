use crate::enums::TradeSide;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An open holding in one symbol.
///
/// A position only exists while its quantity is strictly positive; the ledger
/// removes the entry from its map the moment a sell brings it to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    /// Quantity-weighted average price paid across all open buy fills.
    /// Updated on buys only; sells never change it.
    pub avg_cost: Decimal,
}

/// An immutable receipt for one executed trade. Append-only: once issued it
/// is never edited, the trade log is the full history of the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub side: TradeSide,
    pub symbol: String,
    pub quantity: Decimal,
    /// Execution price per share, after spread and slippage.
    pub price: Decimal,
    /// Notional value of the fill (`quantity * price`), rounded to currency precision.
    pub total: Decimal,
    pub fee: Decimal,
    pub strategy_id: String,
}

/// One day of historical market data for a symbol, as delivered by the
/// external price provider (ascending by date, deduplicated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adj_close: Decimal,
    pub volume: Decimal,
}

/// A single point on a backtest equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn trade_side_round_trips_as_lowercase() {
        assert_eq!(serde_json::to_string(&TradeSide::Buy).unwrap(), "\"buy\"");
        let side: TradeSide = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(side, TradeSide::Sell);
    }

    #[test]
    fn trade_side_opposite() {
        assert_eq!(TradeSide::Buy.opposite(), TradeSide::Sell);
        assert_eq!(TradeSide::Sell.opposite(), TradeSide::Buy);
    }

    #[test]
    fn position_serializes_with_decimal_fields() {
        let position = Position {
            symbol: "AAPL".to_string(),
            quantity: dec!(100),
            avg_cost: dec!(150.25),
        };
        let json = serde_json::to_string(&position).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, position);
    }
}
