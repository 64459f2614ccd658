pub mod enums;
pub mod error;
pub mod rounding;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::TradeSide;
pub use error::ValidationError;
pub use rounding::{quantize_currency, quantize_price};
pub use structs::{EquityPoint, Position, PriceBar, TradeRecord};
