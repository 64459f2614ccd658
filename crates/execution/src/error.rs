use core_types::ValidationError;
use ledger::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a trade was turned away. Rejection is an outcome, not a fault: the
/// ledger is untouched and the reason is surfaced to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("Trade validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Insufficient cash. Need {required}, have {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Cannot sell {requested} shares, only {available} held")]
    InsufficientShares { requested: Decimal, available: Decimal },
}

impl From<LedgerError> for RejectReason {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::InsufficientFunds {
                required,
                available,
            } => RejectReason::InsufficientFunds {
                required,
                available,
            },
            LedgerError::InsufficientShares {
                requested,
                available,
            } => RejectReason::InsufficientShares {
                requested,
                available,
            },
        }
    }
}
