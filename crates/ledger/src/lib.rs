//! # Papertrade Ledger Crate
//!
//! The in-memory state of one paper-trading account: cash, open positions,
//! and the realized-gain accumulator. The ledger is a pure state machine —
//! it knows how to apply a priced fill and how to value itself, and nothing
//! else. Pricing, validation, and record-keeping live in the execution
//! engine, which is the only caller expected to mutate a ledger.
//!
//! Every mutation validates before it writes, so a failed operation leaves
//! the account byte-for-byte unchanged.

pub mod account;
pub mod error;

// Re-export the key components to provide a clean, public-facing API.
pub use account::{Ledger, LedgerSnapshot};
pub use error::LedgerError;
