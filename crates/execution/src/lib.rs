//! # Papertrade Execution Crate
//!
//! The trade execution engine: the single write path into a ledger.
//!
//! ## Architectural Principles
//!
//! - **Validate, then apply:** every failure is detected before the first
//!   ledger write. A rejected trade leaves the account byte-for-byte
//!   unchanged; there is no partial mutation to roll back.
//! - **Receipts, not state:** a successful execution returns an immutable
//!   `TradeRecord`. The engine keeps no trade log of its own — retention is
//!   the caller's decision.
//!
//! ## Public API
//!
//! - `ExecutionEngine`: validates, prices, and applies one trade at a time.
//! - `ExecutionOutcome`: `Executed` with the receipt, or `Rejected` with a
//!   typed reason.

pub mod engine;
pub mod error;

// Re-export the key components to provide a clean, public-facing API.
pub use engine::{ExecutionEngine, ExecutionOutcome};
pub use error::RejectReason;
