//! Ledger input and account aggregation.
//!
//! This module implements the first pipeline stage:
//! - Normalized ledger entries (lenient amounts)
//! - Per-account balance records
//! - Sequential and parallel aggregation

pub mod aggregator;
pub mod balance;
pub mod entry;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::{AccountAggregator, AccountBalances};
pub use balance::AccountBalance;
pub use entry::{LedgerEntry, parse_amount};
