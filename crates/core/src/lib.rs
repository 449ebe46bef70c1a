//! Core business logic for Bilan.
//!
//! This crate contains the pure balance sheet pipeline with ZERO I/O.
//! All rule tables, classification and totals live here.
//!
//! # Modules
//!
//! - `ledger` - Ledger entries and per-account aggregation
//! - `rules` - Classification rule tables and labels
//! - `balance_sheet` - Classification, depreciation netting, structure and validation

pub mod balance_sheet;
pub mod ledger;
pub mod rules;

pub use balance_sheet::{BalanceSheet, BalanceSheetService, ValidationReport};
pub use ledger::LedgerEntry;
pub use rules::{RuleSet, RulesError};
