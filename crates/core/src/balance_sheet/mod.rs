//! Balance sheet generation.
//!
//! This module turns aggregated account balances into a French balance sheet:
//! - Net result
//! - Depreciation extraction
//! - Classification to sides and sub-class groups
//! - Depreciation netting
//! - Section structure and totals
//! - Equilibrium validation

pub mod amortization;
pub mod classifier;
pub mod depreciation;
pub mod result;
pub mod service;
pub mod structurer;
pub mod types;
pub mod validator;

#[cfg(test)]
mod tests;

pub use amortization::{AmortizationApplier, AmortizedGroups};
pub use classifier::BalanceSheetClassifier;
pub use depreciation::DepreciationExtractor;
pub use result::ResultCalculator;
pub use service::{BalanceSheetService, DEFAULT_PARALLEL_THRESHOLD};
pub use structurer::StatementStructurer;
pub use types::*;
pub use validator::BalanceValidator;
