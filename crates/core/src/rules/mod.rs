//! Classification rules.
//!
//! Static, versionable rule data consumed by the balance sheet pipeline:
//! - Numeric thresholds
//! - Class routing and its exceptions
//! - Depreciation prefix tables
//! - Report section membership
//! - Display labels

pub mod error;
pub mod labels;
pub mod ruleset;

pub use error::RulesError;
pub use labels::LabelResolver;
pub use ruleset::{
    ClassRouting, DepreciationRules, LabelTables, ResultRules, RuleSet, SectionKind, SectionRule,
    Thresholds, TradeCodes, TradeLedger,
};
