//! Rule table error types.

use bilan_shared::types::Side;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while loading or validating classification rules.
///
/// These are the only failures of the core: once a rule set is accepted,
/// generating a balance sheet cannot fail.
#[derive(Debug, Error)]
pub enum RulesError {
    /// Rule file could not be parsed.
    #[error("Cannot parse rules: {0}")]
    Parse(String),

    /// A threshold is negative.
    #[error("Threshold {name} must not be negative (got {value})")]
    NegativeThreshold {
        /// Threshold name.
        name: &'static str,
        /// Rejected value.
        value: Decimal,
    },

    /// A routing key is not a single class digit.
    #[error("Invalid class key in routing table: {0:?}")]
    InvalidClassKey(String),

    /// A class is both routed to the balance sheet and used for the net result.
    #[error("Class {0} is routed to the balance sheet and also used for the net result")]
    OverlappingClass(u8),

    /// A code or prefix is empty or contains non-digit characters.
    #[error("Invalid account prefix {0:?}")]
    InvalidPrefix(String),

    /// A sub-class is not exactly two digits.
    #[error("Invalid sub-class {0:?}: expected two digits")]
    InvalidSubClass(String),

    /// A depreciation table entry does not belong to a depreciation class.
    #[error("Prefix {0:?} is not inside any depreciation class")]
    NotADepreciationPrefix(String),

    /// The padding width for account codes is out of range.
    #[error("Account code width must be between 1 and 16 (got {0})")]
    InvalidCodeWidth(usize),

    /// Two sections claim the same sub-class on the same side.
    #[error("Sub-class {sub_class} on the {side} side belongs to more than one section")]
    DuplicateSection {
        /// Balance sheet side.
        side: Side,
        /// Duplicated sub-class.
        sub_class: String,
    },
}

impl From<config::ConfigError> for RulesError {
    fn from(err: config::ConfigError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for RulesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
