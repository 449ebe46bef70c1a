//! Per-account balance records.

use bilan_shared::types::AccountCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Net position of one account code over the whole entry list.
///
/// Invariant: `net_balance == total_debit - total_credit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account code.
    pub code: AccountCode,
    /// Display label.
    pub label: String,
    /// Sum of all debits.
    pub total_debit: Decimal,
    /// Sum of all credits.
    pub total_credit: Decimal,
    /// Debit minus credit.
    pub net_balance: Decimal,
}

impl AccountBalance {
    /// Creates a balance from its totals.
    #[must_use]
    pub fn new(
        code: AccountCode,
        label: impl Into<String>,
        total_debit: Decimal,
        total_credit: Decimal,
    ) -> Self {
        Self {
            code,
            label: label.into(),
            total_debit,
            total_credit,
            net_balance: total_debit.saturating_sub(total_credit),
        }
    }

    /// Returns the class digit of the account code.
    #[must_use]
    pub fn class(&self) -> Option<u8> {
        self.code.class()
    }

    /// Returns the two-digit sub-class of the account code.
    #[must_use]
    pub fn sub_class(&self) -> Option<&str> {
        self.code.sub_class()
    }

    /// Returns true if the absolute net balance is below `epsilon`.
    #[must_use]
    pub fn is_negligible(&self, epsilon: Decimal) -> bool {
        self.net_balance.abs() < epsilon
    }
}

/// Debit and credit totals accumulated for one account.
///
/// Sums saturate at the bounds of `Decimal`; the validator flags saturated
/// totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PartialBalance {
    pub label: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl PartialBalance {
    pub fn add(&mut self, label: Option<&str>, debit: Decimal, credit: Decimal) {
        if self.label.is_none() {
            self.label = label
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);
        }
        self.debit = self.debit.saturating_add(debit);
        self.credit = self.credit.saturating_add(credit);
    }

    /// Folds `other` into `self`; the label already held wins.
    pub fn merge(&mut self, other: Self) {
        if self.label.is_none() {
            self.label = other.label;
        }
        self.debit = self.debit.saturating_add(other.debit);
        self.credit = self.credit.saturating_add(other.credit);
    }
}
