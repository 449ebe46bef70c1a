//! Equilibrium and completeness checks.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::warn;

use super::types::{BalanceSheet, DepreciationBuckets, ValidationReport};
use crate::ledger::AccountBalances;
use crate::rules::RuleSet;

/// Classes whose accounts must all appear on the balance sheet.
const BALANCE_SHEET_CLASSES: std::ops::RangeInclusive<u8> = 1..=5;

/// Checks a structured balance sheet.
pub struct BalanceValidator;

impl BalanceValidator {
    /// Validates the sheet against the balances it was built from.
    ///
    /// Findings are returned as data; nothing here aborts the pipeline.
    #[must_use]
    pub fn validate(
        sheet: &BalanceSheet,
        balances: &AccountBalances,
        buckets: &DepreciationBuckets,
        orphan_depreciation: &BTreeMap<String, Decimal>,
        rules: &RuleSet,
    ) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let totals = &sheet.totals;

        let saturated = [totals.total_assets, totals.total_liabilities]
            .iter()
            .any(|total| total.abs() == Decimal::MAX);
        if saturated {
            warn!(
                total_assets = %totals.total_assets,
                total_liabilities = %totals.total_liabilities,
                "Totals exceed the representable range"
            );
            errors.push(format!(
                "Amounts exceed the representable range: total assets {} and total liabilities {} are saturated",
                totals.total_assets, totals.total_liabilities
            ));
        }

        let gap = totals.gap.abs();
        if gap > rules.thresholds.tolerance {
            warn!(
                total_assets = %totals.total_assets,
                total_liabilities = %totals.total_liabilities,
                %gap,
                "Balance sheet is not balanced"
            );
            errors.push(format!(
                "Balance sheet is not balanced: total assets {} != total liabilities {} (gap {gap})",
                totals.total_assets, totals.total_liabilities
            ));
        }

        if totals.total_liabilities < Decimal::ZERO {
            warn!(total_liabilities = %totals.total_liabilities, "Negative total liabilities");
            warnings.push(format!(
                "Total liabilities are negative ({}): critical equity situation",
                totals.total_liabilities
            ));
        }

        let unclassified_accounts: Vec<_> = balances
            .values()
            .filter(|balance| {
                balance
                    .class()
                    .is_some_and(|class| BALANCE_SHEET_CLASSES.contains(&class))
            })
            .filter(|balance| !balance.is_negligible(rules.thresholds.epsilon))
            .filter(|balance| !buckets.consumed.contains(&balance.code))
            .filter(|balance| !sheet.contains_account(&balance.code))
            .cloned()
            .collect();
        if !unclassified_accounts.is_empty() {
            let codes: Vec<&str> = unclassified_accounts
                .iter()
                .map(|balance| balance.code.as_str())
                .collect();
            warn!(count = codes.len(), codes = ?codes, "Unclassified accounts");
            warnings.push(format!(
                "{} account(s) could not be classified: {}",
                codes.len(),
                codes.join(", ")
            ));
        }

        for (sub_class, amount) in orphan_depreciation {
            warn!(%sub_class, %amount, "Depreciation without asset group");
            warnings.push(format!(
                "Depreciation of {amount} offsets sub-class {sub_class}, which has no asset"
            ));
        }

        ValidationReport {
            is_balanced: errors.is_empty(),
            errors,
            warnings,
            unclassified_accounts,
        }
    }
}
