//! Balance sheet generation service.

use tracing::{debug, info};

use super::amortization::AmortizationApplier;
use super::classifier::BalanceSheetClassifier;
use super::depreciation::DepreciationExtractor;
use super::result::ResultCalculator;
use super::structurer::StatementStructurer;
use super::types::BalanceSheet;
use super::validator::BalanceValidator;
use crate::ledger::{AccountAggregator, LedgerEntry};
use crate::rules::{LabelResolver, RuleSet, RulesError};

/// Entry count from which aggregation runs on the rayon pool by default.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 50_000;

/// Service running the ledger-to-balance-sheet pipeline.
///
/// Holds validated rules only; every call builds its balances and groups
/// from scratch, so one service can be shared across threads.
#[derive(Debug, Clone)]
pub struct BalanceSheetService {
    rules: RuleSet,
    labels: LabelResolver,
    parallel_threshold: usize,
}

impl BalanceSheetService {
    /// Creates a service after validating `rules`.
    pub fn new(rules: RuleSet) -> Result<Self, RulesError> {
        rules.validate()?;
        let labels = LabelResolver::new(&rules.labels);
        Ok(Self {
            rules,
            labels,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Sets the entry count from which aggregation runs in parallel.
    #[must_use]
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Returns the rules in use.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Generates the balance sheet of an entry list.
    ///
    /// Returns `None` when there are no entries at all: nothing to display,
    /// which is not a failure. Data-quality problems never abort generation;
    /// they are recorded in the sheet's validation report.
    ///
    /// Stages:
    /// 1. Aggregate entries per account
    /// 2. Calculate the net result (classes 6/7)
    /// 3. Extract depreciation buckets
    /// 4. Classify balance sheet accounts
    /// 5. Net depreciation against asset groups and accounts
    /// 6. Structure sections and totals
    /// 7. Validate equilibrium and completeness
    #[must_use]
    pub fn generate(&self, entries: Option<&[LedgerEntry]>) -> Option<BalanceSheet> {
        let entries = entries.filter(|entries| !entries.is_empty())?;
        let rules = &self.rules;

        let balances = if entries.len() >= self.parallel_threshold {
            AccountAggregator::aggregate_parallel(entries, &self.labels)
        } else {
            AccountAggregator::aggregate(entries, &self.labels)
        };
        debug!(entries = entries.len(), accounts = balances.len(), "Entries aggregated");

        let net_result = ResultCalculator::calculate(&balances, rules);
        let buckets = DepreciationExtractor::extract(&balances, rules);
        let groups = BalanceSheetClassifier::classify(&balances, rules, &self.labels);
        let amortized = AmortizationApplier::apply(&groups, &buckets, rules);
        let sheet = StatementStructurer::structure(amortized.groups, &net_result, rules);
        let validation = BalanceValidator::validate(
            &sheet,
            &balances,
            &buckets,
            &amortized.orphan_depreciation,
            rules,
        );

        info!(
            total_assets = %sheet.totals.total_assets,
            total_liabilities = %sheet.totals.total_liabilities,
            is_balanced = validation.is_balanced,
            warnings = validation.warnings.len(),
            "Balance sheet generated"
        );
        Some(sheet.with_validation(validation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bilan_shared::types::Side;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn service() -> BalanceSheetService {
        BalanceSheetService::new(RuleSet::default()).unwrap()
    }

    #[test]
    fn test_no_entries_means_no_result() {
        assert!(service().generate(None).is_none());
        assert!(service().generate(Some(&[])).is_none());
    }

    #[test]
    fn test_only_unusable_entries_still_produce_a_sheet() {
        let entries = vec![LedgerEntry::new("", dec!(10), Decimal::ZERO)];
        let sheet = service().generate(Some(&entries)).unwrap();
        assert_eq!(sheet.totals.total_assets, Decimal::ZERO);
        assert!(sheet.validation.is_balanced);
    }

    #[test]
    fn test_overflowing_totals_saturate_instead_of_panicking() {
        let entries = vec![
            LedgerEntry::new("512", Decimal::MAX, Decimal::ZERO),
            LedgerEntry::new("512", Decimal::MAX, Decimal::ZERO),
            LedgerEntry::new("2154", Decimal::MAX, Decimal::ZERO),
            LedgerEntry::new("28154", Decimal::ZERO, Decimal::MAX),
        ];
        let sheet = service().generate(Some(&entries)).unwrap();
        assert_eq!(sheet.group(Side::Asset, "51").unwrap().net_total, Decimal::MAX);
        assert_eq!(sheet.totals.total_assets, Decimal::MAX);
        assert!(!sheet.validation.is_balanced);
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let rules = RuleSet::default().with_thresholds(None, Some(dec!(-1)));
        assert!(matches!(
            BalanceSheetService::new(rules),
            Err(RulesError::NegativeThreshold {
                name: "tolerance",
                ..
            })
        ));
    }

    #[test]
    fn test_parallel_threshold_does_not_change_the_sheet() {
        let entries: Vec<LedgerEntry> = (1..=500i64)
            .flat_map(|i| {
                [
                    LedgerEntry::new("512", Decimal::new(i, 2), Decimal::ZERO),
                    LedgerEntry::new("401", Decimal::ZERO, Decimal::new(i, 2)),
                ]
            })
            .collect();

        let sequential = service().generate(Some(&entries)).unwrap();
        let parallel = service()
            .with_parallel_threshold(1)
            .generate(Some(&entries))
            .unwrap();

        assert_eq!(sequential, parallel);
        assert!(sequential.group(Side::Asset, "51").is_some());
    }
}
