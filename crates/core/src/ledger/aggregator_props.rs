//! Property-based tests for account aggregation.
//!
//! - Order independence
//! - Totals are exact sums
//! - Parallel aggregation equals sequential aggregation

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aggregator::AccountAggregator;
use super::entry::LedgerEntry;
use crate::rules::{LabelResolver, LabelTables};

const CODES: [&str; 8] = ["101", "2154", "28154", "401", "411", "512", "607", "707"];

/// Strategy for one entry: a known code and amounts in cents.
fn entry_strategy() -> impl Strategy<Value = LedgerEntry> {
    (
        prop::sample::select(CODES.to_vec()),
        0i64..10_000_000,
        0i64..10_000_000,
    )
        .prop_map(|(code, debit, credit)| {
            LedgerEntry::new(code, Decimal::new(debit, 2), Decimal::new(credit, 2))
        })
}

/// Strategy for an entry list together with a permutation of it.
fn entries_and_shuffle() -> impl Strategy<Value = (Vec<LedgerEntry>, Vec<LedgerEntry>)> {
    prop::collection::vec(entry_strategy(), 0..200)
        .prop_flat_map(|entries| (Just(entries.clone()), Just(entries).prop_shuffle()))
}

fn labels() -> LabelResolver {
    LabelResolver::new(&LabelTables::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Permuting the entries yields identical balances.
    #[test]
    fn prop_aggregation_is_order_independent((entries, shuffled) in entries_and_shuffle()) {
        let labels = labels();
        let original = AccountAggregator::aggregate(&entries, &labels);
        let permuted = AccountAggregator::aggregate(&shuffled, &labels);
        prop_assert_eq!(original, permuted);
    }

    /// Totals equal the sums over entries sharing the code, and net = debit - credit.
    #[test]
    fn prop_totals_are_exact_sums(entries in prop::collection::vec(entry_strategy(), 1..200)) {
        let balances = AccountAggregator::aggregate(&entries, &labels());

        for (code, balance) in &balances {
            let debit: Decimal = entries
                .iter()
                .filter(|e| e.account_code == code.as_str())
                .map(LedgerEntry::debit_or_zero)
                .sum();
            let credit: Decimal = entries
                .iter()
                .filter(|e| e.account_code == code.as_str())
                .map(LedgerEntry::credit_or_zero)
                .sum();
            prop_assert_eq!(balance.total_debit, debit);
            prop_assert_eq!(balance.total_credit, credit);
            prop_assert_eq!(balance.net_balance, debit - credit);
        }

        let distinct: std::collections::BTreeSet<&str> =
            entries.iter().map(|e| e.account_code.as_str()).collect();
        prop_assert_eq!(balances.len(), distinct.len());
    }

    /// Parallel aggregation equals sequential aggregation.
    #[test]
    fn prop_parallel_equals_sequential(entries in prop::collection::vec(entry_strategy(), 0..300)) {
        let labels = labels();
        prop_assert_eq!(
            AccountAggregator::aggregate(&entries, &labels),
            AccountAggregator::aggregate_parallel(&entries, &labels)
        );
    }
}
