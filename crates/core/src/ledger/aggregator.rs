//! Account aggregation.
//!
//! Collapses the entry list into one [`AccountBalance`] per account code.
//! Aggregation is a plain sum per code, so partial maps built over any
//! partition of the entries merge into the same result; the parallel variant
//! relies on that.

use std::collections::BTreeMap;

use bilan_shared::types::AccountCode;
use rayon::prelude::*;
use tracing::debug;

use super::balance::{AccountBalance, PartialBalance};
use super::entry::LedgerEntry;
use crate::rules::LabelResolver;

/// Aggregated balances, ordered by account code.
pub type AccountBalances = BTreeMap<AccountCode, AccountBalance>;

type PartialBalances = BTreeMap<AccountCode, PartialBalance>;

/// Minimum number of entries handed to one rayon task.
const MIN_CHUNK_LEN: usize = 4_096;

/// Folds ledger entries into per-account balances.
pub struct AccountAggregator;

impl AccountAggregator {
    /// Aggregates entries sequentially.
    ///
    /// Entries with an empty account code are skipped; missing amounts count
    /// as zero. Accounts without a label in any entry get one from `labels`.
    #[must_use]
    pub fn aggregate(entries: &[LedgerEntry], labels: &LabelResolver) -> AccountBalances {
        let partials = Self::fold_chunk(PartialBalances::new(), entries);
        Self::finish(partials, labels)
    }

    /// Aggregates entries on the rayon pool.
    ///
    /// Produces exactly the same balances as [`AccountAggregator::aggregate`].
    #[must_use]
    pub fn aggregate_parallel(entries: &[LedgerEntry], labels: &LabelResolver) -> AccountBalances {
        let partials = entries
            .par_chunks(MIN_CHUNK_LEN)
            .fold(PartialBalances::new, Self::fold_chunk)
            .reduce(PartialBalances::new, Self::merge);
        Self::finish(partials, labels)
    }

    fn fold_chunk(mut acc: PartialBalances, entries: &[LedgerEntry]) -> PartialBalances {
        for entry in entries {
            let Some(code) = AccountCode::parse(&entry.account_code) else {
                debug!(
                    debit = ?entry.debit,
                    credit = ?entry.credit,
                    "Skipping entry without account code"
                );
                continue;
            };
            acc.entry(code).or_default().add(
                entry.account_label.as_deref(),
                entry.debit_or_zero(),
                entry.credit_or_zero(),
            );
        }
        acc
    }

    fn merge(mut left: PartialBalances, right: PartialBalances) -> PartialBalances {
        for (code, partial) in right {
            left.entry(code).or_default().merge(partial);
        }
        left
    }

    fn finish(partials: PartialBalances, labels: &LabelResolver) -> AccountBalances {
        partials
            .into_iter()
            .map(|(code, partial)| {
                let label = partial
                    .label
                    .unwrap_or_else(|| labels.account_label(&code));
                let balance = AccountBalance::new(code.clone(), label, partial.debit, partial.credit);
                (code, balance)
            })
            .collect()
    }
}
