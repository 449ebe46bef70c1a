//! Depreciation netting.
//!
//! Works in two phases over the classified groups without touching them:
//! group totals are netted against the sub-class buckets first, then every
//! fixed-asset entry is copied with its own net book value.

use std::collections::BTreeMap;

use bilan_shared::types::Side;
use rust_decimal::Decimal;
use tracing::debug;

use super::types::{BookValue, ClassifiedEntry, DepreciationBuckets, Group};
use crate::rules::RuleSet;

/// Groups after depreciation netting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmortizedGroups {
    /// New groups, same order as the input.
    pub groups: Vec<Group>,
    /// Non-zero buckets whose sub-class has no asset group.
    pub orphan_depreciation: BTreeMap<String, Decimal>,
}

/// Nets extracted depreciation against asset groups and accounts.
pub struct AmortizationApplier;

impl AmortizationApplier {
    /// Produces netted copies of `groups`.
    #[must_use]
    pub fn apply(groups: &[Group], buckets: &DepreciationBuckets, rules: &RuleSet) -> AmortizedGroups {
        let width = rules.depreciation.code_width;

        let groups: Vec<Group> = groups
            .iter()
            .map(|group| Self::net_group(group, buckets))
            .map(|group| {
                if group.side == Side::Asset && rules.is_fixed_asset_sub_class(&group.sub_class) {
                    Self::with_book_values(group, buckets, width)
                } else {
                    group
                }
            })
            .collect();

        let orphan_depreciation: BTreeMap<String, Decimal> = buckets
            .by_sub_class
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .filter(|(sub_class, _)| {
                !groups
                    .iter()
                    .any(|g| g.side == Side::Asset && &g.sub_class == *sub_class)
            })
            .map(|(sub_class, amount)| (sub_class.clone(), *amount))
            .collect();

        debug!(orphans = orphan_depreciation.len(), "Depreciation netted");
        AmortizedGroups {
            groups,
            orphan_depreciation,
        }
    }

    /// Computes the book value of one asset account.
    ///
    /// The wear ratio is `depreciation / gross * 100`, capped at 100 and
    /// rounded to two decimals; it is zero when the gross value is not positive.
    #[must_use]
    pub fn book_value(gross: Decimal, depreciation: Decimal) -> BookValue {
        let wear_ratio = if gross > Decimal::ZERO {
            depreciation
                .checked_div(gross)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map_or(Decimal::ONE_HUNDRED, |ratio| ratio.min(Decimal::ONE_HUNDRED))
                .round_dp(2)
        } else {
            Decimal::ZERO
        };
        BookValue {
            gross,
            depreciation,
            net: gross.saturating_sub(depreciation),
            wear_ratio,
        }
    }

    fn net_group(group: &Group, buckets: &DepreciationBuckets) -> Group {
        let depreciation = buckets.for_sub_class(&group.sub_class);
        if group.side != Side::Asset || depreciation.is_zero() {
            return group.clone();
        }
        Group {
            depreciation_total: depreciation,
            net_total: group.gross_total.saturating_sub(depreciation),
            ..group.clone()
        }
    }

    fn with_book_values(group: Group, buckets: &DepreciationBuckets, width: usize) -> Group {
        let entries = group
            .entries
            .into_iter()
            .map(|entry| {
                let depreciation = buckets.for_account(&entry.code().normalized(width));
                ClassifiedEntry {
                    book_value: Some(Self::book_value(entry.assigned_amount, depreciation)),
                    ..entry
                }
            })
            .collect();
        Group { entries, ..group }
    }
}
