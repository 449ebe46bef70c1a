//! Depreciation and provision extraction.

use rust_decimal::Decimal;
use tracing::debug;

use super::types::DepreciationBuckets;
use crate::ledger::AccountBalances;
use crate::rules::RuleSet;

/// Isolates accumulated depreciation, bucketed by the asset it offsets.
pub struct DepreciationExtractor;

impl DepreciationExtractor {
    /// Extracts depreciation from the depreciation/provision accounts.
    ///
    /// The offset of an account is `max(0, credit - debit)`: an atypical debit
    /// balance contributes zero. Each account lands in exactly one sub-class
    /// bucket (longest prefix); the per-account map only receives accounts
    /// whose prefix has a transform rule.
    #[must_use]
    pub fn extract(balances: &AccountBalances, rules: &RuleSet) -> DepreciationBuckets {
        let mut buckets = DepreciationBuckets::default();

        for balance in balances.values() {
            if !rules.is_depreciation_account(&balance.code) {
                continue;
            }
            let Some(bucket) = rules.depreciation_bucket(&balance.code) else {
                debug!(code = %balance.code, "Depreciation account has no bucket");
                continue;
            };

            let offset = balance
                .total_credit
                .saturating_sub(balance.total_debit)
                .max(Decimal::ZERO);
            let total = buckets
                .by_sub_class
                .entry(bucket.to_string())
                .or_insert(Decimal::ZERO);
            *total = total.saturating_add(offset);
            buckets.consumed.insert(balance.code.clone());

            if let Some(asset_code) = rules.offset_asset_code(&balance.code) {
                let total = buckets.by_account.entry(asset_code).or_insert(Decimal::ZERO);
                *total = total.saturating_add(offset);
            }
        }

        debug!(
            buckets = buckets.by_sub_class.len(),
            accounts = buckets.by_account.len(),
            "Depreciation extracted"
        );
        buckets
    }
}
