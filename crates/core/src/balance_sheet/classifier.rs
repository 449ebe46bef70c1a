//! Routing of account balances to balance sheet groups.

use std::collections::BTreeMap;

use bilan_shared::types::Side;
use rust_decimal::Decimal;
use tracing::debug;

use super::types::{ClassifiedEntry, Group};
use crate::ledger::{AccountBalance, AccountBalances};
use crate::rules::{ClassRouting, LabelResolver, RuleSet};

/// Routes account balances to asset-side or liability-side groups.
pub struct BalanceSheetClassifier;

impl BalanceSheetClassifier {
    /// Classifies every balance sheet account.
    ///
    /// Skipped without producing an entry:
    /// - net result classes and depreciation/provision accounts (handled by
    ///   their own stages)
    /// - balances below the near-zero threshold
    /// - balances the routing rule drops (credit balance on a fixed asset, ...)
    /// - sub-classes no report section accepts on the routed side
    ///
    /// Returned groups are ordered by side, then sub-class.
    #[must_use]
    pub fn classify(
        balances: &AccountBalances,
        rules: &RuleSet,
        labels: &LabelResolver,
    ) -> Vec<Group> {
        let mut groups: BTreeMap<(Side, String), Group> = BTreeMap::new();

        for balance in balances.values() {
            let Some(class) = balance.class() else {
                continue;
            };
            if rules.is_result_class(class) || rules.is_depreciation_account(&balance.code) {
                continue;
            }
            if balance.is_negligible(rules.thresholds.epsilon) {
                continue;
            }
            let Some(routing) = rules.routing_for(class) else {
                continue;
            };
            let Some((side, assigned_amount)) = Self::route(routing, balance, rules) else {
                debug!(code = %balance.code, balance = %balance.net_balance, "Balance dropped by routing rule");
                continue;
            };
            let Some(sub_class) = balance.sub_class() else {
                continue;
            };
            if rules.section_for(side, sub_class).is_none() {
                debug!(code = %balance.code, %side, sub_class, "No section accepts sub-class");
                continue;
            }

            let entry = ClassifiedEntry {
                account: balance.clone(),
                side,
                assigned_amount,
                trade_ledger: rules.trade_ledger(&balance.code),
                book_value: None,
            };
            groups
                .entry((side, sub_class.to_string()))
                .or_insert_with(|| Group::new(sub_class, side, labels.sub_class_label(sub_class)))
                .push(entry);
        }

        debug!(groups = groups.len(), "Balances classified");
        groups.into_values().collect()
    }

    /// Applies a class routing rule to one balance.
    ///
    /// Returns the side and the positive amount posted there, or `None` when
    /// the rule drops the balance.
    #[must_use]
    pub fn route(
        routing: ClassRouting,
        balance: &AccountBalance,
        rules: &RuleSet,
    ) -> Option<(Side, Decimal)> {
        let amount = balance.net_balance;
        match routing {
            ClassRouting::Equity => {
                if rules.is_contra_equity(&balance.code) && amount > Decimal::ZERO {
                    Some((Side::Asset, amount))
                } else {
                    Some((Side::Liability, amount.abs()))
                }
            }
            ClassRouting::PositiveAsset => (amount > Decimal::ZERO).then_some((Side::Asset, amount)),
            ClassRouting::SignDependent => {
                if amount > Decimal::ZERO {
                    Some((Side::Asset, amount))
                } else if amount < Decimal::ZERO {
                    Some((Side::Liability, -amount))
                } else {
                    None
                }
            }
        }
    }
}
