//! Display label resolution.
//!
//! Labels are for presentation only; no classification decision reads them.

use std::collections::BTreeMap;

use bilan_shared::types::AccountCode;

use super::ruleset::LabelTables;

/// Resolves human-readable labels for account codes and sub-classes.
#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    sub_classes: BTreeMap<String, String>,
    accounts: BTreeMap<String, String>,
}

impl LabelResolver {
    /// Creates a resolver over the given tables.
    #[must_use]
    pub fn new(tables: &LabelTables) -> Self {
        Self {
            sub_classes: tables.sub_classes.clone(),
            accounts: tables.accounts.clone(),
        }
    }

    /// Label of a two-digit sub-class.
    #[must_use]
    pub fn sub_class_label(&self, sub_class: &str) -> String {
        self.sub_classes
            .get(sub_class)
            .cloned()
            .unwrap_or_else(|| format!("Comptes {sub_class}"))
    }

    /// Label of an account: longest matching account prefix, then the
    /// sub-class label, then a generic label.
    #[must_use]
    pub fn account_label(&self, code: &AccountCode) -> String {
        let by_prefix = self
            .accounts
            .iter()
            .filter(|(prefix, _)| code.has_prefix(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, label)| label.clone());

        by_prefix
            .or_else(|| {
                code.sub_class()
                    .and_then(|sub_class| self.sub_classes.get(sub_class).cloned())
            })
            .unwrap_or_else(|| format!("Compte {code}"))
    }
}
