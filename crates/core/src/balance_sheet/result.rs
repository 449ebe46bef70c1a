//! Net result of the period.

use rust_decimal::Decimal;
use tracing::debug;

use super::types::{NetResult, NetResultKind};
use crate::ledger::AccountBalances;
use crate::rules::RuleSet;

/// Derives the net result from revenue and expense classes.
pub struct ResultCalculator;

impl ResultCalculator {
    /// Calculates revenue minus expenses.
    ///
    /// Revenue accounts are credit-normal (`credit - debit`), expense accounts
    /// debit-normal (`debit - credit`).
    #[must_use]
    pub fn calculate(balances: &AccountBalances, rules: &RuleSet) -> NetResult {
        let mut total_revenue = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let mut has_activity = false;

        for balance in balances.values() {
            let Some(class) = balance.class() else {
                continue;
            };
            if rules.result.revenue_classes.contains(&class) {
                total_revenue = total_revenue
                    .saturating_add(balance.total_credit.saturating_sub(balance.total_debit));
                has_activity = true;
            } else if rules.result.expense_classes.contains(&class) {
                total_expense = total_expense
                    .saturating_add(balance.total_debit.saturating_sub(balance.total_credit));
                has_activity = true;
            }
        }

        let amount = total_revenue.saturating_sub(total_expense);
        let kind = NetResultKind::from_amount(amount);
        debug!(%total_revenue, %total_expense, %amount, "Net result calculated");

        NetResult {
            amount,
            kind,
            label: kind.label().to_string(),
            total_revenue,
            total_expense,
            has_activity,
        }
    }
}
