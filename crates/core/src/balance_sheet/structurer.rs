//! Arrangement of groups into report sections.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::warn;

use super::types::{
    AssetSide, BalanceSheet, CurrentAssets, Group, LiabilitySide, NetResult, Section,
    ShortTermLiabilities, SheetTotals, ValidationReport, saturating_sum,
};
use crate::rules::{RuleSet, SectionKind, TradeLedger};

/// Builds the hierarchical balance sheet from netted groups.
pub struct StatementStructurer;

impl StatementStructurer {
    /// Places every group in its section and computes all totals.
    ///
    /// Composite totals are sums of section totals, never recomputed from
    /// account balances. The net result line is part of equity when the
    /// period had revenue or expense accounts. The returned sheet carries an
    /// empty validation report.
    #[must_use]
    pub fn structure(groups: Vec<Group>, net_result: &NetResult, rules: &RuleSet) -> BalanceSheet {
        let mut by_section: BTreeMap<SectionKind, Vec<Group>> = BTreeMap::new();
        for group in groups {
            match rules.section_for(group.side, &group.sub_class) {
                Some(kind) => by_section.entry(kind).or_default().push(group),
                None => warn!(
                    side = %group.side,
                    sub_class = %group.sub_class,
                    "Group has no section and is left out of the balance sheet"
                ),
            }
        }
        let mut take = |kind: SectionKind| {
            Section::new(kind, by_section.remove(&kind).unwrap_or_default())
        };

        let fixed_assets = take(SectionKind::FixedAssets);
        let inventory = take(SectionKind::Inventory);
        let receivables = take(SectionKind::Receivables);
        let cash_assets = take(SectionKind::CashAssets);
        let equity = take(SectionKind::Equity);
        let provisions = take(SectionKind::Provisions);
        let long_term_debt = take(SectionKind::LongTermDebt);
        let short_term_debt = take(SectionKind::ShortTermDebt);
        let cash_liabilities = take(SectionKind::CashLiabilities);

        let current_assets = CurrentAssets {
            trade_receivables: Self::trade_total(&receivables, TradeLedger::Receivables),
            total: saturating_sum([inventory.total, receivables.total, cash_assets.total]),
            inventory,
            receivables,
            cash: cash_assets,
        };
        let assets = AssetSide {
            total: fixed_assets.total.saturating_add(current_assets.total),
            fixed_assets,
            current_assets,
        };

        let net_result = net_result.has_activity.then(|| net_result.clone());
        let total_equity = equity.total.saturating_add(
            net_result
                .as_ref()
                .map_or(Decimal::ZERO, |result| result.amount),
        );
        let short_term = ShortTermLiabilities {
            trade_payables: Self::trade_total(&short_term_debt, TradeLedger::Payables),
            total: short_term_debt.total.saturating_add(cash_liabilities.total),
            debt: short_term_debt,
            cash: cash_liabilities,
        };
        let liabilities = LiabilitySide {
            total: saturating_sum([
                total_equity,
                provisions.total,
                long_term_debt.total,
                short_term.total,
            ]),
            equity,
            net_result,
            total_equity,
            provisions,
            long_term_debt,
            short_term,
        };

        let totals = SheetTotals {
            total_assets: assets.total,
            total_liabilities: liabilities.total,
            gap: assets.total.saturating_sub(liabilities.total),
        };

        BalanceSheet {
            assets,
            liabilities,
            totals,
            validation: ValidationReport::default(),
        }
    }

    fn trade_total(section: &Section, ledger: TradeLedger) -> Decimal {
        saturating_sum(
            section
                .groups
                .iter()
                .flat_map(|group| group.entries.iter())
                .filter(|entry| entry.trade_ledger == Some(ledger))
                .map(|entry| entry.assigned_amount),
        )
    }
}
