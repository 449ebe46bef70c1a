//! End-to-end and property-based tests for balance sheet generation.
//!
//! Properties:
//! - Balanced journals yield balanced sheets
//! - Negligible balances never reach a group
//! - Depreciation never increases a group
//! - Every balance sheet account is placed or reported

use bilan_shared::types::Side;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::depreciation::DepreciationExtractor;
use super::service::BalanceSheetService;
use super::types::{BalanceSheet, NetResultKind};
use crate::ledger::{AccountAggregator, LedgerEntry};
use crate::rules::{LabelResolver, RuleSet};

fn generate(entries: &[LedgerEntry]) -> BalanceSheet {
    BalanceSheetService::new(RuleSet::default())
        .unwrap()
        .generate(Some(entries))
        .unwrap()
}

// ============================================================================
// Strategies
// ============================================================================

/// Accounts only ever debited by generated transactions.
const DEBIT_CODES: [&str; 5] = ["512", "2154", "411", "607", "6811"];
/// Accounts only ever credited by generated transactions.
const CREDIT_CODES: [&str; 6] = ["101", "164", "401", "530", "707", "28154"];

/// Largest generated transaction amount, in cents.
const MAX_CENTS: i64 = 100_000;
/// Largest number of generated transactions.
const MAX_TRANSACTIONS: usize = 50;

/// One balanced transaction: the same amount debited and credited.
fn transaction_strategy() -> impl Strategy<Value = [LedgerEntry; 2]> {
    (
        prop::sample::select(DEBIT_CODES.to_vec()),
        prop::sample::select(CREDIT_CODES.to_vec()),
        100i64..=MAX_CENTS,
    )
        .prop_map(|(debit_code, credit_code, cents)| {
            let amount = Decimal::new(cents, 2);
            [
                LedgerEntry::new(debit_code, amount, Decimal::ZERO),
                LedgerEntry::new(credit_code, Decimal::ZERO, amount),
            ]
        })
}

/// A balanced journal opened by a fixed-asset purchase larger than any
/// depreciation the generated transactions can book.
fn balanced_journal() -> impl Strategy<Value = Vec<LedgerEntry>> {
    prop::collection::vec(transaction_strategy(), 0..MAX_TRANSACTIONS).prop_map(|txs| {
        let opening = Decimal::new(MAX_CENTS * 100, 2);
        let mut entries = vec![
            LedgerEntry::new("2154", opening, Decimal::ZERO),
            LedgerEntry::new("101", Decimal::ZERO, opening),
        ];
        entries.extend(txs.into_iter().flatten());
        entries
    })
}

/// Free-form entries over balance sheet and result accounts.
fn free_entries() -> impl Strategy<Value = Vec<LedgerEntry>> {
    let codes = vec![
        "101", "109", "1068", "151", "164", "2154", "241", "28154", "2899", "370", "401",
        "411", "4456", "491", "512", "519", "530", "541", "607", "707",
    ];
    prop::collection::vec(
        (prop::sample::select(codes), 0i64..50_000, 0i64..50_000).prop_map(
            |(code, debit, credit)| {
                LedgerEntry::new(code, Decimal::new(debit, 3), Decimal::new(credit, 3))
            },
        ),
        1..60,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Double-entry journals produce sheets where assets equal liabilities.
    #[test]
    fn prop_balanced_journal_is_balanced(entries in balanced_journal()) {
        let sheet = generate(&entries);
        prop_assert_eq!(sheet.totals.total_assets, sheet.totals.total_liabilities);
        prop_assert_eq!(sheet.totals.gap, Decimal::ZERO);
        prop_assert!(sheet.validation.is_balanced);
        prop_assert!(sheet.validation.errors.is_empty());
        prop_assert!(sheet.validation.unclassified_accounts.is_empty());
    }

    /// No classified entry has a balance below epsilon.
    #[test]
    fn prop_negligible_balances_are_excluded(entries in free_entries()) {
        let sheet = generate(&entries);
        for group in sheet.groups() {
            for entry in &group.entries {
                prop_assert!(entry.account.net_balance.abs() >= dec!(0.01));
                prop_assert!(entry.assigned_amount > Decimal::ZERO);
            }
        }
    }

    /// Depreciation is non-negative and the net total never exceeds the gross.
    #[test]
    fn prop_depreciation_only_reduces(entries in free_entries()) {
        let sheet = generate(&entries);
        for group in sheet.groups() {
            prop_assert!(group.depreciation_total >= Decimal::ZERO);
            prop_assert_eq!(group.net_total, group.gross_total - group.depreciation_total);
            if group.side == Side::Liability {
                prop_assert_eq!(group.depreciation_total, Decimal::ZERO);
            }
        }
    }

    /// A class 1-5 account above epsilon is either in a group, absorbed as
    /// depreciation, or listed as unclassified; never twice.
    #[test]
    fn prop_accounts_are_placed_or_reported(entries in free_entries()) {
        let rules = RuleSet::default();
        let sheet = generate(&entries);
        let balances = AccountAggregator::aggregate(&entries, &LabelResolver::new(&rules.labels));
        let buckets = DepreciationExtractor::extract(&balances, &rules);

        for balance in &sheet.validation.unclassified_accounts {
            prop_assert!(!sheet.contains_account(&balance.code));
            prop_assert!(balance.class().is_some_and(|c| (1..=5).contains(&c)));
        }

        for balance in balances.values() {
            let on_sheet = balance.class().is_some_and(|c| (1..=5).contains(&c));
            if !on_sheet
                || balance.is_negligible(rules.thresholds.epsilon)
                || buckets.consumed.contains(&balance.code)
            {
                continue;
            }
            let placed = sheet.contains_account(&balance.code);
            let reported = sheet
                .validation
                .unclassified_accounts
                .iter()
                .any(|unclassified| unclassified.code == balance.code);
            prop_assert!(
                placed != reported,
                "{} placed={} reported={}",
                balance.code,
                placed,
                reported
            );
        }
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_bank_and_supplier() {
    let sheet = generate(&[
        LedgerEntry::new("512", dec!(1000), Decimal::ZERO),
        LedgerEntry::new("401", Decimal::ZERO, dec!(1000)),
    ]);

    let bank = sheet.group(Side::Asset, "51").unwrap();
    assert_eq!(bank.net_total, dec!(1000));
    let suppliers = sheet.group(Side::Liability, "40").unwrap();
    assert_eq!(suppliers.net_total, dec!(1000));
    assert_eq!(sheet.liabilities.short_term.trade_payables, dec!(1000));

    assert_eq!(sheet.totals.total_assets, dec!(1000));
    assert_eq!(sheet.totals.total_liabilities, dec!(1000));
    assert!(sheet.validation.is_balanced);
    assert!(sheet.liabilities.net_result.is_none());
}

#[test]
fn test_credit_cash_balance_is_a_liability() {
    let sheet = generate(&[
        LedgerEntry::new("101", Decimal::ZERO, dec!(1000)),
        LedgerEntry::new("512", dec!(1100), Decimal::ZERO),
        LedgerEntry::new("530", Decimal::ZERO, dec!(100)),
    ]);

    let overdraft = sheet.group(Side::Liability, "53").unwrap();
    assert_eq!(overdraft.net_total, dec!(100));
    assert_eq!(sheet.liabilities.short_term.cash.total, dec!(100));
    assert_eq!(sheet.totals.total_assets, dec!(1100));
    assert_eq!(sheet.totals.total_liabilities, dec!(1100));
    assert!(sheet.validation.is_balanced);
    assert!(sheet.validation.unclassified_accounts.is_empty());
}

#[test]
fn test_result_only_journal_is_unbalanced() {
    let sheet = generate(&[
        LedgerEntry::new("707", Decimal::ZERO, dec!(5000)),
        LedgerEntry::new("607", dec!(2000), Decimal::ZERO),
    ]);

    let result = sheet.liabilities.net_result.as_ref().unwrap();
    assert_eq!(result.amount, dec!(3000));
    assert_eq!(result.kind, NetResultKind::Profit);
    assert_eq!(sheet.totals.total_assets, Decimal::ZERO);
    assert_eq!(sheet.totals.total_liabilities, dec!(3000));
    assert!(!sheet.validation.is_balanced);
    assert_eq!(sheet.validation.errors.len(), 1);
}

#[test]
fn test_depreciated_equipment() {
    let sheet = generate(&[
        LedgerEntry::new("2154", dec!(1000), Decimal::ZERO),
        LedgerEntry::new("28154", Decimal::ZERO, dec!(400)),
        LedgerEntry::new("512", dec!(400), Decimal::ZERO),
        LedgerEntry::new("101", Decimal::ZERO, dec!(1000)),
    ]);

    let equipment = sheet.group(Side::Asset, "21").unwrap();
    assert_eq!(equipment.gross_total, dec!(1000));
    assert_eq!(equipment.depreciation_total, dec!(400));
    assert_eq!(equipment.net_total, dec!(600));

    let book_value = equipment.entries[0].book_value.as_ref().unwrap();
    assert_eq!(book_value.net, dec!(600));
    assert_eq!(book_value.wear_ratio, dec!(40));

    assert_eq!(sheet.totals.total_assets, dec!(1000));
    assert!(sheet.validation.is_balanced);
    assert!(sheet.validation.warnings.is_empty());
}

#[test]
fn test_loss_reduces_equity() {
    let sheet = generate(&[
        LedgerEntry::new("512", dec!(500), Decimal::ZERO),
        LedgerEntry::new("101", Decimal::ZERO, dec!(1000)),
        LedgerEntry::new("607", dec!(500), Decimal::ZERO),
    ]);

    let result = sheet.liabilities.net_result.as_ref().unwrap();
    assert_eq!(result.kind, NetResultKind::Loss);
    assert_eq!(result.amount, dec!(-500));
    assert_eq!(sheet.liabilities.total_equity, dec!(500));
    assert!(sheet.validation.is_balanced);
}

#[test]
fn test_missing_or_empty_input() {
    let service = BalanceSheetService::new(RuleSet::default()).unwrap();
    assert!(service.generate(None).is_none());
    assert!(service.generate(Some(&[])).is_none());
}

#[test]
fn test_sheet_serializes_to_json() {
    let sheet = generate(&[
        LedgerEntry::new("512", dec!(1000), Decimal::ZERO).with_label("Banque BNP"),
        LedgerEntry::new("401", Decimal::ZERO, dec!(1000)),
    ]);
    let json = serde_json::to_value(&sheet).unwrap();

    assert_eq!(json["totals"]["total_assets"], "1000");
    assert_eq!(json["validation"]["is_balanced"], true);
    let entry = &json["assets"]["current_assets"]["cash"]["groups"][0]["entries"][0];
    assert_eq!(entry["code"], "512");
    assert_eq!(entry["label"], "Banque BNP");
}
