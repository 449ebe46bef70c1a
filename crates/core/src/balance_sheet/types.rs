//! Balance sheet data types.

use std::collections::{BTreeMap, BTreeSet};

use bilan_shared::types::{AccountCode, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountBalance;
use crate::rules::{SectionKind, TradeLedger};

/// Sums amounts, saturating at the bounds of `Decimal`.
pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sign of the net result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetResultKind {
    /// Revenue exceeds expenses.
    Profit,
    /// Expenses exceed revenue.
    Loss,
    /// Revenue equals expenses.
    BreakEven,
}

impl NetResultKind {
    /// Returns the kind matching the sign of `amount`.
    #[must_use]
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Profit
        } else if amount < Decimal::ZERO {
            Self::Loss
        } else {
            Self::BreakEven
        }
    }

    /// Returns the balance sheet label of the result line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profit => "Résultat de l'exercice (bénéfice)",
            Self::Loss => "Résultat de l'exercice (perte)",
            Self::BreakEven => "Résultat de l'exercice",
        }
    }
}

/// Net result of the period, posted as a synthetic equity line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetResult {
    /// Revenue minus expenses.
    pub amount: Decimal,
    /// Sign of the result.
    pub kind: NetResultKind,
    /// Display label.
    pub label: String,
    /// Sum of revenue contributions (credit - debit).
    pub total_revenue: Decimal,
    /// Sum of expense contributions (debit - credit).
    pub total_expense: Decimal,
    /// Whether any revenue or expense account was present.
    pub has_activity: bool,
}

/// Gross, depreciation and net value of one fixed-asset account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookValue {
    /// Gross value.
    pub gross: Decimal,
    /// Accumulated depreciation matched to this account.
    pub depreciation: Decimal,
    /// Gross minus depreciation.
    pub net: Decimal,
    /// Depreciation over gross, in percent, capped at 100.
    pub wear_ratio: Decimal,
}

/// An account balance routed to one side of the balance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    /// Original balance.
    #[serde(flatten)]
    pub account: AccountBalance,
    /// Side it is presented on.
    pub side: Side,
    /// Positive amount posted to the group.
    pub assigned_amount: Decimal,
    /// Trade sub-ledger, when the account belongs to one.
    pub trade_ledger: Option<TradeLedger>,
    /// Net book value, for fixed-asset accounts after depreciation netting.
    pub book_value: Option<BookValue>,
}

impl ClassifiedEntry {
    /// Returns the account code.
    #[must_use]
    pub fn code(&self) -> &AccountCode {
        &self.account.code
    }
}

/// Accounts sharing a sub-class on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Two-digit sub-class.
    pub sub_class: String,
    /// Side.
    pub side: Side,
    /// Display label.
    pub label: String,
    /// Contributing entries, ordered by account code.
    pub entries: Vec<ClassifiedEntry>,
    /// Sum of assigned amounts.
    pub gross_total: Decimal,
    /// Depreciation netted against the group.
    pub depreciation_total: Decimal,
    /// Gross minus depreciation.
    pub net_total: Decimal,
}

impl Group {
    /// Creates an empty group.
    #[must_use]
    pub fn new(sub_class: impl Into<String>, side: Side, label: impl Into<String>) -> Self {
        Self {
            sub_class: sub_class.into(),
            side,
            label: label.into(),
            entries: Vec::new(),
            gross_total: Decimal::ZERO,
            depreciation_total: Decimal::ZERO,
            net_total: Decimal::ZERO,
        }
    }

    pub(crate) fn push(&mut self, entry: ClassifiedEntry) {
        self.gross_total = self.gross_total.saturating_add(entry.assigned_amount);
        self.net_total = self.gross_total.saturating_sub(self.depreciation_total);
        self.entries.push(entry);
    }

    /// Returns true if an entry of the group carries `code`.
    #[must_use]
    pub fn contains(&self, code: &AccountCode) -> bool {
        self.entries.iter().any(|entry| entry.code() == code)
    }
}

/// Depreciation extracted from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationBuckets {
    /// Asset sub-class -> accumulated depreciation.
    pub by_sub_class: BTreeMap<String, Decimal>,
    /// Normalized asset account code -> accumulated depreciation.
    pub by_account: BTreeMap<String, Decimal>,
    /// Depreciation accounts absorbed by a bucket.
    pub consumed: BTreeSet<AccountCode>,
}

impl DepreciationBuckets {
    /// Returns the bucket total of an asset sub-class.
    #[must_use]
    pub fn for_sub_class(&self, sub_class: &str) -> Decimal {
        self.by_sub_class
            .get(sub_class)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the depreciation matched to a normalized asset account code.
    #[must_use]
    pub fn for_account(&self, normalized_code: &str) -> Decimal {
        self.by_account
            .get(normalized_code)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// One report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section.
    pub kind: SectionKind,
    /// Heading.
    pub label: String,
    /// Groups, ordered by sub-class.
    pub groups: Vec<Group>,
    /// Sum of group net totals.
    pub total: Decimal,
}

impl Section {
    /// Creates a section from its groups, sorting them and computing the total.
    #[must_use]
    pub fn new(kind: SectionKind, mut groups: Vec<Group>) -> Self {
        groups.sort_by(|a, b| a.sub_class.cmp(&b.sub_class));
        let total = saturating_sum(groups.iter().map(|g| g.net_total));
        Self {
            kind,
            label: kind.label().to_string(),
            groups,
            total,
        }
    }
}

/// Current assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAssets {
    /// Stocks et en-cours.
    pub inventory: Section,
    /// Créances.
    pub receivables: Section,
    /// Disponibilités.
    pub cash: Section,
    /// Of which trade receivables.
    pub trade_receivables: Decimal,
    /// Inventory + receivables + cash.
    pub total: Decimal,
}

/// Asset side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSide {
    /// Actif immobilisé.
    pub fixed_assets: Section,
    /// Actif circulant.
    pub current_assets: CurrentAssets,
    /// Fixed + current assets.
    pub total: Decimal,
}

/// Short-term liabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermLiabilities {
    /// Dettes d'exploitation et diverses.
    pub debt: Section,
    /// Concours bancaires courants.
    pub cash: Section,
    /// Of which trade payables.
    pub trade_payables: Decimal,
    /// Debt + cash liabilities.
    pub total: Decimal,
}

/// Liability side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilitySide {
    /// Capitaux propres (accounts only).
    pub equity: Section,
    /// Net result line, posted next to equity.
    pub net_result: Option<NetResult>,
    /// Equity accounts plus net result.
    pub total_equity: Decimal,
    /// Provisions pour risques et charges.
    pub provisions: Section,
    /// Dettes financières.
    pub long_term_debt: Section,
    /// Short-term liabilities.
    pub short_term: ShortTermLiabilities,
    /// Equity + provisions + long-term debt + short-term liabilities.
    pub total: Decimal,
}

/// Top-level totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTotals {
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities (equity included).
    pub total_liabilities: Decimal,
    /// Total assets minus total liabilities.
    pub gap: Decimal,
}

/// Outcome of the equilibrium and completeness checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no error was recorded.
    pub is_balanced: bool,
    /// Errors.
    pub errors: Vec<String>,
    /// Warnings.
    pub warnings: Vec<String>,
    /// Balance sheet accounts that reached no section.
    pub unclassified_accounts: Vec<AccountBalance>,
}

/// The balance sheet, with its validation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Actif.
    pub assets: AssetSide,
    /// Passif.
    pub liabilities: LiabilitySide,
    /// Totals.
    pub totals: SheetTotals,
    /// Validation report.
    pub validation: ValidationReport,
}

impl BalanceSheet {
    /// Returns every section, asset side first.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        [
            &self.assets.fixed_assets,
            &self.assets.current_assets.inventory,
            &self.assets.current_assets.receivables,
            &self.assets.current_assets.cash,
            &self.liabilities.equity,
            &self.liabilities.provisions,
            &self.liabilities.long_term_debt,
            &self.liabilities.short_term.debt,
            &self.liabilities.short_term.cash,
        ]
        .into_iter()
    }

    /// Returns every group of every section.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.sections().flat_map(|section| section.groups.iter())
    }

    /// Finds the group of a sub-class on one side.
    #[must_use]
    pub fn group(&self, side: Side, sub_class: &str) -> Option<&Group> {
        self.groups()
            .find(|group| group.side == side && group.sub_class == sub_class)
    }

    /// Returns true if some group holds the account.
    #[must_use]
    pub fn contains_account(&self, code: &AccountCode) -> bool {
        self.groups().any(|group| group.contains(code))
    }

    pub(crate) fn with_validation(self, validation: ValidationReport) -> Self {
        Self { validation, ..self }
    }
}
