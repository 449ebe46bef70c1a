//! Classification rule tables.
//!
//! Everything the pipeline needs to know about the chart of accounts lives
//! here as data: thresholds, class routing, depreciation prefixes, section
//! membership and display labels. `RuleSet::default()` carries the French
//! PCG tables; a TOML or JSON file can override any part of them.

use std::collections::{BTreeMap, BTreeSet};

use bilan_shared::types::{AccountCode, Side, account_code::normalize_code};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::RulesError;

/// Numeric thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Balances whose absolute value is below this are ignored.
    pub epsilon: Decimal,
    /// Largest accepted difference between total assets and total liabilities.
    pub tolerance: Decimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            epsilon: Decimal::new(1, 2),
            tolerance: Decimal::new(1, 2),
        }
    }
}

/// How the balances of one account class reach the balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRouting {
    /// Liability side at absolute value, except contra-equity codes.
    Equity,
    /// Asset side, only debit balances.
    PositiveAsset,
    /// Debit balance on the asset side, credit balance on the liability side.
    SignDependent,
}

/// Privileged third-party sub-ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeLedger {
    /// Customers (`411`).
    Receivables,
    /// Suppliers (`401`).
    Payables,
}

/// Account prefixes of the trade sub-ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeCodes {
    /// Trade receivables prefix.
    pub receivables: String,
    /// Trade payables prefix.
    pub payables: String,
}

impl Default for TradeCodes {
    fn default() -> Self {
        Self {
            receivables: "411".to_string(),
            payables: "401".to_string(),
        }
    }
}

/// Classes feeding the net result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultRules {
    /// Credit-normal classes.
    pub revenue_classes: Vec<u8>,
    /// Debit-normal classes.
    pub expense_classes: Vec<u8>,
}

impl Default for ResultRules {
    fn default() -> Self {
        Self {
            revenue_classes: vec![7],
            expense_classes: vec![6],
        }
    }
}

/// Depreciation and provision tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepreciationRules {
    /// Prefixes identifying depreciation/provision accounts.
    pub class_prefixes: Vec<String>,
    /// Depreciation prefix -> asset sub-class bucket.
    pub buckets: BTreeMap<String, String>,
    /// Depreciation prefix -> asset prefix, for per-account netting.
    pub transforms: BTreeMap<String, String>,
    /// Width account codes are normalized to before matching.
    pub code_width: usize,
    /// Asset sub-classes whose accounts get a net book value.
    pub fixed_asset_sub_classes: Vec<String>,
}

impl Default for DepreciationRules {
    fn default() -> Self {
        Self {
            class_prefixes: strings(&["28", "29", "39", "49", "59"]),
            buckets: table(&[
                ("280", "20"),
                ("281", "21"),
                ("282", "22"),
                ("290", "20"),
                ("291", "21"),
                ("292", "22"),
                ("293", "23"),
                ("296", "26"),
                ("297", "27"),
                ("391", "31"),
                ("392", "32"),
                ("393", "33"),
                ("394", "34"),
                ("395", "35"),
                ("397", "37"),
                ("491", "41"),
                ("495", "45"),
                ("496", "46"),
                ("590", "50"),
            ]),
            transforms: table(&[
                ("280", "20"),
                ("281", "21"),
                ("282", "22"),
                ("290", "20"),
                ("291", "21"),
                ("293", "23"),
                ("296", "26"),
                ("297", "27"),
            ]),
            code_width: 6,
            fixed_asset_sub_classes: strings(&["20", "21", "22", "23", "26", "27"]),
        }
    }
}

/// Report sections of the balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Actif immobilisé.
    FixedAssets,
    /// Stocks et en-cours.
    Inventory,
    /// Créances.
    Receivables,
    /// Disponibilités.
    CashAssets,
    /// Capitaux propres.
    Equity,
    /// Provisions pour risques et charges.
    Provisions,
    /// Dettes financières.
    LongTermDebt,
    /// Dettes d'exploitation et diverses.
    ShortTermDebt,
    /// Concours bancaires courants.
    CashLiabilities,
}

impl SectionKind {
    /// All sections, in report order.
    pub const ALL: [Self; 9] = [
        Self::FixedAssets,
        Self::Inventory,
        Self::Receivables,
        Self::CashAssets,
        Self::Equity,
        Self::Provisions,
        Self::LongTermDebt,
        Self::ShortTermDebt,
        Self::CashLiabilities,
    ];

    /// Returns the side the section is presented on.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::FixedAssets | Self::Inventory | Self::Receivables | Self::CashAssets => {
                Side::Asset
            }
            Self::Equity
            | Self::Provisions
            | Self::LongTermDebt
            | Self::ShortTermDebt
            | Self::CashLiabilities => Side::Liability,
        }
    }

    /// Returns the regulatory heading of the section.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FixedAssets => "Actif immobilisé",
            Self::Inventory => "Stocks et en-cours",
            Self::Receivables => "Créances",
            Self::CashAssets => "Disponibilités",
            Self::Equity => "Capitaux propres",
            Self::Provisions => "Provisions pour risques et charges",
            Self::LongTermDebt => "Dettes financières",
            Self::ShortTermDebt => "Dettes d'exploitation et diverses",
            Self::CashLiabilities => "Concours bancaires courants",
        }
    }
}

/// Membership of one report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    /// Section.
    pub kind: SectionKind,
    /// Two-digit sub-classes routed to it.
    pub sub_classes: Vec<String>,
}

/// Display labels, resolved by longest prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTables {
    /// Sub-class -> label.
    pub sub_classes: BTreeMap<String, String>,
    /// Account prefix -> label.
    pub accounts: BTreeMap<String, String>,
}

impl Default for LabelTables {
    fn default() -> Self {
        Self {
            sub_classes: table(&[
                ("10", "Capital et réserves"),
                ("11", "Report à nouveau"),
                ("12", "Résultat de l'exercice"),
                ("13", "Subventions d'investissement"),
                ("14", "Provisions réglementées"),
                ("15", "Provisions pour risques et charges"),
                ("16", "Emprunts et dettes assimilées"),
                ("17", "Dettes rattachées à des participations"),
                ("18", "Comptes de liaison des établissements"),
                ("20", "Immobilisations incorporelles"),
                ("21", "Immobilisations corporelles"),
                ("22", "Immobilisations mises en concession"),
                ("23", "Immobilisations en cours"),
                ("26", "Participations et créances rattachées"),
                ("27", "Autres immobilisations financières"),
                ("28", "Amortissements des immobilisations"),
                ("29", "Dépréciations des immobilisations"),
                ("31", "Matières premières"),
                ("32", "Autres approvisionnements"),
                ("33", "En-cours de production de biens"),
                ("34", "En-cours de production de services"),
                ("35", "Stocks de produits"),
                ("36", "Stocks provenant d'immobilisations"),
                ("37", "Stocks de marchandises"),
                ("38", "Stocks en voie d'acheminement"),
                ("39", "Dépréciations des stocks et en-cours"),
                ("40", "Fournisseurs et comptes rattachés"),
                ("41", "Clients et comptes rattachés"),
                ("42", "Personnel et comptes rattachés"),
                ("43", "Sécurité sociale et autres organismes sociaux"),
                ("44", "État et autres collectivités publiques"),
                ("45", "Groupe et associés"),
                ("46", "Débiteurs divers et créditeurs divers"),
                ("47", "Comptes transitoires ou d'attente"),
                ("48", "Comptes de régularisation"),
                ("49", "Dépréciations des comptes de tiers"),
                ("50", "Valeurs mobilières de placement"),
                ("51", "Banques, établissements financiers et assimilés"),
                ("52", "Instruments de trésorerie"),
                ("53", "Caisse"),
                ("54", "Régies d'avances et accréditifs"),
                ("58", "Virements internes"),
                ("59", "Dépréciations des comptes financiers"),
                ("60", "Achats"),
                ("61", "Services extérieurs"),
                ("62", "Autres services extérieurs"),
                ("63", "Impôts, taxes et versements assimilés"),
                ("64", "Charges de personnel"),
                ("65", "Autres charges de gestion courante"),
                ("66", "Charges financières"),
                ("67", "Charges exceptionnelles"),
                ("68", "Dotations aux amortissements, dépréciations et provisions"),
                ("69", "Participation des salariés, impôts sur les bénéfices"),
                ("70", "Ventes de produits fabriqués, prestations de services, marchandises"),
                ("71", "Production stockée"),
                ("72", "Production immobilisée"),
                ("74", "Subventions d'exploitation"),
                ("75", "Autres produits de gestion courante"),
                ("76", "Produits financiers"),
                ("77", "Produits exceptionnels"),
                ("78", "Reprises sur amortissements, dépréciations et provisions"),
                ("79", "Transferts de charges"),
            ]),
            accounts: table(&[
                ("101", "Capital"),
                ("106", "Réserves"),
                ("108", "Compte de l'exploitant"),
                ("109", "Actionnaires : capital souscrit non appelé"),
                ("110", "Report à nouveau (solde créditeur)"),
                ("119", "Report à nouveau (solde débiteur)"),
                ("120", "Résultat de l'exercice (bénéfice)"),
                ("129", "Résultat de l'exercice (perte)"),
                ("164", "Emprunts auprès des établissements de crédit"),
                ("201", "Frais d'établissement"),
                ("205", "Concessions et droits similaires, brevets, licences"),
                ("207", "Fonds commercial"),
                ("211", "Terrains"),
                ("213", "Constructions"),
                ("215", "Installations techniques, matériel et outillage industriels"),
                ("218", "Autres immobilisations corporelles"),
                ("2182", "Matériel de transport"),
                ("2183", "Matériel de bureau et matériel informatique"),
                ("2184", "Mobilier"),
                ("261", "Titres de participation"),
                ("275", "Dépôts et cautionnements versés"),
                ("401", "Fournisseurs"),
                ("404", "Fournisseurs d'immobilisations"),
                ("408", "Fournisseurs - factures non parvenues"),
                ("411", "Clients"),
                ("416", "Clients douteux ou litigieux"),
                ("421", "Personnel - rémunérations dues"),
                ("431", "Sécurité sociale"),
                ("444", "État - impôts sur les bénéfices"),
                ("4456", "Taxes sur le chiffre d'affaires déductibles"),
                ("4457", "Taxes sur le chiffre d'affaires collectées"),
                ("455", "Associés - comptes courants"),
                ("512", "Banques"),
                ("519", "Concours bancaires courants"),
                ("530", "Caisse"),
                ("607", "Achats de marchandises"),
                ("641", "Rémunérations du personnel"),
                ("6811", "Dotations aux amortissements des immobilisations"),
                ("706", "Prestations de services"),
                ("707", "Ventes de marchandises"),
            ]),
        }
    }
}

/// Complete set of classification rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Numeric thresholds.
    pub thresholds: Thresholds,
    /// Class digit -> routing rule, for classes presented on the balance sheet.
    pub routing: BTreeMap<String, ClassRouting>,
    /// Equity prefixes presented on the asset side when carrying a debit balance.
    pub contra_equity_prefixes: Vec<String>,
    /// Trade sub-ledger prefixes.
    pub trade: TradeCodes,
    /// Net result classes.
    pub result: ResultRules,
    /// Depreciation tables.
    pub depreciation: DepreciationRules,
    /// Section membership.
    pub sections: Vec<SectionRule>,
    /// Display labels.
    pub labels: LabelTables,
}

impl Default for RuleSet {
    fn default() -> Self {
        let mut routing = BTreeMap::new();
        routing.insert("1".to_string(), ClassRouting::Equity);
        routing.insert("2".to_string(), ClassRouting::PositiveAsset);
        routing.insert("3".to_string(), ClassRouting::PositiveAsset);
        routing.insert("4".to_string(), ClassRouting::SignDependent);
        routing.insert("5".to_string(), ClassRouting::SignDependent);

        let third_party = &["40", "41", "42", "43", "44", "45", "46", "47", "48"];
        let cash = &["50", "51", "52", "53", "54", "58"];
        let sections = vec![
            section(
                SectionKind::FixedAssets,
                &["10", "20", "21", "22", "23", "26", "27"],
            ),
            section(
                SectionKind::Inventory,
                &["31", "32", "33", "34", "35", "36", "37", "38"],
            ),
            section(SectionKind::Receivables, third_party),
            section(SectionKind::CashAssets, cash),
            section(SectionKind::Equity, &["10", "11", "12", "13", "14"]),
            section(SectionKind::Provisions, &["15"]),
            section(SectionKind::LongTermDebt, &["16", "17", "18"]),
            section(SectionKind::ShortTermDebt, third_party),
            section(SectionKind::CashLiabilities, cash),
        ];

        Self {
            thresholds: Thresholds::default(),
            routing,
            contra_equity_prefixes: strings(&["109"]),
            trade: TradeCodes::default(),
            result: ResultRules::default(),
            depreciation: DepreciationRules::default(),
            sections,
            labels: LabelTables::default(),
        }
    }
}

impl RuleSet {
    /// Parses and validates a rule set written in TOML.
    ///
    /// Tables absent from the text keep their built-in PCG values.
    pub fn from_toml_str(text: &str) -> Result<Self, RulesError> {
        let rules: Self = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parses and validates a rule set written in JSON.
    pub fn from_json_str(text: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(text)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Replaces the thresholds that are given.
    #[must_use]
    pub fn with_thresholds(mut self, epsilon: Option<Decimal>, tolerance: Option<Decimal>) -> Self {
        if let Some(epsilon) = epsilon {
            self.thresholds.epsilon = epsilon;
        }
        if let Some(tolerance) = tolerance {
            self.thresholds.tolerance = tolerance;
        }
        self
    }

    /// Checks the tables for internal consistency.
    pub fn validate(&self) -> Result<(), RulesError> {
        for (name, value) in [
            ("epsilon", self.thresholds.epsilon),
            ("tolerance", self.thresholds.tolerance),
        ] {
            if value < Decimal::ZERO {
                return Err(RulesError::NegativeThreshold { name, value });
            }
        }

        for key in self.routing.keys() {
            let class = parse_class_key(key)?;
            if self.is_result_class(class) {
                return Err(RulesError::OverlappingClass(class));
            }
        }

        for prefix in self
            .contra_equity_prefixes
            .iter()
            .chain([&self.trade.receivables, &self.trade.payables])
            .chain(&self.depreciation.class_prefixes)
        {
            check_prefix(prefix)?;
        }

        let depreciation = &self.depreciation;
        if !(1..=16).contains(&depreciation.code_width) {
            return Err(RulesError::InvalidCodeWidth(depreciation.code_width));
        }
        for (prefix, sub_class) in &depreciation.buckets {
            self.check_depreciation_prefix(prefix)?;
            check_sub_class(sub_class)?;
        }
        for (prefix, asset_prefix) in &depreciation.transforms {
            self.check_depreciation_prefix(prefix)?;
            check_prefix(asset_prefix)?;
        }
        for sub_class in &depreciation.fixed_asset_sub_classes {
            check_sub_class(sub_class)?;
        }

        let mut seen = BTreeSet::new();
        for rule in &self.sections {
            for sub_class in &rule.sub_classes {
                check_sub_class(sub_class)?;
                let side = rule.kind.side();
                if !seen.insert((side, sub_class.as_str())) {
                    return Err(RulesError::DuplicateSection {
                        side,
                        sub_class: sub_class.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns the routing rule of an account class.
    #[must_use]
    pub fn routing_for(&self, class: u8) -> Option<ClassRouting> {
        self.routing.get(&class.to_string()).copied()
    }

    /// Returns true if the class feeds the net result.
    #[must_use]
    pub fn is_result_class(&self, class: u8) -> bool {
        self.result.revenue_classes.contains(&class) || self.result.expense_classes.contains(&class)
    }

    /// Returns true if the account is a depreciation/provision account.
    #[must_use]
    pub fn is_depreciation_account(&self, code: &AccountCode) -> bool {
        self.depreciation
            .class_prefixes
            .iter()
            .any(|prefix| code.has_prefix(prefix))
    }

    /// Returns the asset sub-class bucket a depreciation account offsets.
    #[must_use]
    pub fn depreciation_bucket(&self, code: &AccountCode) -> Option<&str> {
        longest_prefix(&self.depreciation.buckets, code).map(|(_, bucket)| bucket.as_str())
    }

    /// Returns the normalized code of the asset account a depreciation account
    /// offsets: the depreciation prefix is swapped for the asset prefix, the
    /// remaining digits are kept and the result is padded.
    #[must_use]
    pub fn offset_asset_code(&self, code: &AccountCode) -> Option<String> {
        let (prefix, asset_prefix) = longest_prefix(&self.depreciation.transforms, code)?;
        let rest = &code.as_str()[prefix.len()..];
        Some(normalize_code(
            &format!("{asset_prefix}{rest}"),
            self.depreciation.code_width,
        ))
    }

    /// Returns true if the equity account is presented on the asset side
    /// when it carries a debit balance.
    #[must_use]
    pub fn is_contra_equity(&self, code: &AccountCode) -> bool {
        self.contra_equity_prefixes
            .iter()
            .any(|prefix| code.has_prefix(prefix))
    }

    /// Returns the trade sub-ledger an account belongs to, if any.
    #[must_use]
    pub fn trade_ledger(&self, code: &AccountCode) -> Option<TradeLedger> {
        if code.has_prefix(&self.trade.receivables) {
            Some(TradeLedger::Receivables)
        } else if code.has_prefix(&self.trade.payables) {
            Some(TradeLedger::Payables)
        } else {
            None
        }
    }

    /// Returns the section accepting a sub-class on the given side.
    #[must_use]
    pub fn section_for(&self, side: Side, sub_class: &str) -> Option<SectionKind> {
        self.sections
            .iter()
            .find(|rule| {
                rule.kind.side() == side && rule.sub_classes.iter().any(|s| s == sub_class)
            })
            .map(|rule| rule.kind)
    }

    /// Returns true if accounts of the sub-class get a net book value.
    #[must_use]
    pub fn is_fixed_asset_sub_class(&self, sub_class: &str) -> bool {
        self.depreciation
            .fixed_asset_sub_classes
            .iter()
            .any(|s| s == sub_class)
    }

    fn check_depreciation_prefix(&self, prefix: &str) -> Result<(), RulesError> {
        check_prefix(prefix)?;
        let inside = self
            .depreciation
            .class_prefixes
            .iter()
            .any(|class_prefix| prefix.starts_with(class_prefix.as_str()));
        if inside {
            Ok(())
        } else {
            Err(RulesError::NotADepreciationPrefix(prefix.to_string()))
        }
    }
}

fn longest_prefix<'a>(
    table: &'a BTreeMap<String, String>,
    code: &AccountCode,
) -> Option<(&'a str, &'a String)> {
    table
        .iter()
        .filter(|(prefix, _)| code.has_prefix(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(prefix, value)| (prefix.as_str(), value))
}

fn parse_class_key(key: &str) -> Result<u8, RulesError> {
    match key.as_bytes() {
        [digit] if digit.is_ascii_digit() => Ok(digit - b'0'),
        _ => Err(RulesError::InvalidClassKey(key.to_string())),
    }
}

fn check_prefix(prefix: &str) -> Result<(), RulesError> {
    if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(RulesError::InvalidPrefix(prefix.to_string()))
    }
}

fn check_sub_class(sub_class: &str) -> Result<(), RulesError> {
    if sub_class.len() == 2 && sub_class.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(RulesError::InvalidSubClass(sub_class.to_string()))
    }
}

fn section(kind: SectionKind, sub_classes: &[&str]) -> SectionRule {
    SectionRule {
        kind,
        sub_classes: strings(sub_classes),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
