//! Ledger entry domain types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// A single normalized ledger row, as handed over by the parsing layer.
///
/// Amounts are optional: a missing or unreadable debit/credit counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Account code (PCG), e.g. `512000`.
    #[serde(default)]
    pub account_code: String,
    /// Optional account label from the source file.
    #[serde(default)]
    pub account_label: Option<String>,
    /// Debit amount.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub debit: Option<Decimal>,
    /// Credit amount.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub credit: Option<Decimal>,
}

impl LedgerEntry {
    /// Creates an entry with both amounts set.
    #[must_use]
    pub fn new(account_code: impl Into<String>, debit: Decimal, credit: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            account_label: None,
            debit: Some(debit),
            credit: Some(credit),
        }
    }

    /// Sets the account label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.account_label = Some(label.into());
        self
    }

    /// Returns the debit amount, zero when absent.
    #[must_use]
    pub fn debit_or_zero(&self) -> Decimal {
        self.debit.unwrap_or(Decimal::ZERO)
    }

    /// Returns the credit amount, zero when absent.
    #[must_use]
    pub fn credit_or_zero(&self) -> Decimal {
        self.credit.unwrap_or(Decimal::ZERO)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(Decimal),
    Text(String),
    Other(IgnoredAny),
}

/// Accepts numbers, numeric strings (`"1 234,56"` included) and anything else
/// as "absent".
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => Some(value),
        RawAmount::Text(text) => parse_amount(&text),
        RawAmount::Other(_) => None,
    })
}

/// Parses a textual amount written with either `.` or `,` as decimal separator.
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_numbers_and_strings() {
        let entries: Vec<LedgerEntry> = serde_json::from_str(
            r#"[
                {"accountCode": "512", "accountLabel": "Banque", "debit": 1000, "credit": 0},
                {"accountCode": "401", "debit": "0", "credit": "1 234,56"},
                {"accountCode": "411", "debit": 12.5}
            ]"#,
        )
        .unwrap();

        assert_eq!(entries[0].debit, Some(dec!(1000)));
        assert_eq!(entries[0].account_label.as_deref(), Some("Banque"));
        assert_eq!(entries[1].credit, Some(dec!(1234.56)));
        assert_eq!(entries[2].debit, Some(dec!(12.5)));
        assert_eq!(entries[2].credit, None);
        assert_eq!(entries[2].credit_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn test_invalid_amounts_become_absent() {
        let entries: Vec<LedgerEntry> = serde_json::from_str(
            r#"[
                {"accountCode": "512", "debit": "abc", "credit": null},
                {"accountCode": "512", "debit": true, "credit": {"x": 1}},
                {"debit": 10}
            ]"#,
        )
        .unwrap();

        assert_eq!(entries[0].debit, None);
        assert_eq!(entries[0].credit, None);
        assert_eq!(entries[1].debit, None);
        assert_eq!(entries[1].credit, None);
        assert_eq!(entries[2].account_code, "");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1\u{a0}000,50"), Some(dec!(1000.50)));
        assert_eq!(parse_amount("-42.1"), Some(dec!(-42.1)));
        assert_eq!(parse_amount("  "), None);
        assert_eq!(parse_amount("12a"), None);
    }
}
