//! Account codes of the French chart of accounts (PCG).
//!
//! The first digit of a code is its class (1 = equity, 2 = fixed assets, ...),
//! the first two digits its sub-class. Codes are compared as text so that
//! leading zeros and sub-ledger suffixes are preserved as given.

use serde::{Deserialize, Serialize};

/// A trimmed, non-empty account code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCode(String);

impl AccountCode {
    /// Parses a raw code, trimming surrounding whitespace.
    ///
    /// Returns `None` for an empty or blank code.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the class digit, if the code starts with a digit.
    #[must_use]
    pub fn class(&self) -> Option<u8> {
        self.0
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| u8::try_from(d).ok())
    }

    /// Returns the two-digit sub-class, if the code starts with two digits.
    #[must_use]
    pub fn sub_class(&self) -> Option<&str> {
        let prefix = self.0.get(..2)?;
        prefix
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then_some(prefix)
    }

    /// Returns true if the code starts with `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Returns the canonical form of the code at `width` digits.
    ///
    /// Shorter codes are right-padded with `0`; longer codes lose trailing
    /// zeros until they reach `width`. `213`, `2130` and `21300000` all
    /// normalize to `213000` at width 6.
    #[must_use]
    pub fn normalized(&self, width: usize) -> String {
        normalize_code(&self.0, width)
    }
}

/// Normalizes a raw code string the same way as [`AccountCode::normalized`].
#[must_use]
pub fn normalize_code(code: &str, width: usize) -> String {
    let mut normalized = code.to_string();
    while normalized.len() > width && normalized.ends_with('0') {
        normalized.pop();
    }
    while normalized.len() < width {
        normalized.push('0');
    }
    normalized
}

impl std::fmt::Display for AccountCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
