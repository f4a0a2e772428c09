//! Closed enums for the text-typed columns.
//!
//! Persisted values are plain strings. Parsing never fails: unknown text degrades to a
//! documented fallback variant so a single bad row cannot break a batch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money coming in
    Income,
    /// Money going out; also the fallback for unrecognized text
    #[default]
    Expense,
}

impl TransactionKind {
    /// Parses persisted text, case-insensitively. Unknown values read as [`Self::Expense`].
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("INCOME") {
            Self::Income
        } else {
            Self::Expense
        }
    }

    /// Text stored in the database.
    #[must_use]
    pub const fn as_db(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}

/// How a rule's pattern is compared against a description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStrategy {
    /// Substring test; also the fallback for unrecognized text
    #[default]
    Contains,
    /// Prefix test
    StartsWith,
    /// Case-insensitive regular expression, matched anywhere
    Regex,
}

impl MatchStrategy {
    /// Parses persisted text, case-insensitively. Unknown values read as [`Self::Contains`].
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("STARTS_WITH") {
            Self::StartsWith
        } else if value.eq_ignore_ascii_case("REGEX") {
            Self::Regex
        } else {
            Self::Contains
        }
    }

    /// Text stored in the database.
    #[must_use]
    pub const fn as_db(self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::Regex => "REGEX",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}
