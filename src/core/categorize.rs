//! Categorization engine - maps a free-text description to a category using user rules.
//!
//! Rules are user data of unknown quality, so evaluation never fails: disabled rules, blank
//! patterns and regexes that do not compile simply never match. Matching is case-insensitive
//! using Unicode default case folding, which does not depend on the process locale.
//!
//! Rules are tried by priority (highest first), then by id (highest first), and the first
//! match wins. Everything here is pure; a [`Categorizer`] can be shared across threads.

use crate::core::kinds::MatchStrategy;
use crate::entities::categorization_rule;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use tracing::debug;

/// How one compiled rule tests a folded description.
#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    StartsWith(String),
    Regex(Regex),
    Never,
}

impl Matcher {
    fn compile(rule: &categorization_rule::Model) -> Self {
        let pattern = rule.pattern.trim();
        if pattern.is_empty() {
            return Self::Never;
        }

        match rule.strategy() {
            MatchStrategy::Contains => Self::Contains(fold(pattern)),
            MatchStrategy::StartsWith => Self::StartsWith(fold(pattern)),
            MatchStrategy::Regex => {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Self::Regex(regex),
                    Err(e) => {
                        debug!("Rule {} has an invalid regex, it will never match: {}", rule.id, e);
                        Self::Never
                    }
                }
            }
        }
    }

    fn is_match(&self, folded_description: &str) -> bool {
        match self {
            Self::Contains(needle) => folded_description.contains(needle.as_str()),
            Self::StartsWith(prefix) => folded_description.starts_with(prefix.as_str()),
            Self::Regex(regex) => regex.is_match(folded_description),
            Self::Never => false,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule_id: i64,
    category_id: i64,
    matcher: Matcher,
}

/// A rule set sorted and compiled once, ready to categorize many descriptions.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: Vec<CompiledRule>,
}

impl Categorizer {
    /// Keeps the enabled rules, orders them for evaluation, and compiles their patterns.
    #[must_use]
    pub fn new(rules: &[categorization_rule::Model]) -> Self {
        let mut enabled: Vec<&categorization_rule::Model> =
            rules.iter().filter(|rule| rule.enabled).collect();
        enabled.sort_by(|a, b| evaluation_order(a, b));

        let rules = enabled
            .into_iter()
            .map(|rule| CompiledRule {
                rule_id: rule.id,
                category_id: rule.category_id,
                matcher: Matcher::compile(rule),
            })
            .collect();

        Self { rules }
    }

    /// Category of the first rule matching `description`, if any.
    #[must_use]
    pub fn resolve(&self, description: &str) -> Option<i64> {
        let folded = fold(description);
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(&folded))
            .map(|rule| {
                debug!("Description matched rule {}", rule.rule_id);
                rule.category_id
            })
    }

    /// Number of enabled rules taking part in evaluation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no enabled rule is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Resolves the category for a single description.
///
/// For many descriptions against the same rules, build a [`Categorizer`] once instead.
#[must_use]
pub fn resolve_category(description: &str, rules: &[categorization_rule::Model]) -> Option<i64> {
    Categorizer::new(rules).resolve(description)
}

/// Priority descending, then id descending (newest rule wins a tie).
fn evaluation_order(a: &categorization_rule::Model, b: &categorization_rule::Model) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| b.id.cmp(&a.id))
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}
