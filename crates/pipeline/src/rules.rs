//! Label-generating rules and the ordered registry that evaluates them.
//!
//! A [`RuleSet`] is built once at startup and shared read-only by every event
//! handler. Rules are pure: they inspect an [`Issue`] and return label names;
//! they never mutate the issue and never perform I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Issue, LabelName};

/// A pure function from an issue to the labels it should carry.
pub trait Rule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Labels this rule wants attached to `issue`, in order.
    fn labels(&self, issue: &Issue) -> Vec<LabelName>;
}

/// A closure-backed rule.
pub struct FnRule<F> {
    name: String,
    func: F,
}

impl<F> FnRule<F>
where
    F: Fn(&Issue) -> Vec<LabelName> + Send + Sync,
{
    /// Wraps `func` under `name`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Issue) -> Vec<LabelName> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self, issue: &Issue) -> Vec<LabelName> {
        (self.func)(issue)
    }
}

// ---------------------------------------------------------------------------
// Keyword rules
// ---------------------------------------------------------------------------

/// Which part of the issue a [`KeywordRule`] inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    /// The issue title only.
    #[default]
    Title,
    /// The issue body only.
    Body,
    /// Either the title or the body.
    TitleOrBody,
}

/// Attaches `label` when any keyword occurs in the chosen field.
///
/// Matching is a case-insensitive substring search. The label is emitted at
/// most once regardless of how many keywords match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Label to attach on a match.
    pub label: LabelName,
    /// Keywords searched for; matched case-insensitively.
    pub keywords: Vec<String>,
    /// Field to search.
    #[serde(default)]
    pub field: MatchField,
}

impl KeywordRule {
    /// Creates a title keyword rule. Returns `None` if `label` is empty.
    pub fn title(label: &str, keywords: &[&str]) -> Option<Self> {
        Some(Self {
            label: LabelName::new(label)?,
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            field: MatchField::Title,
        })
    }

    fn matches(&self, issue: &Issue) -> bool {
        let haystack = match self.field {
            MatchField::Title => issue.title_str().to_lowercase(),
            MatchField::Body => issue.body_str().to_lowercase(),
            MatchField::TitleOrBody => {
                format!("{}\n{}", issue.title_str(), issue.body_str()).to_lowercase()
            }
        };
        self.keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| haystack.contains(&k.to_lowercase()))
    }
}

impl Rule for KeywordRule {
    fn name(&self) -> &str {
        self.label.as_str()
    }

    fn labels(&self, issue: &Issue) -> Vec<LabelName> {
        if self.matches(issue) {
            vec![self.label.clone()]
        } else {
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered collection of rules, evaluated in registration order.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in title keyword rules.
    pub fn default_rules() -> Self {
        let builtin = [
            ("kind/bug", &["bug", "panic", "fail", "error", "crash"][..]),
            ("kind/feature", &["feature request", "[feature]"][..]),
            ("kind/proposal", &["proposal"][..]),
            ("kind/question", &["question", "how to"][..]),
            ("areas/docs", &["docs", "documentation", "readme"][..]),
            ("areas/test", &["test", "flaky"][..]),
        ];
        builtin
            .into_iter()
            .filter_map(|(label, keywords)| KeywordRule::title(label, keywords))
            .fold(Self::new(), |set, rule| set.with_rule(rule))
    }

    /// Appends `rule` and returns the set, for builder-style construction.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.register(rule);
        self
    }

    /// Appends `rule` after every rule registered so far.
    pub fn register(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Concatenates the output of every rule, preserving registration order.
    pub fn evaluate(&self, issue: &Issue) -> Vec<LabelName> {
        self.rules.iter().flat_map(|r| r.labels(issue)).collect()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
