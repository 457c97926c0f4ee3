//! Policy rules and the rule set loaded from `.gitops/rules.yml`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{MatchMode, Pattern};

/// A declarative review rule.
///
/// `filter` predicates are checked against the base side of a document;
/// `change` predicates only hold for paths whose value changed, and are
/// checked against the new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Rule {
    /// Path → pattern, all of which must match the base document.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub filter: IndexMap<String, Pattern>,
    /// Path → pattern, each of which must name a changed value matching the head document.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub change: IndexMap<String, Pattern>,
    /// User login or `org/team` slug whose approval satisfies the rule.
    /// Empty means the rule set's default reviewer.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reviewer: String,
    /// Review may be skipped when every triggered rule grants it.
    pub skip_review: bool,
    /// The change may be merged automatically when every triggered rule grants it.
    pub auto_merge: bool,
}

impl Rule {
    /// A rule with no predicates that requires `reviewer`.
    pub fn for_reviewer(reviewer: impl Into<String>) -> Self {
        Self {
            reviewer: reviewer.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, path: impl Into<String>, pattern: Pattern) -> Self {
        self.filter.insert(path.into(), pattern);
        self
    }

    pub fn with_change(mut self, path: impl Into<String>, pattern: Pattern) -> Self {
        self.change.insert(path.into(), pattern);
        self
    }

    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = reviewer.into();
        self
    }

    pub fn with_grants(mut self, skip_review: bool, auto_merge: bool) -> Self {
        self.skip_review = skip_review;
        self.auto_merge = auto_merge;
        self
    }

    /// Whether this rule has neither filter nor change predicates.
    pub fn is_unconditional(&self) -> bool {
        self.filter.is_empty() && self.change.is_empty()
    }
}

/// Ordered rule list plus the reviewer used when nothing classifies a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleSet {
    /// Rules in declaration order; the first match for a document wins.
    #[serde(default, rename = "rules")]
    pub items: Vec<Rule>,
    pub default_reviewer: String,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl RuleSet {
    pub fn new(items: Vec<Rule>, default_reviewer: impl Into<String>) -> Self {
        Self {
            items,
            default_reviewer: default_reviewer.into(),
            match_mode: MatchMode::default(),
        }
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Synthetic fallback rule: the default reviewer, no grants.
    pub fn default_reviewer_rule(&self) -> Rule {
        Rule::for_reviewer(self.default_reviewer.clone())
    }

    /// Reviewer required by `rule`, substituting the default when unset.
    pub fn reviewer_for<'a>(&'a self, rule: &'a Rule) -> &'a str {
        if rule.reviewer.is_empty() {
            &self.default_reviewer
        } else {
            &rule.reviewer
        }
    }
}
