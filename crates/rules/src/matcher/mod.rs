//! Rule matching for reviewable files.
//!
//! Each document of a file is compared positionally against the document
//! at the same index on the other side. For every changed document the
//! rule list is scanned in declaration order and the first rule whose
//! filter and change predicates both hold is taken.
//!
//! A file falls back to the default reviewer when:
//! - either side is absent (added or deleted file)
//! - the two sides hold different numbers of documents
//! - no changed document is classified by any rule

mod predicates;

use tracing::debug;

use crate::file::ReviewableFile;
use crate::flatten::FlatKeyMap;
use crate::schema::{Rule, RuleSet};

use predicates::rule_matches;

/// Index of the first rule that classifies the edit from `base` to `head`.
pub fn first_match(rules: &RuleSet, base: &FlatKeyMap, head: &FlatKeyMap) -> Option<usize> {
    rules
        .items
        .iter()
        .position(|rule| rule_matches(rule, base, head, rules.match_mode))
}

/// Rules triggered by one file: one first-match per changed document, or
/// the default-reviewer rule when nothing classifies the change.
///
/// Duplicates are kept; callers aggregate raw matches across files.
pub fn match_rules(rules: &RuleSet, file: &ReviewableFile) -> Vec<Rule> {
    let (base, head) = match (&file.base, &file.head) {
        (Some(base), Some(head)) => (base.documents(), head.documents()),
        _ => {
            debug!(path = %file.path(), "file added or deleted, requiring default reviewer");
            return vec![rules.default_reviewer_rule()];
        }
    };

    if base.len() != head.len() {
        debug!(
            path = %file.path(),
            base_documents = base.len(),
            head_documents = head.len(),
            "document count changed, requiring default reviewer"
        );
        return vec![rules.default_reviewer_rule()];
    }

    let mut matched = Vec::new();
    for (index, (base_keys, head_keys)) in base.iter().zip(head).enumerate() {
        if base_keys == head_keys {
            continue;
        }
        match first_match(rules, base_keys, head_keys) {
            Some(rule_index) => {
                debug!(path = %file.path(), document = index, rule_index, "document matched rule");
                matched.push(rules.items[rule_index].clone());
            }
            None => {
                debug!(path = %file.path(), document = index, "document matched no rule");
            }
        }
    }

    if matched.is_empty() {
        debug!(path = %file.path(), "no rules matched, requiring default reviewer");
        return vec![rules.default_reviewer_rule()];
    }
    matched
}

// ── Tests ───────────────────────────────────────────────────────────
