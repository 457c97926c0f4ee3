//! Filter and change predicates evaluated against one document pair.
//!
//! Filters narrow which documents a rule applies to, using the base side.
//! Change predicates narrow which edits it covers: each named path must
//! exist on both sides, differ, and match on the head side.

use indexmap::IndexMap;

use crate::flatten::FlatKeyMap;
use crate::schema::{MatchMode, Pattern, Rule};

// ── Predicates ──────────────────────────────────────────────────────

/// Every filter path exists in `base` and its value matches.
pub(super) fn filter_holds(
    filter: &IndexMap<String, Pattern>,
    base: &FlatKeyMap,
    mode: MatchMode,
) -> bool {
    filter.iter().all(|(path, pattern)| match base.get(path) {
        Some(value) => pattern.is_match(value, mode),
        None => false,
    })
}

/// Every change path exists on both sides with differing values, and the
/// new value matches.
pub(super) fn change_holds(
    change: &IndexMap<String, Pattern>,
    base: &FlatKeyMap,
    head: &FlatKeyMap,
    mode: MatchMode,
) -> bool {
    change.iter().all(|(path, pattern)| match (base.get(path), head.get(path)) {
        (Some(old), Some(new)) => old != new && pattern.is_match(new, mode),
        _ => false,
    })
}

/// Whether `rule` classifies the edit from `base` to `head`. Unchanged
/// documents never match.
pub(super) fn rule_matches(rule: &Rule, base: &FlatKeyMap, head: &FlatKeyMap, mode: MatchMode) -> bool {
    if base == head {
        return false;
    }
    filter_holds(&rule.filter, base, mode) && change_holds(&rule.change, base, head, mode)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&str, &str)]) -> FlatKeyMap {
        pairs.iter().copied().collect()
    }

    fn patterns(pairs: &[(&str, &str)]) -> IndexMap<String, Pattern> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Pattern::new(v).unwrap()))
            .collect()
    }

    #[test]
    fn filter_requires_every_path() {
        let base = keys(&[("kind", "SummonPlatform"), ("metadata.namespace", "summon-qa")]);
        let filter = patterns(&[("kind", "SummonPlatform"), ("metadata.namespace", "summon-qa")]);
        assert!(filter_holds(&filter, &base, MatchMode::Search));

        let missing = patterns(&[("kind", "SummonPlatform"), ("metadata.name", ".*")]);
        assert!(!filter_holds(&missing, &base, MatchMode::Search));

        let mismatch = patterns(&[("metadata.namespace", "summon-dev")]);
        assert!(!filter_holds(&mismatch, &base, MatchMode::Search));
    }

    #[test]
    fn filter_reads_base_side_only() {
        let base = keys(&[("metadata.namespace", "summon-dev")]);
        let head = keys(&[("metadata.namespace", "summon-qa")]);
        let rule = Rule::default().with_filter("metadata.namespace", Pattern::new("summon-qa").unwrap());
        assert!(!rule_matches(&rule, &base, &head, MatchMode::Search));
    }

    #[test]
    fn change_requires_differing_values() {
        let change = patterns(&[("spec.version", ".*")]);
        let base = keys(&[("spec.version", "base")]);
        assert!(change_holds(&change, &base, &keys(&[("spec.version", "head")]), MatchMode::Search));
        assert!(!change_holds(&change, &base, &base, MatchMode::Search));
    }

    #[test]
    fn change_requires_both_sides() {
        let change = patterns(&[("spec.version", ".*")]);
        let with = keys(&[("spec.version", "1")]);
        let without = keys(&[("other", "1")]);
        assert!(!change_holds(&change, &without, &with, MatchMode::Search));
        assert!(!change_holds(&change, &with, &without, MatchMode::Search));
    }

    #[test]
    fn change_pattern_checks_new_value() {
        let change = patterns(&[("spec.version", "^v2\\.")]);
        let base = keys(&[("spec.version", "v1.9")]);
        assert!(change_holds(&change, &base, &keys(&[("spec.version", "v2.0")]), MatchMode::Search));
        assert!(!change_holds(&change, &keys(&[("spec.version", "v2.0")]), &keys(&[("spec.version", "v1.9")]), MatchMode::Search));
    }

    #[test]
    fn empty_rule_matches_any_change() {
        let rule = Rule::default();
        let base = keys(&[("a", "1")]);
        assert!(rule_matches(&rule, &base, &keys(&[("a", "2")]), MatchMode::Search));
        assert!(!rule_matches(&rule, &base, &base, MatchMode::Search));
    }

    #[test]
    fn full_mode_anchors_patterns() {
        let base = keys(&[("metadata.namespace", "summon-qa-east")]);
        let filter = patterns(&[("metadata.namespace", "summon-qa")]);
        assert!(filter_holds(&filter, &base, MatchMode::Search));
        assert!(!filter_holds(&filter, &base, MatchMode::Full));
    }
}
