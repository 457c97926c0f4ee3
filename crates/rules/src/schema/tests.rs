//! Tests for schema types.

use super::*;

const RULES_YAML: &str = r#"
defaultReviewer: me
rules:
- filter:
    kind: SummonPlatform
    metadata.namespace: summon-dev
  skipReview: true
  autoMerge: true
- filter:
    kind: SummonPlatform
    metadata.namespace: summon-qa
  change:
    spec.version: .*
"#;

fn pattern(source: &str) -> Pattern {
    Pattern::new(source).unwrap()
}

#[test]
fn parse_rule_set() {
    let rules: RuleSet = serde_yaml::from_str(RULES_YAML).unwrap();
    assert_eq!(rules.default_reviewer, "me");
    assert_eq!(rules.match_mode, MatchMode::Search);

    let expected = vec![
        Rule::default()
            .with_filter("kind", pattern("SummonPlatform"))
            .with_filter("metadata.namespace", pattern("summon-dev"))
            .with_grants(true, true),
        Rule::default()
            .with_filter("kind", pattern("SummonPlatform"))
            .with_filter("metadata.namespace", pattern("summon-qa"))
            .with_change("spec.version", pattern(".*")),
    ];
    assert_eq!(rules.items, expected);
}

#[test]
fn filter_order_is_kept() {
    let rules: RuleSet = serde_yaml::from_str(RULES_YAML).unwrap();
    let paths: Vec<_> = rules.items[0].filter.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["kind", "metadata.namespace"]);
}

#[test]
fn match_mode_full() {
    let rules: RuleSet =
        serde_yaml::from_str("defaultReviewer: me\nmatchMode: full\nrules: []\n").unwrap();
    assert_eq!(rules.match_mode, MatchMode::Full);
}

#[test]
fn rules_key_is_optional() {
    let rules: RuleSet = serde_yaml::from_str("defaultReviewer: me\n").unwrap();
    assert!(rules.items.is_empty());
}

#[test]
fn unknown_fields_are_rejected() {
    let err = serde_yaml::from_str::<RuleSet>(
        "defaultReviewer: me\nrules:\n- filter: {kind: X}\n  autoMrege: true\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("autoMrege"), "got: {err}");
}

#[test]
fn invalid_regex_is_a_parse_error() {
    let err = serde_yaml::from_str::<RuleSet>(
        "defaultReviewer: me\nrules:\n- filter: {kind: \"Summon(\"}\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("invalid pattern"), "got: {err}");
}

#[test]
fn scalar_patterns_are_accepted() {
    let rules: RuleSet = serde_yaml::from_str(
        "defaultReviewer: me\nrules:\n- filter: {spec.replicas: 3, spec.enabled: true}\n",
    )
    .unwrap();
    let filter = &rules.items[0].filter;
    assert_eq!(filter["spec.replicas"].as_str(), "3");
    assert_eq!(filter["spec.enabled"].as_str(), "true");
}

#[test]
fn pattern_modes() {
    let p = pattern("summon-qa");
    assert!(p.is_match("summon-qa", MatchMode::Search));
    assert!(p.is_match("summon-qa-2", MatchMode::Search));
    assert!(p.is_match("summon-qa", MatchMode::Full));
    assert!(!p.is_match("summon-qa-2", MatchMode::Full));

    let alt = pattern("summon-(dev|qa)");
    assert!(alt.is_match("summon-dev", MatchMode::Full));
    assert!(!alt.is_match("xsummon-dev", MatchMode::Full));

    // Alternation must stay inside the anchors.
    let bare_alt = pattern("dev|qa");
    assert!(!bare_alt.is_match("dev-extra", MatchMode::Full));
}

#[test]
fn default_reviewer_substitution() {
    let rules = RuleSet::new(vec![Rule::default(), Rule::for_reviewer("alice")], "fallback");
    assert_eq!(rules.reviewer_for(&rules.items[0]), "fallback");
    assert_eq!(rules.reviewer_for(&rules.items[1]), "alice");

    let fallback = rules.default_reviewer_rule();
    assert_eq!(fallback.reviewer, "fallback");
    assert!(fallback.is_unconditional());
    assert!(!fallback.skip_review);
    assert!(!fallback.auto_merge);
}

#[test]
fn serialization_round_trips_sources() {
    let rules: RuleSet = serde_yaml::from_str(RULES_YAML).unwrap();
    let yaml = serde_yaml::to_string(&rules).unwrap();
    assert!(!yaml.contains("  reviewer:"));
    let reparsed: RuleSet = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(reparsed, rules);
}
