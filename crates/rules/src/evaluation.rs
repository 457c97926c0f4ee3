//! Caller-side evaluation pipeline.
//!
//! Drives the engine end to end for one pull request:
//! 1. [`extract`](crate::diff::extract) reviewable files from the parsed diff
//! 2. [`fetch_contents`] for every present side through a [`ContentFetcher`]
//! 3. [`parse_contents`] into flattened documents
//! 4. [`match_files`] against the rule set
//! 5. [`reduce`](crate::reducer::reduce) with the current reviews
//!
//! Only step 2 suspends; matching and reduction are in-memory.

use review_gate_core::{GateConfig, Review};
use tracing::{debug, info};

use crate::diff::{extract, FileDiff};
use crate::error::{GateError, Result};
use crate::fetch::{ContentFetcher, ContentKey};
use crate::file::{is_structured_path, ReviewableFile};
use crate::loader::parse_rules;
use crate::matcher::match_rules;
use crate::reducer::{reduce, PolicyDecision, TeamMembership};
use crate::schema::{Rule, RuleSet};

/// Fetch the raw bytes of every present side of every file.
///
/// Non-YAML paths are skipped: they are never decoded, so their content
/// cannot influence matching.
pub async fn fetch_contents(files: &mut [ReviewableFile], fetcher: &dyn ContentFetcher) -> Result<()> {
    for file in files.iter_mut() {
        let (owner, repo) = (file.owner.clone(), file.repo.clone());
        for side in file.sides_mut() {
            if !is_structured_path(side.path()) {
                debug!(path = %side.path(), "not a YAML file, skipping fetch");
                continue;
            }
            let key = ContentKey::new(&owner, &repo, side.path(), side.revision());
            let content = fetcher.fetch(&key).await.map_err(|source| GateError::Fetch {
                path: side.path().to_string(),
                revision: side.revision().to_string(),
                source,
            })?;
            side.set_content(content);
        }
    }
    Ok(())
}

/// Decode every fetched side into flattened documents.
pub fn parse_contents(files: &mut [ReviewableFile]) -> Result<()> {
    files.iter_mut().try_for_each(ReviewableFile::parse)
}

/// Extract, fetch and parse the files touched by a diff.
pub async fn prepare_files(
    diffs: &[FileDiff],
    owner: &str,
    repo: &str,
    head_revision: &str,
    base_revision: &str,
    fetcher: &dyn ContentFetcher,
) -> Result<Vec<ReviewableFile>> {
    let mut files = extract(diffs, owner, repo, head_revision, base_revision);
    fetch_contents(&mut files, fetcher).await?;
    parse_contents(&mut files)?;
    info!(owner, repo, head = head_revision, base = base_revision, files = files.len(), "prepared files");
    Ok(files)
}

/// Raw rule matches across all files, in file order.
pub fn match_files(rules: &RuleSet, files: &[ReviewableFile]) -> Vec<Rule> {
    files.iter().flat_map(|file| match_rules(rules, file)).collect()
}

/// Match prepared files and reduce the result against the reviews.
pub fn evaluate(
    rules: &RuleSet,
    files: &[ReviewableFile],
    reviews: &[Review],
    teams: &dyn TeamMembership,
) -> Result<PolicyDecision> {
    let triggered = match_files(rules, files);
    debug!(triggered = triggered.len(), "matched rules");
    reduce(rules, &triggered, reviews, teams)
}

/// Fetch and load the policy file at `revision` (normally the head of
/// [`GateConfig::rules_ref`], never the pull request's own base).
pub async fn load_rules(
    fetcher: &dyn ContentFetcher,
    config: &GateConfig,
    owner: &str,
    repo: &str,
    revision: &str,
) -> Result<RuleSet> {
    let key = ContentKey::new(owner, repo, &config.rules_path, revision);
    let content = fetcher.fetch(&key).await.map_err(|source| GateError::Fetch {
        path: config.rules_path.clone(),
        revision: revision.to_string(),
        source,
    })?;
    let rules = parse_rules(&content)?;
    info!(key = %key, rules = rules.items.len(), "loaded rules");
    Ok(rules)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::CachedFetcher;
    use crate::reducer::TeamDirectory;
    use async_trait::async_trait;
    use bytes::Bytes;
    use review_gate_core::CollaboratorError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RULES: &str = r#"
defaultReviewer: acme/platform
rules:
- filter:
    kind: SummonPlatform
    metadata.namespace: summon-dev
  change:
    spec.version: .*
  reviewer: dev-lead
  skipReview: true
  autoMerge: true
"#;

    const BASE: &str = "kind: SummonPlatform\nmetadata:\n  namespace: summon-dev\nspec:\n  version: \"1.0\"\n";
    const HEAD: &str = "kind: SummonPlatform\nmetadata:\n  namespace: summon-dev\nspec:\n  version: \"1.1\"\n";

    #[derive(Default)]
    struct RepoFetcher {
        files: HashMap<(String, String), Bytes>,
        calls: AtomicUsize,
    }

    impl RepoFetcher {
        fn with(mut self, path: &str, revision: &str, content: &str) -> Self {
            self.files
                .insert((path.to_string(), revision.to_string()), Bytes::from(content.to_string()));
            self
        }
    }

    #[async_trait]
    impl ContentFetcher for RepoFetcher {
        async fn fetch(&self, key: &ContentKey) -> std::result::Result<Bytes, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(&(key.path.clone(), key.revision.clone()))
                .cloned()
                .ok_or_else(|| CollaboratorError::not_found(key.to_string()))
        }
    }

    fn rules() -> RuleSet {
        parse_rules(RULES.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn version_bump_is_auto_mergeable() {
        let fetcher = RepoFetcher::default()
            .with("app-dev/platform.yml", "base", BASE)
            .with("app-dev/platform.yml", "head", HEAD);
        let diffs = [FileDiff::modified("app-dev/platform.yml")];
        let files = prepare_files(&diffs, "acme", "deploys", "head", "base", &fetcher).await.unwrap();

        let triggered = match_files(&rules(), &files);
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].reviewer, "dev-lead");

        let decision = evaluate(&rules(), &files, &[], &TeamDirectory::new()).unwrap();
        assert!(decision.auto_merge_granted);
        assert!(decision.skip_review_granted);
        assert_eq!(decision.pending_reviewers(), vec!["dev-lead"]);

        let decision = evaluate(&rules(), &files, &[Review::approved("dev-lead")], &TeamDirectory::new()).unwrap();
        assert!(decision.is_approved());
    }

    #[tokio::test]
    async fn added_file_needs_default_reviewer() {
        let fetcher = RepoFetcher::default().with("app-dev/new.yml", "head", HEAD);
        let diffs = [FileDiff::added("app-dev/new.yml")];
        let files = prepare_files(&diffs, "acme", "deploys", "head", "base", &fetcher).await.unwrap();

        let teams = TeamDirectory::new().with_member("acme/platform", "ops");
        let decision = evaluate(&rules(), &files, &[], &teams).unwrap();
        assert_eq!(decision.pending_reviewers(), vec!["acme/platform"]);
        assert!(!decision.auto_merge_granted);

        let decision = evaluate(&rules(), &files, &[Review::approved("ops")], &teams).unwrap();
        assert!(decision.is_approved());
        assert!(!decision.auto_merge_granted);
    }

    #[tokio::test]
    async fn non_yaml_files_are_not_fetched_and_need_default_reviewer() {
        let fetcher = RepoFetcher::default();
        let diffs = [FileDiff::modified("README.md")];
        let files = prepare_files(&diffs, "acme", "deploys", "head", "base", &fetcher).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(match_files(&rules(), &files), vec![rules().default_reviewer_rule()]);
    }

    #[tokio::test]
    async fn fetch_failure_names_path_and_revision() {
        let fetcher = RepoFetcher::default().with("app-dev/platform.yml", "head", HEAD);
        let diffs = [FileDiff::modified("app-dev/platform.yml")];
        let err = prepare_files(&diffs, "acme", "deploys", "head", "base", &fetcher).await.unwrap_err();
        match err {
            GateError::Fetch { path, revision, source } => {
                assert_eq!(path, "app-dev/platform.yml");
                assert_eq!(revision, "base");
                assert!(source.is_not_found());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn decode_failure_aborts_preparation() {
        let fetcher = RepoFetcher::default()
            .with("app-dev/platform.yml", "base", BASE)
            .with("app-dev/platform.yml", "head", "kind: [broken\n");
        let diffs = [FileDiff::modified("app-dev/platform.yml")];
        let err = prepare_files(&diffs, "acme", "deploys", "head", "base", &fetcher).await.unwrap_err();
        assert!(matches!(err, GateError::Decode { .. }));
    }

    #[tokio::test]
    async fn matches_concatenate_across_files() {
        let fetcher = RepoFetcher::default()
            .with("a/platform.yml", "base", BASE)
            .with("a/platform.yml", "head", HEAD)
            .with("b/platform.yml", "base", BASE)
            .with("b/platform.yml", "head", BASE);
        let diffs = [FileDiff::modified("a/platform.yml"), FileDiff::modified("b/platform.yml")];
        let files = prepare_files(&diffs, "acme", "deploys", "head", "base", &fetcher).await.unwrap();
        let reviewers: Vec<_> = match_files(&rules(), &files).into_iter().map(|r| r.reviewer).collect();
        assert_eq!(reviewers, vec!["dev-lead".to_string(), "acme/platform".to_string()]);
    }

    #[tokio::test]
    async fn load_rules_uses_configured_path() {
        let config = GateConfig::default();
        let fetcher = CachedFetcher::with_capacity(
            RepoFetcher::default().with(&config.rules_path, "main-sha", RULES),
            8,
        );
        let loaded = load_rules(&fetcher, &config, "acme", "deploys", "main-sha").await.unwrap();
        assert_eq!(loaded, rules());

        load_rules(&fetcher, &config, "acme", "deploys", "main-sha").await.unwrap();
        assert_eq!(fetcher.inner().calls.load(Ordering::SeqCst), 1);

        let err = load_rules(&fetcher, &config, "acme", "deploys", "other").await.unwrap_err();
        assert!(matches!(err, GateError::Fetch { .. }));
    }

    #[tokio::test]
    async fn invalid_rules_file_is_a_rules_error() {
        let config = GateConfig::default();
        let fetcher = RepoFetcher::default().with(&config.rules_path, "sha", "rules: []\n");
        let err = load_rules(&fetcher, &config, "acme", "deploys", "sha").await.unwrap_err();
        assert!(matches!(err, GateError::Rules(_)));
    }
}
