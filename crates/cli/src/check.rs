//! `validate` and `check` subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use review_gate_core::{GateConfig, Review};
use review_gate_rules::evaluation::{load_rules, match_files, prepare_files};
use review_gate_rules::fetch::{CachedFetcher, DirectoryFetcher};
use review_gate_rules::loader::load_file;
use review_gate_rules::{reduce, PolicyDecision, Rule, RuleSet, TeamDirectory};
use serde::Serialize;
use tracing::info;

use crate::cli::CheckArgs;
use crate::tree::changed_files;

const BASE_REVISION: &str = "base";
const HEAD_REVISION: &str = "head";

/// Result of one `check` run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub files: Vec<String>,
    pub triggered_rules: Vec<Rule>,
    pub decision: PolicyDecision,
}

pub fn validate(path: &Path) -> Result<RuleSet> {
    load_file(path).with_context(|| format!("invalid rules file {}", path.display()))
}

fn load_teams(path: Option<&Path>) -> Result<TeamDirectory> {
    let Some(path) = path else {
        return Ok(TeamDirectory::new());
    };
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let teams: TeamDirectory =
        serde_yaml::from_str(&yaml).with_context(|| format!("failed to parse {}", path.display()))?;
    info!(path = %path.display(), teams = teams.team_count(), "loaded team directory");
    Ok(teams)
}

pub async fn check(args: &CheckArgs, config: &GateConfig) -> Result<CheckReport> {
    let fetcher = CachedFetcher::with_capacity(
        DirectoryFetcher::new()
            .with_revision(BASE_REVISION, &args.base)
            .with_revision(HEAD_REVISION, &args.head),
        config.fetch_cache_capacity,
    );

    // The policy comes from the base tree unless given explicitly, so a
    // change cannot loosen the rules it is judged by.
    let rules = match &args.rules {
        Some(path) => validate(path)?,
        None => load_rules(&fetcher, config, &args.owner, &args.repo, BASE_REVISION)
            .await
            .context("failed to load rules from the base tree")?,
    };
    let teams = load_teams(args.teams.as_deref())?;

    let diffs = changed_files(&args.base, &args.head, &args.paths)?;
    let files = prepare_files(&diffs, &args.owner, &args.repo, HEAD_REVISION, BASE_REVISION, &fetcher).await?;

    let reviews: Vec<Review> = args.approved_by.iter().map(|login| Review::approved(login)).collect();
    let triggered = match_files(&rules, &files);
    let decision = reduce(&rules, &triggered, &reviews, &teams)?;
    info!(
        files = files.len(),
        triggered = triggered.len(),
        approved = decision.is_approved(),
        "check complete"
    );

    Ok(CheckReport {
        files: files.iter().map(|f| f.path().to_string()).collect(),
        triggered_rules: triggered,
        decision,
    })
}

pub fn render(report: &CheckReport) -> String {
    let mut out = String::new();
    if report.files.is_empty() {
        out.push_str("No changed files.\n");
    }
    for path in &report.files {
        out.push_str(&format!("changed: {}\n", path));
    }
    for rule in &report.triggered_rules {
        out.push_str(&format!("rule: reviewer {}\n", rule.reviewer));
    }
    out.push_str(&report.decision.to_string());
    out
}
