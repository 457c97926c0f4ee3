use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Default location of the policy file inside a repository.
pub const DEFAULT_RULES_PATH: &str = ".gitops/rules.yml";

/// Default branch whose policy file is enforced.
pub const DEFAULT_RULES_REF: &str = "master";

/// Default number of fetched files kept in memory.
pub const DEFAULT_FETCH_CACHE_CAPACITY: usize = 128;

/// Resolves `{PROFILE}_{KEY}` first, falling back to `{KEY}`. Empty values count as unset.
fn profiled_opt<F>(lookup: &F, profile: &str, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed).filter(|s| !s.is_empty()) {
            return Some(v);
        }
    }
    lookup(key).filter(|s| !s.is_empty())
}

fn profiled_or<F>(lookup: &F, profile: &str, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    profiled_opt(lookup, profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_usize<F>(lookup: &F, profile: &str, key: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    profiled_opt(lookup, profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Path of the policy file inside the repository under review.
    pub rules_path: String,
    /// Ref the policy file is read from. The PR base is not trusted for policy.
    pub rules_ref: String,
    /// Capacity of the content-fetch cache, in files.
    pub fetch_cache_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            rules_path: DEFAULT_RULES_PATH.to_string(),
            rules_ref: DEFAULT_RULES_REF.to_string(),
            fetch_cache_capacity: DEFAULT_FETCH_CACHE_CAPACITY,
        }
    }
}

impl GateConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `REVIEW_GATE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let lookup = |key: &str| env::var(key).ok();
        let profile = lookup("REVIEW_GATE_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, lookup)
    }

    /// Build config for a named profile from an arbitrary key lookup.
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let capacity = profiled_usize(
            &lookup,
            p,
            "REVIEW_GATE_FETCH_CACHE_CAPACITY",
            DEFAULT_FETCH_CACHE_CAPACITY,
        );
        Self {
            profile: p.to_string(),
            rules_path: profiled_or(&lookup, p, "REVIEW_GATE_RULES_PATH", DEFAULT_RULES_PATH),
            rules_ref: profiled_or(&lookup, p, "REVIEW_GATE_RULES_REF", DEFAULT_RULES_REF),
            // A zero-sized cache is meaningless; clamp to one entry.
            fetch_cache_capacity: capacity.max(1),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  rules:       path={}, ref={}", self.rules_path, self.rules_ref);
        tracing::info!("  fetch cache: capacity={}", self.fetch_cache_capacity);
    }
}
