//! Policy-driven review gating for configuration-change pull requests.
//!
//! This crate provides:
//! - Flattening of YAML document streams into comparable path → value maps
//! - Reviewable file model and extraction from a parsed multi-file diff
//! - YAML policy rules (filter + change predicates) with load-time validation
//! - First-match rule matching per document, with default-reviewer fallback
//! - Reduction of triggered rules and approvals into a policy decision
//! - Collaborator traits (content fetch, team membership) and an LRU fetch cache

pub mod diff;
pub mod error;
pub mod evaluation;
pub mod fetch;
pub mod file;
pub mod flatten;
pub mod loader;
pub mod matcher;
pub mod reducer;
pub mod schema;

pub use diff::{extract, is_version_only_bump, FileDiff, Hunk, NULL_PATH};
pub use error::{GateError, Result};
pub use file::{ReviewableContent, ReviewableFile};
pub use flatten::{flatten, DocumentSet, FlatKeyMap, Node, Scalar};
pub use matcher::match_rules;
pub use reducer::{reduce, PolicyDecision, Reviewer, TeamDirectory, TeamMembership};
pub use schema::{MatchMode, Pattern, Rule, RuleSet};
