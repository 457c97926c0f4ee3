//! Errors surfaced while evaluating a change against policy.
//!
//! Every variant carries the entity it concerns (file path and revision, or
//! the index of the triggered rule) so the caller can log it and fail the
//! check. Document-count mismatches are not errors: they take the
//! default-reviewer fallback.

use review_gate_core::CollaboratorError;

use crate::loader::RuleError;

/// Errors that abort policy evaluation for a pull request.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Structured content could not be decoded.
    #[error("error parsing file {path}@{revision}: {source}")]
    Decode {
        path: String,
        revision: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Content fetch failed.
    #[error("error fetching content for {path}@{revision}: {source}")]
    Fetch {
        path: String,
        revision: String,
        #[source]
        source: CollaboratorError,
    },

    /// Team membership lookup failed while checking a triggered rule.
    /// `triggered_index` is the position in the triggered list, not in the
    /// rules file.
    #[error("error resolving reviewer '{reviewer}' for triggered rule #{triggered_index}: {source}")]
    Membership {
        triggered_index: usize,
        reviewer: String,
        #[source]
        source: CollaboratorError,
    },

    /// Content was parsed before being fetched.
    #[error("content for {path}@{revision} has not been fetched")]
    MissingContent { path: String, revision: String },

    /// Policy file could not be loaded.
    #[error(transparent)]
    Rules(#[from] RuleError),
}

/// Result alias for evaluation operations.
pub type Result<T> = std::result::Result<T, GateError>;
