//! Error types for the rule loader.

/// Errors that can occur while loading a policy file.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error, including invalid patterns.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Rule validation error (e.g. empty default reviewer, malformed team slug).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for rule loading operations.
pub type Result<T> = std::result::Result<T, RuleError>;
