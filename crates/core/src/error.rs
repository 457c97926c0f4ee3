use thiserror::Error;

/// Failure reported by an external collaborator (content fetch, team lookup,
/// review listing).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl CollaboratorError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        CollaboratorError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn transport(reason: impl std::fmt::Display) -> Self {
        CollaboratorError::Transport(reason.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CollaboratorError::NotFound { .. })
    }
}
