use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a pull request review, as reported by the review lister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    Dismissed,
    ChangesRequested,
    Commented,
    Pending,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewState::Approved => write!(f, "APPROVED"),
            ReviewState::Dismissed => write!(f, "DISMISSED"),
            ReviewState::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            ReviewState::Commented => write!(f, "COMMENTED"),
            ReviewState::Pending => write!(f, "PENDING"),
            ReviewState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A single review left on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Login of the review author.
    pub author: String,
    pub state: ReviewState,
}

impl Review {
    pub fn new(author: impl Into<String>, state: ReviewState) -> Self {
        Self {
            author: author.into(),
            state,
        }
    }

    pub fn approved(author: impl Into<String>) -> Self {
        Self::new(author, ReviewState::Approved)
    }

    /// Only approvals that have not been dismissed count towards a rule.
    pub fn is_approval(&self) -> bool {
        self.state == ReviewState::Approved
    }
}
