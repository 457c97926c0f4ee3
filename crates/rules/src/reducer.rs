//! Reduction of triggered rules and approvals into a policy decision.
//!
//! Grants are unanimous: auto-merge (or skip-review) holds only when every
//! triggered rule grants it, and vacuously when nothing triggered. Each
//! triggered rule is satisfied by one approving review from its reviewer,
//! either the named user or an active member of the named `org/team`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use review_gate_core::{CollaboratorError, Review};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GateError, Result};
use crate::schema::{Rule, RuleSet};

// ── Reviewers ───────────────────────────────────────────────────────

/// Parsed reviewer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reviewer {
    /// A user login.
    User(String),
    /// A team, written `org/team`.
    Team { org: String, team: String },
}

impl FromStr for Reviewer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('/') {
            None => Ok(Reviewer::User(s.to_string())),
            Some((org, team)) if !org.is_empty() && !team.is_empty() && !team.contains('/') => {
                Ok(Reviewer::Team {
                    org: org.to_string(),
                    team: team.to_string(),
                })
            }
            Some(_) => Err(format!("malformed team reviewer '{}', expected org/team", s)),
        }
    }
}

impl fmt::Display for Reviewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reviewer::User(login) => f.write_str(login),
            Reviewer::Team { org, team } => write!(f, "{}/{}", org, team),
        }
    }
}

// ── Team membership ─────────────────────────────────────────────────

/// Team membership lookups, typically backed by the GitHub teams API.
pub trait TeamMembership {
    /// Whether `username` is an active member of `org/team`.
    fn is_active_member(
        &self,
        org: &str,
        team: &str,
        username: &str,
    ) -> std::result::Result<bool, CollaboratorError>;
}

/// In-memory team directory, keyed by `org/team`.
///
/// Deserializes from a YAML map such as `acme/platform: [alice, bob]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamDirectory {
    teams: HashMap<String, BTreeSet<String>>,
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, team: &str, username: &str) -> Self {
        self.teams
            .entry(team.to_string())
            .or_default()
            .insert(username.to_string());
        self
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

impl TeamMembership for TeamDirectory {
    fn is_active_member(
        &self,
        org: &str,
        team: &str,
        username: &str,
    ) -> std::result::Result<bool, CollaboratorError> {
        Ok(self
            .teams
            .get(&format!("{}/{}", org, team))
            .is_some_and(|members| members.contains(username)))
    }
}

// ── Decision ────────────────────────────────────────────────────────

/// Outcome of policy evaluation for one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    /// Triggered rules without a qualifying approval, reviewer resolved.
    pub unsatisfied_rules: Vec<Rule>,
    pub auto_merge_granted: bool,
    pub skip_review_granted: bool,
}

impl PolicyDecision {
    /// Every triggered rule has its approval.
    pub fn is_approved(&self) -> bool {
        self.unsatisfied_rules.is_empty()
    }

    /// Reviewers still owing an approval, deduplicated, in rule order.
    pub fn pending_reviewers(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.unsatisfied_rules
            .iter()
            .map(|rule| rule.reviewer.as_str())
            .filter(|reviewer| seen.insert(*reviewer))
            .collect()
    }
}

impl fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_approved() {
            writeln!(f, "All required approvals present.")?;
        } else {
            writeln!(f, "Approval required from: {}", self.pending_reviewers().join(", "))?;
        }
        writeln!(f, "Auto-merge: {}", if self.auto_merge_granted { "granted" } else { "not granted" })?;
        write!(f, "Skip review: {}", if self.skip_review_granted { "granted" } else { "not granted" })
    }
}

// ── Reduction ───────────────────────────────────────────────────────

/// Reduce triggered rules and reviews into a [`PolicyDecision`].
///
/// Membership lookup failures abort the reduction: a failed lookup is not
/// the same as a missing approval.
pub fn reduce(
    rules: &RuleSet,
    triggered: &[Rule],
    reviews: &[Review],
    teams: &dyn TeamMembership,
) -> Result<PolicyDecision> {
    let mut decision = PolicyDecision {
        unsatisfied_rules: Vec::new(),
        auto_merge_granted: true,
        skip_review_granted: true,
    };

    for (triggered_index, rule) in triggered.iter().enumerate() {
        decision.auto_merge_granted &= rule.auto_merge;
        decision.skip_review_granted &= rule.skip_review;

        let identifier = rules.reviewer_for(rule);
        // Malformed slugs were rejected at load; treat any left as a login,
        // which no approval can carry.
        let reviewer = identifier
            .parse::<Reviewer>()
            .unwrap_or_else(|_| Reviewer::User(identifier.to_string()));

        let satisfied =
            is_satisfied(&reviewer, reviews, teams).map_err(|source| GateError::Membership {
                triggered_index,
                reviewer: identifier.to_string(),
                source,
            })?;
        debug!(triggered_index, reviewer = %reviewer, satisfied, "checked rule approval");

        if !satisfied {
            decision.unsatisfied_rules.push(Rule {
                reviewer: identifier.to_string(),
                ..rule.clone()
            });
        }
    }

    info!(
        triggered = triggered.len(),
        unsatisfied = decision.unsatisfied_rules.len(),
        auto_merge = decision.auto_merge_granted,
        skip_review = decision.skip_review_granted,
        "policy reduced"
    );
    Ok(decision)
}

/// Whether any approving review comes from `reviewer`. Stops at the first hit.
fn is_satisfied(
    reviewer: &Reviewer,
    reviews: &[Review],
    teams: &dyn TeamMembership,
) -> std::result::Result<bool, CollaboratorError> {
    for review in reviews.iter().filter(|r| r.is_approval()) {
        let approves = match reviewer {
            Reviewer::User(login) => review.author == *login,
            Reviewer::Team { org, team } => teams.is_active_member(org, team, &review.author)?,
        };
        if approves {
            return Ok(true);
        }
    }
    Ok(false)
}

// ── Tests ───────────────────────────────────────────────────────────
