//! Policy loading entry points.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::reducer::Reviewer;
use crate::schema::RuleSet;

use super::error::{Result, RuleError};

/// Parse and validate a policy file's contents.
pub fn parse_rules(content: &[u8]) -> Result<RuleSet> {
    let rules: RuleSet = serde_yaml::from_slice(content)?;
    validate(&rules)?;
    Ok(rules)
}

/// Read, parse and validate a policy file from disk.
pub fn load_file(path: &Path) -> Result<RuleSet> {
    let content = fs::read(path)?;
    let rules = parse_rules(&content)?;
    info!(
        path = %path.display(),
        rules = rules.items.len(),
        default_reviewer = %rules.default_reviewer,
        match_mode = %rules.match_mode,
        "loaded rules"
    );
    Ok(rules)
}

/// Check the constraints serde cannot express.
///
/// An unconditional rule followed by further rules is legal but shadows
/// them for every changed document, so it is logged rather than rejected.
pub fn validate(rules: &RuleSet) -> Result<()> {
    if rules.default_reviewer.trim().is_empty() {
        return Err(RuleError::Validation(
            "defaultReviewer must not be empty".to_string(),
        ));
    }
    rules
        .default_reviewer
        .parse::<Reviewer>()
        .map_err(|e| RuleError::Validation(format!("defaultReviewer: {}", e)))?;

    for (index, rule) in rules.items.iter().enumerate() {
        if !rule.reviewer.is_empty() {
            rule.reviewer
                .parse::<Reviewer>()
                .map_err(|e| RuleError::Validation(format!("rule #{}: {}", index, e)))?;
        }
        if rule.is_unconditional() && index + 1 < rules.items.len() {
            warn!(
                rule_index = index,
                shadowed = rules.items.len() - index - 1,
                "rule has no filter or change predicates; later rules can never match"
            );
        }
    }
    Ok(())
}
