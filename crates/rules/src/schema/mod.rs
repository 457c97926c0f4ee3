//! YAML policy schema types with serde deserialization.
//!
//! Defines the policy file hierarchy:
//! - `RuleSet`: ordered rules plus the default reviewer and match mode
//! - `Rule`: filter/change predicates, reviewer, and merge/review grants
//! - `Pattern`: a regex compiled once at load time

mod pattern;
mod rule;

pub use pattern::*;
pub use rule::*;

#[cfg(test)]
mod tests;
