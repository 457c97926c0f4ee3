//! Policy file loading and validation.
//!
//! Deserializes a [`RuleSet`](crate::schema::RuleSet) from YAML (bytes,
//! string, or file) and validates what the schema alone cannot express:
//! a non-empty default reviewer and well-formed `org/team` reviewers.

mod core;
mod error;


pub use self::core::{load_file, parse_rules, validate};
pub use self::error::{Result, RuleError};
