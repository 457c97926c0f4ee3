//! Regex predicates compiled at load time.

use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// How a predicate pattern is applied to a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The pattern may match anywhere in the value.
    #[default]
    Search,
    /// The pattern must match the entire value.
    Full,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Search => write!(f, "search"),
            MatchMode::Full => write!(f, "full"),
        }
    }
}

/// A compiled predicate pattern. Equality and serialization use the source text.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "String")]
pub struct Pattern {
    source: String,
    search: Regex,
    full: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            search: Regex::new(source)?,
            full: Regex::new(&format!("^(?:{})$", source))?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Search => self.search.is_match(value),
            MatchMode::Full => self.full.is_match(value),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Accepts any YAML scalar, so `replicas: 3` or `enabled: true` work as
/// literal patterns without quoting.
impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PatternVisitor;

        impl Visitor<'_> for PatternVisitor {
            type Value = Pattern;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a regular expression")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Pattern, E> {
                Pattern::new(v).map_err(|e| E::custom(format!("invalid pattern '{}': {}", v, e)))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Pattern, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Pattern, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Pattern, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Pattern, E> {
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(PatternVisitor)
    }
}
