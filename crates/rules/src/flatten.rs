//! Flattening of structured documents into dotted-path → value maps.
//!
//! A decoded YAML document is first lifted into a [`Node`] tree, then
//! visited depth-first: mapping entries extend the path with their key,
//! sequence elements with their index, and scalars are recorded as the
//! leaf value. `a: {b: [x, y]}` flattens to `a.b.0 = x`, `a.b.1 = y`.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

// ── Document tree ───────────────────────────────────────────────────

/// A scalar leaf of a decoded document.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    /// Renders the value the way policy patterns compare against it:
    /// lowercase booleans, strings verbatim, floats as described on
    /// [`format_float`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Uint(u) => write!(f, "{}", u),
            Scalar::Float(x) => f.write_str(&format_float(*x)),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip digits; exponent form (`1e+21`, `1.5e-07`) when the
/// decimal exponent is below -4 or at least 6, plain decimal otherwise.
/// Whole floats drop the fraction (`1.0` renders as `1`); infinities render
/// as `+Inf`/`-Inf`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let scientific = format!("{:e}", x);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return x.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if x != 0.0 && (exponent < -4 || exponent >= 6) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        x.to_string()
    }
}

/// Heterogeneous document node produced by the structured-document decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Mapping entries in document order, keys already stringified.
    Map(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Scalar(Scalar),
}

impl Node {
    /// Number of scalar leaves under this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Map(entries) => entries.iter().map(|(_, v)| v.leaf_count()).sum(),
            Node::Sequence(items) => items.iter().map(Node::leaf_count).sum(),
            Node::Scalar(_) => 1,
        }
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(number_scalar(&n)),
            Value::String(s) => Node::Scalar(Scalar::Str(s)),
            Value::Sequence(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Mapping(mapping) => Node::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (key_label(k), Node::from(v)))
                    .collect(),
            ),
            // Tags (`!Ref foo`) carry no meaning for comparison; keep the value.
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

fn number_scalar(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::Uint(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Stringify a mapping key. Scalar keys use scalar rendering; complex keys
/// (rare in practice) fall back to their compact YAML form.
fn key_label(key: serde_yaml::Value) -> String {
    match Node::from(key.clone()) {
        Node::Scalar(scalar) => scalar.to_string(),
        _ => serde_yaml::to_string(&key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// ── Flat key maps ───────────────────────────────────────────────────

/// Flat mapping from dotted path to stringified leaf value.
#[derive(Debug, Clone, Default)]
pub struct FlatKeyMap {
    entries: BTreeMap<String, String>,
}

/// One [`FlatKeyMap`] per document of a multi-document file, in stream order.
pub type DocumentSet = Vec<FlatKeyMap>;

impl FlatKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn insert(&mut self, path: String, value: String) {
        self.entries.insert(path, value);
    }
}

impl PartialEq for FlatKeyMap {
    /// Two maps are equal when they hold the same paths with the same values.
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .all(|(path, value)| other.entries.get(path) == Some(value))
    }
}

impl Eq for FlatKeyMap {}

impl<K, V> FromIterator<(K, V)> for FlatKeyMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FlatKeyMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Flattening ──────────────────────────────────────────────────────

/// Flatten one document into its leaf map.
///
/// A null document (empty YAML document) yields an empty map. A bare
/// scalar document is recorded under the empty path.
pub fn flatten(document: &Node) -> FlatKeyMap {
    let mut keys = FlatKeyMap::new();
    if matches!(document, Node::Scalar(Scalar::Null)) {
        return keys;
    }
    visit(&mut keys, "", document);
    keys
}

fn visit(keys: &mut FlatKeyMap, prefix: &str, node: &Node) {
    match node {
        Node::Map(entries) => {
            for (key, value) in entries {
                visit(keys, &join(prefix, key), value);
            }
        }
        Node::Sequence(items) => {
            for (index, value) in items.iter().enumerate() {
                visit(keys, &join(prefix, &index.to_string()), value);
            }
        }
        Node::Scalar(scalar) => keys.insert(prefix.to_string(), scalar.to_string()),
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

// ── Decoding ────────────────────────────────────────────────────────

/// Whether any line holds something other than whitespace or a comment.
/// A bare `---` counts: it opens an explicit, possibly empty, document.
fn has_documents(content: &[u8]) -> bool {
    String::from_utf8_lossy(content).lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    })
}

/// Decode a YAML stream (`---`-separated) into one [`Node`] per document.
///
/// Malformed input is an error; a stream of only whitespace and comments
/// yields no documents.
pub fn decode_documents(content: &[u8]) -> Result<Vec<Node>, serde_yaml::Error> {
    if !has_documents(content) {
        return Ok(Vec::new());
    }
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        documents.push(Node::from(value));
    }
    Ok(documents)
}

/// Decode and flatten every document of a YAML stream.
pub fn flatten_documents(content: &[u8]) -> Result<DocumentSet, serde_yaml::Error> {
    Ok(decode_documents(content)?.iter().map(flatten).collect())
}

// ── Tests ───────────────────────────────────────────────────────────
