//! Ordered Graphviz attribute maps.
//!
//! Graphviz attributes are plain `name=value` pairs. [`Attributes`] keeps them
//! in insertion order so that the emitted description is reproducible, and
//! supports layering (defaults first, user overrides on top) through
//! [`Attributes::overlay`].
//!
//! # Example
//!
//! ```
//! use trellis_core::attributes::Attributes;
//!
//! let mut attrs = Attributes::new();
//! attrs.set("shape", "box");
//! attrs.set("label", "Queue \"A\"");
//!
//! assert_eq!(attrs.to_dot_list(), r#"[shape="box" label="Queue \"A\""]"#);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// An insertion-ordered set of Graphviz attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    ///
    /// Overwriting an existing attribute keeps its original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`Attributes::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Copies every attribute of `other` over this set.
    pub fn overlay(&mut self, other: &Attributes) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Returns a new set with `other` layered over `self`.
    pub fn merged(&self, other: &Attributes) -> Attributes {
        let mut merged = self.clone();
        merged.overlay(other);
        merged
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the attributes as a DOT attribute list, e.g. `[a="1" b="2"]`.
    ///
    /// Returns an empty string for an empty set.
    pub fn to_dot_list(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut out = String::from("[");
        for (idx, (name, value)) in self.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            out.push_str(&name_or_quoted(name));
            out.push('=');
            out.push_str(&quote(value));
        }
        out.push(']');
        out
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}

/// Scalar values accepted for an attribute in configuration files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<RawValue> for String {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Text(text) => text,
            RawValue::Integer(int) => int.to_string(),
            RawValue::Float(float) => float.to_string(),
            RawValue::Flag(flag) => flag.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, RawValue>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

/// Returns `name` bare when it is a plain DOT identifier, quoted otherwise.
fn name_or_quoted(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if plain { name.to_string() } else { quote(name) }
}

/// Quotes a string as a DOT double-quoted identifier.
///
/// Backslashes and double quotes are escaped, and line breaks become the DOT
/// `\n` escape so that multi-line labels survive the round trip.
///
/// # Examples
///
/// ```
/// use trellis_core::attributes::quote;
///
/// assert_eq!(quote("plain"), "\"plain\"");
/// assert_eq!(quote("two\nlines"), "\"two\\nlines\"");
/// ```
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
