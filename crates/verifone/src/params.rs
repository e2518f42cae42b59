//! Ordered field-code → value maps used for both requests and responses.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use crate::field::{FieldCode, LengthIssue};

/// An ordered mapping from field-code strings to values.
///
/// Keys are kept as raw strings so unknown provider fields survive a round
/// trip untouched; [`ParameterSet::validate`] checks them against the
/// [`FieldCode`] grammar on demand. Iteration order is the byte-wise key
/// order, which is also the order the signature plaintext is built in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterSet(BTreeMap<String, String>);

/// One advisory finding from [`ParameterSet::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The key does not follow the field-code grammar.
    UnparsableKey { key: String },
    /// The value violates the length bounds declared by its field code.
    Length { key: String, issue: LengthIssue },
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the key was present.
    pub fn insert(
        &mut self,
        code: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.0.insert(code.into(), value.into())
    }

    /// Insert a field keyed by a parsed [`FieldCode`].
    pub fn insert_field(&mut self, code: &FieldCode, value: impl Into<String>) -> Option<String> {
        self.0.insert(code.to_string(), value.into())
    }

    /// Insert only if the key is absent. Used for defaultable fields such
    /// as timestamps the caller may have set explicitly.
    pub fn insert_missing(&mut self, code: &str, value: impl Into<String>) {
        self.0.entry(code.to_string()).or_insert_with(|| value.into());
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn remove(&mut self, code: &str) -> Option<String> {
        self.0.remove(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` into `self`; fields in `other` win on conflict.
    pub fn merge(&mut self, other: ParameterSet) {
        self.0.extend(other.0);
    }

    /// Canonical signing plaintext: `key=value` pairs in key order, joined
    /// with `;` and terminated by a trailing `;`.
    pub fn plaintext(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.0 {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push(';');
        }
        out
    }

    /// Check every entry against the field-code grammar and its length
    /// bounds. Findings are advisory; nothing here blocks a request.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (key, value) in &self.0 {
            match FieldCode::from_str(key) {
                Err(_) => issues.push(ValidationIssue::UnparsableKey { key: key.clone() }),
                Ok(code) => {
                    if let Some(issue) = code.validate(value) {
                        issues.push(ValidationIssue::Length {
                            key: key.clone(),
                            issue,
                        });
                    }
                }
            }
        }
        issues
    }
}

impl FromIterator<(String, String)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ParameterSet {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Truncate a string to at most `max` characters (not bytes), matching the
/// provider-side behavior for truncatable fields.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
