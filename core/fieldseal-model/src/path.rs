//! Pre-parsed field locations.
//!
//! A [`FieldPath`] is parsed once when an entity type is classified and then
//! reused for every instance of that type, so no string parsing happens on
//! the per-entity hot path.

use std::fmt;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// Location of a field inside an entity.
///
/// Accepts either a JSON pointer (`"/profile/ssn"`) or a bare field name
/// (`"ssn"`, equivalent to `"/ssn"`). Pointer tokens use the RFC 6901
/// escapes `~0` (`~`) and `~1` (`/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    tokens: Vec<String>,
}

impl FieldPath {
    /// Parses a field path.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        let invalid = |reason: &str| ModelError::InvalidFieldPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty path"));
        }

        let tokens = match raw.strip_prefix('/') {
            Some(rest) => rest
                .split('/')
                .map(unescape)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| invalid("bad escape sequence"))?,
            None => vec![raw.to_string()],
        };

        if tokens.iter().any(String::is_empty) {
            return Err(invalid("empty segment"));
        }

        Ok(Self {
            raw: raw.to_string(),
            tokens,
        })
    }

    /// The path as it was declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The leaf field name (last segment).
    pub fn name(&self) -> &str {
        self.tokens.last().map(String::as_str).unwrap_or_default()
    }

    /// All segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.tokens
    }

    /// Looks the path up in a JSON document.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.tokens
            .iter()
            .try_fold(root, |node, token| step(node, token))
    }

    /// Looks the path up in a JSON document for mutation.
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut node = root;
        for token in &self.tokens {
            node = match node {
                Value::Object(map) => map.get_mut(token)?,
                Value::Array(items) => items.get_mut(token.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn step<'a>(node: &'a Value, token: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => items.get(token.parse::<usize>().ok()?),
        _ => None,
    }
}

fn unescape(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}
