//! Reserved accessor-name detection.
//!
//! Generated accessor names must not collide with members the emitted
//! collection runtime already defines. Collection-protocol and lifecycle
//! member names match case-insensitively; target-language keywords match
//! exactly. Substring containment never counts as a collision.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::SvcgenError;

/// Target-language keywords; a name collides only in this exact casing.
const CASE_SENSITIVE: &[&str] = &[
    "abstract", "break", "case", "catch", "class", "clone", "const", "continue", "default", "do",
    "else", "extends", "final", "finally", "for", "foreach", "function", "global", "if",
    "implements", "instanceof", "interface", "namespace", "new", "private", "protected", "public",
    "return", "static", "switch", "throw", "trait", "try", "use", "while",
];

/// Collection-protocol and runtime lifecycle members; any casing collides.
const CASE_INSENSITIVE: &[&str] = &[
    "_get",
    "_set",
    "add",
    "count",
    "current",
    "first",
    "getAttributeName",
    "getInternArray",
    "getInternArrayIsArray",
    "getInternArrayOffset",
    "initInternArray",
    "item",
    "key",
    "last",
    "length",
    "next",
    "offsetExists",
    "offsetGet",
    "offsetSet",
    "offsetUnset",
    "rewind",
    "setInternArray",
    "setInternArrayIsArray",
    "setInternArrayOffset",
    "valid",
];

#[derive(Deserialize)]
struct ReservedLists {
    #[serde(default)]
    case_sensitive: Vec<String>,
    #[serde(default)]
    case_insensitive: Vec<String>,
}

/// Immutable reserved-identifier set with one exact-case list and one
/// case-folded list.
#[derive(Debug, Clone)]
pub struct ReservedIdentifiers {
    exact: BTreeSet<String>,
    folded: BTreeSet<String>,
}

impl ReservedIdentifiers {
    /// Set preloaded with the built-in keyword and collection-member lists.
    pub fn builtin() -> Self {
        Self {
            exact: CASE_SENSITIVE.iter().map(|s| (*s).to_string()).collect(),
            folded: CASE_INSENSITIVE
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    /// Loads the two lists from a JSON object with `case_sensitive` and
    /// `case_insensitive` string arrays. Either list may be omitted.
    pub fn from_json_str(input: &str) -> Result<Self, SvcgenError> {
        let value: JsonValue = serde_json::from_str(input)
            .map_err(|e| SvcgenError::ConfigInvalid(format!("reserved identifiers: {e}")))?;
        let lists: ReservedLists = serde_json::from_value(value).map_err(|e| {
            SvcgenError::ConfigInvalid(format!(
                "reserved identifiers must be an object with string lists: {e}"
            ))
        })?;

        Ok(Self {
            exact: lists.case_sensitive.into_iter().collect(),
            folded: lists
                .case_insensitive
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        })
    }

    /// Loads the reserved-identifier lists from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SvcgenError> {
        let input = fs::read_to_string(path.as_ref()).map_err(|e| {
            SvcgenError::ConfigInvalid(format!(
                "failed to read reserved identifiers '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&input)
    }

    /// Returns true iff `name` collides with a reserved member name.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.exact.contains(name) || self.folded.contains(&name.to_lowercase())
    }
}
