//! Scalar type catalog mapping schema type names to target scalar kinds.
//!
//! The catalog is loaded once (either the built-in table or a JSON mapping)
//! and is immutable afterwards. Lookups are exact-case; the only exception
//! is the anonymous-type naming convention, which is recognized structurally.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SvcgenError;

/// Prefix used by the schema front-end when it synthesizes a name for an
/// inline (anonymous) simple type, e.g. `anonymous159`.
pub const ANONYMOUS_PREFIX: &str = "anonymous";

/// Target scalar kind a schema scalar type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
}

impl ScalarKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Stable lowercase name, used in instruction comments and dedup keys.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

/// Built-in scalar table covering the XML Schema simple types the generator
/// understands. Names are matched exactly: `duration` is a scalar, `Duration`
/// is not.
const BUILTIN_TYPES: &[(&str, ScalarKind)] = &[
    ("anySimpleType", ScalarKind::String),
    ("anyType", ScalarKind::String),
    ("anyURI", ScalarKind::String),
    ("base64Binary", ScalarKind::String),
    ("date", ScalarKind::String),
    ("dateTime", ScalarKind::String),
    ("duration", ScalarKind::String),
    ("ENTITIES", ScalarKind::String),
    ("ENTITY", ScalarKind::String),
    ("gDay", ScalarKind::String),
    ("gMonth", ScalarKind::String),
    ("gMonthDay", ScalarKind::String),
    ("gYear", ScalarKind::String),
    ("gYearMonth", ScalarKind::String),
    ("hexBinary", ScalarKind::String),
    ("ID", ScalarKind::String),
    ("IDREF", ScalarKind::String),
    ("IDREFS", ScalarKind::String),
    ("language", ScalarKind::String),
    ("Name", ScalarKind::String),
    ("NCName", ScalarKind::String),
    ("NMTOKEN", ScalarKind::String),
    ("NMTOKENS", ScalarKind::String),
    ("normalizedString", ScalarKind::String),
    ("NOTATION", ScalarKind::String),
    ("QName", ScalarKind::String),
    ("string", ScalarKind::String),
    ("time", ScalarKind::String),
    ("token", ScalarKind::String),
    ("byte", ScalarKind::Int),
    ("int", ScalarKind::Int),
    ("integer", ScalarKind::Int),
    ("long", ScalarKind::Int),
    ("negativeInteger", ScalarKind::Int),
    ("nonNegativeInteger", ScalarKind::Int),
    ("nonPositiveInteger", ScalarKind::Int),
    ("positiveInteger", ScalarKind::Int),
    ("short", ScalarKind::Int),
    ("unsignedByte", ScalarKind::Int),
    ("unsignedInt", ScalarKind::Int),
    ("unsignedLong", ScalarKind::Int),
    ("unsignedShort", ScalarKind::Int),
    ("decimal", ScalarKind::Float),
    ("double", ScalarKind::Float),
    ("float", ScalarKind::Float),
    ("boolean", ScalarKind::Bool),
];

/// Immutable lookup table from schema scalar type name to [`ScalarKind`].
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: BTreeMap<String, ScalarKind>,
}

impl TypeCatalog {
    /// Catalog preloaded with the built-in XML Schema simple-type table.
    pub fn builtin() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .map(|(name, kind)| ((*name).to_string(), *kind))
            .collect();
        Self { types }
    }

    /// Loads a catalog from a JSON mapping of `{"typeName": "kind"}` where
    /// kind is one of `string`, `int`, `float`, `bool`.
    pub fn from_json_str(input: &str) -> Result<Self, SvcgenError> {
        let value: JsonValue = serde_json::from_str(input)
            .map_err(|e| SvcgenError::ConfigInvalid(format!("type catalog: {e}")))?;
        let map = value.as_object().ok_or_else(|| {
            SvcgenError::ConfigInvalid("type catalog must be a mapping/object".to_string())
        })?;

        let mut types = BTreeMap::new();
        for (name, raw_kind) in map {
            let kind_name = raw_kind.as_str().ok_or_else(|| {
                SvcgenError::ConfigInvalid(format!(
                    "type catalog entry '{name}' must map to a kind string"
                ))
            })?;
            let kind = ScalarKind::from_name(kind_name).ok_or_else(|| {
                SvcgenError::ConfigInvalid(format!(
                    "type catalog entry '{name}' has unknown kind '{kind_name}'"
                ))
            })?;
            types.insert(name.clone(), kind);
        }

        Ok(Self { types })
    }

    /// Loads a catalog from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SvcgenError> {
        let input = fs::read_to_string(path.as_ref()).map_err(|e| {
            SvcgenError::ConfigInvalid(format!(
                "failed to read type catalog '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&input)
    }

    /// Returns true iff `name` is a recognized scalar type name (exact case)
    /// or follows the anonymous-type naming convention.
    pub fn is_scalar(&self, name: &str) -> bool {
        self.types.contains_key(name) || is_anonymous(name)
    }

    /// Maps a type name to its target scalar kind.
    ///
    /// Anonymous names map to [`ScalarKind::String`]; unrecognized names
    /// return `None` rather than erroring.
    pub fn scalar_kind(&self, name: &str) -> Option<ScalarKind> {
        if let Some(kind) = self.types.get(name) {
            return Some(*kind);
        }
        if is_anonymous(name) {
            return Some(ScalarKind::String);
        }
        None
    }
}

/// Recognizes synthesized anonymous type names: the fixed prefix followed by
/// one or more digits and nothing else.
pub fn is_anonymous(name: &str) -> bool {
    match name.strip_prefix(ANONYMOUS_PREFIX) {
        Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_recognizes_duration_exact_case() {
        let catalog = TypeCatalog::builtin();
        assert!(catalog.is_scalar("duration"));
        assert!(!catalog.is_scalar("Duration"));
    }

    #[test]
    fn builtin_kind_lookup() {
        let catalog = TypeCatalog::builtin();
        assert_eq!(catalog.scalar_kind("duration"), Some(ScalarKind::String));
        assert_eq!(catalog.scalar_kind("base64Binary"), Some(ScalarKind::String));
        assert_eq!(catalog.scalar_kind("unsignedLong"), Some(ScalarKind::Int));
        assert_eq!(catalog.scalar_kind("decimal"), Some(ScalarKind::Float));
        assert_eq!(catalog.scalar_kind("boolean"), Some(ScalarKind::Bool));
        assert_eq!(catalog.scalar_kind("Duration"), None);
    }

    #[test]
    fn anonymous_names_are_scalars_with_string_kind() {
        let catalog = TypeCatalog::builtin();
        assert!(catalog.is_scalar("anonymous159"));
        assert_eq!(catalog.scalar_kind("anonymous159"), Some(ScalarKind::String));
        assert!(!is_anonymous("anonymous"));
        assert!(!is_anonymous("anonymous15x"));
        assert!(!is_anonymous("Anonymous159"));
    }

    #[test]
    fn loads_from_json_mapping() {
        let catalog =
            TypeCatalog::from_json_str(r#"{"duration": "string", "counter": "int"}"#).unwrap();
        assert_eq!(catalog.scalar_kind("counter"), Some(ScalarKind::Int));
        assert_eq!(catalog.scalar_kind("dateTime"), None);
    }

    #[test]
    fn rejects_malformed_catalog() {
        let err = TypeCatalog::from_json_str("not json").unwrap_err();
        assert!(err.to_string().contains("config error"));

        let err = TypeCatalog::from_json_str(r#"{"duration": "text"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown kind"));

        let err = TypeCatalog::from_json_str(r#"["duration"]"#).unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }
}
