//! In-memory structural model: structures, attributes and restrictions.
//!
//! The model is handed over by the schema front-end already resolved from
//! the raw service description; this module only normalizes and validates
//! it. Inheritance is a single-parent chain checked for cycles once at
//! construction time, never re-checked per lookup.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::catalog::{ScalarKind, TypeCatalog};
use crate::error::SvcgenError;

/// Constraint set declared on a type or attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    /// Ordered set of permitted literal values.
    Enumeration(Vec<String>),
    /// Bound/pattern facets, declaration order preserved.
    Facets(Vec<(String, JsonValue)>),
}

/// One field declaration on a [`Structure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// Declared type: either a scalar name resolved via the catalog or the
    /// name of another structure.
    pub type_name: String,
    /// Bounded repetition (fixed-size sequence semantics).
    #[serde(default)]
    pub is_array: bool,
    /// Unbounded repetition (dynamic sequence semantics).
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub restriction: Option<Restriction>,
    /// Meta facets in declaration order; names unique per attribute.
    #[serde(default)]
    pub meta: Vec<(String, JsonValue)>,
    /// Owning structure name, maintained by [`SchemaModel::new`].
    #[serde(default)]
    pub owner: String,
}

impl Attribute {
    /// Plain scalar or structure-typed attribute with no markers.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: false,
            is_list: false,
            restriction: None,
            meta: Vec::new(),
            owner: String::new(),
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = Some(restriction);
        self
    }

    pub fn with_meta(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.meta.push((name.into(), value));
        self
    }
}

/// Named composite record type with ordered attributes and an optional
/// parent in a single-inheritance chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Restriction declared on the type itself. Named enumeration types are
    /// structures with a restriction and no attributes.
    #[serde(default)]
    pub restriction: Option<Restriction>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
            restriction: None,
        }
    }

    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = Some(restriction);
        self
    }
}

/// Result of resolving an attribute's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType<'a> {
    Scalar(ScalarKind),
    Structure(&'a Structure),
}

/// Validated collection of structures in declaration order.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    structures: Vec<Structure>,
    index: BTreeMap<String, usize>,
}

impl SchemaModel {
    /// Builds the model, stamping owner back-references and validating the
    /// load-time invariants: unique structure and attribute names,
    /// array/list mutual exclusion, unique meta facet names, and acyclic
    /// parent chains with resolvable parents.
    pub fn new(mut structures: Vec<Structure>) -> Result<Self, SvcgenError> {
        let mut index = BTreeMap::new();
        for (position, structure) in structures.iter().enumerate() {
            if index.insert(structure.name.clone(), position).is_some() {
                return Err(SvcgenError::SchemaInvalid(format!(
                    "duplicate structure '{}'",
                    structure.name
                )));
            }
        }

        for structure in &mut structures {
            let mut seen = BTreeSet::new();
            for attribute in &mut structure.attributes {
                if !seen.insert(attribute.name.clone()) {
                    return Err(SvcgenError::SchemaInvalid(format!(
                        "duplicate attribute '{}' in structure '{}'",
                        attribute.name, structure.name
                    )));
                }
                if attribute.is_array && attribute.is_list {
                    return Err(SvcgenError::SchemaInvalid(format!(
                        "attribute '{}.{}' is marked both array and list",
                        structure.name, attribute.name
                    )));
                }
                let mut meta_names = BTreeSet::new();
                for (meta_name, _) in &attribute.meta {
                    if !meta_names.insert(meta_name.clone()) {
                        return Err(SvcgenError::SchemaInvalid(format!(
                            "duplicate meta facet '{}' on attribute '{}.{}'",
                            meta_name, structure.name, attribute.name
                        )));
                    }
                }
                attribute.owner = structure.name.clone();
            }
        }

        let model = Self { structures, index };
        model.check_inheritance()?;
        Ok(model)
    }

    fn check_inheritance(&self) -> Result<(), SvcgenError> {
        for structure in &self.structures {
            let mut visited = BTreeSet::new();
            visited.insert(structure.name.as_str());
            let mut current = structure;
            while let Some(parent_name) = current.parent.as_deref() {
                let parent = self.structure(parent_name).ok_or_else(|| {
                    SvcgenError::SchemaInvalid(format!(
                        "structure '{}' extends unknown structure '{}'",
                        current.name, parent_name
                    ))
                })?;
                if !visited.insert(parent_name) {
                    return Err(SvcgenError::SchemaInvalid(format!(
                        "inheritance cycle through structure '{}'",
                        parent_name
                    )));
                }
                current = parent;
            }
        }
        Ok(())
    }

    /// Structures in declaration order.
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn structure(&self, name: &str) -> Option<&Structure> {
        self.index.get(name).map(|&position| &self.structures[position])
    }

    /// Resolves an attribute's declared type: scalar kinds win over
    /// structures; a name matching neither is an [`SvcgenError::UnresolvedType`].
    pub fn resolve_attribute_type<'a>(
        &'a self,
        catalog: &TypeCatalog,
        attribute: &Attribute,
    ) -> Result<ResolvedType<'a>, SvcgenError> {
        if let Some(kind) = catalog.scalar_kind(&attribute.type_name) {
            return Ok(ResolvedType::Scalar(kind));
        }
        if let Some(structure) = self.structure(&attribute.type_name) {
            return Ok(ResolvedType::Structure(structure));
        }
        Err(SvcgenError::UnresolvedType {
            structure: attribute.owner.clone(),
            attribute: attribute.name.clone(),
            type_name: attribute.type_name.clone(),
        })
    }

    /// Restriction driving the enumeration rule: attribute-level first, else
    /// the restriction declared on the attribute's named type. First match
    /// wins; restrictions are never merged.
    pub fn restriction_for<'a>(&'a self, attribute: &'a Attribute) -> Option<&'a Restriction> {
        if let Some(restriction) = attribute.restriction.as_ref() {
            return Some(restriction);
        }
        self.structure(&attribute.type_name)
            .and_then(|structure| structure.restriction.as_ref())
    }

    /// Attributes visible on a structure, walking the parent chain from the
    /// root down. A subclass attribute hides a same-named parent attribute
    /// in place.
    pub fn visible_attributes<'a>(&'a self, structure: &'a Structure) -> Vec<&'a Attribute> {
        let mut chain = vec![structure];
        let mut current = structure;
        while let Some(parent_name) = current.parent.as_deref() {
            // Resolvable and acyclic per `check_inheritance`.
            match self.structure(parent_name) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent;
                }
                None => break,
            }
        }

        let mut visible: Vec<&'a Attribute> = Vec::new();
        for structure in chain.iter().rev() {
            for attribute in &structure.attributes {
                match visible.iter().position(|a| a.name == attribute.name) {
                    Some(position) => visible[position] = attribute,
                    None => visible.push(attribute),
                }
            }
        }
        visible
    }
}
