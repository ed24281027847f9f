//! Rule catalog: one handler per cardinality/type rule and per supported
//! meta facet.
//!
//! The catalog is a closed enum resolved statically; unknown facet names map
//! to no handler and are skipped by the engine, so schemas using facets this
//! generator does not model still generate.

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::catalog::{ScalarKind, TypeCatalog};
use crate::context::{CheckKind, ValidationInstruction};
use crate::model::{Attribute, Restriction, SchemaModel};

/// Read-only inputs a handler may consult while constructing an instruction.
pub struct RuleInput<'a> {
    pub model: &'a SchemaModel,
    pub catalog: &'a TypeCatalog,
    pub attribute: &'a Attribute,
}

/// A named validation rule. Cardinality/type rules take a null constraint
/// value; facet rules take the declared facet value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleHandler {
    Array,
    List,
    Enumeration,
    ItemType,
    Scalar(ScalarKind),
    Length,
    MinLength,
    MaxLength,
    MinInclusive,
    MaxInclusive,
    MinExclusive,
    MaxExclusive,
    Pattern,
    MinOccurs,
    MaxOccurs,
    TotalDigits,
    FractionDigits,
}

impl RuleHandler {
    /// Resolves a meta facet name to its handler. Unknown names yield
    /// `None`; the engine treats that as a silent no-op.
    pub fn for_meta(name: &str) -> Option<Self> {
        match name {
            "length" => Some(Self::Length),
            "minLength" => Some(Self::MinLength),
            "maxLength" => Some(Self::MaxLength),
            "minInclusive" => Some(Self::MinInclusive),
            "maxInclusive" => Some(Self::MaxInclusive),
            "minExclusive" => Some(Self::MinExclusive),
            "maxExclusive" => Some(Self::MaxExclusive),
            "pattern" => Some(Self::Pattern),
            "minOccurs" => Some(Self::MinOccurs),
            "maxOccurs" => Some(Self::MaxOccurs),
            "totalDigits" => Some(Self::TotalDigits),
            "fractionDigits" => Some(Self::FractionDigits),
            _ => None,
        }
    }

    /// Stable, value-dependent rendering of the rule, used as the rule
    /// component of the dedup key and as the instruction comment. Depends
    /// only on handler identity and the constraint value.
    pub fn describe(&self, value: &JsonValue) -> String {
        match self {
            Self::Array => "array sequence".to_string(),
            Self::List => "list sequence".to_string(),
            Self::Enumeration => "enumeration membership".to_string(),
            Self::ItemType => "item type".to_string(),
            Self::Scalar(kind) => format!("{} coercion", kind.name()),
            Self::Length => format!("length({})", render_value(value)),
            Self::MinLength => format!("minLength({})", render_value(value)),
            Self::MaxLength => format!("maxLength({})", render_value(value)),
            Self::MinInclusive => format!("minInclusive({})", render_value(value)),
            Self::MaxInclusive => format!("maxInclusive({})", render_value(value)),
            Self::MinExclusive => format!("minExclusive({})", render_value(value)),
            Self::MaxExclusive => format!("maxExclusive({})", render_value(value)),
            Self::Pattern => format!("pattern({})", render_value(value)),
            Self::MinOccurs => format!("minOccurs({})", render_value(value)),
            Self::MaxOccurs => format!("maxOccurs({})", render_value(value)),
            Self::TotalDigits => format!("totalDigits({})", render_value(value)),
            Self::FractionDigits => format!("fractionDigits({})", render_value(value)),
        }
    }

    /// Constructs the validation instruction, or `None` when the rule has
    /// nothing to emit for this value (text scalars, facet values of the
    /// wrong shape, uncompilable patterns).
    pub fn apply(
        &self,
        input: &RuleInput<'_>,
        parameter: &str,
        value: &JsonValue,
        item_accessor: bool,
    ) -> Option<ValidationInstruction> {
        let check = self.build_check(input, value, item_accessor)?;
        Some(ValidationInstruction {
            check,
            parameter: parameter.to_string(),
            comment: self.describe(value),
        })
    }

    fn build_check(
        &self,
        input: &RuleInput<'_>,
        value: &JsonValue,
        item_accessor: bool,
    ) -> Option<CheckKind> {
        match self {
            Self::Array => Some(CheckKind::ArraySequence {
                item_type: input.attribute.type_name.clone(),
            }),
            Self::List => Some(CheckKind::ListSequence {
                item_type: input.attribute.type_name.clone(),
            }),
            Self::Enumeration => match input.model.restriction_for(input.attribute) {
                Some(Restriction::Enumeration(values)) => Some(CheckKind::EnumMembership {
                    allowed: values.clone(),
                }),
                // Facet-only restrictions have no literal set to check.
                Some(Restriction::Facets(_)) | None => None,
            },
            Self::ItemType => {
                let type_name = input.attribute.type_name.as_str();
                if let Some(kind) = input.catalog.scalar_kind(type_name) {
                    return Self::Scalar(kind).build_check(input, value, item_accessor);
                }
                input
                    .model
                    .structure(type_name)
                    .map(|structure| CheckKind::StructureInstance {
                        structure: structure.name.clone(),
                    })
            }
            // Text needs no coercion; the other kinds get a coercion check.
            Self::Scalar(ScalarKind::String) => None,
            Self::Scalar(kind) => Some(CheckKind::ScalarCoercion { target: *kind }),
            Self::Length => as_u64(value).map(|exact| CheckKind::Length { exact }),
            Self::MinLength => as_u64(value).map(|min| CheckKind::MinLength { min }),
            Self::MaxLength => as_u64(value).map(|max| CheckKind::MaxLength { max }),
            Self::MinInclusive => as_f64(value).map(|bound| CheckKind::MinInclusive { bound }),
            Self::MaxInclusive => as_f64(value).map(|bound| CheckKind::MaxInclusive { bound }),
            Self::MinExclusive => as_f64(value).map(|bound| CheckKind::MinExclusive { bound }),
            Self::MaxExclusive => as_f64(value).map(|bound| CheckKind::MaxExclusive { bound }),
            Self::Pattern => {
                let pattern = value.as_str()?;
                // An uncompilable facet pattern is dropped, not fatal.
                Regex::new(pattern).ok()?;
                Some(CheckKind::Pattern {
                    pattern: pattern.to_string(),
                })
            }
            Self::MinOccurs => as_u64(value).map(|min| CheckKind::MinOccurs { min }),
            Self::MaxOccurs => as_u64(value).map(|max| CheckKind::MaxOccurs { max }),
            Self::TotalDigits => as_u64(value).map(|digits| CheckKind::TotalDigits { digits }),
            Self::FractionDigits => as_u64(value).map(|digits| CheckKind::FractionDigits { digits }),
        }
    }
}

fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Facet values arrive from the schema front-end either as numbers or as the
// raw literal strings the source document carried.
fn as_u64(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Structure;

    fn input<'a>(
        model: &'a SchemaModel,
        catalog: &'a TypeCatalog,
        attribute: &'a Attribute,
    ) -> RuleInput<'a> {
        RuleInput {
            model,
            catalog,
            attribute,
        }
    }

    #[test]
    fn describe_is_deterministic_and_value_dependent() {
        assert_eq!(RuleHandler::MinLength.describe(&json!(5)), "minLength(5)");
        assert_eq!(RuleHandler::MinLength.describe(&json!(6)), "minLength(6)");
        assert_eq!(
            RuleHandler::Pattern.describe(&json!("[0-9]+")),
            "pattern([0-9]+)"
        );
        assert_eq!(RuleHandler::Array.describe(&JsonValue::Null), "array sequence");
    }

    #[test]
    fn unknown_meta_names_resolve_to_no_handler() {
        assert_eq!(RuleHandler::for_meta("whiteSpace"), None);
        assert_eq!(RuleHandler::for_meta("minLength"), Some(RuleHandler::MinLength));
    }

    #[test]
    fn string_scalar_emits_nothing() {
        let model = SchemaModel::new(vec![
            Structure::new("S").with_attribute(Attribute::new("name", "string"))
        ])
        .unwrap();
        let catalog = TypeCatalog::builtin();
        let attribute = &model.structure("S").unwrap().attributes[0];
        let handler = RuleHandler::Scalar(ScalarKind::String);
        assert!(handler
            .apply(&input(&model, &catalog, attribute), "name", &JsonValue::Null, false)
            .is_none());
    }

    #[test]
    fn facet_values_parse_from_strings() {
        let model = SchemaModel::new(vec![
            Structure::new("S").with_attribute(Attribute::new("id", "string"))
        ])
        .unwrap();
        let catalog = TypeCatalog::builtin();
        let attribute = &model.structure("S").unwrap().attributes[0];
        let instruction = RuleHandler::MaxLength
            .apply(&input(&model, &catalog, attribute), "id", &json!("12"), false)
            .unwrap();
        assert_eq!(instruction.check, CheckKind::MaxLength { max: 12 });

        let instruction = RuleHandler::MinInclusive
            .apply(&input(&model, &catalog, attribute), "id", &json!("0.5"), false)
            .unwrap();
        assert_eq!(instruction.check, CheckKind::MinInclusive { bound: 0.5 });
    }

    #[test]
    fn malformed_facet_values_emit_nothing() {
        let model = SchemaModel::new(vec![
            Structure::new("S").with_attribute(Attribute::new("id", "string"))
        ])
        .unwrap();
        let catalog = TypeCatalog::builtin();
        let attribute = &model.structure("S").unwrap().attributes[0];
        let i = input(&model, &catalog, attribute);

        assert!(RuleHandler::MinLength
            .apply(&i, "id", &json!("many"), false)
            .is_none());
        assert!(RuleHandler::Pattern
            .apply(&i, "id", &json!("(unclosed"), false)
            .is_none());
        assert!(RuleHandler::MaxInclusive
            .apply(&i, "id", &json!(true), false)
            .is_none());
    }

    #[test]
    fn item_type_resolves_scalar_then_structure() {
        let model = SchemaModel::new(vec![
            Structure::new("Line"),
            Structure::new("Order")
                .with_attribute(Attribute::new("counts", "int").array())
                .with_attribute(Attribute::new("lines", "Line").array()),
        ])
        .unwrap();
        let catalog = TypeCatalog::builtin();
        let order = model.structure("Order").unwrap();

        let counts = &order.attributes[0];
        let instruction = RuleHandler::ItemType
            .apply(&input(&model, &catalog, counts), "item", &JsonValue::Null, true)
            .unwrap();
        assert_eq!(
            instruction.check,
            CheckKind::ScalarCoercion {
                target: ScalarKind::Int
            }
        );

        let lines = &order.attributes[1];
        let instruction = RuleHandler::ItemType
            .apply(&input(&model, &catalog, lines), "item", &JsonValue::Null, true)
            .unwrap();
        assert_eq!(
            instruction.check,
            CheckKind::StructureInstance {
                structure: "Line".to_string()
            }
        );
    }
}
