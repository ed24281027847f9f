//! Validation core of a service-description client generator.
//!
//! Consumes an already-parsed structural model (structures, attributes,
//! restrictions) plus the scalar type catalog, and plans the ordered
//! validation instructions each generated accessor must carry. Rendering
//! instructions into source text, schema document parsing and package
//! layout are collaborator concerns and live outside this crate.

pub mod catalog;
pub mod context;
pub mod error;
pub mod handlers;
pub mod model;
pub mod reserved;
pub mod rules;

use serde::{Deserialize, Serialize};

use catalog::TypeCatalog;
use context::{AccessorDescriptor, GenerationContext, ValidationInstruction};
pub use error::SvcgenError;
use model::{Attribute, SchemaModel, Structure};
use reserved::ReservedIdentifiers;
use rules::{AppliedRuleLedger, RuleEngine};

/// One planned accessor with its validation instructions in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAccessor {
    /// Structure the accessor is generated on (may differ from the
    /// attribute's declaring structure for inherited attributes).
    pub structure: String,
    pub attribute: String,
    pub accessor: AccessorDescriptor,
    /// True when the accessor name collides with a reserved runtime member
    /// and the naming stage must rename it.
    pub needs_rename: bool,
    pub instructions: Vec<ValidationInstruction>,
}

/// A structure skipped because one of its attributes references an unknown
/// type. The rest of the run is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStructure {
    pub structure: String,
    pub attribute: String,
    pub type_name: String,
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub accessors: Vec<PlannedAccessor>,
    pub skipped: Vec<SkippedStructure>,
}

/// Plans validation instructions for every accessor of every structure.
///
/// Walks structures in declaration order and each structure's visible
/// attributes (inherited ones included, so the same declaring attribute is
/// revisited per subclass and deduplicated by the per-run ledger). Array
/// and list attributes get a second, per-item accessor plan.
pub fn plan_model(
    model: &SchemaModel,
    type_catalog: &TypeCatalog,
    reserved_identifiers: &ReservedIdentifiers,
) -> GenerationReport {
    let engine = RuleEngine::new(model, type_catalog);
    let mut ledger = AppliedRuleLedger::new();
    let mut report = GenerationReport::default();

    'structures: for structure in model.structures() {
        // Named enumeration types become constant sets, not accessors.
        if structure.restriction.is_some() && structure.attributes.is_empty() {
            continue;
        }

        let visible = model.visible_attributes(structure);
        for attribute in &visible {
            if let Err(err) = model.resolve_attribute_type(type_catalog, attribute) {
                if let SvcgenError::UnresolvedType {
                    attribute,
                    type_name,
                    ..
                } = err
                {
                    report.skipped.push(SkippedStructure {
                        structure: structure.name.clone(),
                        attribute,
                        type_name,
                    });
                }
                continue 'structures;
            }
        }

        for attribute in visible {
            plan_accessor(
                &engine,
                &mut ledger,
                reserved_identifiers,
                &mut report,
                structure,
                attribute,
                false,
            );
            if attribute.is_array || attribute.is_list {
                plan_accessor(
                    &engine,
                    &mut ledger,
                    reserved_identifiers,
                    &mut report,
                    structure,
                    attribute,
                    true,
                );
            }
        }
    }

    report
}

fn plan_accessor(
    engine: &RuleEngine<'_>,
    ledger: &mut AppliedRuleLedger,
    reserved_identifiers: &ReservedIdentifiers,
    report: &mut GenerationReport,
    structure: &Structure,
    attribute: &Attribute,
    item_variant: bool,
) {
    let accessor = accessor_descriptor(attribute, item_variant);
    let needs_rename = reserved_identifiers.is_reserved(&accessor.name);
    let parameter = accessor.parameter.clone();
    let mut ctx = GenerationContext::new(structure, attribute, accessor);
    engine.apply_rules(&mut ctx, ledger, &parameter, item_variant);

    report.accessors.push(PlannedAccessor {
        structure: structure.name.clone(),
        attribute: attribute.name.clone(),
        accessor: ctx.accessor.clone(),
        needs_rename,
        instructions: ctx.into_instructions(),
    });
}

// Placeholder names; the out-of-scope naming stage applies real casing and
// collision suffixes.
fn accessor_descriptor(attribute: &Attribute, item_variant: bool) -> AccessorDescriptor {
    let prefix = if item_variant { "addTo" } else { "set" };
    AccessorDescriptor {
        name: format!("{prefix}{}", upper_first(&attribute.name)),
        parameter: if item_variant {
            "item".to_string()
        } else {
            attribute.name.clone()
        },
        item_variant,
    }
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::CheckKind;
    use crate::model::{Attribute, Restriction, Structure};

    fn plan(structures: Vec<Structure>) -> GenerationReport {
        let model = SchemaModel::new(structures).unwrap();
        plan_model(
            &model,
            &TypeCatalog::builtin(),
            &ReservedIdentifiers::builtin(),
        )
    }

    #[test]
    fn plans_setter_and_item_accessor_for_arrays() {
        let report = plan(vec![
            Structure::new("Order").with_attribute(Attribute::new("codes", "token").array())
        ]);

        assert_eq!(report.accessors.len(), 2);
        assert_eq!(report.accessors[0].accessor.name, "setCodes");
        assert!(!report.accessors[0].accessor.item_variant);
        assert_eq!(report.accessors[1].accessor.name, "addToCodes");
        assert!(report.accessors[1].accessor.item_variant);
    }

    #[test]
    fn unresolved_structure_is_skipped_and_reported() {
        let report = plan(vec![
            Structure::new("Broken").with_attribute(Attribute::new("ref", "Missing")),
            Structure::new("Fine").with_attribute(Attribute::new("id", "int")),
        ]);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].structure, "Broken");
        assert_eq!(report.skipped[0].attribute, "ref");
        assert_eq!(report.skipped[0].type_name, "Missing");

        assert_eq!(report.accessors.len(), 1);
        assert_eq!(report.accessors[0].structure, "Fine");
        assert_eq!(
            report.accessors[0].instructions[0].check,
            CheckKind::ScalarCoercion {
                target: catalog::ScalarKind::Int
            }
        );
    }

    #[test]
    fn enumeration_types_get_no_accessors() {
        let report = plan(vec![
            Structure::new("Currency")
                .with_restriction(Restriction::Enumeration(vec!["EUR".into()])),
            Structure::new("Price").with_attribute(Attribute::new("currency", "Currency")),
        ]);

        let structures: Vec<&str> = report
            .accessors
            .iter()
            .map(|a| a.structure.as_str())
            .collect();
        assert_eq!(structures, vec!["Price"]);
    }

    #[test]
    fn reserved_accessor_names_are_flagged() {
        let report = plan(vec![
            Structure::new("Bag").with_attribute(Attribute::new("internArray", "string"))
        ]);

        assert_eq!(report.accessors[0].accessor.name, "setInternArray");
        assert!(report.accessors[0].needs_rename);
    }

    #[test]
    fn inherited_attribute_rules_dedup_across_subclasses() {
        let report = plan(vec![
            Structure::new("Base").with_attribute(
                Attribute::new("id", "string").with_meta("maxLength", json!(8)),
            ),
            Structure::new("Derived").extending("Base"),
        ]);

        // Both structures plan the accessor, but the ledger keys on the
        // declaring owner, so only the first visit emits instructions.
        assert_eq!(report.accessors.len(), 2);
        assert_eq!(report.accessors[0].structure, "Base");
        assert_eq!(report.accessors[0].instructions.len(), 1);
        assert_eq!(report.accessors[1].structure, "Derived");
        assert!(report.accessors[1].instructions.is_empty());
    }
}
