//! Rule engine: primary dispatch, meta-facet layering and exactly-once
//! emission bookkeeping.
//!
//! Dispatch priority is fixed: array and list cardinality dominate because
//! a repeated field's own value is a sequence, not a scalar; enumeration
//! membership dominates plain scalar coercion; item-type handling lets the
//! per-element accessor re-enter the dispatch with cardinality suppressed.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::catalog::TypeCatalog;
use crate::context::GenerationContext;
use crate::handlers::{RuleHandler, RuleInput};
use crate::model::{Attribute, SchemaModel};

/// Per-run memo guaranteeing at-most-once emission per
/// `(rule description, owning structure, attribute)` triple.
///
/// The owner/attribute components keep unrelated attributes that share a
/// rule+value pair on different structures from suppressing each other.
/// Create one ledger per generation run; never share across runs.
#[derive(Debug, Default)]
pub struct AppliedRuleLedger {
    applied: HashSet<(String, String, String)>,
}

impl AppliedRuleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff this exact rule application has already been recorded.
    pub fn has_been_applied(&self, rule_comment: &str, attribute: &Attribute) -> bool {
        self.applied.contains(&(
            rule_comment.to_string(),
            attribute.owner.clone(),
            attribute.name.clone(),
        ))
    }

    /// Records a rule application. Recording the same key twice is a no-op.
    pub fn record(&mut self, rule_comment: &str, attribute: &Attribute) {
        self.applied.insert((
            rule_comment.to_string(),
            attribute.owner.clone(),
            attribute.name.clone(),
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }
}

/// Decides which validation rules apply to an attribute's accessor and
/// emits one instruction per applicable rule through the context sink.
pub struct RuleEngine<'a> {
    model: &'a SchemaModel,
    catalog: &'a TypeCatalog,
}

impl<'a> RuleEngine<'a> {
    pub fn new(model: &'a SchemaModel, catalog: &'a TypeCatalog) -> Self {
        Self { model, catalog }
    }

    /// Sole entry point, called once per generated accessor and once more
    /// per array/list item accessor.
    ///
    /// Never fails for a well-formed attribute: unknown facet names,
    /// unmapped scalar types and dedup hits are all silent no-ops.
    pub fn apply_rules(
        &self,
        ctx: &mut GenerationContext<'_>,
        ledger: &mut AppliedRuleLedger,
        parameter: &str,
        item_accessor: bool,
    ) {
        let attribute = ctx.attribute;

        let primary = if attribute.is_array && !item_accessor {
            // Enumeration/scalar rules are deferred to the item accessor.
            Some(RuleHandler::Array)
        } else if attribute.is_list && !item_accessor {
            Some(RuleHandler::List)
        } else if self.model.restriction_for(attribute).is_some() {
            Some(RuleHandler::Enumeration)
        } else if item_accessor {
            Some(RuleHandler::ItemType)
        } else {
            self.catalog
                .scalar_kind(&attribute.type_name)
                .map(RuleHandler::Scalar)
        };

        if let Some(handler) = primary {
            self.apply_one(handler, &JsonValue::Null, ctx, ledger, parameter, item_accessor);
        }

        self.apply_meta_rules(ctx, ledger, parameter, item_accessor);
    }

    /// Layers every declared meta facet on top of whichever primary rule
    /// fired, in declaration order. Unknown facet names are skipped.
    fn apply_meta_rules(
        &self,
        ctx: &mut GenerationContext<'_>,
        ledger: &mut AppliedRuleLedger,
        parameter: &str,
        item_accessor: bool,
    ) {
        let attribute = ctx.attribute;
        for (name, value) in &attribute.meta {
            if let Some(handler) = RuleHandler::for_meta(name) {
                self.apply_one(handler, value, ctx, ledger, parameter, item_accessor);
            }
        }
    }

    fn apply_one(
        &self,
        handler: RuleHandler,
        value: &JsonValue,
        ctx: &mut GenerationContext<'_>,
        ledger: &mut AppliedRuleLedger,
        parameter: &str,
        item_accessor: bool,
    ) {
        let input = RuleInput {
            model: self.model,
            catalog: self.catalog,
            attribute: ctx.attribute,
        };
        let Some(instruction) = handler.apply(&input, parameter, value, item_accessor) else {
            return;
        };

        let comment = handler.describe(value);
        if ledger.has_been_applied(&comment, ctx.attribute) {
            return;
        }
        ledger.record(&comment, ctx.attribute);
        ctx.push(instruction);
    }

    /// Cardinality/type handlers, exposed for diagnostics and alternate
    /// generation paths.
    pub fn array_rule(&self) -> RuleHandler {
        RuleHandler::Array
    }

    pub fn list_rule(&self) -> RuleHandler {
        RuleHandler::List
    }

    pub fn enumeration_rule(&self) -> RuleHandler {
        RuleHandler::Enumeration
    }

    pub fn item_type_rule(&self) -> RuleHandler {
        RuleHandler::ItemType
    }

    /// Meta-facet handler lookup; `None` for facets this generator does not
    /// model.
    pub fn meta_rule(&self, name: &str) -> Option<RuleHandler> {
        RuleHandler::for_meta(name)
    }
}
