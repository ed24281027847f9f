//! Per-accessor generation context and the validation-instruction sink.

use serde::{Deserialize, Serialize};

use crate::catalog::ScalarKind;
use crate::model::{Attribute, Structure};

/// Renderer-agnostic description of one runtime check. A later emission
/// stage turns these into concrete source text; the core never renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationInstruction {
    pub check: CheckKind,
    /// Accessor parameter the check applies to.
    pub parameter: String,
    /// Human-readable rule description; also the rule component of the
    /// dedup key.
    pub comment: String,
}

/// Closed set of checks the rule catalog knows how to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Value must be a bounded sequence whose elements have the item type.
    ArraySequence { item_type: String },
    /// Value must be an unbounded sequence whose elements have the item type.
    ListSequence { item_type: String },
    /// Value must be one of the enumerated literals.
    EnumMembership { allowed: Vec<String> },
    /// Value must be an instance of the named structure.
    StructureInstance { structure: String },
    /// Value must coerce to the target scalar kind.
    ScalarCoercion { target: ScalarKind },
    Length { exact: u64 },
    MinLength { min: u64 },
    MaxLength { max: u64 },
    MinInclusive { bound: f64 },
    MaxInclusive { bound: f64 },
    MinExclusive { bound: f64 },
    MaxExclusive { bound: f64 },
    Pattern { pattern: String },
    MinOccurs { min: u64 },
    MaxOccurs { max: u64 },
    TotalDigits { digits: u64 },
    FractionDigits { digits: u64 },
}

/// Identity of the accessor being synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorDescriptor {
    pub name: String,
    pub parameter: String,
    /// True for the per-element accessor of an array/list attribute.
    pub item_variant: bool,
}

/// Everything the rule engine needs while building one accessor: the owning
/// structure, the attribute, the accessor identity and the instruction sink.
#[derive(Debug)]
pub struct GenerationContext<'a> {
    pub structure: &'a Structure,
    pub attribute: &'a Attribute,
    pub accessor: AccessorDescriptor,
    instructions: Vec<ValidationInstruction>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        structure: &'a Structure,
        attribute: &'a Attribute,
        accessor: AccessorDescriptor,
    ) -> Self {
        Self {
            structure,
            attribute,
            accessor,
            instructions: Vec::new(),
        }
    }

    /// Appends an instruction; emission order is preserved.
    pub fn push(&mut self, instruction: ValidationInstruction) {
        self.instructions.push(instruction);
    }

    pub fn instructions(&self) -> &[ValidationInstruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<ValidationInstruction> {
        self.instructions
    }
}
