//! Engine errors and non-fatal warnings

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::engine::validator::StructuralIssue;

/// Fatal engine errors - generation is aborted and nothing is returned
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum EngineError {
    #[error("no equipment records to generate from")]
    #[diagnostic(
        code(wbsgen::engine::empty_input),
        help("check that the equipment list has rows with equipment number, subsystem, description and commissioning filled in")
    )]
    EmptyInput,

    #[error("cyclic parent chain involving equipment '{equipment}'")]
    #[diagnostic(
        code(wbsgen::engine::cyclic_parent),
        help("an item cannot be its own ancestor; fix the parent equipment column for this chain")
    )]
    CyclicParentChain { equipment: String },

    #[error("generated structure has {count} structural issue(s)")]
    #[diagnostic(
        code(wbsgen::engine::structural_integrity),
        help("run without --strict to keep the output and inspect it with 'wbsgen validate'")
    )]
    StructuralIntegrity { count: usize },
}

/// Non-fatal findings returned alongside generated data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A new item's subsystem could not be matched; the item was dropped
    UnresolvedSubsystemReference { equipment: String, subsystem: String },

    /// The validator found a problem in the produced node set
    StructuralIntegrity { issue: StructuralIssue },

    /// The same equipment number appeared twice; the first row was kept
    DuplicateEquipment { equipment: String, subsystem: String },

    /// An extend run named a subsystem that is already in the structure
    SubsystemAlreadyExists { subsystem: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedSubsystemReference {
                equipment,
                subsystem,
            } => write!(
                f,
                "dropped {}: subsystem '{}' not found in existing structure",
                equipment, subsystem
            ),
            Warning::StructuralIntegrity { issue } => write!(f, "structure: {}", issue),
            Warning::DuplicateEquipment {
                equipment,
                subsystem,
            } => write!(
                f,
                "duplicate equipment {} in '{}' (first row kept)",
                equipment, subsystem
            ),
            Warning::SubsystemAlreadyExists { subsystem } => write!(
                f,
                "subsystem '{}' already exists; use 'wbsgen reconcile' to add equipment to it",
                subsystem
            ),
        }
    }
}
