//! Continuation / diff engine
//!
//! Compares a revised equipment list against an existing structure and
//! appends only what is new. Existing nodes are never renumbered, renamed
//! or removed; equipment missing from the revised list is reported only.

pub mod extract;
pub mod matcher;

use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;

use crate::engine::error::{EngineError, Warning};
use crate::engine::index::EquipmentIndex;
use crate::engine::tree::WbsTree;
use crate::engine::validator::{self, ValidationReport};
use crate::entities::node::names;
use crate::entities::state::FIRST_SUBSYSTEM_COUNTER;
use crate::entities::{Category, Commissioning, EquipmentRecord, ProjectState, WbsCode, WbsNode};

pub use extract::{extract, Extraction};
pub use matcher::SubsystemMatcher;

/// How the revised list relates to the existing structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentAnalysis {
    /// Relevant items not yet in the structure
    pub new_equipment: Vec<String>,
    /// Relevant items already in the structure
    pub existing_equipment: Vec<String>,
    /// Items in the structure that are no longer relevant
    pub removed_equipment: Vec<String>,
}

/// Output of a reconcile run
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Nodes created by this run, all flagged `isNew`
    pub new_nodes: Vec<WbsNode>,
    /// Existing nodes unchanged, followed by the new nodes
    pub nodes: Vec<WbsNode>,
    pub analysis: EquipmentAnalysis,
    /// New items that could not be placed
    pub dropped: Vec<String>,
    pub warnings: Vec<Warning>,
    pub validation: ValidationReport,
    /// Replacement project state
    pub state: ProjectState,
}

impl Reconciliation {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn into_strict(self) -> Result<Self, EngineError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(EngineError::StructuralIntegrity {
                count: self.validation.issues.len(),
            })
        }
    }
}

/// Reconcile against a bare node set
///
/// Subsystem labels are recovered from the nodes and the top-level counter
/// starts from the highest code in use.
pub fn reconcile(
    existing: &[WbsNode],
    revised: &[EquipmentRecord],
    project_name: &str,
) -> Result<Reconciliation, EngineError> {
    let extraction = extract(existing);
    let subsystems = extraction.subsystems.iter().map(|s| s.label()).collect();
    Reconciler {
        existing,
        extraction,
        project_name: project_name.to_string(),
        last_wbs_code: FIRST_SUBSYSTEM_COUNTER,
        subsystems,
    }
    .run(revised)
}

/// Reconcile against a saved project state
pub fn reconcile_state(
    state: &ProjectState,
    revised: &[EquipmentRecord],
) -> Result<Reconciliation, EngineError> {
    Reconciler {
        existing: &state.wbs_nodes,
        extraction: extract(&state.wbs_nodes),
        project_name: state.project_name.clone(),
        last_wbs_code: state.last_wbs_code,
        subsystems: state.subsystems.clone(),
    }
    .run(revised)
}

struct Reconciler<'n> {
    existing: &'n [WbsNode],
    extraction: Extraction,
    project_name: String,
    last_wbs_code: u32,
    subsystems: Vec<String>,
}

/// Mutable output of a run
struct Placement {
    tree: WbsTree,
    new_nodes: Vec<WbsNode>,
    dropped: Vec<String>,
    warnings: Vec<Warning>,
}

impl Placement {
    fn push(&mut self, code: WbsCode, name: impl Into<String>) {
        let node = WbsNode::new(code, name).marked_new();
        self.tree.push(node.clone());
        self.new_nodes.push(node);
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "reconcile");
        self.warnings.push(warning);
    }
}

impl<'n> Reconciler<'n> {
    fn run(self, revised: &[EquipmentRecord]) -> Result<Reconciliation, EngineError> {
        if revised.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let relevant: Vec<&EquipmentRecord> = revised
            .iter()
            .filter(|r| r.commissioning.is_relevant())
            .collect();
        let (analysis, new_items) = self.partition(&relevant);

        let mut matcher = SubsystemMatcher::new();
        for subsystem in &self.extraction.subsystems {
            matcher.register(&subsystem.name, &subsystem.code);
        }

        let mut placement = Placement {
            tree: WbsTree::from_nodes(self.existing.to_vec()),
            new_nodes: Vec::new(),
            dropped: Vec::new(),
            warnings: Vec::new(),
        };

        let new_active: Vec<&EquipmentRecord> = new_items
            .iter()
            .copied()
            .filter(|r| r.commissioning == Commissioning::Yes)
            .collect();
        self.place_active(&mut placement, &matcher, &new_active)?;

        let new_tbc: Vec<&EquipmentRecord> = new_items
            .iter()
            .copied()
            .filter(|r| r.commissioning == Commissioning::Tbc)
            .collect();
        let created_top_level = self.place_tbc(&mut placement, &new_tbc);

        let nodes = placement.tree.into_nodes();
        let validation = validator::validate_report(&nodes);
        for issue in &validation.issues {
            let warning = Warning::StructuralIntegrity {
                issue: issue.clone(),
            };
            tracing::warn!(%warning, "reconcile");
            placement.warnings.push(warning);
        }

        let last_wbs_code = match created_top_level {
            Some(n) => self.last_wbs_code.max(n + 1),
            None => self.last_wbs_code,
        };
        let state = ProjectState {
            project_name: self.project_name.clone(),
            last_wbs_code,
            subsystems: self.subsystems.clone(),
            wbs_nodes: nodes.clone(),
            timestamp: Utc::now(),
        };

        tracing::info!(
            new = analysis.new_equipment.len(),
            existing = analysis.existing_equipment.len(),
            removed = analysis.removed_equipment.len(),
            placed = placement.new_nodes.len(),
            dropped = placement.dropped.len(),
            "reconciled equipment list"
        );

        Ok(Reconciliation {
            new_nodes: placement.new_nodes,
            nodes,
            analysis,
            dropped: placement.dropped,
            warnings: placement.warnings,
            validation,
            state,
        })
    }

    /// Split relevant records into new and existing, and find removed items
    fn partition<'r>(
        &self,
        relevant: &[&'r EquipmentRecord],
    ) -> (EquipmentAnalysis, Vec<&'r EquipmentRecord>) {
        let mut analysis = EquipmentAnalysis::default();
        let mut new_items = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for &record in relevant {
            let number = record.equipment_number.as_str();
            if !seen.insert(number) {
                continue;
            }
            if self.extraction.contains(number) {
                analysis.existing_equipment.push(number.to_string());
            } else {
                analysis.new_equipment.push(number.to_string());
                new_items.push(record);
            }
        }

        let mut reported: HashSet<&str> = HashSet::new();
        for item in &self.extraction.equipment {
            let number = item.equipment_number.as_str();
            if !seen.contains(number) && reported.insert(number) {
                analysis.removed_equipment.push(number.to_string());
            }
        }

        (analysis, new_items)
    }

    /// Place new `Y` items: under their existing parent, otherwise under
    /// the subsystem's `99` node
    fn place_active(
        &self,
        placement: &mut Placement,
        matcher: &SubsystemMatcher,
        records: &[&EquipmentRecord],
    ) -> Result<(), EngineError> {
        let index = EquipmentIndex::build(records.iter().copied())?;

        for root in index.roots() {
            let existing_parent = root
                .parent()
                .and_then(|p| self.extraction.code_of(p))
                .filter(|code| !self.extraction.in_tbc_branch(code))
                .filter(|code| placement.tree.contains(code))
                .cloned();

            let parent_code = match existing_parent {
                Some(code) => code,
                None => match matcher.resolve(&root.subsystem) {
                    Some(subsystem_code) => unrecognised_node(placement, subsystem_code),
                    None => {
                        placement.warn(Warning::UnresolvedSubsystemReference {
                            equipment: root.equipment_number.clone(),
                            subsystem: root.subsystem.clone(),
                        });
                        drop_branch(placement, &index, root);
                        continue;
                    }
                },
            };

            place_branch(placement, &index, root, &parent_code);
        }
        Ok(())
    }

    /// Append new TBC items under the TBC branch, creating it if needed
    ///
    /// Returns the top-level counter used when the branch was created.
    fn place_tbc(&self, placement: &mut Placement, records: &[&EquipmentRecord]) -> Option<u32> {
        if records.is_empty() {
            return None;
        }

        let root = WbsCode::root();
        let (tbc_code, created) = match &self.extraction.tbc {
            Some(code) => (code.clone(), None),
            None => {
                let next = placement.tree.next_child_code(&root);
                let counter = next.last_segment().max(self.last_wbs_code);
                let code = root.child(counter);
                placement.push(code.clone(), names::TBC);
                (code, Some(counter))
            }
        };

        for record in records {
            let code = placement.tree.next_child_code(&tbc_code);
            placement.push(code, record.wbs_name());
        }
        created
    }
}

/// Code of the `99 | Unrecognised Equipment` node of a subsystem, created
/// if the subsystem lacks one
fn unrecognised_node(placement: &mut Placement, subsystem: &WbsCode) -> WbsCode {
    let label = Category::Unrecognised.label();
    if let Some(node) = placement
        .tree
        .find_child(subsystem, |n| n.wbs_name == label)
    {
        return node.wbs_code.clone();
    }

    let positional = subsystem.child(Category::Unrecognised.position());
    let code = if placement.tree.contains(&positional) {
        placement.tree.next_child_code(subsystem)
    } else {
        positional
    };
    placement.push(code.clone(), label);
    code
}

fn place_branch(
    placement: &mut Placement,
    index: &EquipmentIndex<'_>,
    record: &EquipmentRecord,
    parent: &WbsCode,
) {
    let code = placement.tree.next_child_code(parent);
    placement.push(code.clone(), record.wbs_name());
    for child in index.children_of(&record.equipment_number) {
        place_branch(placement, index, child, &code);
    }
}

fn drop_branch(placement: &mut Placement, index: &EquipmentIndex<'_>, record: &EquipmentRecord) {
    placement.dropped.push(record.equipment_number.clone());
    for child in index.children_of(&record.equipment_number) {
        drop_branch(placement, index, child);
    }
}
