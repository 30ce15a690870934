//! Hierarchy builder
//!
//! Assembles the complete node set for a "new" or "continue" generation:
//! root, Milestones, Prerequisites, one branch per subsystem with all 11
//! category nodes, equipment trees, and the trailing TBC branch.

use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::engine::allocator::{CodeAllocator, Sequence};
use crate::engine::error::{EngineError, Warning};
use crate::engine::index::EquipmentIndex;
use crate::engine::subsystem::{self, ResolvedSubsystem};
use crate::engine::validator::{self, ValidationReport};
use crate::entities::node::names;
use crate::entities::{Category, Commissioning, EquipmentRecord, ProjectState, WbsCode, WbsNode};

/// Whether a run starts a fresh structure or extends a saved one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    New,
    Continue,
}

/// Counts and findings of one generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    /// Node names of the subsystems created by this run
    pub subsystems: Vec<String>,
    pub equipment_placed: usize,
    pub tbc_items: usize,
    /// Records with commissioning `N`
    pub excluded: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub warnings: Vec<Warning>,
    pub validation: ValidationReport,
}

/// Output of the hierarchy builder
#[derive(Debug, Clone)]
pub struct Generation {
    /// Complete node set (visualization and continuation state)
    pub nodes: Vec<WbsNode>,
    /// Nodes created by this run (P6 import)
    pub new_nodes: Vec<WbsNode>,
    /// Replacement project state
    pub state: ProjectState,
    pub summary: GenerationSummary,
}

impl Generation {
    pub fn is_valid(&self) -> bool {
        self.summary.validation.is_valid()
    }

    /// Turn structural findings into an error
    pub fn into_strict(self) -> Result<Self, EngineError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(EngineError::StructuralIntegrity {
                count: self.summary.validation.issues.len(),
            })
        }
    }
}

/// Generate a fresh structure
pub fn generate_new(
    records: &[EquipmentRecord],
    project_name: &str,
) -> Result<Generation, EngineError> {
    HierarchyBuilder::new(GenerationMode::New, project_name, None).build(records)
}

/// Extend a saved structure with new subsystems
///
/// Prior nodes are carried forward unchanged (flagged `isExisting`), new
/// subsystems continue the saved counters and are flagged `isNew`.
pub fn generate_continue(
    records: &[EquipmentRecord],
    state: &ProjectState,
) -> Result<Generation, EngineError> {
    HierarchyBuilder::new(GenerationMode::Continue, &state.project_name, Some(state))
        .build(records)
}

struct HierarchyBuilder<'s> {
    mode: GenerationMode,
    project_name: String,
    prior: Option<&'s ProjectState>,
    nodes: Vec<WbsNode>,
    summary: GenerationSummary,
}

impl<'s> HierarchyBuilder<'s> {
    fn new(mode: GenerationMode, project_name: &str, prior: Option<&'s ProjectState>) -> Self {
        Self {
            mode,
            project_name: project_name.to_string(),
            prior,
            nodes: Vec::new(),
            summary: GenerationSummary::default(),
        }
    }

    /// Push a node created by this run
    fn emit(&mut self, node: WbsNode) {
        let node = match self.mode {
            GenerationMode::New => node.unflagged(),
            GenerationMode::Continue => node.marked_new(),
        };
        self.nodes.push(node);
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "generation");
        self.summary.warnings.push(warning);
    }

    fn build(mut self, records: &[EquipmentRecord]) -> Result<Generation, EngineError> {
        if records.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let active: Vec<&EquipmentRecord> = records
            .iter()
            .filter(|r| r.commissioning == Commissioning::Yes)
            .collect();
        let tbc: Vec<&EquipmentRecord> = records
            .iter()
            .filter(|r| r.commissioning == Commissioning::Tbc)
            .collect();
        self.summary.excluded = records.len() - active.len() - tbc.len();

        let subsystems = self.plan_subsystems(&active);
        let mut allocator = CodeAllocator::from_state(self.prior);

        let root = CodeAllocator::root();
        let milestones = CodeAllocator::milestones();
        let prerequisites = CodeAllocator::prerequisites();
        self.nodes.push(WbsNode::new(root.clone(), self.project_name.clone()));
        self.nodes.push(WbsNode::new(milestones.clone(), names::MILESTONES));
        self.nodes.push(WbsNode::new(prerequisites.clone(), names::PREREQUISITES));

        let mut prior_tbc: Option<(WbsCode, u32)> = None;
        if let Some(prior) = self.prior {
            for node in &prior.wbs_nodes {
                if node.is_root()
                    || node.wbs_code == root
                    || node.wbs_code == milestones
                    || node.wbs_code == prerequisites
                {
                    continue;
                }
                if node.parent_wbs_code.as_ref() == Some(&root) && node.wbs_name == names::TBC {
                    prior_tbc = Some((node.wbs_code.clone(), 0));
                }
                if let Some((tbc_code, last)) = prior_tbc.as_mut() {
                    if node.parent_wbs_code.as_ref() == Some(&*tbc_code) {
                        *last = (*last).max(node.wbs_code.last_segment());
                    }
                }
                self.nodes.push(node.clone().marked_existing());
            }
        }

        let planned: Vec<(ResolvedSubsystem, WbsCode)> = subsystems
            .into_iter()
            .map(|s| {
                let codes = allocator.allocate_subsystem();
                debug_assert_eq!(codes.ordinal, s.ordinal);
                self.emit(WbsNode::new(codes.prerequisite, s.node_name()));
                (s, codes.node)
            })
            .collect();

        for (resolved, code) in &planned {
            let members: Vec<&EquipmentRecord> = active
                .iter()
                .copied()
                .filter(|r| resolved.raw_names.iter().any(|raw| raw == r.subsystem.trim()))
                .collect();
            self.build_subsystem(resolved, code, &members)?;
            self.summary.subsystems.push(resolved.node_name());
        }

        if !tbc.is_empty() {
            let mut seq = match prior_tbc {
                Some((code, last)) => Sequence::after(code, last),
                None => {
                    let code = allocator.allocate_top_level();
                    self.emit(WbsNode::new(code.clone(), names::TBC));
                    Sequence::under(code)
                }
            };
            for record in &tbc {
                self.emit(WbsNode::new(seq.next_code(), record.wbs_name()));
            }
            self.summary.tbc_items = tbc.len();
        }

        self.finish(allocator.next_counter())
    }

    /// Unique subsystem names of the `Y` records, resolved and ordered
    ///
    /// In continue mode names already present in the saved state are
    /// skipped with a warning.
    fn plan_subsystems(&mut self, active: &[&EquipmentRecord]) -> Vec<ResolvedSubsystem> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut raw_names: Vec<&str> = Vec::new();
        for record in active {
            let name = record.subsystem.trim();
            if seen.insert(name) {
                raw_names.push(name);
            }
        }

        if let Some(prior) = self.prior {
            let mut reported: HashSet<String> = HashSet::new();
            let mut kept = Vec::with_capacity(raw_names.len());
            for name in raw_names {
                let formatted = subsystem::format_subsystem(name).formatted;
                if prior.has_subsystem(&formatted) {
                    if reported.insert(formatted.clone()) {
                        self.warn(Warning::SubsystemAlreadyExists {
                            subsystem: formatted,
                        });
                    }
                } else {
                    kept.push(name);
                }
            }
            raw_names = kept;
        }

        let existing = self.prior.map_or(0, |s| s.subsystem_count());
        subsystem::resolve(raw_names, existing)
    }

    fn build_subsystem(
        &mut self,
        resolved: &ResolvedSubsystem,
        code: &WbsCode,
        members: &[&EquipmentRecord],
    ) -> Result<(), EngineError> {
        let index = EquipmentIndex::build(members.iter().copied())?;
        for duplicate in index.duplicates() {
            self.warn(Warning::DuplicateEquipment {
                equipment: duplicate.equipment_number.clone(),
                subsystem: resolved.formatted.clone(),
            });
        }

        self.emit(WbsNode::new(code.clone(), resolved.node_name()));

        for category in Category::ALL {
            let category_code = CodeAllocator::category(code, category);
            self.emit(WbsNode::new(category_code.clone(), category.label()));

            let mut seq = Sequence::under(category_code);
            for fixed in category.fixed_children() {
                self.emit(WbsNode::new(seq.next_code(), *fixed));
            }
            for root in index.roots().filter(|r| index.category_of(r) == category) {
                let root_code = seq.next_code();
                self.emit_equipment(&index, root, root_code, category);
            }
        }

        tracing::debug!(
            subsystem = %resolved.node_name(),
            code = %code,
            equipment = index.len(),
            "built subsystem"
        );
        Ok(())
    }

    /// Emit an item and its descendants, children numbered from 1 per parent
    fn emit_equipment(
        &mut self,
        index: &EquipmentIndex<'_>,
        record: &EquipmentRecord,
        code: WbsCode,
        category: Category,
    ) {
        self.emit(WbsNode::new(code.clone(), record.wbs_name()));
        self.summary.equipment_placed += 1;
        *self.summary.per_category.entry(category).or_insert(0) += 1;

        let mut seq = Sequence::under(code);
        for child in index.children_of(&record.equipment_number) {
            let child_code = seq.next_code();
            self.emit_equipment(index, child, child_code, category);
        }
    }

    fn finish(mut self, next_counter: u32) -> Result<Generation, EngineError> {
        let validation = validator::validate_report(&self.nodes);
        for issue in &validation.issues {
            self.warn(Warning::StructuralIntegrity {
                issue: issue.clone(),
            });
        }
        self.summary.validation = validation;

        let new_nodes: Vec<WbsNode> = match self.mode {
            GenerationMode::New => self.nodes.clone(),
            GenerationMode::Continue => self.nodes.iter().filter(|n| n.is_new).cloned().collect(),
        };

        let mut subsystems = self
            .prior
            .map(|p| p.subsystems.clone())
            .unwrap_or_default();
        subsystems.extend(self.summary.subsystems.iter().cloned());

        let state = ProjectState {
            project_name: self.project_name.clone(),
            last_wbs_code: next_counter,
            subsystems,
            wbs_nodes: self.nodes.clone(),
            timestamp: Utc::now(),
        };

        tracing::info!(
            mode = ?self.mode,
            subsystems = self.summary.subsystems.len(),
            nodes = self.nodes.len(),
            new_nodes = new_nodes.len(),
            equipment = self.summary.equipment_placed,
            tbc = self.summary.tbc_items,
            "generated structure"
        );

        Ok(Generation {
            nodes: self.nodes,
            new_nodes,
            state,
            summary: self.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(number: &str, parent: &str, subsystem: &str, desc: &str, c: Commissioning) -> EquipmentRecord {
        EquipmentRecord::new(number, subsystem, desc, c).with_parent(parent)
    }

    fn example_records() -> Vec<EquipmentRecord> {
        vec![
            rec("+UH101", "", "Switchroom +Z01", "Panel A", Commissioning::Yes),
            rec("+UH101-F1", "+UH101", "Switchroom +Z01", "Relay", Commissioning::Yes),
            rec("E101", "", "Switchroom +Z01", "Earth rod", Commissioning::Yes),
        ]
    }

    fn name_at<'a>(nodes: &'a [WbsNode], code: &str) -> Option<&'a str> {
        nodes
            .iter()
            .find(|n| n.wbs_code.to_string() == code)
            .map(|n| n.wbs_name.as_str())
    }

    fn children_of<'a>(nodes: &'a [WbsNode], code: &str) -> Vec<&'a WbsNode> {
        nodes
            .iter()
            .filter(|n| n.parent_code_str() == code)
            .collect()
    }

    #[test]
    fn test_example_scenario() {
        let gen = generate_new(&example_records(), "Demo").unwrap();
        let nodes = &gen.nodes;

        assert_eq!(name_at(nodes, "1"), Some("Demo"));
        assert_eq!(name_at(nodes, "1.1"), Some("M | Milestones"));
        assert_eq!(name_at(nodes, "1.2"), Some("P | Pre-requisites"));
        assert_eq!(name_at(nodes, "1.2.1"), Some("S1 | +Z01 - Switchroom"));
        assert_eq!(name_at(nodes, "1.3"), Some("S1 | +Z01 - Switchroom"));
        assert_eq!(name_at(nodes, "1.3.1"), Some("01 | Preparations and set-up"));
        assert_eq!(name_at(nodes, "1.3.1.1"), Some("Test bay"));
        assert_eq!(name_at(nodes, "1.3.1.2"), Some("Panel Shop"));
        assert_eq!(name_at(nodes, "1.3.1.3"), Some("Pad"));
        assert_eq!(name_at(nodes, "1.3.2"), Some("02 | Protection Panels"));
        assert_eq!(name_at(nodes, "1.3.2.1"), Some("+UH101 | Panel A"));
        assert_eq!(name_at(nodes, "1.3.2.1.1"), Some("+UH101-F1 | Relay"));
        assert_eq!(name_at(nodes, "1.3.7"), Some("07 | Earthing"));
        assert_eq!(name_at(nodes, "1.3.7.1"), Some("E101 | Earth rod"));
        assert_eq!(name_at(nodes, "1.3.9.1"), Some("Phase 1"));
        assert_eq!(name_at(nodes, "1.3.9.2"), Some("Phase 2"));
        assert_eq!(name_at(nodes, "1.3.11"), Some("99 | Unrecognised Equipment"));
        assert_eq!(nodes.len(), 24);

        assert_eq!(gen.state.last_wbs_code, 4);
        assert_eq!(gen.state.subsystems, vec!["S1 | +Z01 - Switchroom"]);
        assert_eq!(gen.new_nodes, gen.nodes);
        assert!(gen.is_valid());
        assert!(nodes.iter().all(|n| !n.is_new && !n.is_existing));
        assert_eq!(gen.summary.equipment_placed, 3);
        assert_eq!(gen.summary.per_category.get(&Category::ProtectionPanels), Some(&2));
    }

    #[test]
    fn test_every_subsystem_has_eleven_categories() {
        let records = vec![
            rec("+UH1", "", "Switchroom Z01", "a", Commissioning::Yes),
            rec("QQ1", "", "Battery Room Z02", "b", Commissioning::Yes),
        ];
        let gen = generate_new(&records, "Demo").unwrap();
        for sub in ["1.3", "1.4"] {
            let cats = children_of(&gen.nodes, sub);
            assert_eq!(cats.len(), 11);
            for (i, (node, category)) in cats.iter().zip(Category::ALL).enumerate() {
                assert_eq!(node.wbs_code.last_segment() as usize, i + 1);
                assert_eq!(node.wbs_name, category.label());
            }
        }
        assert_eq!(name_at(&gen.nodes, "1.4.11.1"), Some("QQ1 | b"));
    }

    #[test]
    fn test_commissioning_partition() {
        let records = vec![
            rec("+UH1", "", "Switchroom Z01", "yes", Commissioning::Yes),
            rec("+UH2", "", "Switchroom Z01", "maybe", Commissioning::Tbc),
            rec("+UH3", "", "Switchroom Z01", "never", Commissioning::No),
            rec("E7", "", "Other Z02", "later", Commissioning::Tbc),
        ];
        let gen = generate_new(&records, "Demo").unwrap();

        assert_eq!(name_at(&gen.nodes, "1.3.2.1"), Some("+UH1 | yes"));
        assert_eq!(name_at(&gen.nodes, "1.4"), Some(names::TBC));
        assert_eq!(name_at(&gen.nodes, "1.4.1"), Some("+UH2 | maybe"));
        assert_eq!(name_at(&gen.nodes, "1.4.2"), Some("E7 | later"));
        assert!(!gen.nodes.iter().any(|n| n.wbs_name.starts_with("+UH3")));
        // TBC-only subsystems do not get a branch
        assert!(!gen.nodes.iter().any(|n| n.wbs_name.contains("Other")));

        assert_eq!(gen.summary.excluded, 1);
        assert_eq!(gen.summary.tbc_items, 2);
        assert_eq!(gen.state.last_wbs_code, 5);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut records = example_records();
        records.push(rec("TX1", "", "Substation", "Transformer", Commissioning::Yes));
        records.push(rec("B1", "", "Battery Room Z02", "Bank", Commissioning::Tbc));
        let a = generate_new(&records, "Demo").unwrap();
        let b = generate_new(&records, "Demo").unwrap();
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(
            serde_json::to_string(&a.nodes).unwrap(),
            serde_json::to_string(&b.nodes).unwrap()
        );
    }

    #[test]
    fn test_substation_numbered_last() {
        let records = vec![
            rec("TX1", "", "Main Substation", "tx", Commissioning::Yes),
            rec("E1", "", "Switchroom Z03", "e", Commissioning::Yes),
        ];
        let gen = generate_new(&records, "Demo").unwrap();
        assert_eq!(name_at(&gen.nodes, "1.3"), Some("S1 | +Z03 - Switchroom"));
        assert_eq!(name_at(&gen.nodes, "1.4"), Some("S2 | Main Substation"));
        assert_eq!(name_at(&gen.nodes, "1.4.5.1"), Some("TX1 | tx"));
    }

    #[test]
    fn test_deep_nesting() {
        let records = vec![
            rec("+UH1", "", "S Z01", "l0", Commissioning::Yes),
            rec("A", "+UH1", "S Z01", "l1", Commissioning::Yes),
            rec("B", "A", "S Z01", "l2", Commissioning::Yes),
            rec("C", "B", "S Z01", "l3", Commissioning::Yes),
            rec("D", "A", "S Z01", "l2b", Commissioning::Yes),
        ];
        let gen = generate_new(&records, "Demo").unwrap();
        assert_eq!(name_at(&gen.nodes, "1.3.2.1.1.1.1"), Some("C | l3"));
        assert_eq!(name_at(&gen.nodes, "1.3.2.1.1.2"), Some("D | l2b"));
    }

    #[test]
    fn test_child_of_excluded_parent_becomes_root() {
        let records = vec![
            rec("+UH1", "", "S Z01", "off", Commissioning::No),
            rec("E1", "+UH1", "S Z01", "on", Commissioning::Yes),
        ];
        let gen = generate_new(&records, "Demo").unwrap();
        assert_eq!(name_at(&gen.nodes, "1.3.7.1"), Some("E1 | on"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = generate_new(&[], "Demo").unwrap_err();
        assert_eq!(err, EngineError::EmptyInput);
    }

    #[test]
    fn test_cyclic_chain_is_an_error() {
        let records = vec![
            rec("A1", "B1", "S Z01", "a", Commissioning::Yes),
            rec("B1", "A1", "S Z01", "b", Commissioning::Yes),
        ];
        let err = generate_new(&records, "Demo").unwrap_err();
        assert!(matches!(err, EngineError::CyclicParentChain { .. }));
    }

    #[test]
    fn test_duplicate_equipment_warns() {
        let records = vec![
            rec("E1", "", "S Z01", "first", Commissioning::Yes),
            rec("E1", "", "S Z01", "second", Commissioning::Yes),
        ];
        let gen = generate_new(&records, "Demo").unwrap();
        assert_eq!(name_at(&gen.nodes, "1.3.7.1"), Some("E1 | first"));
        assert!(name_at(&gen.nodes, "1.3.7.2").is_none());
        assert!(matches!(
            gen.summary.warnings.as_slice(),
            [Warning::DuplicateEquipment { .. }]
        ));
    }

    #[test]
    fn test_continue_appends_new_subsystems() {
        let first = generate_new(&example_records(), "Demo").unwrap();
        let more = vec![
            rec("BAT1", "", "Battery Room Z02", "Battery", Commissioning::Yes),
            rec("X9", "", "Battery Room Z02", "Spare", Commissioning::Tbc),
        ];
        let second = generate_continue(&more, &first.state).unwrap();

        assert_eq!(name_at(&second.nodes, "1.2.2"), Some("S2 | +Z02 - Battery Room"));
        assert_eq!(name_at(&second.nodes, "1.4"), Some("S2 | +Z02 - Battery Room"));
        assert_eq!(name_at(&second.nodes, "1.4.6.1"), Some("BAT1 | Battery"));
        assert_eq!(name_at(&second.nodes, "1.5"), Some(names::TBC));
        assert_eq!(name_at(&second.nodes, "1.5.1"), Some("X9 | Spare"));

        // Prior subsystem carried forward untouched
        let prior = second
            .nodes
            .iter()
            .find(|n| n.wbs_code.to_string() == "1.3.2.1")
            .unwrap();
        assert!(prior.is_existing);
        assert_eq!(prior.wbs_name, "+UH101 | Panel A");

        assert!(second.new_nodes.iter().all(|n| n.is_new));
        assert!(second.new_nodes.iter().any(|n| n.wbs_code.to_string() == "1.4"));
        assert!(!second.new_nodes.iter().any(|n| n.wbs_code.to_string() == "1.3"));
        assert!(!second.new_nodes.iter().any(|n| n.is_root()));

        assert_eq!(second.state.last_wbs_code, 6);
        assert_eq!(second.state.subsystem_count(), 2);
        assert!(second.is_valid());
    }

    #[test]
    fn test_continue_reuses_existing_tbc_branch() {
        let mut records = example_records();
        records.push(rec("T1", "", "Switchroom +Z01", "first tbc", Commissioning::Tbc));
        let first = generate_new(&records, "Demo").unwrap();
        assert_eq!(name_at(&first.nodes, "1.4"), Some(names::TBC));
        assert_eq!(first.state.last_wbs_code, 5);

        let more = vec![
            rec("E9", "", "Yard Z05", "yard earth", Commissioning::Yes),
            rec("T2", "", "Yard Z05", "second tbc", Commissioning::Tbc),
        ];
        let second = generate_continue(&more, &first.state).unwrap();
        assert_eq!(name_at(&second.nodes, "1.5"), Some("S2 | +Z05 - Yard"));
        assert_eq!(name_at(&second.nodes, "1.4.2"), Some("T2 | second tbc"));
        assert_eq!(
            second.nodes.iter().filter(|n| n.wbs_name == names::TBC).count(),
            1
        );
        assert_eq!(second.state.last_wbs_code, 6);
        assert!(second.is_valid());
    }

    #[test]
    fn test_continue_skips_known_subsystems() {
        let first = generate_new(&example_records(), "Demo").unwrap();
        let again = vec![rec("E55", "", "Z01 Switchroom", "dup", Commissioning::Yes)];
        let second = generate_continue(&again, &first.state).unwrap();

        assert!(second.summary.subsystems.is_empty());
        assert!(matches!(
            second.summary.warnings.as_slice(),
            [Warning::SubsystemAlreadyExists { .. }]
        ));
        assert!(second.new_nodes.is_empty());
        assert_eq!(second.state.last_wbs_code, first.state.last_wbs_code);
    }

    #[test]
    fn test_into_strict() {
        let gen = generate_new(&example_records(), "Demo").unwrap();
        assert!(gen.into_strict().is_ok());
    }
}
