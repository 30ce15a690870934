//! Equipment classifier
//!
//! Only root equipment is pattern-classified. Any item whose parent chain
//! resolves inside the same equipment set takes the category of its root
//! ancestor, whatever its own number looks like.

use std::collections::{HashMap, HashSet};

use crate::engine::rules;
use crate::entities::{Category, EquipmentRecord};

/// Classify a record against the other records of its subsystem
pub fn classify(record: &EquipmentRecord, subsystem_records: &[EquipmentRecord]) -> Category {
    let mut by_number: HashMap<&str, &EquipmentRecord> = HashMap::new();
    for r in subsystem_records {
        by_number.entry(r.equipment_number.as_str()).or_insert(r);
    }
    let root = walk_to_root(record, |number| by_number.get(number).copied());
    classify_root(root)
}

/// Pattern-classify a record as if it had no parent
pub fn classify_root(record: &EquipmentRecord) -> Category {
    rules::match_category(&record.equipment_number, record.plu.as_deref())
        .unwrap_or(Category::Unrecognised)
}

/// Follow `parentEquipmentNumber` links until no parent is found
///
/// A visited set stops the walk on a cyclic chain, returning the last
/// record reached before the chain repeats.
pub fn walk_to_root<'a, F>(record: &'a EquipmentRecord, lookup: F) -> &'a EquipmentRecord
where
    F: Fn(&str) -> Option<&'a EquipmentRecord>,
{
    let mut current = record;
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(current.equipment_number.as_str());

    while let Some(parent) = current.parent().and_then(&lookup) {
        if !visited.insert(parent.equipment_number.as_str()) {
            break;
        }
        current = parent;
    }

    current
}

/// Items of a subsystem that fall back to `99`
///
/// Every item is re-tested against the union of the `02`-`10` rules via its
/// root ancestor; those matching none are collected in input order.
pub fn unrecognised(subsystem_records: &[EquipmentRecord]) -> Vec<&EquipmentRecord> {
    let mut by_number: HashMap<&str, &EquipmentRecord> = HashMap::new();
    for r in subsystem_records {
        by_number.entry(r.equipment_number.as_str()).or_insert(r);
    }
    subsystem_records
        .iter()
        .filter(|r| {
            let root = walk_to_root(r, |number| by_number.get(number).copied());
            !rules::matches_any_rule(&root.equipment_number, root.plu.as_deref())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Commissioning;

    fn rec(number: &str, parent: &str) -> EquipmentRecord {
        EquipmentRecord::new(number, "Switchroom +Z01", "desc", Commissioning::Yes)
            .with_parent(parent)
    }

    #[test]
    fn test_root_is_pattern_classified() {
        let set = vec![rec("+UH101", ""), rec("E101", "")];
        assert_eq!(classify(&set[0], &set), Category::ProtectionPanels);
        assert_eq!(classify(&set[1], &set), Category::Earthing);
    }

    #[test]
    fn test_child_inherits_root_category() {
        // E5 alone would be Earthing, but its root is a protection panel
        let set = vec![
            rec("+UH101", ""),
            rec("+UH101-F1", "+UH101"),
            rec("E5", "+UH101-F1"),
        ];
        assert_eq!(classify(&set[2], &set), Category::ProtectionPanels);
        assert_eq!(classify(&set[1], &set), Category::ProtectionPanels);
    }

    #[test]
    fn test_parent_outside_set_means_root() {
        let set = vec![rec("E5", "+UH999")];
        assert_eq!(classify(&set[0], &set), Category::Earthing);
    }

    #[test]
    fn test_unmatched_root_is_unrecognised() {
        let set = vec![rec("QQ1", ""), rec("E1", "QQ1")];
        assert_eq!(classify(&set[0], &set), Category::Unrecognised);
        assert_eq!(classify(&set[1], &set), Category::Unrecognised);
    }

    #[test]
    fn test_plu_is_consulted() {
        let set = vec![rec("Q1", "").with_plu("CCTV camera")];
        assert_eq!(classify(&set[0], &set), Category::AncillarySystems);
    }

    #[test]
    fn test_walk_stops_on_cycle() {
        let set = vec![rec("A1", "B1"), rec("B1", "A1")];
        let root = walk_to_root(&set[0], |n| set.iter().find(|r| r.equipment_number == n));
        assert_eq!(root.equipment_number, "B1");
    }

    #[test]
    fn test_unrecognised_collects_fallback_items() {
        let set = vec![
            rec("+UH101", ""),
            rec("QQ1", ""),
            rec("QQ1-A", "QQ1"),
            rec("E101", ""),
        ];
        let numbers: Vec<&str> = unrecognised(&set)
            .iter()
            .map(|r| r.equipment_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["QQ1", "QQ1-A"]);
    }
}
