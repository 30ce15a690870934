//! Equipment adjacency index
//!
//! Built once per subsystem: maps each equipment number to its record and
//! its direct children, both in input order, and rejects cyclic parent
//! chains up front so later walks can recurse freely.

use std::collections::{HashMap, HashSet};

use crate::engine::classifier::{classify_root, walk_to_root};
use crate::engine::error::EngineError;
use crate::entities::{Category, EquipmentRecord};

#[derive(Debug)]
pub struct EquipmentIndex<'a> {
    records: Vec<&'a EquipmentRecord>,
    by_number: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
    duplicates: Vec<&'a EquipmentRecord>,
}

impl<'a> EquipmentIndex<'a> {
    /// Index a set of records
    ///
    /// A repeated equipment number keeps its first row; later rows are
    /// reported through [`EquipmentIndex::duplicates`]. A record is a root
    /// when its parent is missing from the set.
    pub fn build<I>(records: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = &'a EquipmentRecord>,
    {
        let mut index = Self {
            records: Vec::new(),
            by_number: HashMap::new(),
            children: HashMap::new(),
            roots: Vec::new(),
            duplicates: Vec::new(),
        };

        for record in records {
            let number = record.equipment_number.as_str();
            if index.by_number.contains_key(number) {
                index.duplicates.push(record);
                continue;
            }
            index.by_number.insert(number, index.records.len());
            index.records.push(record);
        }

        for (i, &record) in index.records.iter().enumerate() {
            match record.parent() {
                Some(parent) if index.by_number.contains_key(parent) => {
                    index.children.entry(parent).or_default().push(i);
                }
                _ => index.roots.push(i),
            }
        }

        index.check_acyclic()?;
        Ok(index)
    }

    /// Every record must be reachable from a root, otherwise it sits on or
    /// below a cycle
    fn check_acyclic(&self) -> Result<(), EngineError> {
        let mut reached = vec![false; self.records.len()];
        let mut stack: Vec<usize> = self.roots.clone();
        while let Some(i) = stack.pop() {
            if reached[i] {
                continue;
            }
            reached[i] = true;
            if let Some(kids) = self.children.get(self.records[i].equipment_number.as_str()) {
                stack.extend(kids.iter().copied());
            }
        }

        let Some(first) = reached.iter().position(|r| !r) else {
            return Ok(());
        };

        // Walk up from the unreached record until the chain repeats
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = self.records[first];
        loop {
            if !seen.insert(current.equipment_number.as_str()) {
                return Err(EngineError::CyclicParentChain {
                    equipment: current.equipment_number.clone(),
                });
            }
            match current.parent().and_then(|p| self.get(p)) {
                Some(parent) => current = parent,
                None => {
                    return Err(EngineError::CyclicParentChain {
                        equipment: current.equipment_number.clone(),
                    })
                }
            }
        }
    }

    /// Number of indexed (non-duplicate) records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, equipment_number: &str) -> Option<&'a EquipmentRecord> {
        self.by_number
            .get(equipment_number)
            .map(|&i| self.records[i])
    }

    /// Records without a parent in the set, input order
    pub fn roots(&self) -> impl Iterator<Item = &'a EquipmentRecord> + '_ {
        self.roots.iter().map(|&i| self.records[i])
    }

    /// Direct children of an equipment number, input order
    pub fn children_of(&self, equipment_number: &str) -> impl Iterator<Item = &'a EquipmentRecord> + '_ {
        self.children
            .get(equipment_number)
            .into_iter()
            .flatten()
            .map(|&i| self.records[i])
    }

    /// Root ancestor of a record within this set
    pub fn root_of(&self, record: &'a EquipmentRecord) -> &'a EquipmentRecord {
        walk_to_root(record, |number| self.get(number))
    }

    /// Category of a record: its root ancestor's pattern classification
    pub fn category_of(&self, record: &'a EquipmentRecord) -> Category {
        classify_root(self.root_of(record))
    }

    /// Later rows that repeated an already indexed equipment number
    pub fn duplicates(&self) -> &[&'a EquipmentRecord] {
        &self.duplicates
    }
}
