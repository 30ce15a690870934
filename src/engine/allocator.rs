//! WBS code allocator
//!
//! Codes are purely positional. The only carried state is the top-level
//! counter (`ProjectState::last_wbs_code`) and the number of subsystems
//! already allocated, both handed in by the caller.

use crate::entities::state::FIRST_SUBSYSTEM_COUNTER;
use crate::entities::{Category, ProjectState, WbsCode};

/// Codes handed out for one subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemCodes {
    /// `1.<counter>`
    pub node: WbsCode,
    /// `1.2.<n>` entry under Prerequisites
    pub prerequisite: WbsCode,
    /// `n` of the `S<n>` label
    pub ordinal: usize,
}

/// Allocates top-level and subsystem codes for one generation run
#[derive(Debug, Clone)]
pub struct CodeAllocator {
    next: u32,
    existing_subsystems: usize,
    allocated_subsystems: usize,
}

impl CodeAllocator {
    pub fn new(start: u32, existing_subsystems: usize) -> Self {
        let start = start.max(FIRST_SUBSYSTEM_COUNTER);
        Self {
            next: start,
            existing_subsystems,
            allocated_subsystems: 0,
        }
    }

    /// Continue from a saved state, or start fresh at `1.3`
    pub fn from_state(state: Option<&ProjectState>) -> Self {
        match state {
            Some(s) => Self::new(s.last_wbs_code, s.subsystem_count()),
            None => Self::new(FIRST_SUBSYSTEM_COUNTER, 0),
        }
    }

    pub fn root() -> WbsCode {
        WbsCode::root()
    }

    pub fn milestones() -> WbsCode {
        WbsCode::root().child(1)
    }

    pub fn prerequisites() -> WbsCode {
        WbsCode::root().child(2)
    }

    /// Next subsystem: `1.<counter>` plus its `1.2.<n>` prerequisite entry
    pub fn allocate_subsystem(&mut self) -> SubsystemCodes {
        let ordinal = self.existing_subsystems + self.allocated_subsystems + 1;
        let codes = SubsystemCodes {
            node: WbsCode::root().child(self.next),
            prerequisite: Self::prerequisites().child(ordinal as u32),
            ordinal,
        };
        self.next += 1;
        self.allocated_subsystems += 1;
        codes
    }

    /// Next bare top-level code (used for the TBC branch)
    pub fn allocate_top_level(&mut self) -> WbsCode {
        let code = WbsCode::root().child(self.next);
        self.next += 1;
        code
    }

    /// Positional code of a category under a subsystem
    pub fn category(subsystem: &WbsCode, category: Category) -> WbsCode {
        subsystem.child(category.position())
    }

    /// Counter to store back into `ProjectState::last_wbs_code`
    pub fn next_counter(&self) -> u32 {
        self.next
    }
}

/// Sequential child numbering under one parent
#[derive(Debug, Clone)]
pub struct Sequence {
    parent: WbsCode,
    last: u32,
}

impl Sequence {
    /// Children numbered from 1
    pub fn under(parent: WbsCode) -> Self {
        Self { parent, last: 0 }
    }

    /// Children numbered after an existing last child
    pub fn after(parent: WbsCode, last: u32) -> Self {
        Self { parent, last }
    }

    pub fn next_code(&mut self) -> WbsCode {
        self.last += 1;
        self.parent.child(self.last)
    }
}
