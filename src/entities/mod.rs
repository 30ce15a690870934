//! Entity type definitions
//!
//! - [`EquipmentRecord`] - One normalized row of the equipment list
//! - [`Category`] - The fixed 11-slot equipment grouping
//! - [`WbsNode`] / [`WbsCode`] - Elements of the generated structure
//! - [`ProjectState`] - Snapshot carried between generation runs

pub mod category;
pub mod equipment;
pub mod node;
pub mod state;

pub use category::Category;
pub use equipment::{Commissioning, EquipmentRecord};
pub use node::{CodeParseError, WbsCode, WbsNode};
pub use state::ProjectState;
