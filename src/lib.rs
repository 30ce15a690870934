//! wbsgen: equipment list to work breakdown structure
//!
//! Turns a commissioning equipment list into a hierarchical WBS for
//! Primavera P6 import, and extends or reconciles that structure as the
//! list is revised without renumbering what already exists.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
pub mod logging;
