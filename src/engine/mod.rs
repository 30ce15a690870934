//! WBS generation engine
//!
//! Pure transformations from equipment records (and an optional saved
//! [`ProjectState`](crate::entities::ProjectState)) to WBS node sets.
//! Nothing here touches the filesystem.

pub mod allocator;
pub mod builder;
pub mod classifier;
pub mod continuation;
pub mod error;
pub mod index;
pub mod rules;
pub mod subsystem;
pub mod tree;
pub mod validator;

pub use builder::{generate_continue, generate_new, Generation, GenerationMode, GenerationSummary};
pub use classifier::classify;
pub use continuation::{reconcile, reconcile_state, EquipmentAnalysis, Reconciliation};
pub use error::{EngineError, Warning};
pub use validator::{validate, validate_report, StructuralIssue, ValidationReport};
