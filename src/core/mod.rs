//! Core module - project workspace, configuration and file formats

pub mod config;
pub mod export;
pub mod loader;
pub mod project;

pub use config::Config;
pub use export::{write_json, write_p6_csv, ExportError};
pub use loader::{load_equipment, read_equipment, EquipmentList, LoadError};
pub use project::{Project, ProjectError};
