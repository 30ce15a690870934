//! CLI command implementations

pub mod classify;
pub mod completions;
pub mod export;
pub mod extend;
pub mod generate;
pub mod init;
pub mod reconcile;
pub mod show;
pub mod status;
pub mod validate;
