//! Project state - the snapshot persisted between generation runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::entities::node::WbsNode;

/// First top-level counter handed to subsystems (1 = root, 1.1 = M, 1.2 = P)
pub const FIRST_SUBSYSTEM_COUNTER: u32 = 3;

/// State carried from one generation call to the next
///
/// Treated as a value: every workflow returns a fresh `ProjectState`
/// that replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub project_name: String,

    /// Next unused top-level counter
    pub last_wbs_code: u32,

    /// Subsystem labels already allocated (`S<n> | <formatted name>`)
    #[serde(default)]
    pub subsystems: Vec<String>,

    /// Full snapshot of the last generated or merged tree
    #[serde(default)]
    pub wbs_nodes: Vec<WbsNode>,

    pub timestamp: DateTime<Utc>,
}

impl ProjectState {
    /// Empty state for a project that has never been generated
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            last_wbs_code: FIRST_SUBSYSTEM_COUNTER,
            subsystems: Vec::new(),
            wbs_nodes: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn subsystem_count(&self) -> usize {
        self.subsystems.len()
    }

    /// Whether a subsystem with this formatted name was already allocated
    pub fn has_subsystem(&self, formatted_name: &str) -> bool {
        self.subsystems.iter().any(|label| {
            label
                .split_once(" | ")
                .map(|(_, name)| name)
                .unwrap_or(label)
                .eq_ignore_ascii_case(formatted_name)
        })
    }

    /// Nodes flagged as created by the latest run
    pub fn new_nodes(&self) -> Vec<WbsNode> {
        self.wbs_nodes.iter().filter(|n| n.is_new).cloned().collect()
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        serde_json::from_str(json).map_err(|e| StateError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string_pretty(self).map_err(|e| StateError::Serialize(e.to_string()))
    }

    /// Read a previously saved state file
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            return Err(StateError::NotFound(path.to_path_buf()));
        }
        let contents =
            fs::read_to_string(path).map_err(|e| StateError::IoError(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Write the state as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::IoError(e.to_string()))?;
        }
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| StateError::IoError(e.to_string()))
    }
}

/// Errors that can occur while reading or writing project state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("no saved WBS state at {0:?}. Run 'wbsgen generate' first.")]
    NotFound(std::path::PathBuf),

    #[error("invalid state file: {0}")]
    Parse(String),

    #[error("failed to serialize state: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::node::WbsCode;
    use tempfile::tempdir;

    #[test]
    fn test_new_state_starts_at_three() {
        let state = ProjectState::new("Demo");
        assert_eq!(state.last_wbs_code, 3);
        assert_eq!(state.subsystem_count(), 0);
        assert!(state.wbs_nodes.is_empty());
    }

    #[test]
    fn test_has_subsystem_matches_formatted_part() {
        let mut state = ProjectState::new("Demo");
        state.subsystems.push("S1 | +Z01 - Switchroom".to_string());
        assert!(state.has_subsystem("+Z01 - Switchroom"));
        assert!(state.has_subsystem("+z01 - switchroom"));
        assert!(!state.has_subsystem("+Z02 - Switchroom"));
    }

    #[test]
    fn test_json_field_names() {
        let mut state = ProjectState::new("Demo");
        state
            .wbs_nodes
            .push(WbsNode::new(WbsCode::root(), "Demo"));
        let json = state.to_json().unwrap();
        for field in ["projectName", "lastWbsCode", "subsystems", "wbsNodes", "timestamp"] {
            assert!(json.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/state.json");

        let mut state = ProjectState::new("Demo");
        state.last_wbs_code = 5;
        state.subsystems.push("S1 | Switchroom".to_string());
        state.save(&path).unwrap();

        let loaded = ProjectState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempdir().unwrap();
        let err = ProjectState::load(&tmp.path().join("state.json")).unwrap_err();
        assert!(matches!(err, StateError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_json() {
        let err = ProjectState::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StateError::Parse(_)));
    }
}
