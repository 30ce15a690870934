//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the workspace directory marking a project root
pub const WORKSPACE_DIR: &str = ".wbsgen";

/// Represents a wbsgen project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .wbsgen/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path, name: Option<&str>) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(WORKSPACE_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create(root, name)
    }

    /// Force initialization even if .wbsgen/ exists
    ///
    /// The config file is rewritten; a saved state is left in place.
    pub fn init_force(path: &Path, name: Option<&str>) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        Self::create(root, name)
    }

    fn create(root: PathBuf, name: Option<&str>) -> Result<Self, ProjectError> {
        let project = Self { root };

        std::fs::create_dir_all(project.workspace_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::create_dir_all(project.exports_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config(name))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(project)
    }

    fn default_config(name: Option<&str>) -> String {
        let name_line = match name {
            Some(name) => format!("project_name: \"{}\"", name.replace('"', "\\\"")),
            None => "# project_name: \"\"".to_string(),
        };
        format!(
            r#"# wbsgen Project Configuration

# Name of the root WBS node (default: the project directory name)
{name_line}

# Fail generation when the produced structure has integrity issues
strict: false

# Default output format (auto, tree, json, csv, tsv)
# default_format: auto

# Log filter, same syntax as RUST_LOG
# log_filter: "wbsgen=info"
"#
        )
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .wbsgen workspace directory
    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.workspace_dir().join("config.yaml")
    }

    /// Saved [`ProjectState`](crate::entities::ProjectState) between runs
    pub fn state_path(&self) -> PathBuf {
        self.workspace_dir().join("state.json")
    }

    pub fn has_state(&self) -> bool {
        self.state_path().is_file()
    }

    /// Default directory for P6 and JSON exports
    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a wbsgen project (searched from {searched_from:?}). Run 'wbsgen init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("wbsgen project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), None).unwrap();

        assert!(project.workspace_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.exports_dir().is_dir());
        assert!(!project.has_state());
        assert_eq!(project.state_path(), project.workspace_dir().join("state.json"));
    }

    #[test]
    fn test_project_init_writes_name() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), Some("North Yard")).unwrap();
        let config = std::fs::read_to_string(project.config_path()).unwrap();
        assert!(config.contains("project_name: \"North Yard\""));
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), None).unwrap();

        let err = Project::init(tmp.path(), None).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_keeps_state() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), None).unwrap();
        std::fs::write(project.state_path(), "{}").unwrap();

        let project = Project::init_force(tmp.path(), Some("Renamed")).unwrap();
        assert!(project.has_state());
        let config = std::fs::read_to_string(project.config_path()).unwrap();
        assert!(config.contains("Renamed"));
    }

    #[test]
    fn test_project_discover_finds_workspace_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), None).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_workspace_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
