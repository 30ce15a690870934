//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// wbsgen configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name used for the root node when `--name` is not given
    pub project_name: Option<String>,

    /// Treat structural validation findings as errors
    pub strict: Option<bool>,

    /// Default output format
    pub default_format: Option<String>,

    /// `tracing` filter directive, e.g. `wbsgen=debug`
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load configuration for a known (or absent) project
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/wbsgen/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Project config (.wbsgen/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 3. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Settings taken from `WBSGEN_*` variables
    fn from_env<F>(var: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            project_name: var("WBSGEN_PROJECT_NAME").filter(|s| !s.trim().is_empty()),
            strict: var("WBSGEN_STRICT").and_then(|s| parse_bool(&s)),
            default_format: None,
            log_filter: var("WBSGEN_LOG").filter(|s| !s.trim().is_empty()),
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wbsgen")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.project_name.is_some() {
            self.project_name = other.project_name;
        }
        if other.strict.is_some() {
            self.strict = other.strict;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log_filter.is_some() {
            self.log_filter = other.log_filter;
        }
    }

    /// Root node name, falling back to the project directory name
    pub fn project_name(&self, project: Option<&Project>) -> String {
        if let Some(ref name) = self.project_name {
            return name.clone();
        }
        project
            .and_then(|p| p.root().file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Project".to_string())
    }

    pub fn strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
