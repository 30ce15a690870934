//! Shared helper functions for CLI commands
//!
//! Project and state lookup, equipment list loading, node set output and
//! the stderr reporting used by the generating commands.

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use std::path::Path;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::export::{self, write_json, write_p6_csv};
use crate::core::loader::{load_equipment, EquipmentList};
use crate::core::{Config, Project};
use crate::engine::{GenerationSummary, Warning};
use crate::entities::{ProjectState, WbsNode};

/// Locate the project, honouring `--project`
pub fn find_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Load the saved state of a project
pub fn load_state(project: &Project) -> Result<ProjectState> {
    ProjectState::load(&project.state_path()).map_err(|e| miette::miette!("{}", e))
}

pub fn save_state(project: &Project, state: &ProjectState) -> Result<()> {
    state
        .save(&project.state_path())
        .map_err(|e| miette::miette!("{}", e))?;
    tracing::info!(path = %project.state_path().display(), "saved project state");
    Ok(())
}

/// Load an equipment list, reporting skipped rows on stderr
pub fn load_list(path: &Path, global: &GlobalOpts) -> Result<EquipmentList> {
    let list = load_equipment(path)?;
    if !global.quiet && !list.skipped.is_empty() {
        eprintln!(
            "{} Skipped {} of {} row(s) in {}",
            style("!").yellow(),
            list.skipped.len(),
            list.rows(),
            style(path.display()).cyan()
        );
        for row in list.skipped.iter().take(10) {
            eprintln!("    line {}: {}", row.line, row.reason);
        }
        if list.skipped.len() > 10 {
            eprintln!("    ... and {} more", list.skipped.len() - 10);
        }
    }
    Ok(list)
}

/// `--format`, falling back to the configured default
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Whether structural findings should fail the command
pub fn is_strict(flag: bool, config: &Config) -> bool {
    flag || config.strict()
}

/// Write a node set to a file or stdout: JSON for `-f json`, P6 CSV otherwise
pub fn write_nodes(nodes: &[WbsNode], output: Option<&Path>, format: OutputFormat) -> Result<()> {
    let json = format == OutputFormat::Json;
    match output {
        Some(path) if path.as_os_str() != "-" => {
            export::write_to_file(path, |out| {
                if json {
                    write_json(out, nodes)
                } else {
                    write_p6_csv(out, nodes)
                }
            })?;
            eprintln!(
                "{} Wrote {} node(s) to {}",
                style("✓").green(),
                nodes.len(),
                style(path.display()).cyan()
            );
        }
        _ => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if json {
                write_json(&mut out, nodes)?;
            } else {
                write_p6_csv(&mut out, nodes)?;
            }
            out.flush().into_diagnostic()?;
        }
    }
    Ok(())
}

pub fn print_warnings(warnings: &[Warning], global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    for warning in warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
}

/// Human-readable generation summary on stderr
pub fn print_summary(summary: &GenerationSummary, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    if summary.subsystems.is_empty() {
        eprintln!("{} No new subsystems", style("→").blue());
    }
    for name in &summary.subsystems {
        eprintln!("{} {}", style("+").green(), name);
    }
    eprintln!(
        "{} {} item(s) placed, {} TBC, {} excluded",
        style("→").blue(),
        summary.equipment_placed,
        summary.tbc_items,
        summary.excluded
    );
    if global.verbose {
        for (category, count) in &summary.per_category {
            eprintln!("    {}: {}", category.label(), count);
        }
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
            project: None,
        }
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_effective_format() {
        let config = Config {
            default_format: Some("json".into()),
            ..Default::default()
        };
        assert_eq!(effective_format(&global(OutputFormat::Auto), &config), OutputFormat::Json);
        assert_eq!(effective_format(&global(OutputFormat::Tsv), &config), OutputFormat::Tsv);
        assert_eq!(
            effective_format(&global(OutputFormat::Auto), &Config::default()),
            OutputFormat::Auto
        );
    }

    #[test]
    fn test_is_strict() {
        let strict_config = Config {
            strict: Some(true),
            ..Default::default()
        };
        assert!(is_strict(false, &strict_config));
        assert!(is_strict(true, &Config::default()));
        assert!(!is_strict(false, &Config::default()));
    }
}
