//! `wbsgen validate` command - Check a saved WBS for structural problems

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{effective_format, find_project, is_strict};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::engine::{validate_report, EngineError};
use crate::entities::ProjectState;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// State file to check (default: the project's saved state)
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Strict mode - findings become errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global).ok();
    let config = Config::load_for(project.as_ref());

    let path = match (&args.state, &project) {
        (Some(path), _) => path.clone(),
        (None, Some(project)) => project.state_path(),
        (None, None) => find_project(global)?.state_path(),
    };
    let state = ProjectState::load(&path).map_err(|e| miette::miette!("{}", e))?;
    let report = validate_report(&state.wbs_nodes);

    match effective_format(global, &config) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| miette::miette!("{}", e))?;
            println!("{}", json);
        }
        _ => {
            for issue in &report.issues {
                println!("{} {}", style("✗").red(), issue);
            }
            if report.is_valid() {
                if !global.quiet {
                    println!(
                        "{} {} node(s), structure is valid",
                        style("✓").green(),
                        report.node_count
                    );
                }
            } else {
                println!(
                    "{} {} issue(s) in {} node(s)",
                    style("!").yellow(),
                    report.issues.len(),
                    report.node_count
                );
            }
        }
    }

    if !report.is_valid() && is_strict(args.strict, &config) {
        return Err(EngineError::StructuralIntegrity {
            count: report.issues.len(),
        }
        .into());
    }
    Ok(())
}
