//! `wbsgen generate` command - Build a fresh WBS from an equipment list

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{
    effective_format, find_project, is_strict, load_list, print_summary, print_warnings,
    save_state, write_nodes,
};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::engine::generate_new;

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Equipment list (CSV)
    pub input: PathBuf,

    /// Project name for the root node (default: from config)
    #[arg(long)]
    pub name: Option<String>,

    /// Write the P6 CSV here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Fail if the generated structure has integrity issues
    #[arg(long)]
    pub strict: bool,

    /// Generate and print without saving project state
    #[arg(long)]
    pub dry_run: bool,

    /// Replace an existing saved structure
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let project = match find_project(global) {
        Ok(project) => Some(project),
        Err(_) if args.dry_run => None,
        Err(e) => return Err(e),
    };
    let config = Config::load_for(project.as_ref());

    if let Some(project) = &project {
        if project.has_state() && !args.force && !args.dry_run {
            return Err(miette::miette!(
                help = "use 'wbsgen extend' or 'wbsgen reconcile' to add to it, or --force to start over",
                "a WBS has already been generated for this project"
            ));
        }
    }

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| config.project_name(project.as_ref()));
    let list = load_list(&args.input, global)?;

    let mut generation = generate_new(&list.records, &name)?;
    print_warnings(&generation.summary.warnings, global);
    if is_strict(args.strict, &config) {
        generation = generation.into_strict()?;
    }

    match &project {
        Some(project) if !args.dry_run => save_state(project, &generation.state)?,
        _ => {
            if !global.quiet {
                eprintln!("{} Dry run, project state not saved", style("→").blue());
            }
        }
    }

    print_summary(&generation.summary, global);
    write_nodes(
        &generation.new_nodes,
        args.output.as_deref(),
        effective_format(global, &config),
    )
}
