//! `wbsgen extend` command - Add new subsystems to the saved WBS

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{
    effective_format, find_project, is_strict, load_list, load_state, print_summary,
    print_warnings, save_state, write_nodes,
};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::engine::generate_continue;

#[derive(clap::Args, Debug)]
pub struct ExtendArgs {
    /// Equipment list with the new subsystems (CSV)
    pub input: PathBuf,

    /// Write the P6 CSV of new nodes here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Fail if the extended structure has integrity issues
    #[arg(long)]
    pub strict: bool,

    /// Extend and print without saving project state
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ExtendArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global)?;
    let config = Config::load_for(Some(&project));
    let state = load_state(&project)?;
    let list = load_list(&args.input, global)?;

    let mut generation = generate_continue(&list.records, &state)?;
    print_warnings(&generation.summary.warnings, global);
    if is_strict(args.strict, &config) {
        generation = generation.into_strict()?;
    }

    if args.dry_run {
        if !global.quiet {
            eprintln!("{} Dry run, project state not saved", style("→").blue());
        }
    } else {
        save_state(&project, &generation.state)?;
    }

    print_summary(&generation.summary, global);
    write_nodes(
        &generation.new_nodes,
        args.output.as_deref(),
        effective_format(global, &config),
    )
}
