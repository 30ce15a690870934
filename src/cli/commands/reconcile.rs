//! `wbsgen reconcile` command - Merge a revised equipment list into the saved WBS

use console::style;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{
    effective_format, find_project, load_list, load_state, print_warnings, save_state,
    truncate_str, write_nodes,
};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::engine::{reconcile_state, Reconciliation};

#[derive(clap::Args, Debug)]
pub struct ReconcileArgs {
    /// Revised equipment list (CSV)
    pub input: PathBuf,

    /// Write the P6 CSV of new nodes here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Reconcile and print without saving project state
    #[arg(long)]
    pub dry_run: bool,

    /// List equipment that is in the WBS but no longer relevant
    #[arg(long)]
    pub show_removed: bool,
}

pub fn run(args: ReconcileArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global)?;
    let config = Config::load_for(Some(&project));
    let state = load_state(&project)?;
    let list = load_list(&args.input, global)?;

    let mut result = reconcile_state(&state, &list.records)?;
    print_warnings(&result.warnings, global);
    if config.strict() {
        result = result.into_strict()?;
    }

    if !global.quiet {
        print_analysis(&result, args.show_removed);
    }

    if args.dry_run {
        if !global.quiet {
            eprintln!("{} Dry run, project state not saved", style("→").blue());
        }
    } else if result.new_nodes.is_empty() {
        tracing::info!("nothing new, project state unchanged");
    } else {
        save_state(&project, &result.state)?;
    }

    write_nodes(
        &result.new_nodes,
        args.output.as_deref(),
        effective_format(global, &config),
    )
}

fn print_analysis(result: &Reconciliation, show_removed: bool) {
    let analysis = &result.analysis;

    let mut builder = Builder::default();
    builder.push_record(["Equipment", "Count"]);
    builder.push_record(["New".to_string(), analysis.new_equipment.len().to_string()]);
    builder.push_record([
        "Existing".to_string(),
        analysis.existing_equipment.len().to_string(),
    ]);
    builder.push_record([
        "Removed".to_string(),
        analysis.removed_equipment.len().to_string(),
    ]);
    builder.push_record(["Dropped".to_string(), result.dropped.len().to_string()]);
    eprintln!("{}", builder.build().with(Style::rounded()));

    if !result.new_nodes.is_empty() {
        let mut placed = Builder::default();
        placed.push_record(["WBS Code", "Name"]);
        for node in &result.new_nodes {
            placed.push_record([node.wbs_code.to_string(), truncate_str(&node.wbs_name, 60)]);
        }
        eprintln!("{}", placed.build().with(Style::rounded()));
    }

    if show_removed && !analysis.removed_equipment.is_empty() {
        eprintln!("{}", style("No longer in the equipment list:").bold());
        for number in &analysis.removed_equipment {
            eprintln!("  {} {}", style("-").red(), number);
        }
    }

    eprintln!(
        "{} {} new node(s)",
        style("✓").green(),
        result.new_nodes.len()
    );
}
