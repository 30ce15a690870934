//! `wbsgen export` command - Export the saved WBS

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{find_project, load_state, write_nodes};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::WbsNode;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Primavera P6 import CSV (default)
    #[arg(long, conflicts_with = "json")]
    pub p6: bool,

    /// JSON node array
    #[arg(long)]
    pub json: bool,

    /// Output file, `-` for stdout (default: exports/ in the project)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only nodes created by the last extend/reconcile run
    #[arg(long)]
    pub new_only: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global)?;
    let state = load_state(&project)?;

    let json = args.json || (!args.p6 && global.format == OutputFormat::Json);
    let format = if json { OutputFormat::Json } else { OutputFormat::Csv };

    let nodes: Vec<WbsNode> = if args.new_only {
        state.new_nodes()
    } else {
        state.wbs_nodes.clone()
    };

    let output = args.output.unwrap_or_else(|| {
        let file = match (json, args.new_only) {
            (true, false) => "wbs.json",
            (true, true) => "wbs_new.json",
            (false, false) => "wbs_p6.csv",
            (false, true) => "wbs_p6_new.csv",
        };
        project.exports_dir().join(file)
    });

    write_nodes(&nodes, Some(&output), format)
}
