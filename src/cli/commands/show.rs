//! `wbsgen show` command - Display the saved WBS

use console::style;
use miette::Result;

use crate::cli::helpers::{effective_format, find_project, load_state, write_nodes};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::WbsNode;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Only nodes created by the last extend/reconcile run
    #[arg(long)]
    pub new_only: bool,

    /// Maximum code depth to show (the root is depth 1)
    #[arg(long, short = 'd')]
    pub depth: Option<usize>,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global)?;
    let config = Config::load_for(Some(&project));
    let state = load_state(&project)?;

    let nodes: Vec<WbsNode> = state
        .wbs_nodes
        .iter()
        .filter(|n| !args.new_only || n.is_new)
        .filter(|n| args.depth.map_or(true, |d| n.wbs_code.depth() <= d))
        .cloned()
        .collect();

    match effective_format(global, &config) {
        OutputFormat::Json | OutputFormat::Csv => {
            write_nodes(&nodes, None, effective_format(global, &config))
        }
        OutputFormat::Tsv => {
            for node in &nodes {
                println!(
                    "{}\t{}\t{}",
                    node.wbs_code,
                    node.parent_code_str(),
                    node.wbs_name
                );
            }
            Ok(())
        }
        OutputFormat::Auto | OutputFormat::Tree => {
            print!("{}", render_tree(&nodes));
            if !global.quiet {
                println!();
                println!(
                    "{} node(s) shown of {}",
                    style(nodes.len()).cyan(),
                    state.wbs_nodes.len()
                );
            }
            Ok(())
        }
    }
}

/// Indented tree, two spaces per level below the root
fn render_tree(nodes: &[WbsNode]) -> String {
    let width = nodes
        .iter()
        .map(|n| n.wbs_code.to_string().len() + 2 * (n.wbs_code.depth() - 1))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for node in nodes {
        let indent = "  ".repeat(node.wbs_code.depth() - 1);
        let code = format!("{}{}", indent, node.wbs_code);
        let marker = if node.is_new {
            format!(" {}", style("(new)").green())
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{:<width$}  {}{}\n",
            code,
            node.wbs_name,
            marker,
            width = width
        ));
    }
    out
}
