//! `wbsgen status` command - Project status summary

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::cli::helpers::{effective_format, find_project, load_state};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::engine::continuation::extract;
use crate::engine::validate_report;
use crate::entities::{Category, ProjectState, WbsCode};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show per-subsystem equipment counts
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    project_name: String,
    generated_at: String,
    last_wbs_code: u32,
    subsystems: Vec<String>,
    nodes: usize,
    new_nodes: usize,
    equipment: usize,
    tbc_items: usize,
    per_category: BTreeMap<Category, usize>,
    per_subsystem: BTreeMap<String, usize>,
    issues: usize,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global)?;
    let config = Config::load_for(Some(&project));

    if !project.has_state() {
        println!(
            "{} No WBS generated yet. Run {}",
            style("→").blue(),
            style("wbsgen generate <equipment.csv>").yellow()
        );
        return Ok(());
    }
    let state = load_state(&project)?;
    let report = collect(&state);

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        _ => print_report(&report, args.detailed),
    }
    Ok(())
}

fn collect(state: &ProjectState) -> StatusReport {
    let names: HashMap<&WbsCode, &str> = state
        .wbs_nodes
        .iter()
        .map(|n| (&n.wbs_code, n.wbs_name.as_str()))
        .collect();
    let extraction = extract::extract(&state.wbs_nodes);

    let mut report = StatusReport {
        project_name: state.project_name.clone(),
        generated_at: state.timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
        last_wbs_code: state.last_wbs_code,
        subsystems: state.subsystems.clone(),
        nodes: state.wbs_nodes.len(),
        new_nodes: state.wbs_nodes.iter().filter(|n| n.is_new).count(),
        issues: validate_report(&state.wbs_nodes).issues.len(),
        ..Default::default()
    };

    for item in &extraction.equipment {
        if extraction.in_tbc_branch(&item.code) {
            report.tbc_items += 1;
            continue;
        }
        report.equipment += 1;

        // Walk up to the category and subsystem ancestors
        let mut ancestor = item.code.parent();
        while let Some(code) = ancestor {
            let name = names.get(&code).copied().unwrap_or_default();
            if code.depth() == 3 {
                if let Some(category) = Category::ALL.iter().find(|c| c.label() == name) {
                    *report.per_category.entry(*category).or_insert(0) += 1;
                }
            }
            if code.depth() == 2 {
                *report.per_subsystem.entry(name.to_string()).or_insert(0) += 1;
            }
            ancestor = code.parent();
        }
    }

    report
}

fn print_report(report: &StatusReport, detailed: bool) {
    println!("{}", style(&report.project_name).bold().underlined());
    println!("Generated      {}", report.generated_at);
    println!("Next WBS code  1.{}", report.last_wbs_code);
    println!(
        "Nodes          {} ({} new in last run)",
        style(report.nodes).cyan(),
        report.new_nodes
    );
    println!(
        "Equipment      {} placed, {} TBC",
        style(report.equipment).cyan(),
        report.tbc_items
    );
    println!();

    println!("{}", style("SUBSYSTEMS").bold());
    for subsystem in &report.subsystems {
        match report.per_subsystem.get(subsystem) {
            Some(count) if detailed => println!("  {:<40} {}", subsystem, count),
            _ => println!("  {}", subsystem),
        }
    }
    println!();

    println!("{}", style("CATEGORIES").bold());
    for category in Category::ALL {
        let count = report.per_category.get(&category).copied().unwrap_or(0);
        println!("  {:<32} {}", category.label(), count);
    }
    println!();

    if report.issues == 0 {
        println!("{} Structure is valid", style("✓").green());
    } else {
        println!(
            "{} {} structural issue(s), run {}",
            style("!").yellow(),
            report.issues,
            style("wbsgen validate").yellow()
        );
    }
}
