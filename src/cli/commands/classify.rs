//! `wbsgen classify` command - Show the category of every equipment item

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, find_project, load_list, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::engine::classifier::{classify, unrecognised};
use crate::engine::subsystem::format_subsystem;
use crate::entities::{Category, EquipmentRecord};

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Equipment list (CSV)
    pub input: PathBuf,

    /// Only items that match no category pattern (category 99)
    #[arg(long)]
    pub unrecognised: bool,

    /// Include items with commissioning N
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifiedItem {
    equipment_number: String,
    subsystem: String,
    commissioning: String,
    category: Category,
    category_name: &'static str,
}

pub fn run(args: ClassifyArgs, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global).ok();
    let config = Config::load_for(project.as_ref());
    let list = load_list(&args.input, global)?;

    let records: Vec<EquipmentRecord> = list
        .records
        .into_iter()
        .filter(|r| args.all || r.commissioning.is_relevant())
        .collect();

    // Parent chains are resolved within each subsystem
    let mut by_subsystem: HashMap<String, Vec<EquipmentRecord>> = HashMap::new();
    for record in &records {
        by_subsystem
            .entry(record.subsystem.trim().to_string())
            .or_default()
            .push(record.clone());
    }

    let items: Vec<ClassifiedItem> = if args.unrecognised {
        let flagged: HashSet<&str> = by_subsystem
            .values()
            .flat_map(|group| unrecognised(group))
            .map(|r| r.equipment_number.as_str())
            .collect();
        records
            .iter()
            .filter(|r| flagged.contains(r.equipment_number.as_str()))
            .map(|r| item(r, Category::Unrecognised))
            .collect()
    } else {
        records
            .iter()
            .map(|record| {
                let group = &by_subsystem[record.subsystem.trim()];
                item(record, classify(record, group))
            })
            .collect()
    };

    let format = effective_format(global, &config);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&items).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let delimiter = if format == OutputFormat::Tsv { b'\t' } else { b',' };
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .from_writer(std::io::stdout());
            writer
                .write_record(["equipment_number", "subsystem", "commissioning", "category"])
                .into_diagnostic()?;
            for i in &items {
                writer
                    .write_record([
                        i.equipment_number.as_str(),
                        i.subsystem.as_str(),
                        i.commissioning.as_str(),
                        i.category.code(),
                    ])
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Auto | OutputFormat::Tree => {
            let mut builder = Builder::default();
            builder.push_record(["Equipment", "Subsystem", "C", "Category"]);
            for i in &items {
                builder.push_record([
                    i.equipment_number.clone(),
                    truncate_str(&i.subsystem, 32),
                    i.commissioning.clone(),
                    i.category.label(),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));

            if !global.quiet {
                let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
                for i in &items {
                    *counts.entry(i.category).or_insert(0) += 1;
                }
                println!();
                for (category, count) in counts {
                    println!("  {:<32} {}", category.label(), style(count).cyan());
                }
                println!("{} item(s) classified", style(items.len()).cyan());
            }
        }
    }

    Ok(())
}

fn item(record: &EquipmentRecord, category: Category) -> ClassifiedItem {
    ClassifiedItem {
        equipment_number: record.equipment_number.clone(),
        subsystem: format_subsystem(&record.subsystem).formatted,
        commissioning: record.commissioning.to_string(),
        category,
        category_name: category.name(),
    }
}
