//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    classify::ClassifyArgs, completions::CompletionsArgs, export::ExportArgs,
    extend::ExtendArgs, generate::GenerateArgs, init::InitArgs, reconcile::ReconcileArgs,
    show::ShowArgs, status::StatusArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "wbsgen")]
#[command(author, version, about = "Equipment list to WBS generator")]
#[command(long_about = "Turns a commissioning equipment list into a hierarchical work breakdown structure ready for Primavera P6 import, and keeps it in step as the list is revised.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .wbsgen/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new wbsgen project
    Init(InitArgs),

    /// Generate a fresh WBS from an equipment list
    Generate(GenerateArgs),

    /// Add new subsystems to the saved WBS
    Extend(ExtendArgs),

    /// Merge a revised equipment list into the saved WBS
    Reconcile(ReconcileArgs),

    /// Check the saved WBS for structural problems
    Validate(ValidateArgs),

    /// Show the saved WBS as a tree
    Show(ShowArgs),

    /// Export the saved WBS for P6 import or as JSON
    Export(ExportArgs),

    /// Show how each item of an equipment list is categorized
    Classify(ClassifyArgs),

    /// Show project status
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (tree for show, P6 CSV for exports)
    #[default]
    Auto,
    /// Indented tree
    Tree,
    /// JSON format (for programming)
    Json,
    /// CSV format (P6 import layout for node sets)
    Csv,
    /// Tab-separated values (for piping)
    Tsv,
}
