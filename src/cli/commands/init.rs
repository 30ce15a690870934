//! `wbsgen init` command - Initialize a new wbsgen project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Project name for the root WBS node
    #[arg(long)]
    pub name: Option<String>,

    /// Force initialization even if .wbsgen/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path, args.name.as_deref())
    } else {
        Project::init(&path, args.name.as_deref())
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized wbsgen project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Build the WBS from an equipment list",
                style("wbsgen generate equipment.csv -o exports/p6.csv").yellow()
            );
            println!(
                "  {} Review the structure",
                style("wbsgen show").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} wbsgen project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("wbsgen init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
