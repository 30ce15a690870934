use clap::Parser;
use miette::Result;
use wbsgen::cli::helpers::find_project;
use wbsgen::cli::{Cli, Commands};
use wbsgen::core::Config;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let config = Config::load_for(find_project(&global).ok().as_ref());
    wbsgen::logging::init(config.log_filter.as_deref(), global.quiet, global.verbose);

    match cli.command {
        Commands::Init(args) => wbsgen::cli::commands::init::run(args),
        Commands::Generate(args) => wbsgen::cli::commands::generate::run(args, &global),
        Commands::Extend(args) => wbsgen::cli::commands::extend::run(args, &global),
        Commands::Reconcile(args) => wbsgen::cli::commands::reconcile::run(args, &global),
        Commands::Validate(args) => wbsgen::cli::commands::validate::run(args, &global),
        Commands::Show(args) => wbsgen::cli::commands::show::run(args, &global),
        Commands::Export(args) => wbsgen::cli::commands::export::run(args, &global),
        Commands::Classify(args) => wbsgen::cli::commands::classify::run(args, &global),
        Commands::Status(args) => wbsgen::cli::commands::status::run(args, &global),
        Commands::Completions(args) => wbsgen::cli::commands::completions::run(args),
    }
}
