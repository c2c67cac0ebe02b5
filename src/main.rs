use clap::Parser;
use miette::Result;
use vct::cli::{Cli, Commands};

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

    match cli.command {
        Commands::Init(args) => vct::cli::commands::init::run(args),
        Commands::Project(cmd) => vct::cli::commands::project::run(cmd, &global),
        Commands::Sel(cmd) => vct::cli::commands::sel::run(cmd, &global),
        Commands::Tech(cmd) => vct::cli::commands::tech::run(cmd, &global),
        Commands::Quote(cmd) => vct::cli::commands::quote::run(cmd, &global),
        Commands::Consolidate(args) => vct::cli::commands::consolidate::run(args, &global),
        Commands::Production(cmd) => vct::cli::commands::production::run(cmd, &global),
        Commands::Audit(args) => vct::cli::commands::audit::run(args, &global),
        Commands::Ticket(cmd) => vct::cli::commands::ticket::run(cmd, &global),
        Commands::Team(cmd) => vct::cli::commands::team::run(cmd, &global),
        Commands::Completions(args) => vct::cli::commands::completions::run(args),
    }
}
