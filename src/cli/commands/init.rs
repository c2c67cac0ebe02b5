//! `vct init` command - Initialize a new VCT workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::team::TeamRoster;
use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,
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

    match Workspace::init(&path) {
        Ok(ws) => {
            write_team_template(&ws)?;
            println!(
                "{} Initialized VCT workspace at {}",
                style("✓").green(),
                style(ws.root().display()).cyan()
            );
            println!();
            println!("Created workspace structure:");
            for entry in [".vct/", ".vct/config.yaml", ".vct/team.yaml", "projects/", "tickets/"] {
                println!("  {}", style(entry).dim());
            }
            println!();
            println!("Next steps:");
            println!(
                "  {} Add yourself to the team roster",
                style("vct team add").yellow()
            );
            println!(
                "  {} Create your first project",
                style("vct project new").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} VCT workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn write_team_template(ws: &Workspace) -> Result<()> {
    let team_path = ws.team_path();
    if !team_path.exists() {
        std::fs::write(&team_path, TeamRoster::default_template()).into_diagnostic()?;
    }
    Ok(())
}
