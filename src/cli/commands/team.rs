//! `vct team` command - team roster management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_store;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::team::{Role, TeamMember, TeamRoster};

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Add a member to the roster
    Add(AddArgs),

    /// Remove a member by username
    Remove(RemoveArgs),

    /// List roster members
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Username (matches config author or $USER)
    #[arg(long, short = 'u')]
    pub username: String,

    /// Roles to grant (repeatable); the first is the default role
    #[arg(long, short = 'r', required = true)]
    pub roles: Vec<Role>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Username to remove
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by role
    #[arg(long)]
    pub role: Option<Role>,
}

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::Add(args) => run_add(args, global),
        TeamCommands::Remove(args) => run_remove(args, global),
        TeamCommands::List(args) => run_list(args, global),
    }
}

fn run_add(args: AddArgs, _global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let mut roster = TeamRoster::load(store.workspace()).unwrap_or_default();

    if roster.find_member(&args.username).is_some() {
        return Err(miette::miette!(
            "'{}' is already on the roster",
            args.username
        ));
    }

    roster.add_member(TeamMember {
        name: args.name.clone(),
        email: args.email,
        username: args.username.clone(),
        roles: args.roles,
        active: true,
    });
    roster.save(store.workspace()).into_diagnostic()?;

    println!(
        "{} Added {} ({})",
        style("✓").green(),
        style(&args.name).cyan(),
        args.username
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, _global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let mut roster = TeamRoster::load(store.workspace()).unwrap_or_default();

    if !roster.remove_member(&args.username) {
        return Err(miette::miette!("'{}' is not on the roster", args.username));
    }
    roster.save(store.workspace()).into_diagnostic()?;

    println!("{} Removed {}", style("✓").green(), style(&args.username).cyan());
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let roster = TeamRoster::load(store.workspace()).unwrap_or_default();

    let members: Vec<&TeamMember> = match args.role {
        Some(role) => roster.members_with_role(role).collect(),
        None => roster.active_members().collect(),
    };

    if members.is_empty() {
        if !global.quiet {
            println!("No team members. Use 'vct team add' to add one.");
        }
        return Ok(());
    }

    if global.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&members).map_err(|e| miette::miette!("{}", e))?
        );
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<26} {}",
        style("NAME").bold(),
        style("USERNAME").bold(),
        style("EMAIL").bold(),
        style("ROLES").bold()
    );
    println!("{}", "-".repeat(80));
    for m in members {
        let roles = m
            .roles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<20} {:<12} {:<26} {}",
            m.name,
            style(&m.username).cyan(),
            m.email,
            roles
        );
    }
    Ok(())
}
