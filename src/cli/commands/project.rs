//! `vct project` command - project lifecycle management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_short_id, open_store, resolve_actor, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dossier::ProjectDossier;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project dossier
    New(NewArgs),

    /// List projects
    List(ListArgs),

    /// Show a project's details
    Show(ShowArgs),

    /// Advance the project to the next lifecycle stage
    Advance(RefArgs),

    /// Reopen the previous lifecycle stage
    Reopen(RefArgs),

    /// Mark the inquiry lost
    Lost(LostArgs),

    /// Record the signed contract and lock commercial content
    Sign(SignArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project title
    #[arg(long, short = 't')]
    pub title: String,

    /// Customer name
    #[arg(long, short = 'c')]
    pub customer: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by lifecycle stage
    #[arg(long)]
    pub stage: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID or unique prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RefArgs {
    /// Project ID or unique prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct LostArgs {
    /// Project ID or unique prefix
    pub id: String,

    /// Why the inquiry was lost
    #[arg(long, short = 'r')]
    pub reason: String,
}

#[derive(clap::Args, Debug)]
pub struct SignArgs {
    /// Project ID or unique prefix
    pub id: String,

    /// Reference to the sealed contract document
    #[arg(long, short = 'd')]
    pub document: String,

    /// Free-text confirmation statement for the audit log
    #[arg(long)]
    pub declaration: Option<String>,
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::List(args) => run_list(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::Advance(args) => run_advance(args, global),
        ProjectCommands::Reopen(args) => run_reopen(args, global),
        ProjectCommands::Lost(args) => run_lost(args, global),
        ProjectCommands::Sign(args) => run_sign(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let dossier = ProjectDossier::new(args.title, args.customer, actor.name);
    store.save(&dossier).map_err(|e| miette::miette!("{}", e))?;

    if global.quiet {
        println!("{}", dossier.id);
    } else {
        println!(
            "{} Created project {} ({})",
            style("✓").green(),
            style(&dossier.id).cyan(),
            dossier.title
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let mut projects = store.list().map_err(|e| miette::miette!("{}", e))?;

    if let Some(ref stage) = args.stage {
        let stage = stage
            .parse::<crate::core::lifecycle::ProjectStage>()
            .map_err(|e| miette::miette!("{}", e))?;
        projects.retain(|p| p.stage == stage);
    }

    if projects.is_empty() {
        if !global.quiet {
            println!("No projects found.");
        }
        return Ok(());
    }

    let format = if global.format == OutputFormat::Auto {
        OutputFormat::Table
    } else {
        global.format
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&projects).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&projects).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for p in &projects {
                println!("{}", p.id);
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            println!(
                "{:<17} {:<28} {:<20} {:<32} {:>6}",
                style("ID").bold(),
                style("TITLE").bold(),
                style("CUSTOMER").bold(),
                style("STAGE").bold(),
                style("LOCK").bold()
            );
            println!("{}", "-".repeat(107));
            for p in &projects {
                let lock = if p.locked {
                    style("yes").red().to_string()
                } else {
                    style("-").dim().to_string()
                };
                println!(
                    "{:<17} {:<28} {:<20} {:<32} {:>6}",
                    format_short_id(&p.id),
                    truncate_str(&p.title, 26),
                    truncate_str(&p.customer, 18),
                    p.stage,
                    lock
                );
            }
            println!();
            println!("{} project(s) found.", style(projects.len()).cyan());
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store.resolve(&args.id).map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&dossier).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", dossier.id),
        _ => {
            print!("{}", serde_yml::to_string(&dossier).into_diagnostic()?);
        }
    }
    Ok(())
}

fn run_advance(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let next = store
        .with_dossier_mut(&args.id, |d| d.advance_stage(&actor))
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Project advanced to {}", style("✓").green(), style(next).cyan());
    Ok(())
}

fn run_reopen(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let prev = store
        .with_dossier_mut(&args.id, |d| d.reopen_stage(&actor))
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Project reopened at {}", style("✓").green(), style(prev).cyan());
    Ok(())
}

fn run_lost(args: LostArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    store
        .with_dossier_mut(&args.id, |d| d.mark_lost(&actor, args.reason.clone()))
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Inquiry marked lost.", style("✓").green());
    Ok(())
}

fn run_sign(args: SignArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    store
        .with_dossier_mut(&args.id, |d| {
            d.mark_contract_signed(&actor, &args.document, args.declaration.clone())
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Contract recorded ({}); commercial content is now locked.",
        style("✓").green(),
        style(&args.document).cyan()
    );
    Ok(())
}
