//! `vct ticket` command - after-sales ticket management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_short_id, open_store, resolve_actor, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::ticket::{Ticket, TicketStage};

#[derive(Subcommand, Debug)]
pub enum TicketCommands {
    /// Raise a ticket against a project
    New(NewArgs),

    /// List tickets
    List(ListArgs),

    /// Show a ticket with its event history
    Show(RefArgs),

    /// Begin working a ticket
    Start(RefArgs),

    /// Mark a ticket resolved, pending reporter confirmation
    Resolve(NoteArgs),

    /// Reporter confirms the resolution; the ticket closes
    Confirm(RefArgs),

    /// Reporter is not satisfied; reopen the ticket
    Reopen(NoteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Short summary
    #[arg(long, short = 't')]
    pub title: String,

    /// Detailed description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show closed tickets too
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct RefArgs {
    /// Ticket ID or unique prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct NoteArgs {
    /// Ticket ID or unique prefix
    pub id: String,

    /// Note recorded with the event
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

pub fn run(cmd: TicketCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TicketCommands::New(args) => run_new(args, global),
        TicketCommands::List(args) => run_list(args, global),
        TicketCommands::Show(args) => run_show(args, global),
        TicketCommands::Start(args) => transition(args.id, global, |t, actor| t.start(actor)),
        TicketCommands::Resolve(args) => {
            let note = args.note;
            transition(args.id, global, move |t, actor| t.resolve(actor, note))
        }
        TicketCommands::Confirm(args) => transition(args.id, global, |t, actor| t.confirm(actor)),
        TicketCommands::Reopen(args) => {
            let note = args.note;
            transition(args.id, global, move |t, actor| t.reopen(actor, note))
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let project = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;

    let mut ticket = Ticket::new(project, args.title, actor.name);
    ticket.description = args.description;
    store
        .save_ticket(&ticket)
        .map_err(|e| miette::miette!("{}", e))?;

    if global.quiet {
        println!("{}", ticket.id);
    } else {
        println!(
            "{} Opened ticket {} ({})",
            style("✓").green(),
            style(&ticket.id).cyan(),
            ticket.title
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let mut tickets = store.list_tickets().map_err(|e| miette::miette!("{}", e))?;

    if !args.all {
        tickets.retain(|t| t.stage != TicketStage::Closed);
    }

    if tickets.is_empty() {
        if !global.quiet {
            println!("No tickets found.");
        }
        return Ok(());
    }

    if global.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tickets).map_err(|e| miette::miette!("{}", e))?
        );
        return Ok(());
    }

    println!(
        "{:<17} {:<30} {:<30} {:<12}",
        style("ID").bold(),
        style("TITLE").bold(),
        style("STAGE").bold(),
        style("REPORTER").bold()
    );
    println!("{}", "-".repeat(92));
    for t in &tickets {
        let stage = match t.stage {
            TicketStage::Open | TicketStage::Reopened => style(t.stage.to_string()).red(),
            TicketStage::InProgress => style(t.stage.to_string()).yellow(),
            TicketStage::ResolvedPendingConfirmation => style(t.stage.to_string()).cyan(),
            TicketStage::Closed => style(t.stage.to_string()).green(),
        };
        println!(
            "{:<17} {:<30} {:<30} {:<12}",
            format_short_id(&t.id),
            truncate_str(&t.title, 28),
            stage,
            t.author
        );
    }
    println!();
    println!("{} ticket(s).", style(tickets.len()).cyan());
    Ok(())
}

fn run_show(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve_ticket(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;
    let ticket = store.load_ticket(&id).map_err(|e| miette::miette!("{}", e))?;

    if global.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ticket).map_err(|e| miette::miette!("{}", e))?
        );
        return Ok(());
    }

    print!(
        "{}",
        serde_yml::to_string(&ticket).map_err(|e| miette::miette!("{}", e))?
    );
    Ok(())
}

fn transition(
    reference: String,
    global: &GlobalOpts,
    op: impl FnOnce(&mut Ticket, &str) -> Result<(), crate::core::DossierError>,
) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let stage = store
        .with_ticket_mut(&reference, |t| {
            op(t, &actor.name)?;
            Ok(t.stage)
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Ticket is now {}.", style("✓").green(), style(stage).cyan());
    Ok(())
}
