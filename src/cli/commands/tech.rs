//! `vct tech` command - technical version workflow

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_store, resolve_actor};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::modification::LineSuggestion;
use crate::entities::technical::VersionStatus;

#[derive(Subcommand, Debug)]
pub enum TechCommands {
    /// Submit the working list as a new numbered version
    Submit(SubmitArgs),

    /// List the technical version history
    Versions(VersionsArgs),

    /// Reject a submitted version with modification suggestions
    Reject(RejectArgs),

    /// Confirm a submitted version
    Confirm(ConfirmArgs),

    /// Respond to a pending modification request
    Respond(RespondArgs),

    /// List modification requests
    Requests(VersionsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
    /// Project ID or unique prefix
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct VersionsArgs {
    /// Project ID or unique prefix
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct RejectArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Version number to reject
    #[arg(long, short = 'V')]
    pub version: u32,

    /// Per-tag suggestion in TAG:FROM:TO:REASON form (repeatable)
    #[arg(long = "suggest", short = 's')]
    pub suggestions: Vec<String>,

    /// Overall rejection note
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ConfirmArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Version number to confirm
    #[arg(long, short = 'V')]
    pub version: u32,
}

#[derive(clap::Args, Debug)]
pub struct RespondArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Modification request ID
    #[arg(long, short = 'r')]
    pub request: String,

    /// Accept the suggestions
    #[arg(long, conflicts_with = "reject")]
    pub accept: bool,

    /// Reject the suggestions
    #[arg(long)]
    pub reject: bool,

    /// Response text
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

pub fn run(cmd: TechCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TechCommands::Submit(args) => run_submit(args, global),
        TechCommands::Versions(args) => run_versions(args, global),
        TechCommands::Reject(args) => run_reject(args, global),
        TechCommands::Confirm(args) => run_confirm(args, global),
        TechCommands::Respond(args) => run_respond(args, global),
        TechCommands::Requests(args) => run_requests(args, global),
    }
}

fn run_submit(args: SubmitArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let version = store
        .with_dossier_mut(&args.project, |d| d.submit_technical_list(&actor))
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Submitted technical version {}; the list is now locked for commercial review.",
        style("✓").green(),
        style(version).cyan()
    );
    Ok(())
}

fn run_versions(args: VersionsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    if dossier.technical_versions.is_empty() {
        if !global.quiet {
            println!("No versions submitted yet.");
        }
        return Ok(());
    }

    if global.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dossier.technical_versions)
                .map_err(|e| miette::miette!("{}", e))?
        );
        return Ok(());
    }

    println!(
        "{:>4} {:<12} {:>6} {:<12} {:<20}",
        style("VER").bold(),
        style("STATUS").bold(),
        style("ITEMS").bold(),
        style("AUTHOR").bold(),
        style("CREATED").bold()
    );
    println!("{}", "-".repeat(60));
    for v in &dossier.technical_versions {
        let status = match v.status {
            VersionStatus::Submitted => style(v.status.to_string()).yellow(),
            VersionStatus::Confirmed => style(v.status.to_string()).green(),
            VersionStatus::Rejected => style(v.status.to_string()).red(),
        };
        println!(
            "{:>4} {:<12} {:>6} {:<12} {:<20}",
            style(v.version).cyan(),
            status,
            v.requirements.len(),
            v.author,
            v.created.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn parse_suggestion(raw: &str) -> Result<LineSuggestion> {
    let parts: Vec<&str> = raw.splitn(4, ':').collect();
    if parts.len() < 4 {
        return Err(miette::miette!(
            "invalid suggestion '{}'; expected TAG:FROM:TO:REASON",
            raw
        ));
    }
    Ok(LineSuggestion {
        tag: parts[0].to_string(),
        original_model: parts[1].to_string(),
        suggested_model: parts[2].to_string(),
        reason: parts[3].to_string(),
        detail: None,
    })
}

fn run_reject(args: RejectArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let suggestions = args
        .suggestions
        .iter()
        .map(|s| parse_suggestion(s))
        .collect::<Result<Vec<_>>>()?;

    let request_id = store
        .with_dossier_mut(&args.project, |d| {
            d.reject_technical_version(&actor, args.version, suggestions, args.note.clone())
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Rejected version {}; engineering may now revise the list.",
        style("✓").green(),
        style(args.version).cyan()
    );
    println!("  Modification request: {}", style(request_id).cyan());
    Ok(())
}

fn run_confirm(args: ConfirmArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    store
        .with_dossier_mut(&args.project, |d| {
            d.confirm_technical_version(&actor, args.version)
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Version {} confirmed.",
        style("✓").green(),
        style(args.version).cyan()
    );
    Ok(())
}

fn run_respond(args: RespondArgs, global: &GlobalOpts) -> Result<()> {
    if !args.accept && !args.reject {
        return Err(miette::miette!("pass either --accept or --reject"));
    }

    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let project_id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store
        .load(&project_id)
        .map_err(|e| miette::miette!("{}", e))?;
    let request_id = dossier
        .modification_requests
        .iter()
        .map(|r| r.id.clone())
        .find(|id| {
            let s = id.to_string();
            s == args.request.to_uppercase() || s.ends_with(&args.request.to_uppercase())
        })
        .ok_or_else(|| miette::miette!("no modification request matches '{}'", args.request))?;

    store
        .with_dossier_mut(&args.project, |d| {
            d.respond_to_modification(&actor, &request_id, args.accept, args.message.clone())
        })
        .map_err(|e| miette::miette!("{}", e))?;

    let verdict = if args.accept { "accepted" } else { "rejected" };
    println!(
        "{} Suggestions {} on request {}.",
        style("✓").green(),
        verdict,
        style(request_id).cyan()
    );
    Ok(())
}

fn run_requests(args: VersionsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    if dossier.modification_requests.is_empty() {
        if !global.quiet {
            println!("No modification requests.");
        }
        return Ok(());
    }

    if global.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dossier.modification_requests)
                .map_err(|e| miette::miette!("{}", e))?
        );
        return Ok(());
    }

    for r in &dossier.modification_requests {
        println!(
            "{} v{} [{}] by {} ({} suggestion(s))",
            style(&r.id).cyan(),
            r.version,
            r.status,
            r.author,
            r.suggestions.len()
        );
        for s in &r.suggestions {
            println!(
                "    {} {} -> {}: {}",
                style(&s.tag).cyan(),
                s.original_model,
                s.suggested_model,
                s.reason
            );
        }
        if let Some(ref response) = r.response {
            println!("    response: {}", response);
        }
    }
    Ok(())
}
