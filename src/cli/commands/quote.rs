//! `vct quote` command - quotation management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_short_id, open_store, resolve_actor};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::pricing::{self, PriceTier, PricingRule};
use crate::core::{policy, ProjectAction};

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// Derive a quotation from a technical version
    Generate(GenerateArgs),

    /// Show the current quotation
    Show(ShowArgs),

    /// Add a manual line to the current quotation
    AddLine(AddLineArgs),

    /// Edit quantity or pricing of a line
    EditLine(EditLineArgs),

    /// Remove a line from the current quotation
    RemoveLine(RemoveLineArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Technical version to derive from (default: latest)
    #[arg(long, short = 'V')]
    pub version: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Include internal cost prices (commercial/management only)
    #[arg(long)]
    pub cost: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddLineArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Model identifier
    #[arg(long, short = 'm')]
    pub model: String,

    /// Order quantity
    #[arg(long, short = 'n', default_value = "1")]
    pub quantity: u32,

    /// Base list price per unit
    #[arg(long, short = 'p')]
    pub price: f64,
}

#[derive(clap::Args, Debug)]
pub struct EditLineArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Line ID or unique suffix
    #[arg(long, short = 'l')]
    pub line: String,

    /// New order quantity
    #[arg(long, short = 'n')]
    pub quantity: Option<u32>,

    /// Switch to tiered pricing; tier in MIN_QTY:UNIT_PRICE form (repeatable)
    #[arg(long = "tier", short = 't')]
    pub tiers: Vec<String>,

    /// Switch to a manual unit price override
    #[arg(long, conflicts_with = "tiers")]
    pub manual_price: Option<f64>,

    /// Note explaining a manual override
    #[arg(long)]
    pub note: Option<String>,

    /// Switch back to standard base-price rule
    #[arg(long, conflicts_with_all = ["tiers", "manual_price"])]
    pub standard: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveLineArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Line ID or unique suffix
    #[arg(long, short = 'l')]
    pub line: String,
}

pub fn run(cmd: QuoteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QuoteCommands::Generate(args) => run_generate(args, global),
        QuoteCommands::Show(args) => run_show(args, global),
        QuoteCommands::AddLine(args) => run_add_line(args, global),
        QuoteCommands::EditLine(args) => run_edit_line(args, global),
        QuoteCommands::RemoveLine(args) => run_remove_line(args, global),
    }
}

fn run_generate(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let (version, line_count, total) = store
        .with_dossier_mut(&args.project, |d| {
            let version = match args.version {
                Some(v) => v,
                None => d.latest_version().map(|v| v.version).unwrap_or(0),
            };
            let quote = d.generate_quotation(&actor, version)?;
            Ok((version, quote.lines.len(), quote.total()))
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Generated quotation from version {} ({} line(s), total {:.2}).",
        style("✓").green(),
        style(version).cyan(),
        line_count,
        total
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    let Some(quote) = dossier.current_quotation() else {
        if !global.quiet {
            println!("No quotation has been generated yet.");
        }
        return Ok(());
    };

    let show_cost = if args.cost {
        let actor = resolve_actor(global)?;
        if !policy::can(actor.role, ProjectAction::ViewCostPrice, dossier.stage) {
            return Err(miette::miette!(
                "role {} may not view cost prices",
                actor.role
            ));
        }
        true
    } else {
        false
    };

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(quote).map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yml::to_string(quote).map_err(|e| miette::miette!("{}", e))?
            );
        }
        _ => {
            println!(
                "Quotation from technical version {} ({})",
                style(quote.based_on_version).cyan(),
                quote.created.format("%Y-%m-%d")
            );
            println!();
            let cost_header = if show_cost { " COST" } else { "" };
            println!(
                "{:<17} {:<16} {:>5} {:>10} {:>10} {:>11} {:>5}{}",
                style("LINE").bold(),
                style("MODEL").bold(),
                style("QTY").bold(),
                style("BASE").bold(),
                style("UNIT").bold(),
                style("TOTAL").bold(),
                style("DISC").bold(),
                style(cost_header).bold()
            );
            println!("{}", "-".repeat(if show_cost { 85 } else { 80 }));
            for line in &quote.lines {
                let discount = line
                    .discount_percent()
                    .map(|d| format!("-{}%", d))
                    .unwrap_or_else(|| "-".to_string());
                let cost = if show_cost {
                    line.cost_price
                        .map(|c| format!(" {:>9.2}", c))
                        .unwrap_or_else(|| format!(" {:>9}", "-"))
                } else {
                    String::new()
                };
                println!(
                    "{:<17} {:<16} {:>5} {:>10.2} {:>10.2} {:>11.2} {:>5}{}",
                    format_short_id(&line.id),
                    line.model,
                    line.quantity,
                    line.base_price,
                    line.unit_price,
                    line.total_price,
                    discount,
                    cost
                );
            }
            println!();
            println!(
                "Total: {}",
                style(format!("{:.2}", quote.total())).cyan().bold()
            );
        }
    }
    Ok(())
}

fn run_add_line(args: AddLineArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let line_id = store
        .with_dossier_mut(&args.project, |d| {
            d.add_quotation_line(&actor, &args.model, args.quantity, args.price)
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added line {} ({} x{})",
        style("✓").green(),
        style(line_id).cyan(),
        args.model,
        args.quantity
    );
    Ok(())
}

fn parse_tier(raw: &str) -> Result<PriceTier> {
    let (min, price) = raw
        .split_once(':')
        .ok_or_else(|| miette::miette!("invalid tier '{}'; expected MIN_QTY:UNIT_PRICE", raw))?;
    Ok(PriceTier {
        min_qty: min
            .parse()
            .map_err(|_| miette::miette!("invalid tier quantity '{}'", min))?,
        unit_price: price
            .parse()
            .map_err(|_| miette::miette!("invalid tier price '{}'", price))?,
    })
}

fn run_edit_line(args: EditLineArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let rule = if args.standard {
        Some(PricingRule::Standard)
    } else if let Some(price) = args.manual_price {
        Some(PricingRule::ManualOverride {
            price: Some(price),
            note: args.note.clone(),
        })
    } else if !args.tiers.is_empty() {
        let tiers = args
            .tiers
            .iter()
            .map(|s| parse_tier(s))
            .collect::<Result<Vec<_>>>()?;
        for min_qty in pricing::duplicate_minimums(&tiers) {
            eprintln!(
                "{} duplicate tier minimum {}; the last listed tier wins",
                style("warning:").yellow(),
                min_qty
            );
        }
        Some(PricingRule::Tiered { tiers })
    } else {
        None
    };

    let project_id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store
        .load(&project_id)
        .map_err(|e| miette::miette!("{}", e))?;
    let line_id = dossier
        .current_quotation()
        .map(|q| q.lines.iter().map(|l| l.id.clone()).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .find(|id| {
            let s = id.to_string();
            s == args.line.to_uppercase() || s.ends_with(&args.line.to_uppercase())
        })
        .ok_or_else(|| miette::miette!("no quotation line matches '{}'", args.line))?;

    store
        .with_dossier_mut(&args.project, |d| {
            d.update_quotation_line(&actor, &line_id, args.quantity, rule)
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Line {} repriced.", style("✓").green(), style(line_id).cyan());
    Ok(())
}

fn run_remove_line(args: RemoveLineArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let project_id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store
        .load(&project_id)
        .map_err(|e| miette::miette!("{}", e))?;
    let line_id = dossier
        .current_quotation()
        .map(|q| q.lines.iter().map(|l| l.id.clone()).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .find(|id| {
            let s = id.to_string();
            s == args.line.to_uppercase() || s.ends_with(&args.line.to_uppercase())
        })
        .ok_or_else(|| miette::miette!("no quotation line matches '{}'", args.line))?;

    store
        .with_dossier_mut(&args.project, |d| {
            d.delete_quotation_line(&actor, &line_id)
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Line {} removed.", style("✓").green(), style(line_id).cyan());
    Ok(())
}
