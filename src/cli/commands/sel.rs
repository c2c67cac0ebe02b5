//! `vct sel` command - selection requirement management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_store, resolve_actor};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::selection::SelectionRequirement;

#[derive(Subcommand, Debug)]
pub enum SelCommands {
    /// Add a selection requirement to the working technical list
    Add(AddArgs),

    /// Update fields of an existing requirement
    Update(UpdateArgs),

    /// Remove a requirement by tag
    Remove(RemoveArgs),

    /// List the working technical list
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Valve tag, unique within the project (e.g. V-101)
    #[arg(long, short = 't')]
    pub tag: String,

    /// Required torque in Nm
    #[arg(long)]
    pub torque: f64,

    /// Selected actuator model
    #[arg(long, short = 'm')]
    pub model: String,

    /// Actuator series
    #[arg(long, short = 's')]
    pub series: String,

    /// Action type (e.g. double_acting, spring_return)
    #[arg(long, short = 'a')]
    pub action: String,

    /// Unit list price
    #[arg(long, short = 'p')]
    pub price: f64,

    /// Torque the selected model actually delivers in Nm
    #[arg(long)]
    pub actual_torque: f64,

    /// Mechanism attribute (optional compatibility constraint)
    #[arg(long)]
    pub mechanism: Option<String>,

    /// Temperature code (optional compatibility constraint)
    #[arg(long)]
    pub temperature_code: Option<String>,

    /// Valve type (optional compatibility constraint)
    #[arg(long)]
    pub valve_type: Option<String>,

    /// Yoke type (optional compatibility constraint)
    #[arg(long)]
    pub yoke_type: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Tag of the requirement to update
    #[arg(long, short = 't')]
    pub tag: String,

    /// New required torque in Nm
    #[arg(long)]
    pub torque: Option<f64>,

    /// New actuator model
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// New unit list price
    #[arg(long, short = 'p')]
    pub price: Option<f64>,

    /// New delivered torque in Nm
    #[arg(long)]
    pub actual_torque: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Tag of the requirement to remove
    #[arg(long, short = 't')]
    pub tag: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project ID or unique prefix
    pub project: String,
}

pub fn run(cmd: SelCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SelCommands::Add(args) => run_add(args, global),
        SelCommands::Update(args) => run_update(args, global),
        SelCommands::Remove(args) => run_remove(args, global),
        SelCommands::List(args) => run_list(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    let mut requirement = SelectionRequirement::new(
        &args.tag,
        args.torque,
        &args.model,
        &args.series,
        &args.action,
        args.price,
        args.actual_torque,
        &actor.name,
    );
    requirement.mechanism = args.mechanism;
    requirement.temperature_code = args.temperature_code;
    requirement.valve_type = args.valve_type;
    requirement.yoke_type = args.yoke_type;

    store
        .with_dossier_mut(&args.project, |d| d.add_requirement(&actor, requirement))
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added {} ({} @ {} Nm)",
        style("✓").green(),
        style(&args.tag).cyan(),
        args.model,
        args.torque
    );
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    store
        .with_dossier_mut(&args.project, |d| {
            d.update_requirement(&actor, &args.tag, |r| {
                if let Some(torque) = args.torque {
                    r.required_torque = torque;
                }
                if let Some(ref model) = args.model {
                    r.model = model.clone();
                }
                if let Some(price) = args.price {
                    r.unit_price = price;
                }
                if let Some(actual) = args.actual_torque {
                    r.actual_torque = actual;
                }
            })
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Updated {}", style("✓").green(), style(&args.tag).cyan());
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    store
        .with_dossier_mut(&args.project, |d| d.remove_requirement(&actor, &args.tag))
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Removed {}", style("✓").green(), style(&args.tag).cyan());
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    if dossier.requirements.is_empty() {
        if !global.quiet {
            println!("Technical list is empty.");
        }
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&dossier.requirements)
                    .map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yml::to_string(&dossier.requirements)
                    .map_err(|e| miette::miette!("{}", e))?
            );
        }
        _ => {
            println!(
                "{:<8} {:<14} {:<8} {:<14} {:>10} {:>10} {:>10}",
                style("TAG").bold(),
                style("MODEL").bold(),
                style("SERIES").bold(),
                style("ACTION").bold(),
                style("REQ Nm").bold(),
                style("ACT Nm").bold(),
                style("PRICE").bold()
            );
            println!("{}", "-".repeat(80));
            for r in &dossier.requirements {
                println!(
                    "{:<8} {:<14} {:<8} {:<14} {:>10.1} {:>10.1} {:>10.2}",
                    style(&r.tag).cyan(),
                    r.model,
                    r.series,
                    r.action_type,
                    r.required_torque,
                    r.actual_torque,
                    r.unit_price
                );
            }
            println!();
            println!(
                "{} requirement(s), list {}",
                style(dossier.requirements.len()).cyan(),
                if dossier.technical_list_locked {
                    style("locked").red().to_string()
                } else {
                    style("editable").green().to_string()
                }
            );
        }
    }
    Ok(())
}
