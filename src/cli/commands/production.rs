//! `vct production` command - payment confirmation and production orders

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, resolve_actor};
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum ProductionCommands {
    /// Record receipt of the prepayment
    ConfirmPayment(ConfirmPaymentArgs),

    /// Confirm payment and create the production order (irreversible)
    CreateOrder(CreateOrderArgs),
}

#[derive(clap::Args, Debug)]
pub struct ConfirmPaymentArgs {
    /// Project ID or unique prefix
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct CreateOrderArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Free-text confirmation statement for the audit log
    #[arg(long)]
    pub declaration: Option<String>,

    /// Skip the interactive confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ProductionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductionCommands::ConfirmPayment(args) => run_confirm_payment(args, global),
        ProductionCommands::CreateOrder(args) => run_create_order(args, global),
    }
}

fn run_confirm_payment(args: ConfirmPaymentArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    store
        .with_dossier_mut(&args.project, |d| d.set_prepayment_confirmed(&actor))
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{} Prepayment recorded.", style("✓").green());
    Ok(())
}

fn run_create_order(args: CreateOrderArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let actor = resolve_actor(global)?;

    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt("Create the production order? This cannot be undone")
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let (payment_id, order_id) = store
        .with_dossier_mut(&args.project, |d| {
            d.confirm_payment_and_create_production_order(&actor, args.declaration.clone())
        })
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Production order created; project is now in production.",
        style("✓").green()
    );
    println!("  Audit: {}", style(payment_id).cyan());
    println!("  Audit: {}", style(order_id).cyan());
    Ok(())
}
