//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    audit::AuditArgs,
    completions::CompletionsArgs,
    consolidate::ConsolidateArgs,
    init::InitArgs,
    production::ProductionCommands,
    project::ProjectCommands,
    quote::QuoteCommands,
    sel::SelCommands,
    team::TeamCommands,
    tech::TechCommands,
    ticket::TicketCommands,
};
use crate::core::team::Role;

#[derive(Parser)]
#[command(name = "vct")]
#[command(author, version, about = "Valve Commercial Toolkit")]
#[command(
    long_about = "A Unix-style toolkit for driving valve/actuator projects through their commercial lifecycle, stored as plain text YAML files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Role to act under (default: from config or team roster)
    #[arg(long, global = true, env = "VCT_ROLE")]
    pub role: Option<Role>,

    /// Actor name (default: from config, git or $USER)
    #[arg(long, global = true, env = "VCT_AUTHOR")]
    pub actor: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new VCT workspace
    Init(InitArgs),

    /// Project lifecycle management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Selection requirement management (technical list)
    #[command(subcommand)]
    Sel(SelCommands),

    /// Technical version workflow (submit, reject, confirm)
    #[command(subcommand)]
    Tech(TechCommands),

    /// Quotation management
    #[command(subcommand)]
    Quote(QuoteCommands),

    /// Consolidate a technical list into shared actuator models
    Consolidate(ConsolidateArgs),

    /// Payment confirmation and production orders
    #[command(subcommand)]
    Production(ProductionCommands),

    /// Show a project's operation audit log
    Audit(AuditArgs),

    /// After-sales ticket management
    #[command(subcommand)]
    Ticket(TicketCommands),

    /// Team roster management
    #[command(subcommand)]
    Team(TeamCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, yaml for show)
    #[default]
    Auto,
    /// Aligned table for terminals
    Table,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Just IDs, one per line
    Id,
}
