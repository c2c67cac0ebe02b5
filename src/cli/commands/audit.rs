//! `vct audit` command - show a project's operation audit log

use console::style;
use miette::Result;

use crate::cli::helpers::{format_short_id, open_store};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct AuditArgs {
    /// Project ID or unique prefix
    pub project: String,
}

pub fn run(args: AuditArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    if dossier.audit_log.is_empty() {
        if !global.quiet {
            println!("Audit log is empty.");
        }
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(dossier.audit_log.entries())
                    .map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yml::to_string(&dossier.audit_log)
                    .map_err(|e| miette::miette!("{}", e))?
            );
        }
        _ => {
            println!(
                "{:<17} {:<26} {:<12} {:<12} {:<17}",
                style("ID").bold(),
                style("OPERATION").bold(),
                style("ACTOR").bold(),
                style("ROLE").bold(),
                style("WHEN").bold()
            );
            println!("{}", "-".repeat(90));
            for entry in dossier.audit_log.entries() {
                println!(
                    "{:<17} {:<26} {:<12} {:<12} {:<17}",
                    format_short_id(&entry.id),
                    style(entry.operation).cyan(),
                    entry.actor,
                    entry.role,
                    entry.timestamp.format("%Y-%m-%d %H:%M")
                );
                if let Some(ref declaration) = entry.declaration {
                    println!("    \"{}\"", style(declaration).dim());
                }
                for (key, value) in &entry.details {
                    println!("    {}: {}", style(key).dim(), value);
                }
            }
            println!();
            println!("{} entr(ies).", style(dossier.audit_log.len()).cyan());
        }
    }
    Ok(())
}
