//! `vct consolidate` command - shared-model optimization of a technical list

use console::style;
use miette::Result;

use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_store;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::consolidate::consolidate;

#[derive(clap::Args, Debug)]
pub struct ConsolidateArgs {
    /// Project ID or unique prefix
    pub project: String,

    /// Consolidate a submitted version instead of the working list
    #[arg(long, short = 'V')]
    pub version: Option<u32>,
}

pub fn run(args: ConsolidateArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store()?;
    let id = store
        .resolve(&args.project)
        .map_err(|e| miette::miette!("{}", e))?;
    let dossier = store.load(&id).map_err(|e| miette::miette!("{}", e))?;

    let requirements = match args.version {
        Some(v) => {
            &dossier
                .version(v)
                .ok_or_else(|| miette::miette!("technical version {} not found", v))?
                .requirements
        }
        None => &dossier.requirements,
    };

    if requirements.is_empty() {
        if !global.quiet {
            println!("Nothing to consolidate.");
        }
        return Ok(());
    }

    let result = consolidate(requirements);

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&result).map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yml::to_string(&result).map_err(|e| miette::miette!("{}", e))?
            );
        }
        _ => {
            let mut table = Builder::default();
            table.push_record(["Model", "Qty", "Unit", "Total", "Covers", "Note"]);
            for line in &result.lines {
                table.push_record([
                    line.model.clone(),
                    line.quantity.to_string(),
                    format!("{:.2}", line.unit_price),
                    format!("{:.2}", line.total_price),
                    line.covered_tags.join(","),
                    line.note.clone(),
                ]);
            }
            println!("{}", table.build().with(Style::sharp()));
            println!();
            let s = &result.stats;
            println!(
                "{} of {} selections share a model ({}% consolidation), {} unit(s), total {:.2}",
                style(s.original_count - s.optimized_count).cyan(),
                s.original_count,
                style(format!("{:.0}", s.consolidation_rate)).cyan(),
                s.total_quantity,
                s.total_price
            );
        }
    }
    Ok(())
}
