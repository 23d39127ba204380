//! Score command - scores SMILES given on the command line.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use errors::MolforgeError;
use scoring::ScoringFunction;
use serde_json::json;
use std::path::PathBuf;

use crate::output;
use crate::ux_error::{UxError, from_molforge};

#[derive(Args)]
pub struct ScoreArgs {
    /// Configuration document holding a scoring_function section
    #[arg(long, value_name = "CONFIG")]
    pub config: PathBuf,

    /// SMILES to score
    #[arg(value_name = "SMILES", required = true)]
    pub smiles: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    let display_path = args.config.display().to_string();
    let config = config::load_from_file(&args.config)
        .map_err(|e| from_molforge(&MolforgeError::from(e), &display_path))?;
    let section = config.scoring_function().map_err(|e| {
        UxError::new(format!("'{}' has no scoring function", display_path))
            .why(e.to_string())
            .fix("Add a parameters.scoring_function section")
    })?;
    let function = ScoringFunction::from_config(section)
        .map_err(|e| from_molforge(&MolforgeError::from(e), &display_path))?;

    let summaries = function.score_batch(&args.smiles);

    if args.json {
        let rows: Vec<_> = summaries
            .iter()
            .map(|s| {
                json!({
                    "smiles": s.smiles,
                    "valid": s.valid,
                    "total_score": s.total,
                    "components": s.components,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    output::header("Scores");
    for summary in &summaries {
        let total = format!("{:.4}", summary.total);
        let total = if summary.valid { total.green() } else { total.red() };
        println!("  {}  {}", total, summary.smiles);
        if !summary.valid {
            output::warn(&format!("'{}' is not a valid SMILES", summary.smiles));
            continue;
        }
        for component in &summary.components {
            let raw = component
                .raw
                .map(|r| format!("{r:.4}"))
                .unwrap_or_else(|| "n/a".to_string());
            output::field(&component.name, &format!("{:.4} (raw {raw})", component.score));
        }
    }
    Ok(())
}
