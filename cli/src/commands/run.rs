//! Run command - executes one job end to end.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use crate::output;
use crate::ux_error::{UxError, from_molforge};

#[derive(Args)]
pub struct RunArgs {
    /// Configuration document (JSON, YAML or TOML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let display_path = args.config.display().to_string();
    if !args.config.exists() {
        return Err(UxError::new(format!("Configuration '{}' not found", display_path))
            .fix("Check the path passed to `molforge run`")
            .into());
    }

    let config = config::load(&args.config).map_err(|e| from_molforge(&e, &display_path))?;
    debug!(config = %display_path, run_type = %config.run_type, "Loaded configuration");
    output::info(&format!(
        "Starting {} job '{}' ({})",
        config.run_type,
        config.logging.job_name,
        config.job_id()
    ));

    let result = training::run(&config)
        .await
        .map_err(|e| from_molforge(&e, &display_path))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!("{} finished", result.run_type));
    output::field("Job", &format!("{} ({})", result.job_name, result.job_id));
    output::field("Steps", &result.steps_completed.to_string());
    if result.agent_resets > 0 {
        output::field("Agent resets", &result.agent_resets.to_string());
    }
    if let Some(score) = result.final_mean_score {
        output::field("Final mean score", &format!("{score:.4}"));
    }
    if let Some(valid) = result.fraction_valid {
        output::field("Fraction valid", &format!("{valid:.1}%"));
    }
    for artifact in &result.artifacts {
        output::field("Wrote", &artifact.display().to_string());
    }
    Ok(())
}
