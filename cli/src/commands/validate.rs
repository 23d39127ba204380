//! Validate command - reports every configuration problem at once.

use anyhow::Result;
use clap::Args;
use errors::MolforgeError;
use serde_json::json;
use std::path::PathBuf;

use crate::output;
use crate::ux_error::{from_molforge, invalid_configuration};

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration document (JSON, YAML or TOML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let display_path = args.config.display().to_string();
    let mut config = config::load_from_file(&args.config)
        .map_err(|e| from_molforge(&MolforgeError::from(e), &display_path))?;
    config::apply_env_overrides(&mut config);
    config::ensure_job_id(&mut config);
    let issues = config::validation_report(&config);

    if args.json {
        let report = json!({
            "config": display_path,
            "run_type": config.run_type,
            "valid": issues.is_empty(),
            "issues": issues,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        if issues.is_empty() {
            return Ok(());
        }
        std::process::exit(1);
    }

    if !issues.is_empty() {
        return Err(invalid_configuration(&display_path, &issues).into());
    }

    output::success(&format!("{} is a valid {} configuration", display_path, config.run_type));
    output::field("Job", &config.logging.job_name);
    output::field("Result directory", &config.logging.resultdir.display().to_string());
    Ok(())
}
