//! # Environment Overrides
//!
//! Applies `MOLFORGE_*` environment variables on top of a loaded
//! configuration file, then fills in generated defaults.
//!
//! # Variables
//! - `MOLFORGE_RESULT_DIR`: `logging.resultdir`
//! - `MOLFORGE_LOGGING_PATH`: `logging.logging_path`
//! - `MOLFORGE_JOB_ID`: `logging.job_id`
//! - `MOLFORGE_JOB_NAME`: `logging.job_name`
//! - `MOLFORGE_SEED`: `seed` of every parameter section that has one
//! - `MOLFORGE_N_STEPS`: `parameters.reinforcement_learning.n_steps`

use crate::config::RunConfiguration;
use crate::file_loader::load_from_file;
use crate::validation::validate;
use errors::MolforgeResult;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_RESULT_DIR: &str = "MOLFORGE_RESULT_DIR";
pub const ENV_LOGGING_PATH: &str = "MOLFORGE_LOGGING_PATH";
pub const ENV_JOB_ID: &str = "MOLFORGE_JOB_ID";
pub const ENV_JOB_NAME: &str = "MOLFORGE_JOB_NAME";
pub const ENV_SEED: &str = "MOLFORGE_SEED";
pub const ENV_N_STEPS: &str = "MOLFORGE_N_STEPS";

/// Load, override, complete and validate a run configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Single entry point used by the binary: reads the file (format detected
/// by extension), applies environment overrides, assigns a job id when the
/// document has none and runs every validation rule. Nothing downstream
/// needs to re-check the configuration.
///
/// ## Usage
/// ```rust,no_run
/// use config::load;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load(Path::new("run.json"))?;
///     println!("Job: {}", config.job_id());
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns a configuration or resource `MolforgeError`; both are fatal.
pub fn load(path: &Path) -> MolforgeResult<RunConfiguration> {
    let mut config = load_from_file(path)?;
    let applied = apply_env_overrides(&mut config);
    if !applied.is_empty() {
        debug!(overrides = ?applied, "Applied environment overrides");
    }
    ensure_job_id(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Apply every `MOLFORGE_*` variable that is set. Returns the names of the
/// variables that took effect; unparsable numeric values are skipped with a
/// warning.
pub fn apply_env_overrides(config: &mut RunConfiguration) -> Vec<&'static str> {
    let mut applied = Vec::new();

    if let Ok(dir) = env::var(ENV_RESULT_DIR) {
        config.logging.resultdir = PathBuf::from(dir);
        applied.push(ENV_RESULT_DIR);
    }
    if let Ok(path) = env::var(ENV_LOGGING_PATH) {
        config.logging.logging_path = PathBuf::from(path);
        applied.push(ENV_LOGGING_PATH);
    }
    if let Ok(job_id) = env::var(ENV_JOB_ID) {
        config.logging.job_id = Some(job_id);
        applied.push(ENV_JOB_ID);
    }
    if let Ok(job_name) = env::var(ENV_JOB_NAME) {
        config.logging.job_name = job_name;
        applied.push(ENV_JOB_NAME);
    }

    match parse_env::<u64>(ENV_SEED) {
        Ok(seed) => {
            let parameters = &mut config.parameters;
            if let Some(rl) = parameters.reinforcement_learning.as_mut() {
                rl.seed = Some(seed);
            }
            if let Some(sampling) = parameters.sampling.as_mut() {
                sampling.seed = Some(seed);
            }
            if let Some(tl) = parameters.transfer_learning.as_mut() {
                tl.seed = Some(seed);
            }
            if let Some(validation) = parameters.validation.as_mut() {
                validation.seed = Some(seed);
            }
            applied.push(ENV_SEED);
        }
        Err(e) => warn_unparsable(ENV_SEED, e.as_ref()),
    }

    match parse_env::<usize>(ENV_N_STEPS) {
        Ok(n_steps) => {
            if let Some(rl) = config.parameters.reinforcement_learning.as_mut() {
                rl.n_steps = n_steps;
                applied.push(ENV_N_STEPS);
            }
        }
        Err(e) => warn_unparsable(ENV_N_STEPS, e.as_ref()),
    }

    applied
}

/// Assign a fresh UUID v4 job id when none is configured.
pub fn ensure_job_id(config: &mut RunConfiguration) {
    if config.logging.job_id.as_deref().is_none_or(str::is_empty) {
        config.logging.job_id = Some(uuid::Uuid::new_v4().to_string());
    }
}

fn warn_unparsable(key: &str, err: &(dyn std::error::Error + 'static)) {
    if err.downcast_ref::<env::VarError>().is_none() {
        warn!(variable = key, error = %err, "Ignoring unparsable environment override");
    }
}

fn parse_env<T>(key: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
    }
}
