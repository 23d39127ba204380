//! # Run Dispatcher
//!
//! Executes a validated [`RunConfiguration`] of any run type and returns a
//! [`RunResult`]. Progress goes to the sink named by `logging.recipient`.

use crate::artifacts::{ResultArtifacts, read_smiles_file};
use crate::error::TrainingError;
use crate::telemetry::TrainingTelemetry;
use crate::trainer::Trainer;
use config::RunConfiguration;
use errors::MolforgeResult;
use mol_core::{RunResult, RunType};
use observability::{ProgressSink, sink_from_config};
use policy::{FitOptions, PolicyError, Sampler, TokenPolicy, fit_maximum_likelihood};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scoring::ScoringFunction;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Validates the configuration, builds the configured sink and runs.
pub async fn run(config: &RunConfiguration) -> MolforgeResult<RunResult> {
    config::validate(config)?;
    let sink = sink_from_config(&config.logging)?;
    run_with_sink(config, sink).await
}

/// Runs with an explicit progress sink.
pub async fn run_with_sink(
    config: &RunConfiguration,
    sink: Box<dyn ProgressSink>,
) -> MolforgeResult<RunResult> {
    let telemetry = TrainingTelemetry::new(&config.logging.job_name);
    let outcome = match config.run_type {
        RunType::ReinforcementLearning => match Trainer::new(config, sink) {
            Ok(mut trainer) => trainer.run().await,
            Err(e) => Err(e),
        },
        RunType::Sampling => finish(sink.as_ref(), run_sampling(config)).await,
        RunType::Scoring => finish(sink.as_ref(), run_scoring(config)).await,
        RunType::TransferLearning => finish(sink.as_ref(), run_transfer_learning(config)).await,
        RunType::CreateModel => finish(sink.as_ref(), run_create_model(config)).await,
        RunType::Validation => finish(sink.as_ref(), run_validation(config)).await,
    };
    match &outcome {
        Ok(_) => telemetry.record_run(config.run_type, "success"),
        Err(e) => {
            warn!(run_type = %config.run_type, error = %e, "Run failed");
            telemetry.record_run(config.run_type, "failure");
        }
    }
    outcome
}

async fn finish(
    sink: &dyn ProgressSink,
    result: MolforgeResult<RunResult>,
) -> MolforgeResult<RunResult> {
    let result = result?;
    sink.finish(&result).await?;
    Ok(result)
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn create_parent(path: &Path) -> MolforgeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| TrainingError::output(path, e))?;
    }
    Ok(())
}

/// Samples `count` sequences in batches; returns the candidates' SMILES,
/// agent log-likelihoods and validity.
fn sample_many(
    model: &TokenPolicy,
    count: usize,
    batch_size: usize,
    rng: &mut StdRng,
) -> Vec<(String, f64, bool)> {
    let sampler = Sampler::new(model, model);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let n = batch_size.max(1).min(count - out.len());
        out.extend(
            sampler
                .sample(n, rng)
                .into_iter()
                .map(|c| (c.smiles, c.agent_log_likelihood, c.valid)),
        );
    }
    out
}

fn percent_valid(samples: &[(String, f64, bool)]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let valid = samples.iter().filter(|(_, _, valid)| *valid).count();
    Some(100.0 * valid as f64 / samples.len() as f64)
}

fn run_sampling(config: &RunConfiguration) -> MolforgeResult<RunResult> {
    let settings = config.sampling()?;
    let model = TokenPolicy::load(&settings.model_path)?;
    let mut rng = rng_from(settings.seed);
    let samples = sample_many(&model, settings.num_smiles, settings.batch_size, &mut rng);

    let path = &settings.output_smiles_path;
    create_parent(path)?;
    let file = std::fs::File::create(path).map_err(|e| TrainingError::output(path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    for (smiles, likelihood, _) in &samples {
        let line = if settings.with_likelihood {
            writeln!(writer, "{smiles}\t{likelihood}")
        } else {
            writeln!(writer, "{smiles}")
        };
        line.map_err(|e| TrainingError::output(path, e))?;
    }
    writer.flush().map_err(|e| TrainingError::output(path, e))?;

    let mut result = RunResult::new(RunType::Sampling, &config.logging.job_name, config.job_id());
    result.fraction_valid = percent_valid(&samples);
    result.artifacts.push(path.clone());
    info!(
        sampled = samples.len(),
        fraction_valid = result.fraction_valid,
        path = %path.display(),
        "Sampling finished"
    );
    Ok(result)
}

fn run_scoring(config: &RunConfiguration) -> MolforgeResult<RunResult> {
    let settings = config.scoring()?;
    let function = ScoringFunction::from_config(config.scoring_function()?)?;
    let mut smiles = Vec::new();
    for input in &settings.input {
        smiles.extend(read_smiles_file(input)?);
    }
    let summaries = function.score_batch(&smiles);

    let path = match &settings.output_path {
        Some(path) => {
            create_parent(path)?;
            path.clone()
        }
        None => ResultArtifacts::prepare(&config.logging.resultdir)?.scored_smiles(),
    };
    let mut writer = csv::Writer::from_path(&path).map_err(|e| TrainingError::output(&path, e))?;
    let mut header = vec!["smiles".to_string(), "total_score".to_string()];
    header.extend(function.component_names());
    header.push("valid".to_string());
    writer
        .write_record(&header)
        .map_err(|e| TrainingError::output(&path, e))?;
    for summary in &summaries {
        let mut record = vec![summary.smiles.clone(), summary.total.to_string()];
        record.extend(summary.components.iter().map(|c| c.score.to_string()));
        record.push(u8::from(summary.valid).to_string());
        writer
            .write_record(&record)
            .map_err(|e| TrainingError::output(&path, e))?;
    }
    writer.flush().map_err(|e| TrainingError::output(&path, e))?;

    let n = summaries.len().max(1) as f64;
    let mut result = RunResult::new(RunType::Scoring, &config.logging.job_name, config.job_id());
    result.final_mean_score = Some(summaries.iter().map(|s| s.total).sum::<f64>() / n);
    result.fraction_valid =
        Some(100.0 * summaries.iter().filter(|s| s.valid).count() as f64 / n);
    result.steps_completed = summaries.len();
    result.artifacts.push(path.clone());
    info!(scored = summaries.len(), path = %path.display(), "Scoring finished");
    Ok(result)
}

/// Encodes a corpus, skipping entries the vocabulary cannot express.
fn encode_corpus(model: &TokenPolicy, smiles: &[String], source: &Path) -> MolforgeResult<Vec<Vec<usize>>> {
    let encoded: Vec<Vec<usize>> = smiles
        .iter()
        .filter_map(|s| model.vocabulary().encode(s))
        .collect();
    let skipped = smiles.len() - encoded.len();
    if skipped > 0 {
        warn!(skipped, path = %source.display(), "Skipped SMILES with tokens outside the vocabulary");
    }
    if encoded.is_empty() {
        return Err(TrainingError::EmptyInput {
            path: source.display().to_string(),
        }
        .into());
    }
    Ok(encoded)
}

/// `model.ckpt` saved at epoch 3 becomes `model.3.ckpt`.
fn epoch_checkpoint_path(path: &Path, epoch: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{epoch}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{epoch}"),
    };
    path.with_file_name(name)
}

fn run_transfer_learning(config: &RunConfiguration) -> MolforgeResult<RunResult> {
    let settings = config.transfer_learning()?;
    let mut model = TokenPolicy::load(&settings.input_model_path)?;
    let smiles = read_smiles_file(&settings.input_smiles_path)?;
    let sequences = encode_corpus(&model, &smiles, &settings.input_smiles_path)?;
    create_parent(&settings.output_model_path)?;

    let options = FitOptions {
        epochs: settings.num_epochs,
        batch_size: settings.batch_size,
        learning_rate: settings.learning_rate,
        shuffle: settings.shuffle_each_epoch,
    };
    let mut rng = rng_from(settings.seed);
    let mut checkpoints = Vec::new();
    let mut checkpoint_error: Option<PolicyError> = None;
    let save_every = settings.save_every_n_epochs;
    fit_maximum_likelihood(&mut model, &sequences, options, &mut rng, |epoch, policy, _| {
        if save_every == 0 || epoch % save_every != 0 || epoch == options.epochs || checkpoint_error.is_some() {
            return;
        }
        let path = epoch_checkpoint_path(&settings.output_model_path, epoch);
        match policy.save(&path) {
            Ok(()) => checkpoints.push(path),
            Err(e) => checkpoint_error = Some(e),
        }
    });
    if let Some(e) = checkpoint_error {
        return Err(e.into());
    }
    model.save(&settings.output_model_path)?;

    let mut result =
        RunResult::new(RunType::TransferLearning, &config.logging.job_name, config.job_id());
    result.steps_completed = settings.num_epochs;
    result.artifacts = checkpoints;
    result.artifacts.push(settings.output_model_path.clone());
    Ok(result)
}

fn run_create_model(config: &RunConfiguration) -> MolforgeResult<RunResult> {
    let settings = config.create_model()?;
    let smiles = read_smiles_file(&settings.input_smiles_path)?;
    let model = TokenPolicy::from_smiles_corpus(&smiles, settings.max_sequence_length)?;
    create_parent(&settings.output_model_path)?;
    model.save(&settings.output_model_path)?;
    info!(
        tokens = model.num_tokens(),
        corpus = smiles.len(),
        path = %settings.output_model_path.display(),
        "Created model"
    );

    let mut result = RunResult::new(RunType::CreateModel, &config.logging.job_name, config.job_id());
    result.artifacts.push(settings.output_model_path.clone());
    Ok(result)
}

fn run_validation(config: &RunConfiguration) -> MolforgeResult<RunResult> {
    let settings = config.validation()?;
    let model = TokenPolicy::load(&settings.model_path)?;
    let mut rng = rng_from(settings.seed);
    let samples = sample_many(&model, settings.num_smiles, settings.num_smiles, &mut rng);

    let mut result = RunResult::new(RunType::Validation, &config.logging.job_name, config.job_id());
    result.fraction_valid = percent_valid(&samples);
    info!(
        model = %settings.model_path.display(),
        sampled = samples.len(),
        fraction_valid = result.fraction_valid,
        "Validated model"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_checkpoint_path() {
        assert_eq!(
            epoch_checkpoint_path(Path::new("out/focused.ckpt"), 3),
            PathBuf::from("out/focused.3.ckpt")
        );
        assert_eq!(
            epoch_checkpoint_path(Path::new("focused"), 12),
            PathBuf::from("focused.12")
        );
    }

    #[test]
    fn test_percent_valid() {
        assert_eq!(percent_valid(&[]), None);
        let samples = vec![
            ("CCO".to_string(), -3.0, true),
            ("C1C".to_string(), -4.0, false),
        ];
        assert_eq!(percent_valid(&samples), Some(50.0));
    }
}
