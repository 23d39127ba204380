//! # Reinforcement Learning Loop
//!
//! Fine-tunes an agent policy towards a scoring function while a frozen
//! prior keeps it close to plausible chemistry.
//!
//! # M-CANONICAL-DOCS
//!
//! ## Step
//! 1. Sample `batch_size` sequences from the agent; compute prior
//!    likelihoods of the same tokens.
//! 2. Score valid candidates, adjust scores with the diversity filter in
//!    batch order. Invalid candidates score 0.
//! 3. Add inception replays sampled from memory.
//! 4. Target `aug = prior_ll + sigma * score`; minimise the mean of
//!    `(agent_ll - aug)^2` over sampled and replayed candidates with Adam.
//! 5. Update inception and result memories with the sampled batch.
//! 6. Run the reset and margin guards, then report progress.
//!
//! ## States
//! `Initializing -> Stepping -> (Resetting -> Stepping)* -> Terminated`.
//! Resets re-initialise the agent and its optimizer from the prior. The
//! diversity filter, inception memory and result memory persist.

use crate::artifacts::ResultArtifacts;
use crate::guards::{MarginGuard, ResetGuard};
use crate::telemetry::TrainingTelemetry;
use config::{ReinforcementLearningConfig, RunConfiguration};
use errors::MolforgeResult;
use memory::{DiversityFilter, InceptionMemory, ResultMemory};
use mol_core::{
    Candidate, CandidateSource, RunResult, RunType, ScoredCandidate, StepReport, StepRow,
    TrainingState,
};
use observability::ProgressSink;
use policy::{Adam, Sampler, TokenPolicy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scoring::{ScoreSummary, ScoringFunction};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Sampled candidates shown per progress record.
pub const REPORT_ROWS: usize = 10;

/// Statistics of one completed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepStats {
    pub step: usize,
    /// Mean diversity-adjusted score of the sampled batch.
    pub mean_score: f64,
    /// Percentage of valid sampled sequences.
    pub fraction_valid: f64,
    pub loss: f64,
    /// Mean `|aug - agent_ll|` over the sampled batch.
    pub mean_margin: f64,
    pub sigma: f64,
    pub reset: bool,
}

pub struct Trainer {
    settings: ReinforcementLearningConfig,
    job_name: String,
    job_id: String,
    logging_frequency: usize,
    prior: TokenPolicy,
    agent: TokenPolicy,
    optimizer: Adam,
    scoring: ScoringFunction,
    diversity_filter: DiversityFilter,
    inception: InceptionMemory,
    results: ResultMemory,
    artifacts: ResultArtifacts,
    sink: Box<dyn ProgressSink>,
    rng: StdRng,
    state: TrainingState,
    sigma: f64,
    reset_guard: ResetGuard,
    margin_guard: MarginGuard,
    resets: usize,
    telemetry: TrainingTelemetry,
}

impl Trainer {
    /// Loads both policies, builds the scoring function and memories,
    /// prepares the result directory and seeds inception memory.
    ///
    /// Every failure here is fatal and happens before the first step.
    pub fn new(config: &RunConfiguration, sink: Box<dyn ProgressSink>) -> MolforgeResult<Self> {
        let settings = config.reinforcement_learning()?.clone();
        let prior = TokenPolicy::load(&settings.prior)?;
        let agent = TokenPolicy::load(&settings.agent)?;
        prior.ensure_compatible(&agent)?;

        let scoring = ScoringFunction::from_config(config.scoring_function()?)?;
        let diversity_filter = DiversityFilter::from_config(&config.diversity_filter());
        let inception_config = config.inception();
        let artifacts = ResultArtifacts::prepare(&config.logging.resultdir)?;
        artifacts.write_input(config)?;

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let optimizer = Adam::new(settings.learning_rate, agent.parameters().len());

        let mut trainer = Self {
            job_name: config.logging.job_name.clone(),
            job_id: config.job_id().to_string(),
            logging_frequency: config.logging.logging_frequency.max(1),
            sigma: settings.sigma,
            reset_guard: ResetGuard::new(settings.reset, settings.reset_score_cutoff),
            margin_guard: MarginGuard::new(settings.margin_threshold, settings.sigma),
            telemetry: TrainingTelemetry::new(&config.logging.job_name),
            inception: InceptionMemory::new(
                inception_config.memory_size,
                inception_config.sample_size,
            ),
            settings,
            prior,
            agent,
            optimizer,
            scoring,
            diversity_filter,
            results: ResultMemory::new(),
            artifacts,
            sink,
            rng,
            state: TrainingState::Initializing,
            resets: 0,
        };
        trainer.seed_inception(&inception_config.smiles);
        Ok(trainer)
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn agent(&self) -> &TokenPolicy {
        &self.agent
    }

    pub fn inception(&self) -> &InceptionMemory {
        &self.inception
    }

    pub fn results(&self) -> &ResultMemory {
        &self.results
    }

    pub fn diversity_filter(&self) -> &DiversityFilter {
        &self.diversity_filter
    }

    fn seed_inception(&mut self, seeds: &[String]) {
        let sampler = Sampler::new(&self.agent, &self.prior);
        for smiles in seeds {
            let Some(candidate) = sampler.candidate_for(smiles, CandidateSource::Inception) else {
                warn!(smiles = %smiles, "Inception seed uses tokens outside the prior vocabulary, skipping");
                continue;
            };
            let summary = self.scoring.score_smiles(smiles);
            if !summary.valid {
                warn!(smiles = %smiles, "Inception seed is not a valid molecule, skipping");
                continue;
            }
            self.inception
                .add(smiles, summary.total, candidate.prior_log_likelihood);
        }
        if !seeds.is_empty() {
            info!(
                seeds = seeds.len(),
                stored = self.inception.len(),
                "Seeded inception memory"
            );
        }
    }

    /// Runs all configured steps, then writes the agent checkpoint and both
    /// memory exports.
    pub async fn run(&mut self) -> MolforgeResult<RunResult> {
        let started = Instant::now();
        let n_steps = self.settings.n_steps;
        let mut result = RunResult::new(RunType::ReinforcementLearning, &self.job_name, &self.job_id);
        info!(
            job = %self.job_name,
            n_steps,
            batch_size = self.settings.batch_size,
            sigma = self.sigma,
            "Starting reinforcement learning"
        );

        self.state = TrainingState::Stepping;
        for step in 0..n_steps {
            let stats = self.step(step, started).await?;
            result.steps_completed = step + 1;
            result.final_mean_score = Some(stats.mean_score);
            result.fraction_valid = Some(stats.fraction_valid);
        }
        self.state = TrainingState::Terminated;
        result.agent_resets = self.resets;

        let agent_path = self.artifacts.agent();
        self.agent.save(&agent_path)?;
        let memory_path = self.artifacts.memory();
        self.results.write_csv(&memory_path)?;
        let scaffold_path = self.artifacts.scaffold_memory();
        self.diversity_filter.write_csv(&scaffold_path)?;
        result.artifacts = vec![
            agent_path,
            self.artifacts.input(),
            memory_path,
            scaffold_path,
        ];

        self.sink.finish(&result).await?;
        info!(
            job = %self.job_name,
            steps = result.steps_completed,
            resets = result.agent_resets,
            unique_molecules = self.results.len(),
            "Reinforcement learning finished"
        );
        Ok(result)
    }

    /// One sample, score, update cycle.
    #[instrument(skip(self, started), fields(job = %self.job_name))]
    pub async fn step(&mut self, step: usize, started: Instant) -> MolforgeResult<StepStats> {
        let step_started = Instant::now();
        let sampled = Sampler::new(&self.agent, &self.prior)
            .sample(self.settings.batch_size, &mut self.rng);

        let summaries = self
            .scoring
            .score_batch(&sampled.iter().map(|c| c.smiles.as_str()).collect::<Vec<_>>());
        let raw_scores: Vec<f64> = sampled
            .iter()
            .zip(&summaries)
            .map(|(candidate, summary)| candidate_score(candidate, summary))
            .collect();
        let scores = self
            .diversity_filter
            .adjust_batch(step, &sampled, &raw_scores);
        let penalized = raw_scores
            .iter()
            .zip(&scores)
            .filter(|(raw, adjusted)| *adjusted < *raw)
            .count();

        let scored: Vec<ScoredCandidate> = sampled
            .into_iter()
            .zip(summaries)
            .zip(raw_scores.iter().zip(&scores))
            .map(|((candidate, summary), (&raw_score, &score))| ScoredCandidate {
                candidate,
                raw_score,
                score,
                components: summary.components,
            })
            .collect();

        let replays = self.inception_replays();
        let loss = self.update_agent(&scored, &replays);

        for entry in &scored {
            let candidate = &entry.candidate;
            if candidate.valid {
                self.results.record(
                    step,
                    &candidate.smiles,
                    entry.raw_score,
                    candidate.agent_log_likelihood,
                );
                self.inception
                    .add(&candidate.smiles, entry.score, candidate.prior_log_likelihood);
            }
        }

        let n = scored.len().max(1) as f64;
        let mean_score = scored.iter().map(|s| s.score).sum::<f64>() / n;
        let fraction_valid =
            100.0 * scored.iter().filter(|s| s.candidate.valid).count() as f64 / n;
        let mean_margin = scored
            .iter()
            .map(|s| {
                let c = &s.candidate;
                (c.augmented_log_likelihood(self.sigma, s.score) - c.agent_log_likelihood).abs()
            })
            .sum::<f64>()
            / n;

        let report = self.build_report(step, started, &scored, mean_score, fraction_valid);
        let mut reset = false;
        if let Some(raised) = self.margin_guard.observe(mean_score, mean_margin, self.sigma) {
            warn!(step, sigma = raised, mean_score, mean_margin, "Weak reward signal, raising sigma and resetting agent");
            self.sigma = raised;
            self.telemetry.record_sigma(raised);
            self.reset_agent("margin");
            reset = true;
        }
        let cutoff_held = self.reset_guard.observe(mean_score);
        if cutoff_held && !reset {
            info!(step, mean_score, cutoff = self.settings.reset_score_cutoff, "Score cutoff held, resetting agent");
            self.reset_agent("score_cutoff");
            reset = true;
        }

        self.telemetry
            .record_step(mean_score, fraction_valid, loss, step_started.elapsed().as_secs_f64());
        self.telemetry.record_diversity_penalties(penalized);
        self.telemetry.record_inception_size(self.inception.len());

        if step % self.logging_frequency == 0 || step + 1 == self.settings.n_steps {
            self.sink.report(&report).await?;
        }
        debug!(step, mean_score, fraction_valid, loss, "Finished step");

        Ok(StepStats {
            step,
            mean_score,
            fraction_valid,
            loss,
            mean_margin,
            sigma: self.sigma,
            reset,
        })
    }

    fn inception_replays(&mut self) -> Vec<(Candidate, f64)> {
        let picked: Vec<(String, f64)> = self
            .inception
            .sample(self.inception.sample_size(), &mut self.rng)
            .into_iter()
            .map(|entry| (entry.smiles.clone(), entry.score))
            .collect();
        let sampler = Sampler::new(&self.agent, &self.prior);
        picked
            .into_iter()
            .filter_map(|(smiles, score)| {
                sampler
                    .candidate_for(&smiles, CandidateSource::Inception)
                    .map(|candidate| (candidate, score))
            })
            .collect()
    }

    /// One Adam step on the mean squared distance between agent and
    /// augmented likelihoods. Returns the loss before the update.
    fn update_agent(&mut self, scored: &[ScoredCandidate], replays: &[(Candidate, f64)]) -> f64 {
        let batch: Vec<(&Candidate, f64)> = scored
            .iter()
            .map(|s| (&s.candidate, s.score))
            .chain(replays.iter().map(|(c, score)| (c, *score)))
            .collect();
        if batch.is_empty() {
            return 0.0;
        }

        let n = batch.len() as f64;
        let mut gradient = vec![0.0; self.agent.parameters().len()];
        let mut loss = 0.0;
        for (candidate, score) in batch {
            let target = candidate.augmented_log_likelihood(self.sigma, score);
            let diff = candidate.agent_log_likelihood - target;
            loss += diff * diff / n;
            self.agent
                .accumulate_log_likelihood_gradient(&candidate.tokens, 2.0 * diff / n, &mut gradient);
        }
        self.optimizer.step(self.agent.parameters_mut(), &gradient);
        loss
    }

    fn reset_agent(&mut self, reason: &'static str) {
        self.state = TrainingState::Resetting;
        self.agent = self.prior.clone();
        self.optimizer.reset();
        self.resets += 1;
        self.telemetry.record_reset(reason);
        self.state = TrainingState::Stepping;
    }

    fn build_report(
        &self,
        step: usize,
        started: Instant,
        scored: &[ScoredCandidate],
        mean_score: f64,
        fraction_valid: f64,
    ) -> StepReport {
        let elapsed = started.elapsed().as_secs_f64();
        let done = (step + 1) as f64;
        let remaining =
            elapsed / done * self.settings.n_steps.saturating_sub(step + 1) as f64;

        let component_names = self.scoring.component_names();
        let n = scored.len().max(1) as f64;
        let component_means = (0..component_names.len())
            .map(|i| {
                scored
                    .iter()
                    .map(|s| s.components.get(i).map_or(0.0, |c| c.score))
                    .sum::<f64>()
                    / n
            })
            .collect();

        let rows = scored
            .iter()
            .take(REPORT_ROWS)
            .map(|s| StepRow {
                agent: s.candidate.agent_log_likelihood,
                prior: s.candidate.prior_log_likelihood,
                target: s.candidate.augmented_log_likelihood(self.sigma, s.score),
                score: s.score,
                smiles: s.candidate.smiles.clone(),
                components: s.components.iter().map(|c| c.score).collect(),
            })
            .collect();

        StepReport {
            job_name: self.job_name.clone(),
            job_id: self.job_id.clone(),
            step,
            n_steps: self.settings.n_steps,
            fraction_valid,
            mean_score,
            elapsed_secs: elapsed,
            remaining_secs: remaining,
            sigma: self.sigma,
            component_names,
            component_means,
            rows,
        }
    }
}

/// Truncated sequences can still parse; they score 0 like any invalid one.
fn candidate_score(candidate: &Candidate, summary: &ScoreSummary) -> f64 {
    if candidate.valid { summary.total } else { 0.0 }
}
