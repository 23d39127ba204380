use async_trait::async_trait;
use config::{
    AggregationMode, ComponentConfig, ComponentType, LoggingConfig, ReinforcementLearningConfig,
    RunConfiguration, ScoringFunctionConfig,
};
use mol_core::{RunResult, RunType, StepReport};
use observability::{ProgressSink, SinkResult};
use policy::{TokenPolicy, Vocabulary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

/// `^ $ C O N`: enough for acyclic chains, nothing else.
pub fn tiny_vocabulary() -> Vocabulary {
    let tokens = ["^", "$", "C", "O", "N"].iter().map(|t| t.to_string()).collect();
    Vocabulary::new(tokens).expect("fixed vocabulary is valid")
}

pub fn uniform_policy(max_sequence_length: usize) -> TokenPolicy {
    TokenPolicy::uniform(tiny_vocabulary(), max_sequence_length)
}

pub fn corpus_policy(corpus: &[&str], max_sequence_length: usize) -> TokenPolicy {
    let corpus: Vec<String> = corpus.iter().map(|s| s.to_string()).collect();
    TokenPolicy::from_smiles_corpus(&corpus, max_sequence_length).expect("corpus has tokens")
}

pub fn write_policy(dir: &Path, name: &str, policy: &TokenPolicy) -> PathBuf {
    let path = dir.join(name);
    policy.save(&path).expect("checkpoint is writable");
    path
}

pub fn write_smiles(dir: &Path, name: &str, smiles: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = smiles.join("\n");
    content.push('\n');
    std::fs::write(&path, content).expect("smiles file is writable");
    path
}

/// A single Tanimoto similarity component towards `reference`.
pub fn similarity_function(reference: &str) -> ScoringFunctionConfig {
    let mut component = ComponentConfig::new(ComponentType::TanimotoSimilarity, "similarity");
    component.smiles = vec![reference.to_string()];
    ScoringFunctionConfig {
        name: AggregationMode::CustomProduct,
        parallel: false,
        parameters: vec![component],
    }
}

/// Logging that keeps every output inside `dir`.
pub fn local_logging(dir: &Path) -> LoggingConfig {
    LoggingConfig {
        logging_path: dir.join("progress.log"),
        resultdir: dir.join("results"),
        job_name: unique_id("job"),
        job_id: Some(unique_id("id")),
        ..LoggingConfig::default()
    }
}

/// A short, seeded reinforcement learning run with the margin guard off,
/// scoring similarity to `CCCCO`. Prior and agent both point at `prior`.
pub fn rl_config(dir: &Path, prior: &Path) -> RunConfiguration {
    let mut config = RunConfiguration::new(RunType::ReinforcementLearning);
    config.logging = local_logging(dir);
    let mut rl = ReinforcementLearningConfig::new(prior, prior);
    rl.n_steps = 5;
    rl.batch_size = 16;
    rl.seed = Some(7);
    rl.margin_threshold = 0.0;
    config.parameters.reinforcement_learning = Some(rl);
    config.parameters.scoring_function = Some(similarity_function("CCCCO"));
    config
}

/// Keeps every report and result it receives. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<StepReport>>>,
    results: Arc<Mutex<Vec<RunResult>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Box<dyn ProgressSink> {
        Box::new(self.clone())
    }

    pub async fn reports(&self) -> Vec<StepReport> {
        self.reports.lock().await.clone()
    }

    pub async fn results(&self) -> Vec<RunResult> {
        self.results.lock().await.clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn report(&self, report: &StepReport) -> SinkResult<()> {
        self.reports.lock().await.push(report.clone());
        Ok(())
    }

    async fn finish(&self, result: &RunResult) -> SinkResult<()> {
        self.results.lock().await.push(result.clone());
        Ok(())
    }
}
