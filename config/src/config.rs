//! # Run Configuration
//!
//! Strongly-typed configuration documents for every molforge run type.
//!
//! All structures reject unknown fields at deserialization time and carry
//! `validator` rules for per-field ranges. Cross-field rules (which parameter
//! sections a run type requires, component-specific parameters) live in
//! [`crate::validation`].

use errors::{MolforgeError, MolforgeResult};
use mol_core::RunType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};
use validator::Validate;

/// Root configuration document.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Describes one molforge job: what kind of run it is, where progress and
/// artifacts go, and the parameter sections the run type consumes.
///
/// ## Fields
/// - `version`: Optional document version, informational only
/// - `run_type`: Which job to execute
/// - `logging`: Progress sink and result directory settings
/// - `parameters`: Run-type specific sections
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    pub run_type: RunType,

    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,

    #[serde(default)]
    #[validate(nested)]
    pub parameters: Parameters,
}

impl RunConfiguration {
    /// A configuration of the given run type with default logging and no
    /// parameter sections.
    pub fn new(run_type: RunType) -> Self {
        Self {
            version: None,
            run_type,
            logging: LoggingConfig::default(),
            parameters: Parameters::default(),
        }
    }

    pub fn reinforcement_learning(&self) -> MolforgeResult<&ReinforcementLearningConfig> {
        require(
            self.parameters.reinforcement_learning.as_ref(),
            "parameters.reinforcement_learning",
        )
    }

    pub fn scoring_function(&self) -> MolforgeResult<&ScoringFunctionConfig> {
        require(
            self.parameters.scoring_function.as_ref(),
            "parameters.scoring_function",
        )
    }

    pub fn sampling(&self) -> MolforgeResult<&SamplingConfig> {
        require(self.parameters.sampling.as_ref(), "parameters.sampling")
    }

    pub fn scoring(&self) -> MolforgeResult<&ScoringRunConfig> {
        require(self.parameters.scoring.as_ref(), "parameters.scoring")
    }

    pub fn transfer_learning(&self) -> MolforgeResult<&TransferLearningConfig> {
        require(
            self.parameters.transfer_learning.as_ref(),
            "parameters.transfer_learning",
        )
    }

    pub fn create_model(&self) -> MolforgeResult<&CreateModelConfig> {
        require(self.parameters.create_model.as_ref(), "parameters.create_model")
    }

    pub fn validation(&self) -> MolforgeResult<&ValidationRunConfig> {
        require(self.parameters.validation.as_ref(), "parameters.validation")
    }

    /// Diversity filter settings, `NoFilter` when the section is absent.
    pub fn diversity_filter(&self) -> DiversityFilterConfig {
        self.parameters.diversity_filter.clone().unwrap_or_default()
    }

    /// Inception settings, an empty default memory when the section is absent.
    pub fn inception(&self) -> InceptionConfig {
        self.parameters.inception.clone().unwrap_or_default()
    }

    /// The job id, empty until [`crate::loader::ensure_job_id`] has run.
    pub fn job_id(&self) -> &str {
        self.logging.job_id.as_deref().unwrap_or_default()
    }
}

fn require<'a, T>(section: Option<&'a T>, field: &str) -> MolforgeResult<&'a T> {
    section.ok_or_else(|| MolforgeError::configuration(field, "section is required"))
}

/// Where progress records are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient<'a> {
    /// Append plain-text records to `logging_path`.
    Local,
    /// POST JSON records to the given URL.
    Remote(&'a str),
}

/// Progress logging and artifact location.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `sender`: Free-form identifier of the submitting client (default: "local")
/// - `recipient`: `"local"` or an `http(s)://` URL (default: "local")
/// - `logging_frequency`: Emit a step report every N steps (default: 1)
/// - `logging_path`: Progress log file for the local sink (default: "progress.log")
/// - `resultdir`: Directory receiving run artifacts (default: "results")
/// - `job_name`: Human-readable job name (default: "molforge run")
/// - `job_id`: Job identifier, a fresh UUID when absent
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_local")]
    pub sender: String,

    #[serde(default = "default_local")]
    #[validate(custom(function = "validate_recipient"))]
    pub recipient: String,

    #[serde(default = "default_logging_frequency")]
    #[validate(range(min = 1))]
    pub logging_frequency: usize,

    #[serde(default = "default_logging_path")]
    pub logging_path: PathBuf,

    #[serde(default = "default_resultdir")]
    pub resultdir: PathBuf,

    #[serde(default = "default_job_name")]
    #[validate(length(min = 1, max = 255))]
    pub job_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl LoggingConfig {
    pub fn recipient(&self) -> Recipient<'_> {
        if self.recipient == "local" {
            Recipient::Local
        } else {
            Recipient::Remote(&self.recipient)
        }
    }
}

fn default_local() -> String {
    "local".to_string()
}

fn default_logging_frequency() -> usize {
    1
}

fn default_logging_path() -> PathBuf {
    PathBuf::from("progress.log")
}

fn default_resultdir() -> PathBuf {
    PathBuf::from("results")
}

fn default_job_name() -> String {
    "molforge run".to_string()
}

fn validate_recipient(value: &str) -> Result<(), validator::ValidationError> {
    if value == "local" || value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(validator::ValidationError::new("recipient")
            .with_message("must be \"local\" or an http(s) URL".into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sender: default_local(),
            recipient: default_local(),
            logging_frequency: default_logging_frequency(),
            logging_path: default_logging_path(),
            resultdir: default_resultdir(),
            job_name: default_job_name(),
            job_id: None,
        }
    }
}

/// Parameter sections. Which ones are required depends on the run type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub diversity_filter: Option<DiversityFilterConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub inception: Option<InceptionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub reinforcement_learning: Option<ReinforcementLearningConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub scoring_function: Option<ScoringFunctionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub sampling: Option<SamplingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub scoring: Option<ScoringRunConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub transfer_learning: Option<TransferLearningConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub create_model: Option<CreateModelConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub validation: Option<ValidationRunConfig>,
}

/// Scaffold bucketing strategy, selected once per run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
pub enum DiversityFilterName {
    IdenticalMurckoScaffold,
    IdenticalTopologicalScaffold,
    ScaffoldSimilarity,
    #[default]
    NoFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiversityFilterConfig {
    #[serde(default)]
    pub name: DiversityFilterName,

    /// Members a bucket accepts at full reward.
    #[serde(default = "default_nbmax")]
    pub nbmax: usize,

    /// Scores below this pass through without bucketing.
    #[serde(default = "default_min_fraction")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub minscore: f64,

    /// Similarity a candidate must exceed to join an existing bucket.
    #[serde(default = "default_min_fraction")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub minsimilarity: f64,
}

fn default_nbmax() -> usize {
    25
}

fn default_min_fraction() -> f64 {
    0.4
}

impl Default for DiversityFilterConfig {
    fn default() -> Self {
        Self {
            name: DiversityFilterName::default(),
            nbmax: default_nbmax(),
            minscore: default_min_fraction(),
            minsimilarity: default_min_fraction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InceptionConfig {
    /// Seed SMILES inserted before the first step.
    #[serde(default)]
    pub smiles: Vec<String>,

    #[serde(default = "default_memory_size")]
    pub memory_size: usize,

    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_memory_size() -> usize {
    100
}

fn default_sample_size() -> usize {
    10
}

impl Default for InceptionConfig {
    fn default() -> Self {
        Self {
            smiles: Vec::new(),
            memory_size: default_memory_size(),
            sample_size: default_sample_size(),
        }
    }
}

/// Reinforcement learning loop settings.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `prior`: Frozen reference checkpoint
/// - `agent`: Initial agent checkpoint, usually the prior
/// - `n_steps`: Training steps (default: 3000)
/// - `sigma`: Reward scale of the augmented likelihood (default: 128)
/// - `learning_rate`: Adam step size (default: 0.0001)
/// - `batch_size`: Sequences sampled per step (default: 128)
/// - `reset`: Persistence window for the agent reset, 0 disables (default: 0)
/// - `reset_score_cutoff`: Mean score that counts towards the window (default: 0.5)
/// - `margin_threshold`: Margin guard threshold, 0 disables (default: 50)
/// - `seed`: RNG seed, entropy when absent
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReinforcementLearningConfig {
    pub prior: PathBuf,

    pub agent: PathBuf,

    #[serde(default = "default_n_steps")]
    pub n_steps: usize,

    #[serde(default = "default_sigma")]
    #[validate(range(exclusive_min = 0.0))]
    pub sigma: f64,

    #[serde(default = "default_rl_learning_rate")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub learning_rate: f64,

    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,

    #[serde(default)]
    pub reset: usize,

    #[serde(default = "default_reset_score_cutoff")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub reset_score_cutoff: f64,

    #[serde(default = "default_margin_threshold")]
    #[validate(range(min = 0.0))]
    pub margin_threshold: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_n_steps() -> usize {
    3000
}

fn default_sigma() -> f64 {
    128.0
}

fn default_rl_learning_rate() -> f64 {
    0.0001
}

fn default_batch_size() -> usize {
    128
}

fn default_reset_score_cutoff() -> f64 {
    0.5
}

fn default_margin_threshold() -> f64 {
    50.0
}

impl ReinforcementLearningConfig {
    /// Defaults for everything but the checkpoint paths.
    pub fn new(prior: impl Into<PathBuf>, agent: impl Into<PathBuf>) -> Self {
        Self {
            prior: prior.into(),
            agent: agent.into(),
            n_steps: default_n_steps(),
            sigma: default_sigma(),
            learning_rate: default_rl_learning_rate(),
            batch_size: default_batch_size(),
            reset: 0,
            reset_score_cutoff: default_reset_score_cutoff(),
            margin_threshold: default_margin_threshold(),
            seed: None,
        }
    }
}

/// How non-penalty component scores are combined.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregationMode {
    /// Weighted geometric mean.
    #[default]
    CustomProduct,
    /// Weighted arithmetic mean.
    CustomSum,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringFunctionConfig {
    #[serde(default)]
    pub name: AggregationMode,

    /// Evaluate components concurrently.
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    #[validate(nested)]
    pub parameters: Vec<ComponentConfig>,
}

/// Scoring component kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComponentType {
    TanimotoSimilarity,
    JaccardDistance,
    MatchingSubstructure,
    CustomAlerts,
    MolecularWeight,
    NumRings,
    NumRotatableBonds,
    NumHbdLipinski,
    NumHbaLipinski,
    HeavyAtomCount,
}

impl ComponentType {
    /// Penalty components multiply the aggregate directly instead of taking
    /// part in the weighted combination.
    pub fn is_penalty(self) -> bool {
        matches!(self, Self::MatchingSubstructure | Self::CustomAlerts)
    }

    /// Components that compare against the configured `smiles` list and are
    /// meaningless without one.
    pub fn requires_smiles(self) -> bool {
        matches!(self, Self::TanimotoSimilarity | Self::JaccardDistance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub component_type: ComponentType,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default = "default_weight")]
    #[validate(range(min = 0.0))]
    pub weight: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    /// Reference molecules, substructure patterns or alerts, depending on
    /// the component type.
    #[serde(default)]
    pub smiles: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub specific_parameters: SpecificParameters,
}

fn default_weight() -> f64 {
    1.0
}

impl ComponentConfig {
    pub fn new(component_type: ComponentType, name: impl Into<String>) -> Self {
        Self {
            component_type,
            name: name.into(),
            weight: default_weight(),
            model_path: None,
            smiles: Vec::new(),
            specific_parameters: SpecificParameters::default(),
        }
    }
}

/// Score transform selector.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransformationType {
    #[default]
    NoTransformation,
    Sigmoid,
    ReverseSigmoid,
    DoubleSigmoid,
    Step,
    LeftStep,
    RightStep,
}

/// Transform parameters and fingerprint settings of one component.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SpecificParameters {
    /// `false` forces `no_transformation` regardless of `transformation_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_type: Option<TransformationType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coef_div: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coef_si: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coef_se: Option<f64>,

    /// Circular fingerprint radius for similarity components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 6))]
    pub radius: Option<usize>,
}

impl SpecificParameters {
    pub fn transformation_type(&self) -> TransformationType {
        if self.transformation == Some(false) {
            TransformationType::NoTransformation
        } else {
            self.transformation_type.unwrap_or_default()
        }
    }

    /// The first parameter the selected transform needs but lacks.
    pub fn missing_transform_parameter(&self) -> Option<&'static str> {
        let required: &[(&'static str, Option<f64>)] = match self.transformation_type() {
            TransformationType::NoTransformation => &[],
            TransformationType::Sigmoid | TransformationType::ReverseSigmoid => {
                &[("low", self.low), ("high", self.high), ("k", self.k)]
            }
            TransformationType::DoubleSigmoid => &[
                ("low", self.low),
                ("high", self.high),
                ("coef_div", self.coef_div),
                ("coef_si", self.coef_si),
                ("coef_se", self.coef_se),
            ],
            TransformationType::Step => &[("low", self.low), ("high", self.high)],
            TransformationType::LeftStep => &[("low", self.low)],
            TransformationType::RightStep => &[("high", self.high)],
        };
        required
            .iter()
            .find(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
    }
}

/// `sampling` run: draw SMILES from a trained model.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    pub model_path: PathBuf,

    pub output_smiles_path: PathBuf,

    #[serde(default = "default_num_smiles")]
    #[validate(range(min = 1))]
    pub num_smiles: usize,

    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,

    /// Append the log-likelihood after a tab on every line.
    #[serde(default = "default_true")]
    pub with_likelihood: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_num_smiles() -> usize {
    1024
}

fn default_true() -> bool {
    true
}

/// `scoring` run: score SMILES read from files.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringRunConfig {
    #[validate(length(min = 1))]
    pub input: Vec<PathBuf>,

    /// Defaults to `scored_smiles.csv` in the result directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// `transfer_learning` run: fit a model to a SMILES corpus by maximum
/// likelihood.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransferLearningConfig {
    pub input_model_path: PathBuf,

    pub output_model_path: PathBuf,

    pub input_smiles_path: PathBuf,

    #[serde(default = "default_num_epochs")]
    #[validate(range(min = 1))]
    pub num_epochs: usize,

    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,

    #[serde(default = "default_tl_learning_rate")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub learning_rate: f64,

    #[serde(default = "default_true")]
    pub shuffle_each_epoch: bool,

    /// Also write `<output>.<epoch>` every N epochs, 0 keeps only the final
    /// model.
    #[serde(default)]
    pub save_every_n_epochs: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_num_epochs() -> usize {
    10
}

fn default_tl_learning_rate() -> f64 {
    0.001
}

/// `create_model` run: build an untrained-vocabulary model from a corpus.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateModelConfig {
    pub input_smiles_path: PathBuf,

    pub output_model_path: PathBuf,

    #[serde(default = "default_max_sequence_length")]
    #[validate(range(min = 2, max = 4096))]
    pub max_sequence_length: usize,
}

fn default_max_sequence_length() -> usize {
    256
}

/// `validation` run: check that a model loads and samples valid SMILES.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ValidationRunConfig {
    pub model_path: PathBuf,

    #[serde(default = "default_validation_num_smiles")]
    #[validate(range(min = 1))]
    pub num_smiles: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_validation_num_smiles() -> usize {
    128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_reinforcement_learning_document() {
        let json = r#"{
            "run_type": "reinforcement_learning",
            "parameters": {
                "reinforcement_learning": {"prior": "prior.ckpt", "agent": "prior.ckpt"}
            }
        }"#;
        let config: RunConfiguration = serde_json::from_str(json).unwrap();
        let rl = config.reinforcement_learning().unwrap();
        assert_eq!(rl.n_steps, 3000);
        assert_eq!(rl.batch_size, 128);
        assert_eq!(rl.sigma, 128.0);
        assert_eq!(config.logging.recipient(), Recipient::Local);
        assert_eq!(config.diversity_filter().name, DiversityFilterName::NoFilter);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let json = r#"{"run_type": "sampling", "paramters": {}}"#;
        assert!(serde_json::from_str::<RunConfiguration>(json).is_err());

        let json = r#"{
            "run_type": "reinforcement_learning",
            "parameters": {"diversity_filter": {"name": "NoFilter", "bucket_size": 3}}
        }"#;
        assert!(serde_json::from_str::<RunConfiguration>(json).is_err());
    }

    #[test]
    fn test_unknown_component_type_is_rejected() {
        let json = r#"{
            "run_type": "scoring",
            "parameters": {"scoring_function": {"parameters": [
                {"component_type": "qed_score_v9", "name": "qed"}
            ]}}
        }"#;
        assert!(serde_json::from_str::<RunConfiguration>(json).is_err());
    }

    #[test]
    fn test_diversity_filter_names_use_original_spelling() {
        let json = r#"{"name": "IdenticalMurckoScaffold", "nbmax": 3}"#;
        let filter: DiversityFilterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(filter.name, DiversityFilterName::IdenticalMurckoScaffold);
        assert_eq!(filter.nbmax, 3);
        assert_eq!(filter.minscore, 0.4);
    }

    #[test]
    fn test_missing_section_is_a_configuration_error() {
        let config = RunConfiguration::new(RunType::Sampling);
        let err = config.sampling().unwrap_err();
        assert!(err.to_string().contains("parameters.sampling"));
    }

    #[test]
    fn test_remote_recipient() {
        let logging = LoggingConfig {
            recipient: "http://localhost:8080/progress".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(
            logging.recipient(),
            Recipient::Remote("http://localhost:8080/progress")
        );
        assert!(logging.validate().is_ok());

        let logging = LoggingConfig {
            recipient: "ftp://nowhere".to_string(),
            ..LoggingConfig::default()
        };
        assert!(logging.validate().is_err());
    }

    #[test]
    fn test_transformation_flag_overrides_type() {
        let params = SpecificParameters {
            transformation: Some(false),
            transformation_type: Some(TransformationType::Sigmoid),
            ..SpecificParameters::default()
        };
        assert_eq!(
            params.transformation_type(),
            TransformationType::NoTransformation
        );
        assert_eq!(params.missing_transform_parameter(), None);
    }

    #[test]
    fn test_missing_transform_parameter() {
        let params = SpecificParameters {
            transformation_type: Some(TransformationType::DoubleSigmoid),
            low: Some(1.0),
            high: Some(2.0),
            coef_div: Some(3.0),
            ..SpecificParameters::default()
        };
        assert_eq!(params.missing_transform_parameter(), Some("coef_si"));
    }

    #[test]
    fn test_penalty_components() {
        assert!(ComponentType::CustomAlerts.is_penalty());
        assert!(ComponentType::MatchingSubstructure.is_penalty());
        assert!(!ComponentType::TanimotoSimilarity.is_penalty());
        assert_eq!(ComponentType::NumHbdLipinski.to_string(), "num_hbd_lipinski");
    }
}
