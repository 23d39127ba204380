use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

/// The kind of job a configuration describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunType {
    ReinforcementLearning,
    Scoring,
    Sampling,
    TransferLearning,
    CreateModel,
    Validation,
}

/// Where a candidate entered the training batch from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CandidateSource {
    Sampled,
    Inception,
}

/// A generated sequence with its likelihoods under agent and prior.
///
/// Created once per sampling step and never mutated afterwards. `tokens`
/// holds the encoded sequence including the start token and, unless the
/// sequence was truncated, the end token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub smiles: String,
    pub tokens: Vec<usize>,
    pub agent_log_likelihood: f64,
    pub prior_log_likelihood: f64,
    /// Parsed as a molecule and not truncated.
    pub valid: bool,
    pub truncated: bool,
    pub source: CandidateSource,
}

impl Candidate {
    /// `prior_log_likelihood + sigma * reward`, the target the agent's own
    /// log-likelihood is pulled towards.
    pub fn augmented_log_likelihood(&self, sigma: f64, reward: f64) -> f64 {
        self.prior_log_likelihood + sigma * reward
    }
}

/// One scoring component's view of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub name: String,
    pub component_type: String,
    /// Untransformed value, absent when the component could not evaluate.
    pub raw: Option<f64>,
    /// Normalized contribution in [0, 1].
    pub score: f64,
}

/// A candidate after aggregation and diversity adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    /// Aggregated score before the diversity filter.
    pub raw_score: f64,
    /// Reward used for the update.
    pub score: f64,
    pub components: Vec<ComponentScore>,
}

/// States of the reinforcement learning loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrainingState {
    Initializing,
    Stepping,
    Resetting,
    Terminated,
}

/// Summary of a finished run of any type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_type: RunType,
    pub job_name: String,
    pub job_id: String,
    pub steps_completed: usize,
    pub agent_resets: usize,
    /// Mean score of the last step (reinforcement learning, scoring).
    pub final_mean_score: Option<f64>,
    /// Percentage of valid sequences in the last sampled batch.
    pub fraction_valid: Option<f64>,
    pub artifacts: Vec<PathBuf>,
}

impl RunResult {
    pub fn new(run_type: RunType, job_name: &str, job_id: &str) -> Self {
        Self {
            run_type,
            job_name: job_name.to_string(),
            job_id: job_id.to_string(),
            steps_completed: 0,
            agent_resets: 0,
            final_mean_score: None,
            fraction_valid: None,
            artifacts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_run_type_round_trips_through_strings() {
        assert_eq!(
            RunType::from_str("reinforcement_learning").unwrap(),
            RunType::ReinforcementLearning
        );
        assert_eq!(RunType::CreateModel.to_string(), "create_model");
        assert!(RunType::from_str("curriculum_learning").is_err());
    }

    #[test]
    fn test_run_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&RunType::TransferLearning).unwrap();
        assert_eq!(json, "\"transfer_learning\"");
    }

    #[test]
    fn test_augmented_log_likelihood() {
        let candidate = Candidate {
            smiles: "CCO".to_string(),
            tokens: vec![0, 2, 2, 3, 1],
            agent_log_likelihood: -12.0,
            prior_log_likelihood: -10.0,
            valid: true,
            truncated: false,
            source: CandidateSource::Sampled,
        };
        assert_eq!(candidate.augmented_log_likelihood(60.0, 0.5), 20.0);
        assert_eq!(candidate.augmented_log_likelihood(60.0, 0.0), -10.0);
    }
}
