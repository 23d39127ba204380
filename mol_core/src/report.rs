//! Per-step progress records handed to progress sinks.

use serde::{Deserialize, Serialize};

/// One row of the per-candidate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    pub agent: f64,
    pub prior: f64,
    pub target: f64,
    pub score: f64,
    pub smiles: String,
    /// Component contributions, aligned with `StepReport::component_names`.
    pub components: Vec<f64>,
}

/// Statistics for one training step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub job_name: String,
    pub job_id: String,
    pub step: usize,
    pub n_steps: usize,
    /// Percentage in [0, 100].
    pub fraction_valid: f64,
    pub mean_score: f64,
    pub elapsed_secs: f64,
    pub remaining_secs: f64,
    pub sigma: f64,
    pub component_names: Vec<String>,
    /// Mean contribution per component over the sampled batch.
    pub component_means: Vec<f64>,
    pub rows: Vec<StepRow>,
}

impl StepReport {
    pub fn is_final(&self) -> bool {
        self.step + 1 >= self.n_steps
    }
}
