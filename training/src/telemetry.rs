use metrics::{counter, gauge, histogram};
use mol_core::RunType;

/// Metric emission for runs. No exporter is installed here; the host
/// process decides where the `metrics` facade sends data.
#[derive(Debug, Clone)]
pub struct TrainingTelemetry {
    job_name: String,
}

impl TrainingTelemetry {
    pub fn new(job_name: &str) -> Self {
        Self {
            job_name: job_name.to_string(),
        }
    }

    pub fn record_step(&self, mean_score: f64, fraction_valid: f64, loss: f64, duration_secs: f64) {
        let labels = [("job", self.job_name.clone())];
        counter!("molforge_training_steps_total", &labels).increment(1);
        gauge!("molforge_mean_score", &labels).set(mean_score);
        gauge!("molforge_fraction_valid", &labels).set(fraction_valid);
        gauge!("molforge_loss", &labels).set(loss);
        histogram!("molforge_step_duration_seconds", &labels).record(duration_secs);
    }

    pub fn record_sigma(&self, sigma: f64) {
        gauge!("molforge_sigma", "job" => self.job_name.clone()).set(sigma);
    }

    pub fn record_diversity_penalties(&self, penalized: usize) {
        if penalized > 0 {
            counter!("molforge_diversity_penalties_total", "job" => self.job_name.clone())
                .increment(penalized as u64);
        }
    }

    pub fn record_inception_size(&self, size: usize) {
        gauge!("molforge_inception_size", "job" => self.job_name.clone()).set(size as f64);
    }

    pub fn record_reset(&self, reason: &'static str) {
        counter!("molforge_agent_resets_total",
            "job" => self.job_name.clone(),
            "reason" => reason
        )
        .increment(1);
    }

    pub fn record_run(&self, run_type: RunType, status: &'static str) {
        counter!("molforge_runs_total",
            "run_type" => run_type.to_string(),
            "status" => status
        )
        .increment(1);
    }
}
