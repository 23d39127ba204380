//! # Scoring Function
//!
//! Aggregates component scores into one reward in [0, 1].
//!
//! Penalty components multiply the total directly. The remaining components
//! are combined per the aggregation mode:
//! - `custom_product`: `Π cᵢ^(wᵢ/Σw)`
//! - `custom_sum`: `Σ wᵢcᵢ / Σw`
//!
//! Components share no mutable state, so with `parallel` set they are
//! evaluated on the rayon pool; the result is identical either way.

use crate::component::ScoringComponent;
use crate::error::{ScoringError, ScoringResult};
use chem::Molecule;
use config::{AggregationMode, ScoringFunctionConfig};
use mol_core::ComponentScore;
use rayon::prelude::*;
use tracing::debug;

/// Score of one SMILES.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub smiles: String,
    pub valid: bool,
    pub total: f64,
    pub components: Vec<ComponentScore>,
}

#[derive(Debug, Clone)]
pub struct ScoringFunction {
    mode: AggregationMode,
    parallel: bool,
    components: Vec<ScoringComponent>,
}

impl ScoringFunction {
    pub fn from_config(config: &ScoringFunctionConfig) -> ScoringResult<Self> {
        let components = config
            .parameters
            .iter()
            .map(ScoringComponent::from_config)
            .collect::<ScoringResult<Vec<_>>>()?;
        Self::new(config.name, config.parallel, components)
    }

    pub fn new(
        mode: AggregationMode,
        parallel: bool,
        components: Vec<ScoringComponent>,
    ) -> ScoringResult<Self> {
        if components.is_empty() {
            return Err(ScoringError::NoComponents);
        }
        debug!(
            mode = %mode,
            parallel,
            components = components.len(),
            "Built scoring function"
        );
        Ok(Self {
            mode,
            parallel,
            components,
        })
    }

    pub fn components(&self) -> &[ScoringComponent] {
        &self.components
    }

    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name().to_string()).collect()
    }

    /// Parses and scores one SMILES. Unparseable input is invalid and scores
    /// 0 overall and on every component.
    pub fn score_smiles(&self, smiles: &str) -> ScoreSummary {
        let molecule = Molecule::from_smiles(smiles).ok();
        let components = self.evaluate(molecule.as_ref());
        let total = if molecule.is_some() {
            self.aggregate(&components)
        } else {
            0.0
        };
        ScoreSummary {
            smiles: smiles.to_string(),
            valid: molecule.is_some(),
            total,
            components,
        }
    }

    /// Scores a batch in order.
    pub fn score_batch<S: AsRef<str>>(&self, smiles: &[S]) -> Vec<ScoreSummary> {
        smiles.iter().map(|s| self.score_smiles(s.as_ref())).collect()
    }

    fn evaluate(&self, molecule: Option<&Molecule>) -> Vec<ComponentScore> {
        if self.parallel {
            self.components
                .par_iter()
                .map(|c| c.evaluate(molecule))
                .collect()
        } else {
            self.components.iter().map(|c| c.evaluate(molecule)).collect()
        }
    }

    fn aggregate(&self, scores: &[ComponentScore]) -> f64 {
        let mut penalty = 1.0;
        let mut weight_sum = 0.0;
        let mut weighted: Vec<(f64, f64)> = Vec::new();
        for (component, score) in self.components.iter().zip(scores) {
            if component.is_penalty() {
                penalty *= score.score;
            } else {
                weight_sum += component.weight();
                weighted.push((component.weight(), score.score));
            }
        }

        let combined = if weighted.is_empty() || weight_sum <= 0.0 {
            1.0
        } else {
            match self.mode {
                AggregationMode::CustomProduct => weighted
                    .iter()
                    .map(|(w, c)| c.powf(w / weight_sum))
                    .product(),
                AggregationMode::CustomSum => {
                    weighted.iter().map(|(w, c)| w * c).sum::<f64>() / weight_sum
                }
            }
        };
        (penalty * combined).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{ComponentConfig, ComponentType, SpecificParameters, TransformationType};

    fn similarity(reference: &str, weight: f64) -> ComponentConfig {
        let mut config = ComponentConfig::new(ComponentType::TanimotoSimilarity, format!("sim {reference}"));
        config.smiles = vec![reference.to_string()];
        config.weight = weight;
        config
    }

    fn rings_at_least(n: f64) -> ComponentConfig {
        let mut config = ComponentConfig::new(ComponentType::NumRings, "rings");
        config.specific_parameters = SpecificParameters {
            transformation_type: Some(TransformationType::RightStep),
            high: Some(n),
            ..SpecificParameters::default()
        };
        config
    }

    fn function(mode: AggregationMode, parameters: Vec<ComponentConfig>) -> ScoringFunction {
        ScoringFunction::from_config(&ScoringFunctionConfig {
            name: mode,
            parallel: false,
            parameters,
        })
        .unwrap()
    }

    #[test]
    fn test_all_ones_gives_one() {
        for mode in [AggregationMode::CustomProduct, AggregationMode::CustomSum] {
            let f = function(mode, vec![similarity("c1ccccc1O", 2.0), rings_at_least(1.0)]);
            let summary = f.score_smiles("Oc1ccccc1");
            assert!(summary.valid);
            assert!((summary.total - 1.0).abs() < 1e-12, "{mode}");
        }
    }

    #[test]
    fn test_zero_component_zeroes_product() {
        let f = function(
            AggregationMode::CustomProduct,
            vec![similarity("CCO", 1.0), rings_at_least(1.0)],
        );
        assert_eq!(f.score_smiles("CCO").total, 0.0);

        let f = function(
            AggregationMode::CustomSum,
            vec![similarity("CCO", 1.0), rings_at_least(1.0)],
        );
        assert!((f.score_smiles("CCO").total - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_weights_shape_the_sum() {
        let f = function(
            AggregationMode::CustomSum,
            vec![similarity("CCO", 3.0), rings_at_least(1.0)],
        );
        assert!((f.score_smiles("CCO").total - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_alert_multiplies_total() {
        let mut alerts = ComponentConfig::new(ComponentType::CustomAlerts, "alerts");
        alerts.smiles = vec!["OO".to_string()];
        let f = function(
            AggregationMode::CustomSum,
            vec![similarity("COOC", 1.0), alerts],
        );
        let summary = f.score_smiles("COOC");
        assert_eq!(summary.components[0].score, 1.0);
        assert_eq!(summary.total, 0.0);
    }

    #[test]
    fn test_penalty_only_function() {
        let mut substructure = ComponentConfig::new(ComponentType::MatchingSubstructure, "ring");
        substructure.smiles = vec!["c1ccccc1".to_string()];
        let f = function(AggregationMode::CustomProduct, vec![substructure]);
        assert_eq!(f.score_smiles("c1ccccc1C").total, 1.0);
        assert_eq!(f.score_smiles("CCCC").total, 0.5);
    }

    #[test]
    fn test_invalid_smiles_scores_zero() {
        let f = function(AggregationMode::CustomSum, vec![similarity("CCO", 1.0)]);
        let summary = f.score_smiles("C1CC(");
        assert!(!summary.valid);
        assert_eq!(summary.total, 0.0);
        assert!(summary.components.iter().all(|c| c.score == 0.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parameters = vec![similarity("CCO", 1.0), similarity("c1ccccc1", 2.0), rings_at_least(1.0)];
        let sequential = function(AggregationMode::CustomProduct, parameters.clone());
        let parallel = ScoringFunction::from_config(&ScoringFunctionConfig {
            name: AggregationMode::CustomProduct,
            parallel: true,
            parameters,
        })
        .unwrap();
        let batch = ["CCO", "c1ccccc1CO", "CCN", "not smiles"];
        assert_eq!(sequential.score_batch(&batch), parallel.score_batch(&batch));
    }

    #[test]
    fn test_empty_function_rejected() {
        assert!(matches!(
            ScoringFunction::new(AggregationMode::CustomSum, false, vec![]),
            Err(ScoringError::NoComponents)
        ));
    }
}
