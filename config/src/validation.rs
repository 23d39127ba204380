//! # Configuration Validation
//!
//! Field-level rules come from the `validator` derives on the configuration
//! structures. This module flattens their errors into dotted field paths and
//! adds the rules that span several fields: which parameter sections a run
//! type needs and what each scoring component requires.

use crate::config::{RunConfiguration, ScoringFunctionConfig, TransformationType};
use errors::{MolforgeError, MolforgeResult};
use mol_core::RunType;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// One problem found in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub field: String,
    pub reason: String,
}

impl ConfigIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigIssue> for MolforgeError {
    fn from(issue: ConfigIssue) -> Self {
        MolforgeError::configuration(issue.field, issue.reason)
    }
}

/// Validate a run configuration, failing on the first issue.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Guarantees that every component can be constructed from the document
/// before any training step runs.
///
/// ## Validation Rules
/// ### Logging
/// - `recipient`: `"local"` or an `http(s)://` URL
/// - `logging_frequency`: at least 1
///
/// ### Sections by run type
/// - `reinforcement_learning`: `reinforcement_learning` and `scoring_function`
/// - `scoring`: `scoring` and `scoring_function`
/// - `sampling`, `transfer_learning`, `create_model`, `validation`: the
///   section of the same name
///
/// ### Scoring function
/// - At least one component, unique component names
/// - Non-penalty weights sum to more than 0 when any non-penalty component exists
/// - Similarity components list at least one reference SMILES
/// - The selected transform has all of its parameters, `high > low`
///
/// ### Inception
/// - `sample_size` does not exceed `memory_size`
pub fn validate(config: &RunConfiguration) -> MolforgeResult<()> {
    match validation_report(config).into_iter().next() {
        Some(issue) => Err(issue.into()),
        None => Ok(()),
    }
}

/// Every issue in the document, field-level issues first, sorted by field.
pub fn validation_report(config: &RunConfiguration) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if let Err(errors) = config.validate() {
        flatten("", &errors, &mut issues);
        issues.sort_by(|a, b| a.field.cmp(&b.field));
    }
    check_sections(config, &mut issues);
    if let Some(scoring_function) = config.parameters.scoring_function.as_ref() {
        check_scoring_function(scoring_function, &mut issues);
    }
    if let Some(inception) = config.parameters.inception.as_ref()
        && inception.sample_size > inception.memory_size
    {
        issues.push(ConfigIssue::new(
            "parameters.inception.sample_size",
            format!("cannot exceed memory_size ({})", inception.memory_size),
        ));
    }
    issues
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ConfigIssue>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let reason = error
                        .message
                        .as_ref()
                        .map_or_else(|| format!("failed `{}` rule", error.code), ToString::to_string);
                    out.push(ConfigIssue::new(path.clone(), reason));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn check_sections(config: &RunConfiguration, issues: &mut Vec<ConfigIssue>) {
    let p = &config.parameters;
    let required: &[(&str, bool)] = match config.run_type {
        RunType::ReinforcementLearning => &[
            ("reinforcement_learning", p.reinforcement_learning.is_some()),
            ("scoring_function", p.scoring_function.is_some()),
        ],
        RunType::Scoring => &[
            ("scoring", p.scoring.is_some()),
            ("scoring_function", p.scoring_function.is_some()),
        ],
        RunType::Sampling => &[("sampling", p.sampling.is_some())],
        RunType::TransferLearning => &[("transfer_learning", p.transfer_learning.is_some())],
        RunType::CreateModel => &[("create_model", p.create_model.is_some())],
        RunType::Validation => &[("validation", p.validation.is_some())],
    };
    for (section, present) in required {
        if !present {
            issues.push(ConfigIssue::new(
                format!("parameters.{section}"),
                format!("section is required for run_type {}", config.run_type),
            ));
        }
    }
}

fn check_scoring_function(scoring_function: &ScoringFunctionConfig, issues: &mut Vec<ConfigIssue>) {
    let prefix = "parameters.scoring_function.parameters";
    if scoring_function.parameters.is_empty() {
        issues.push(ConfigIssue::new(prefix, "at least one component is required"));
        return;
    }

    let mut names = HashSet::new();
    let mut weighted = 0.0;
    let mut has_weighted_component = false;
    for (index, component) in scoring_function.parameters.iter().enumerate() {
        let field = format!("{prefix}[{index}]");
        if !names.insert(component.name.as_str()) {
            issues.push(ConfigIssue::new(
                format!("{field}.name"),
                format!("duplicate component name {:?}", component.name),
            ));
        }
        if !component.component_type.is_penalty() {
            has_weighted_component = true;
            weighted += component.weight;
        }
        if component.component_type.requires_smiles() && component.smiles.is_empty() {
            issues.push(ConfigIssue::new(
                format!("{field}.smiles"),
                format!("{} needs at least one reference SMILES", component.component_type),
            ));
        }
        if component.model_path.is_some() {
            warn!(component = %component.name, "model_path is not used by {}", component.component_type);
        }

        let params = &component.specific_parameters;
        if let Some(missing) = params.missing_transform_parameter() {
            issues.push(ConfigIssue::new(
                format!("{field}.specific_parameters.{missing}"),
                format!("required by {} transformation", params.transformation_type()),
            ));
        } else if let (Some(low), Some(high)) = (params.low, params.high)
            && high <= low
            && uses_range(params.transformation_type())
        {
            issues.push(ConfigIssue::new(
                format!("{field}.specific_parameters.high"),
                "must be greater than low",
            ));
        }
    }

    if has_weighted_component && weighted <= 0.0 {
        issues.push(ConfigIssue::new(
            prefix,
            "weights of non-penalty components must sum to more than 0",
        ));
    }
}

fn uses_range(transformation: TransformationType) -> bool {
    matches!(
        transformation,
        TransformationType::Sigmoid
            | TransformationType::ReverseSigmoid
            | TransformationType::DoubleSigmoid
            | TransformationType::Step
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComponentConfig, ComponentType, InceptionConfig, ReinforcementLearningConfig};

    fn valid_rl_config() -> RunConfiguration {
        let mut config = RunConfiguration::new(RunType::ReinforcementLearning);
        config.parameters.reinforcement_learning =
            Some(ReinforcementLearningConfig::new("prior.ckpt", "prior.ckpt"));
        let mut similarity = ComponentConfig::new(ComponentType::TanimotoSimilarity, "similarity");
        similarity.smiles = vec!["CCO".to_string()];
        config.parameters.scoring_function = Some(ScoringFunctionConfig {
            parameters: vec![similarity],
            ..ScoringFunctionConfig::default()
        });
        config
    }

    fn components(config: &mut RunConfiguration) -> &mut Vec<ComponentConfig> {
        &mut config
            .parameters
            .scoring_function
            .as_mut()
            .unwrap()
            .parameters
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate(&valid_rl_config()).is_ok());
    }

    #[test]
    fn test_missing_scoring_function() {
        let mut config = valid_rl_config();
        config.parameters.scoring_function = None;
        let issues = validation_report(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "parameters.scoring_function");
    }

    #[test]
    fn test_field_errors_carry_nested_paths() {
        let mut config = valid_rl_config();
        config
            .parameters
            .reinforcement_learning
            .as_mut()
            .unwrap()
            .batch_size = 0;
        config.logging.logging_frequency = 0;

        let fields: Vec<String> = validation_report(&config)
            .into_iter()
            .map(|issue| issue.field)
            .collect();
        assert!(fields.contains(&"logging.logging_frequency".to_string()));
        assert!(fields.contains(&"parameters.reinforcement_learning.batch_size".to_string()));
    }

    #[test]
    fn test_minscore_out_of_range() {
        let mut config = valid_rl_config();
        config.parameters.diversity_filter = Some(crate::config::DiversityFilterConfig {
            minscore: 1.5,
            ..Default::default()
        });
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("parameters.diversity_filter.minscore"));
    }

    #[test]
    fn test_similarity_component_needs_reference() {
        let mut config = valid_rl_config();
        components(&mut config)[0].smiles.clear();
        let issues = validation_report(&config);
        assert_eq!(issues[0].field, "parameters.scoring_function.parameters[0].smiles");
    }

    #[test]
    fn test_duplicate_component_names() {
        let mut config = valid_rl_config();
        let duplicate = components(&mut config)[0].clone();
        components(&mut config).push(duplicate);
        let issues = validation_report(&config);
        assert!(issues.iter().any(|i| i.reason.contains("duplicate")));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = valid_rl_config();
        components(&mut config)[0].weight = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_penalty_only_scoring_function_is_valid() {
        let mut config = valid_rl_config();
        *components(&mut config) = vec![ComponentConfig::new(ComponentType::CustomAlerts, "alerts")];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_sigmoid_needs_parameters() {
        let mut config = valid_rl_config();
        let mut weight = ComponentConfig::new(ComponentType::MolecularWeight, "mw");
        weight.specific_parameters.transformation_type = Some(TransformationType::Sigmoid);
        weight.specific_parameters.low = Some(200.0);
        components(&mut config).push(weight);

        let issues = validation_report(&config);
        assert_eq!(
            issues[0].field,
            "parameters.scoring_function.parameters[1].specific_parameters.high"
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = valid_rl_config();
        let mut weight = ComponentConfig::new(ComponentType::MolecularWeight, "mw");
        weight.specific_parameters.transformation_type = Some(TransformationType::Step);
        weight.specific_parameters.low = Some(500.0);
        weight.specific_parameters.high = Some(200.0);
        components(&mut config).push(weight);

        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inception_sample_larger_than_memory() {
        let mut config = valid_rl_config();
        config.parameters.inception = Some(InceptionConfig {
            smiles: vec![],
            memory_size: 2,
            sample_size: 5,
        });
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("sample_size"));
    }

    #[test]
    fn test_create_model_requires_its_section() {
        let config = RunConfiguration::new(RunType::CreateModel);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("parameters.create_model"));
    }
}
