use errors::MolforgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Component {component}: reference {smiles:?} is not a valid molecule: {reason}")]
    InvalidReference {
        component: String,
        smiles: String,
        reason: String,
    },

    #[error("Component {component}: transformation needs {parameter}")]
    MissingTransformParameter { component: String, parameter: String },

    #[error("Component {component}: {reason}")]
    InvalidTransform { component: String, reason: String },

    #[error("Scoring function has no components")]
    NoComponents,
}

impl From<ScoringError> for MolforgeError {
    fn from(err: ScoringError) -> Self {
        MolforgeError::configuration("parameters.scoring_function", err.to_string())
    }
}

pub type ScoringResult<T> = Result<T, ScoringError>;
