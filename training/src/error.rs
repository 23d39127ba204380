use errors::MolforgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Cannot prepare result directory {path}: {reason}")]
    ResultDirectory { path: String, reason: String },

    #[error("Cannot read {path}: {reason}")]
    Input { path: String, reason: String },

    #[error("{path} contains no usable SMILES")]
    EmptyInput { path: String },

    #[error("Cannot write {path}: {reason}")]
    Output { path: String, reason: String },
}

impl TrainingError {
    pub(crate) fn input(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Input {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn output(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Output {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<TrainingError> for MolforgeError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::ResultDirectory { path, reason }
            | TrainingError::Input { path, reason }
            | TrainingError::Output { path, reason } => MolforgeError::resource(path, reason),
            TrainingError::EmptyInput { path } => {
                MolforgeError::resource(path, "contains no usable SMILES")
            }
        }
    }
}

pub type TrainingResult<T> = Result<T, TrainingError>;
