use errors::MolforgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Checkpoint not found: {path}")]
    CheckpointNotFound { path: String },

    #[error("Invalid checkpoint {path}: {reason}")]
    InvalidCheckpoint { path: String, reason: String },

    #[error("Failed to write checkpoint {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Vocabulary mismatch: {reason}")]
    VocabularyMismatch { reason: String },

    #[error("Invalid vocabulary: {reason}")]
    InvalidVocabulary { reason: String },

    #[error("Corpus contains no encodable SMILES")]
    EmptyCorpus,
}

impl From<PolicyError> for MolforgeError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::CheckpointNotFound { path } => {
                MolforgeError::resource(path, "checkpoint not found")
            }
            PolicyError::WriteFailed { path, reason } => MolforgeError::resource(path, reason),
            PolicyError::InvalidCheckpoint { path, reason } => {
                MolforgeError::Checkpoint { path, reason }
            }
            PolicyError::VocabularyMismatch { reason } => MolforgeError::Checkpoint {
                path: "<agent/prior>".to_string(),
                reason,
            },
            other => MolforgeError::configuration("vocabulary", other.to_string()),
        }
    }
}

pub type PolicyResult<T> = Result<T, PolicyError>;
