//! # Molforge Errors
//!
//! Error taxonomy shared by every molforge crate.
//!
//! Errors fall into four classes:
//! - **Configuration**: missing or malformed fields, invalid run or component
//!   types. Always fatal, reported before any training step runs.
//! - **Candidate**: an unparseable sequence or a failed component evaluation
//!   for a single candidate. Never fatal; the candidate is degraded instead.
//! - **Resource**: missing checkpoints, unreadable inputs, unwritable outputs.
//!   Fatal at startup.
//! - **Checkpoint**: a policy file that exists but cannot be interpreted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification used by callers to decide whether to abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Configuration,
    Candidate,
    Resource,
    Checkpoint,
}

/// Top-level error for the molforge toolkit.
#[derive(Debug, Error)]
pub enum MolforgeError {
    #[error("Invalid configuration at {field}: {reason}")]
    Configuration { field: String, reason: String },

    #[error("Candidate {smiles} rejected: {reason}")]
    Candidate { smiles: String, reason: String },

    #[error("Resource {path} unavailable: {reason}")]
    Resource { path: String, reason: String },

    #[error("Checkpoint {path} is invalid: {reason}")]
    Checkpoint { path: String, reason: String },

    #[error("Progress sink failed: {reason}")]
    Sink { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {format} - {reason}")]
    Serialization { format: String, reason: String },
}

impl MolforgeError {
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn resource(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn candidate(smiles: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Candidate {
            smiles: smiles.into(),
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Configuration { .. } => ErrorClass::Configuration,
            Self::Candidate { .. } => ErrorClass::Candidate,
            Self::Checkpoint { .. } => ErrorClass::Checkpoint,
            Self::Resource { .. } | Self::Sink { .. } | Self::Io(_) | Self::Serialization { .. } => {
                ErrorClass::Resource
            }
        }
    }

    /// Only candidate-level problems may be absorbed by a running loop.
    pub fn is_fatal(&self) -> bool {
        self.class() != ErrorClass::Candidate
    }
}

impl From<serde_json::Error> for MolforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "json".to_string(),
            reason: err.to_string(),
        }
    }
}

pub type MolforgeResult<T> = Result<T, MolforgeError>;
