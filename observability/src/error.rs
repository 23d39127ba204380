use errors::MolforgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write progress log {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Invalid progress recipient {recipient}: {reason}")]
    InvalidRecipient { recipient: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<SinkError> for MolforgeError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Write { path, reason } => MolforgeError::resource(path, reason),
            SinkError::InvalidRecipient { recipient, reason } => MolforgeError::configuration(
                "logging.recipient",
                format!("{recipient}: {reason}"),
            ),
            SinkError::Serialization(e) => MolforgeError::Sink {
                reason: e.to_string(),
            },
        }
    }
}

pub type SinkResult<T> = Result<T, SinkError>;
