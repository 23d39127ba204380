use errors::MolforgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Failed to export {path}: {reason}")]
    Export { path: String, reason: String },
}

impl MemoryError {
    pub(crate) fn export(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Export {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<MemoryError> for MolforgeError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::Export { path, reason } => MolforgeError::resource(path, reason),
        }
    }
}

pub type MemoryResult<T> = Result<T, MemoryError>;
