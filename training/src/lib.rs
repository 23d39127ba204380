//! # Molforge Training
//!
//! Runs molforge jobs end to end.
//!
//! This crate provides:
//! - `Trainer`: the reinforcement learning loop with reset and margin guards
//! - `run`: dispatch for every run type (reinforcement learning, sampling,
//!   scoring, transfer learning, model creation, validation)
//! - Result directory artifacts and metric emission

pub mod artifacts;
pub mod error;
pub mod guards;
pub mod runner;
pub mod telemetry;
pub mod trainer;

pub use artifacts::{ResultArtifacts, read_smiles_file};
pub use error::{TrainingError, TrainingResult};
pub use guards::{MarginGuard, ResetGuard};
pub use runner::{run, run_with_sink};
pub use telemetry::TrainingTelemetry;
pub use trainer::{REPORT_ROWS, StepStats, Trainer};
