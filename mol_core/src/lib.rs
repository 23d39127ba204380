//! # Molforge Core
//!
//! Shared domain types for the molforge toolkit.
//!
//! This crate provides:
//! - `Candidate` and its scored form, passed between sampler, scoring,
//!   diversity filter and trainer
//! - Step reports consumed by progress sinks
//! - The run type enumeration and the result of a run

pub mod report;
pub mod types;

pub use report::{StepReport, StepRow};
pub use types::{
    Candidate, CandidateSource, ComponentScore, RunResult, RunType, ScoredCandidate,
    TrainingState,
};
