//! # Scoring
//!
//! Turns a SMILES string into a reward in [0, 1].
//!
//! This crate provides:
//! - Value transforms (sigmoid family and step functions)
//! - Scoring components (similarity, substructure and alert checks, simple
//!   descriptors) with explicit fallback values
//! - `ScoringFunction`, the weighted product/sum aggregate

pub mod component;
pub mod error;
pub mod function;
pub mod transform;

pub use component::{SUBSTRUCTURE_MISS_PENALTY, ScoringComponent};
pub use error::{ScoringError, ScoringResult};
pub use function::{ScoreSummary, ScoringFunction};
pub use transform::Transform;
