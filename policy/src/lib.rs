//! # Policy
//!
//! The generative side of molforge.
//!
//! This crate provides:
//! - `Vocabulary`: SMILES tokens with reserved start (`^`) and end (`$`)
//! - `TokenPolicy`: an autoregressive next-token model with JSON checkpoints
//! - `Adam`: the optimizer used by reinforcement and likelihood training
//! - `Sampler`: parallel batch sampling with prior likelihoods
//! - Maximum-likelihood fitting for transfer learning

pub mod error;
pub mod likelihood;
pub mod model;
pub mod optimizer;
pub mod sampler;
pub mod vocabulary;

pub use error::{PolicyError, PolicyResult};
pub use likelihood::{FitOptions, fit_maximum_likelihood, mean_negative_log_likelihood};
pub use model::{CHECKPOINT_FORMAT, SampledSequence, TokenPolicy};
pub use optimizer::Adam;
pub use sampler::Sampler;
pub use vocabulary::{END, END_TOKEN, START, START_TOKEN, Vocabulary};
