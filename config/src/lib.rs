//! # Run Configuration
//!
//! Configuration management for molforge runs.
//!
//! This crate provides:
//! - Strongly-typed configuration structures for every run type
//! - Configuration file loading (JSON/YAML/TOML)
//! - Environment variable overrides (`MOLFORGE_*`)
//! - Field-level and cross-field validation
//!
//! Unknown fields are rejected at load time and every required field is
//! enforced before any component is constructed.

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod validation;

pub use config::{
    AggregationMode, ComponentConfig, ComponentType, CreateModelConfig, DiversityFilterConfig,
    DiversityFilterName, InceptionConfig, LoggingConfig, Parameters, Recipient,
    ReinforcementLearningConfig, RunConfiguration, SamplingConfig, ScoringFunctionConfig,
    ScoringRunConfig, SpecificParameters, TransferLearningConfig, TransformationType,
    ValidationRunConfig,
};
pub use file_loader::{ConfigFileError, load_from_file, load_from_json, load_from_toml, load_from_yaml};
pub use loader::{apply_env_overrides, ensure_job_id, load};
pub use validation::{ConfigIssue, validate, validation_report};
