//! Shared test fixtures for the molforge workspace.
//!
//! - tiny vocabularies and policies, written to checkpoint files on demand
//! - run configuration builders pointing into a caller-owned directory
//! - a progress sink that records everything it receives

mod fixtures;

pub use fixtures::*;
