//! # Chemistry Layer
//!
//! A small molecular graph model built from SMILES strings.
//!
//! This crate provides:
//! - SMILES tokenization, parsing with validity checks, and writing
//! - Murcko and topological scaffolds with canonical graph keys
//! - Circular fingerprints and Tanimoto similarity
//! - Substructure matching and a handful of descriptors
//!
//! It covers what scaffold bucketing and similarity scoring need; it is not a
//! general cheminformatics toolkit.

pub mod canon;
pub mod descriptors;
pub mod element;
pub mod error;
pub mod fingerprint;
pub mod molecule;
pub mod scaffold;
pub mod smiles;
pub mod substructure;
pub mod tokenizer;

pub use element::Element;
pub use error::ChemError;
pub use fingerprint::{Fingerprint, tanimoto};
pub use molecule::{Atom, Bond, BondOrder, Molecule};
pub use scaffold::Scaffold;
pub use tokenizer::tokenize;

/// Parses a SMILES string; shorthand for [`Molecule::from_smiles`].
pub fn parse(smiles: &str) -> Result<Molecule, ChemError> {
    Molecule::from_smiles(smiles)
}

/// Whether `smiles` parses into a chemically plausible molecule.
pub fn is_valid_smiles(smiles: &str) -> bool {
    Molecule::from_smiles(smiles).is_ok()
}
