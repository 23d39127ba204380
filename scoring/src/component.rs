//! # Scoring Components
//!
//! One configured component: what it measures, how the raw value is
//! transformed and what it reports when it cannot produce a value.
//!
//! Reference molecules are parsed and fingerprinted once, at construction.

use crate::error::{ScoringError, ScoringResult};
use crate::transform::Transform;
use chem::fingerprint::DEFAULT_RADIUS;
use chem::{Fingerprint, Molecule, tanimoto};
use config::{ComponentConfig, ComponentType};
use mol_core::ComponentScore;

/// Penalty applied by `matching_substructure` when no pattern matches.
pub const SUBSTRUCTURE_MISS_PENALTY: f64 = 0.5;

#[derive(Debug, Clone)]
enum Measure {
    Similarity {
        references: Vec<Fingerprint>,
        radius: usize,
        distance: bool,
    },
    Substructure(Vec<Molecule>),
    Alerts(Vec<Molecule>),
    Descriptor(ComponentType),
}

#[derive(Debug, Clone)]
pub struct ScoringComponent {
    name: String,
    component_type: ComponentType,
    weight: f64,
    transform: Transform,
    measure: Measure,
}

impl ScoringComponent {
    pub fn from_config(config: &ComponentConfig) -> ScoringResult<Self> {
        let parse_all = || -> ScoringResult<Vec<Molecule>> {
            config
                .smiles
                .iter()
                .map(|smiles| {
                    Molecule::from_smiles(smiles).map_err(|e| ScoringError::InvalidReference {
                        component: config.name.clone(),
                        smiles: smiles.clone(),
                        reason: e.to_string(),
                    })
                })
                .collect()
        };

        let radius = config.specific_parameters.radius.unwrap_or(DEFAULT_RADIUS);
        let measure = match config.component_type {
            ComponentType::TanimotoSimilarity | ComponentType::JaccardDistance => {
                Measure::Similarity {
                    references: parse_all()?
                        .iter()
                        .map(|mol| mol.fingerprint(radius))
                        .collect(),
                    radius,
                    distance: config.component_type == ComponentType::JaccardDistance,
                }
            }
            ComponentType::MatchingSubstructure => Measure::Substructure(parse_all()?),
            ComponentType::CustomAlerts => Measure::Alerts(parse_all()?),
            other => Measure::Descriptor(other),
        };

        let transform = if config.component_type.is_penalty() {
            Transform::Identity
        } else {
            Transform::from_parameters(&config.name, &config.specific_parameters)?
        };

        Ok(Self {
            name: config.name.clone(),
            component_type: config.component_type,
            weight: config.weight,
            transform,
            measure,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_penalty(&self) -> bool {
        self.component_type.is_penalty()
    }

    /// Score reported when evaluation yields no usable value. A failed
    /// penalty check does not penalise.
    pub fn fallback_score(&self) -> f64 {
        if self.is_penalty() { 1.0 } else { 0.0 }
    }

    /// Untransformed value for a parsed molecule.
    pub fn raw_value(&self, mol: &Molecule) -> f64 {
        match &self.measure {
            Measure::Similarity {
                references,
                radius,
                distance,
            } => {
                let fingerprint = mol.fingerprint(*radius);
                let best = references
                    .iter()
                    .map(|reference| tanimoto(&fingerprint, reference))
                    .fold(f64::NAN, f64::max);
                if *distance { 1.0 - best } else { best }
            }
            Measure::Substructure(patterns) => {
                if patterns.is_empty() || patterns.iter().any(|p| mol.has_substructure(p)) {
                    1.0
                } else {
                    SUBSTRUCTURE_MISS_PENALTY
                }
            }
            Measure::Alerts(alerts) => {
                if alerts.iter().any(|alert| mol.has_substructure(alert)) {
                    0.0
                } else {
                    1.0
                }
            }
            Measure::Descriptor(kind) => descriptor(*kind, mol),
        }
    }

    /// Evaluates a molecule, `None` meaning the candidate did not parse.
    /// Invalid candidates score 0 on every component.
    pub fn evaluate(&self, mol: Option<&Molecule>) -> ComponentScore {
        let (raw, score) = match mol {
            None => (None, 0.0),
            Some(mol) => {
                let raw = self.raw_value(mol);
                let score = if raw.is_finite() {
                    self.transform.apply(raw)
                } else {
                    f64::NAN
                };
                let score = if score.is_finite() {
                    score
                } else {
                    self.fallback_score()
                };
                (raw.is_finite().then_some(raw), score)
            }
        };
        ComponentScore {
            name: self.name.clone(),
            component_type: self.component_type.to_string(),
            raw,
            score,
        }
    }
}

fn descriptor(kind: ComponentType, mol: &Molecule) -> f64 {
    match kind {
        ComponentType::MolecularWeight => mol.molecular_weight(),
        ComponentType::NumRings => mol.ring_count() as f64,
        ComponentType::NumRotatableBonds => mol.rotatable_bonds() as f64,
        ComponentType::NumHbdLipinski => mol.hbond_donors() as f64,
        ComponentType::NumHbaLipinski => mol.hbond_acceptors() as f64,
        ComponentType::HeavyAtomCount => mol.heavy_atom_count() as f64,
        _ => f64::NAN,
    }
}
