//! Circular (Morgan-style) fingerprints.

use crate::canon::hash_words;
use crate::molecule::Molecule;

pub const DEFAULT_RADIUS: usize = 2;

/// Sorted, deduplicated set of atom-environment identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint {
    features: Vec<u32>,
}

impl Fingerprint {
    pub fn from_features(mut features: Vec<u32>) -> Self {
        features.sort_unstable();
        features.dedup();
        Self { features }
    }

    pub fn features(&self) -> &[u32] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn intersection_count(&self, other: &Fingerprint) -> usize {
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < self.features.len() && j < other.features.len() {
            match self.features[i].cmp(&other.features[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }
}

/// |a ∩ b| / |a ∪ b|; two empty fingerprints have similarity 0.
pub fn tanimoto(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let common = a.intersection_count(b);
    let union = a.len() + b.len() - common;
    if union == 0 {
        0.0
    } else {
        common as f64 / union as f64
    }
}

impl Molecule {
    /// Environment identifiers for every atom at radii `0..=radius`.
    pub fn fingerprint(&self, radius: usize) -> Fingerprint {
        let ring_atoms = self.ring_atoms();
        let mut identifiers: Vec<u64> = (0..self.atom_count())
            .map(|atom| {
                let info = self.atom(atom);
                hash_words(&[
                    u64::from(info.element.atomic_number()),
                    self.degree(atom) as u64,
                    u64::from(self.hydrogen_count(atom)),
                    info.charge as u64,
                    u64::from(ring_atoms[atom]),
                    u64::from(info.aromatic),
                ])
            })
            .collect();

        let mut features: Vec<u32> = identifiers.iter().map(|id| *id as u32).collect();
        for layer in 1..=radius {
            identifiers = (0..self.atom_count())
                .map(|atom| {
                    let mut environment: Vec<(u64, u64)> = self
                        .neighbors(atom)
                        .iter()
                        .map(|&(next, bond)| (self.bonds()[bond].order.code(), identifiers[next]))
                        .collect();
                    environment.sort_unstable();
                    let mut words = vec![layer as u64, identifiers[atom]];
                    for (order, id) in environment {
                        words.push(order);
                        words.push(id);
                    }
                    hash_words(&words)
                })
                .collect();
            features.extend(identifiers.iter().map(|id| *id as u32));
        }
        Fingerprint::from_features(features)
    }
}
