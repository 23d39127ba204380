//! Canonical atom ranks and graph keys by iterated neighbourhood refinement.

use crate::molecule::Molecule;
use xxhash_rust::xxh64::xxh64;

const KEY_SEED: u64 = 0x6d6f_6c66;

pub(crate) fn hash_words(words: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(words.len() * 8);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    xxh64(&bytes, KEY_SEED)
}

fn initial_invariant(mol: &Molecule, atom: usize, ring_atoms: &[bool]) -> u64 {
    let info = mol.atom(atom);
    hash_words(&[
        u64::from(info.element.atomic_number()),
        u64::from(info.aromatic),
        info.charge as u64,
        mol.degree(atom) as u64,
        u64::from(mol.hydrogen_count(atom)),
        u64::from(ring_atoms[atom]),
        u64::from(info.isotope.unwrap_or(0)),
    ])
}

fn refine(mol: &Molecule, labels: &[u64]) -> Vec<u64> {
    (0..mol.atom_count())
        .map(|atom| {
            let mut environment: Vec<(u64, u64)> = mol
                .neighbors(atom)
                .iter()
                .map(|&(next, bond)| (mol.bonds()[bond].order.code(), labels[next]))
                .collect();
            environment.sort_unstable();
            let mut words = Vec::with_capacity(1 + environment.len() * 2);
            words.push(labels[atom]);
            for (order, label) in environment {
                words.push(order);
                words.push(label);
            }
            hash_words(&words)
        })
        .collect()
}

fn distinct(labels: &[u64]) -> usize {
    let mut sorted = labels.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// Refined per-atom labels; symmetry-equivalent atoms share a label.
pub fn atom_labels(mol: &Molecule) -> Vec<u64> {
    let ring_atoms = mol.ring_atoms();
    let mut labels: Vec<u64> = (0..mol.atom_count())
        .map(|atom| initial_invariant(mol, atom, &ring_atoms))
        .collect();
    let mut classes = distinct(&labels);
    for _ in 0..mol.atom_count() {
        let next = refine(mol, &labels);
        let next_classes = distinct(&next);
        labels = next;
        if next_classes <= classes {
            break;
        }
        classes = next_classes;
    }
    labels
}

/// Dense ranks (0-based) ordering atoms by refined label.
pub fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let labels = atom_labels(mol);
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    sorted.dedup();
    labels
        .iter()
        .map(|label| sorted.binary_search(label).unwrap_or(0))
        .collect()
}

/// Order-independent hex key identifying the molecular graph. The empty
/// molecule has the empty key.
pub fn graph_key(mol: &Molecule) -> String {
    if mol.is_empty() {
        return String::new();
    }
    let mut labels = atom_labels(mol);
    labels.sort_unstable();
    labels.push(mol.bond_count() as u64);
    format!("{:016x}", hash_words(&labels))
}
