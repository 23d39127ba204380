//! # Inception Memory
//!
//! Bounded replay buffer of good SMILES mixed into every training batch.
//!
//! - Entries are unique by SMILES; re-adding a present SMILES changes nothing.
//! - When full, an insert must beat the lowest score strictly; the evicted
//!   entry is the lowest score, oldest insertion first on ties.
//! - `sample(k)` draws without replacement.

use rand::Rng;
use rand::seq::index;

#[derive(Debug, Clone, PartialEq)]
pub struct InceptionEntry {
    pub smiles: String,
    pub score: f64,
    /// Prior log-likelihood when the entry was added.
    pub likelihood: f64,
    sequence: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InceptionMemory {
    capacity: usize,
    sample_size: usize,
    entries: Vec<InceptionEntry>,
    next_sequence: u64,
}

impl InceptionMemory {
    pub fn new(capacity: usize, sample_size: usize) -> Self {
        Self {
            capacity,
            sample_size,
            entries: Vec::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries drawn per training step.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, smiles: &str) -> bool {
        self.entries.iter().any(|e| e.smiles == smiles)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[InceptionEntry] {
        &self.entries
    }

    fn lowest(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.score
                    .total_cmp(&b.score)
                    .then(a.sequence.cmp(&b.sequence))
            })
            .map(|(i, _)| i)
    }

    /// Inserts when the SMILES is new and there is room or the score beats
    /// the current lowest entry. Returns whether the entry was stored.
    pub fn add(&mut self, smiles: &str, score: f64, likelihood: f64) -> bool {
        if self.capacity == 0 || !score.is_finite() || self.contains(smiles) {
            return false;
        }
        if self.entries.len() >= self.capacity {
            match self.lowest() {
                Some(i) if score > self.entries[i].score => {
                    self.entries.remove(i);
                }
                _ => return false,
            }
        }
        self.entries.push(InceptionEntry {
            smiles: smiles.to_string(),
            score,
            likelihood,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        true
    }

    /// Up to `k` distinct entries chosen uniformly at random; all entries
    /// when fewer than `k` are held.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<&InceptionEntry> {
        let amount = k.min(self.entries.len());
        index::sample(rng, self.entries.len(), amount)
            .into_iter()
            .map(|i| &self.entries[i])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_overflow_evicts_lowest() {
        let mut memory = InceptionMemory::new(3, 2);
        for (i, smiles) in ["C", "CC", "CCC", "CCCC"].iter().enumerate() {
            assert!(memory.add(smiles, 0.1 * (i + 1) as f64, -1.0));
        }
        assert_eq!(memory.len(), 3);
        assert!(!memory.contains("C"));
        assert!(memory.contains("CCCC"));
    }

    #[test]
    fn test_ties_evict_oldest() {
        let mut memory = InceptionMemory::new(2, 1);
        memory.add("CO", 0.5, -1.0);
        memory.add("CN", 0.5, -1.0);
        assert!(memory.add("CS", 0.9, -1.0));
        assert!(!memory.contains("CO"));
        assert!(memory.contains("CN"));
    }

    #[test]
    fn test_full_memory_rejects_scores_that_do_not_beat_lowest() {
        let mut memory = InceptionMemory::new(1, 1);
        memory.add("CO", 0.5, -1.0);
        assert!(!memory.add("CN", 0.5, -1.0));
        assert!(!memory.add("CS", 0.4, -1.0));
        assert_eq!(memory.entries()[0].smiles, "CO");
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut memory = InceptionMemory::new(5, 1);
        assert!(memory.add("CCO", 0.2, -1.0));
        assert!(!memory.add("CCO", 0.9, -2.0));
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.entries()[0].score, 0.2);
    }

    #[test]
    fn test_sample_more_than_held_returns_all_once() {
        let mut memory = InceptionMemory::new(10, 4);
        for smiles in ["C", "N", "O"] {
            memory.add(smiles, 0.5, -1.0);
        }
        let mut rng = StdRng::seed_from_u64(42);
        let sampled = memory.sample(8, &mut rng);
        assert_eq!(sampled.len(), 3);
        let unique: HashSet<&str> = sampled.iter().map(|e| e.smiles.as_str()).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut memory = InceptionMemory::new(50, 10);
        for i in 0..50 {
            memory.add(&"C".repeat(i + 1), i as f64 / 50.0, -1.0);
        }
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let sampled = memory.sample(10, &mut rng);
            let unique: HashSet<&str> = sampled.iter().map(|e| e.smiles.as_str()).collect();
            assert_eq!(unique.len(), 10);
        }
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut memory = InceptionMemory::new(0, 0);
        assert!(!memory.add("C", 1.0, -1.0));
        assert!(memory.sample(3, &mut StdRng::seed_from_u64(0)).is_empty());
    }
}
