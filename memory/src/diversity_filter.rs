//! # Diversity Filter
//!
//! Attenuates the reward of candidates whose scaffold has already been
//! rewarded often enough.
//!
//! ## Algorithm
//! 1. Candidates that are invalid or score below `minscore` pass through
//!    unchanged and are never bucketed.
//! 2. The candidate's scaffold is matched to an existing bucket: an exact
//!    scaffold key match first, then (`ScaffoldSimilarity` only) the first
//!    bucket in creation order whose representative similarity is strictly
//!    greater than `minsimilarity`. Otherwise a new bucket is created.
//! 3. The bucket count is incremented. Up to `nbmax` members keep their raw
//!    score and are recorded; beyond that the adjusted score is 0.
//!
//! Bucket state is mutated, so batches are adjusted in a single sequential
//! pass in batch order.

use crate::error::{MemoryError, MemoryResult};
use chem::fingerprint::DEFAULT_RADIUS;
use chem::{Fingerprint, Molecule, Scaffold, tanimoto};
use config::{DiversityFilterConfig, DiversityFilterName};
use mol_core::Candidate;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A candidate accepted into a bucket at full reward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketMember {
    pub step: usize,
    pub smiles: String,
    pub scaffold: String,
    pub score: f64,
    pub likelihood: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldBucket {
    key: String,
    scaffold: String,
    fingerprint: Fingerprint,
    count: usize,
    mean_similarity: f64,
    members: Vec<BucketMember>,
}

impl ScaffoldBucket {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Written form of the scaffold that created the bucket.
    pub fn scaffold(&self) -> &str {
        &self.scaffold
    }

    /// Candidates matched to this bucket, including penalized ones.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean similarity of recorded members to the representative.
    pub fn mean_similarity(&self) -> f64 {
        self.mean_similarity
    }

    pub fn members(&self) -> &[BucketMember] {
        &self.members
    }
}

/// Bucket storage shared by the scaffold-based strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldMemory {
    nbmax: usize,
    minscore: f64,
    minsimilarity: f64,
    buckets: Vec<ScaffoldBucket>,
    by_key: HashMap<String, usize>,
}

#[derive(Serialize)]
struct ScaffoldRow<'a> {
    step: usize,
    scaffold: &'a str,
    bucket: usize,
    smiles: &'a str,
    score: f64,
    likelihood: f64,
}

impl ScaffoldMemory {
    fn new(config: &DiversityFilterConfig) -> Self {
        Self {
            nbmax: config.nbmax,
            minscore: config.minscore,
            minsimilarity: config.minsimilarity,
            buckets: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    fn find_bucket(&self, scaffold: &Scaffold, fingerprint: &Fingerprint, similarity: bool) -> Option<(usize, f64)> {
        if let Some(&index) = self.by_key.get(&scaffold.key) {
            return Some((index, 1.0));
        }
        if !similarity {
            return None;
        }
        self.buckets.iter().enumerate().find_map(|(index, bucket)| {
            let s = tanimoto(fingerprint, &bucket.fingerprint);
            (s > self.minsimilarity).then_some((index, s))
        })
    }

    fn adjust(
        &mut self,
        step: usize,
        candidate: &Candidate,
        raw_score: f64,
        scaffold: Scaffold,
        similarity: bool,
    ) -> f64 {
        let fingerprint = scaffold.molecule.fingerprint(DEFAULT_RADIUS);
        let (index, member_similarity) = match self.find_bucket(&scaffold, &fingerprint, similarity) {
            Some(found) => found,
            None => {
                self.by_key.insert(scaffold.key.clone(), self.buckets.len());
                self.buckets.push(ScaffoldBucket {
                    key: scaffold.key.clone(),
                    scaffold: scaffold.smiles.clone(),
                    fingerprint,
                    count: 0,
                    mean_similarity: 0.0,
                    members: Vec::new(),
                });
                (self.buckets.len() - 1, 1.0)
            }
        };

        let bucket = &mut self.buckets[index];
        bucket.count += 1;
        if bucket.count > self.nbmax {
            return 0.0;
        }
        bucket.members.push(BucketMember {
            step,
            smiles: candidate.smiles.clone(),
            scaffold: scaffold.smiles,
            score: raw_score,
            likelihood: candidate.agent_log_likelihood,
        });
        let n = bucket.members.len() as f64;
        bucket.mean_similarity += (member_similarity - bucket.mean_similarity) / n;
        raw_score
    }
}

/// Diversity strategy, chosen once from configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum DiversityFilter {
    IdenticalMurckoScaffold(ScaffoldMemory),
    IdenticalTopologicalScaffold(ScaffoldMemory),
    ScaffoldSimilarity(ScaffoldMemory),
    NoFilter,
}

impl DiversityFilter {
    pub fn from_config(config: &DiversityFilterConfig) -> Self {
        let memory = || ScaffoldMemory::new(config);
        match config.name {
            DiversityFilterName::IdenticalMurckoScaffold => Self::IdenticalMurckoScaffold(memory()),
            DiversityFilterName::IdenticalTopologicalScaffold => {
                Self::IdenticalTopologicalScaffold(memory())
            }
            DiversityFilterName::ScaffoldSimilarity => Self::ScaffoldSimilarity(memory()),
            DiversityFilterName::NoFilter => Self::NoFilter,
        }
    }

    fn memory(&self) -> Option<&ScaffoldMemory> {
        match self {
            Self::IdenticalMurckoScaffold(memory)
            | Self::IdenticalTopologicalScaffold(memory)
            | Self::ScaffoldSimilarity(memory) => Some(memory),
            Self::NoFilter => None,
        }
    }

    /// Adjusted reward for one candidate, updating bucket state.
    pub fn adjust(&mut self, step: usize, candidate: &Candidate, raw_score: f64) -> f64 {
        let (memory, murcko, similarity) = match self {
            Self::NoFilter => return raw_score,
            Self::IdenticalMurckoScaffold(memory) => (memory, true, false),
            Self::IdenticalTopologicalScaffold(memory) => (memory, false, false),
            Self::ScaffoldSimilarity(memory) => (memory, false, true),
        };
        if !candidate.valid || raw_score < memory.minscore {
            return raw_score;
        }
        let Ok(molecule) = Molecule::from_smiles(&candidate.smiles) else {
            return raw_score;
        };
        let scaffold = if murcko {
            molecule.murcko_scaffold()
        } else {
            molecule.topological_scaffold()
        };
        memory.adjust(step, candidate, raw_score, scaffold, similarity)
    }

    /// Adjusts a batch strictly in order.
    pub fn adjust_batch(&mut self, step: usize, candidates: &[Candidate], raw_scores: &[f64]) -> Vec<f64> {
        candidates
            .iter()
            .zip(raw_scores)
            .map(|(candidate, &raw)| self.adjust(step, candidate, raw))
            .collect()
    }

    /// Buckets in creation order; empty for `NoFilter`.
    pub fn buckets(&self) -> &[ScaffoldBucket] {
        self.memory()
            .map(|memory| memory.buckets.as_slice())
            .unwrap_or_default()
    }

    /// Writes every recorded member as `step, scaffold, bucket, smiles,
    /// score, likelihood`, buckets in creation order.
    pub fn write_csv(&self, path: &Path) -> MemoryResult<()> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| MemoryError::export(path, e))?;
        let mut rows = 0usize;
        for (bucket_index, bucket) in self.buckets().iter().enumerate() {
            for member in &bucket.members {
                writer
                    .serialize(ScaffoldRow {
                        step: member.step,
                        scaffold: &member.scaffold,
                        bucket: bucket_index,
                        smiles: &member.smiles,
                        score: member.score,
                        likelihood: member.likelihood,
                    })
                    .map_err(|e| MemoryError::export(path, e))?;
                rows += 1;
            }
        }
        if rows == 0 {
            writer
                .write_record(["step", "scaffold", "bucket", "smiles", "score", "likelihood"])
                .map_err(|e| MemoryError::export(path, e))?;
        }
        writer.flush().map_err(|e| MemoryError::export(path, e))?;
        debug!(path = %path.display(), rows, buckets = self.buckets().len(), "Wrote scaffold memory");
        Ok(())
    }
}
