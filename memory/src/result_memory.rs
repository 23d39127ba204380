//! Best score seen for every unique valid SMILES, exported as `memory.csv`.

use crate::error::{MemoryError, MemoryResult};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub smiles: String,
    pub score: f64,
    /// Agent log-likelihood when the best score was recorded.
    pub likelihood: f64,
    pub step: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ResultMemory {
    entries: HashMap<String, ResultEntry>,
}

#[derive(Serialize)]
struct ResultRow<'a> {
    index: usize,
    smiles: &'a str,
    score: f64,
    likelihood: f64,
}

impl ResultMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, smiles: &str) -> Option<&ResultEntry> {
        self.entries.get(smiles)
    }

    /// Keeps the entry only when the SMILES is new or the score improves.
    pub fn record(&mut self, step: usize, smiles: &str, score: f64, likelihood: f64) -> bool {
        if !score.is_finite() {
            return false;
        }
        match self.entries.get_mut(smiles) {
            Some(existing) if existing.score >= score => false,
            Some(existing) => {
                existing.score = score;
                existing.likelihood = likelihood;
                existing.step = step;
                true
            }
            None => {
                self.entries.insert(
                    smiles.to_string(),
                    ResultEntry {
                        smiles: smiles.to_string(),
                        score,
                        likelihood,
                        step,
                    },
                );
                true
            }
        }
    }

    /// Entries by descending score, ties broken by SMILES.
    pub fn sorted(&self) -> Vec<&ResultEntry> {
        let mut entries: Vec<&ResultEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.smiles.cmp(&b.smiles)));
        entries
    }

    pub fn write_csv(&self, path: &Path) -> MemoryResult<()> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| MemoryError::export(path, e))?;
        let sorted = self.sorted();
        if sorted.is_empty() {
            writer
                .write_record(["index", "smiles", "score", "likelihood"])
                .map_err(|e| MemoryError::export(path, e))?;
        }
        for (index, entry) in sorted.iter().enumerate() {
            writer
                .serialize(ResultRow {
                    index,
                    smiles: &entry.smiles,
                    score: entry.score,
                    likelihood: entry.likelihood,
                })
                .map_err(|e| MemoryError::export(path, e))?;
        }
        writer.flush().map_err(|e| MemoryError::export(path, e))?;
        debug!(path = %path.display(), rows = sorted.len(), "Wrote result memory");
        Ok(())
    }
}
