//! Result directory layout and SMILES file input.

use crate::error::{TrainingError, TrainingResult};
use config::RunConfiguration;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const AGENT_FILE: &str = "Agent.ckpt";
pub const INPUT_FILE: &str = "input.json";
pub const MEMORY_FILE: &str = "memory.csv";
pub const SCAFFOLD_MEMORY_FILE: &str = "scaffold_memory.csv";
pub const SCORED_SMILES_FILE: &str = "scored_smiles.csv";

/// Paths of everything a run writes into `logging.resultdir`.
#[derive(Debug, Clone)]
pub struct ResultArtifacts {
    dir: PathBuf,
}

impl ResultArtifacts {
    /// Creates the directory if needed. Failure here is fatal before any
    /// training step runs.
    pub fn prepare(dir: &Path) -> TrainingResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| TrainingError::ResultDirectory {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(dir = %dir.display(), "Prepared result directory");
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn agent(&self) -> PathBuf {
        self.dir.join(AGENT_FILE)
    }

    pub fn input(&self) -> PathBuf {
        self.dir.join(INPUT_FILE)
    }

    pub fn memory(&self) -> PathBuf {
        self.dir.join(MEMORY_FILE)
    }

    pub fn scaffold_memory(&self) -> PathBuf {
        self.dir.join(SCAFFOLD_MEMORY_FILE)
    }

    pub fn scored_smiles(&self) -> PathBuf {
        self.dir.join(SCORED_SMILES_FILE)
    }

    /// Copies the effective configuration next to the results.
    pub fn write_input(&self, config: &RunConfiguration) -> TrainingResult<PathBuf> {
        let path = self.input();
        let json =
            serde_json::to_string_pretty(config).map_err(|e| TrainingError::output(&path, e))?;
        std::fs::write(&path, json).map_err(|e| TrainingError::output(&path, e))?;
        Ok(path)
    }
}

/// Reads SMILES one per line. Only the first comma, tab or space separated
/// field is used; blank lines, `#` comments and a leading `smiles` header
/// are skipped.
pub fn read_smiles_file(path: &Path) -> TrainingResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| TrainingError::input(path, e))?;
    let mut smiles = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(field) = line.split([',', '\t', ' ']).next().filter(|f| !f.is_empty()) else {
            warn!(path = %path.display(), line = i + 1, "Skipping line without a SMILES field");
            continue;
        };
        if i == 0 && field.eq_ignore_ascii_case("smiles") {
            continue;
        }
        smiles.push(field.to_string());
    }
    if smiles.is_empty() {
        return Err(TrainingError::EmptyInput {
            path: path.display().to_string(),
        });
    }
    Ok(smiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mol_core::RunType;

    #[test]
    fn test_prepare_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ResultArtifacts::prepare(&dir.path().join("a").join("b")).unwrap();
        assert!(artifacts.dir().is_dir());
        assert!(artifacts.agent().ends_with("Agent.ckpt"));
    }

    #[test]
    fn test_prepare_fails_on_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ResultArtifacts::prepare(file.path()),
            Err(TrainingError::ResultDirectory { .. })
        ));
    }

    #[test]
    fn test_input_copy_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ResultArtifacts::prepare(dir.path()).unwrap();
        let config = RunConfiguration::new(RunType::Sampling);
        let path = artifacts.write_input(&config).unwrap();
        let read: RunConfiguration =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(read, config);
    }

    #[test]
    fn test_read_smiles_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.smi");
        std::fs::write(&path, "SMILES,id\nCCO,1\n\n# comment\nc1ccccc1\tbenzene\nCCN\n").unwrap();
        assert_eq!(read_smiles_file(&path).unwrap(), vec!["CCO", "c1ccccc1", "CCN"]);
    }

    #[test]
    fn test_empty_and_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.smi");
        std::fs::write(&path, "\n# nothing\n").unwrap();
        assert!(matches!(read_smiles_file(&path), Err(TrainingError::EmptyInput { .. })));
        assert!(matches!(
            read_smiles_file(&dir.path().join("missing.smi")),
            Err(TrainingError::Input { .. })
        ));
    }
}
