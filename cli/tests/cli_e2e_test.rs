use assert_cmd::{Command, cargo_bin_cmd};
use config::RunConfiguration;
use predicates::prelude::predicate;
use std::path::{Path, PathBuf};
use testing::{corpus_policy, rl_config, similarity_function, write_policy};

fn molforge() -> Command {
    cargo_bin_cmd!("molforge")
}

fn write_config(dir: &Path, name: &str, config: &RunConfiguration) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}

const CORPUS: [&str; 4] = ["CCO", "CCCO", "CCCCO", "c1ccccc1"];

mod help_and_version {
    use super::*;

    #[test]
    fn test_help_flag() {
        molforge()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("Commands:"));
    }

    #[test]
    fn test_version_flag() {
        molforge()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("molforge"));
    }

    #[test]
    fn test_no_args_fails() {
        molforge().assert().failure();
    }

    #[test]
    fn test_run_help_mentions_config() {
        molforge()
            .args(["run", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("CONFIG"));
    }
}

mod validate {
    use super::*;

    #[test]
    fn test_valid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let prior = write_policy(dir.path(), "prior.ckpt", &corpus_policy(&CORPUS, 24));
        let path = write_config(dir.path(), "run.json", &rl_config(dir.path(), &prior));

        molforge()
            .arg("validate")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("valid reinforcement_learning configuration"));
    }

    #[test]
    fn test_invalid_configuration_lists_fields() {
        let dir = tempfile::tempdir().unwrap();
        let prior = write_policy(dir.path(), "prior.ckpt", &corpus_policy(&CORPUS, 24));
        let mut config = rl_config(dir.path(), &prior);
        config.logging.logging_frequency = 0;
        config.parameters.scoring_function = None;
        let path = write_config(dir.path(), "run.json", &config);

        molforge()
            .arg("validate")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("logging.logging_frequency"))
            .stderr(predicate::str::contains("scoring_function"));
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let prior = write_policy(dir.path(), "prior.ckpt", &corpus_policy(&CORPUS, 24));
        let path = write_config(dir.path(), "run.json", &rl_config(dir.path(), &prior));

        let output = molforge()
            .args(["validate", "--json"])
            .arg(&path)
            .output()
            .unwrap();
        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["valid"], true);
        assert_eq!(report["issues"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_file() {
        molforge()
            .args(["validate", "does-not-exist.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does-not-exist.json"));
    }
}

mod sample {
    use super::*;

    #[test]
    fn test_sample_prints_requested_count() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_policy(dir.path(), "model.ckpt", &corpus_policy(&CORPUS, 24));

        let output = molforge()
            .args(["sample", "-n", "12", "--seed", "4", "--batch-size", "5", "--model"])
            .arg(&model)
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.lines().count(), 12);
        assert!(stdout.lines().all(|line| line.contains('\t')));
    }

    #[test]
    fn test_sample_missing_model() {
        molforge()
            .args(["sample", "--model", "absent.ckpt"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot load model"));
    }
}

mod score {
    use super::*;

    #[test]
    fn test_score_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfiguration::new(mol_core::RunType::Scoring);
        config.parameters.scoring_function = Some(similarity_function("CCCCO"));
        let path = write_config(dir.path(), "score.json", &config);

        let output = molforge()
            .args(["score", "--json", "--config"])
            .arg(&path)
            .args(["CCCCO", "C1CC"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(rows[0]["total_score"], 1.0);
        assert_eq!(rows[1]["valid"], false);
    }
}

mod run {
    use super::*;

    #[test]
    fn test_run_reinforcement_learning() {
        let dir = tempfile::tempdir().unwrap();
        let prior = write_policy(dir.path(), "prior.ckpt", &corpus_policy(&CORPUS, 24));
        let mut config = rl_config(dir.path(), &prior);
        config.logging.job_id = Some("e2e".to_string());
        if let Some(rl) = config.parameters.reinforcement_learning.as_mut() {
            rl.n_steps = 2;
        }
        let resultdir = config.logging.resultdir.clone();
        let path = write_config(dir.path(), "run.json", &config);

        let output = molforge().args(["run", "--json"]).arg(&path).output().unwrap();
        assert!(output.status.success());
        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["steps_completed"], 2);
        assert_eq!(result["job_id"], "e2e");
        assert!(resultdir.join("Agent.ckpt").exists());
    }

    #[test]
    fn test_run_missing_prior() {
        let dir = tempfile::tempdir().unwrap();
        let config = rl_config(dir.path(), &dir.path().join("absent.ckpt"));
        let path = write_config(dir.path(), "run.json", &config);

        molforge()
            .arg("run")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("absent.ckpt"));
    }
}
