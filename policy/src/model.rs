//! # Token Policy
//!
//! A first-order autoregressive model over SMILES tokens: the distribution of
//! the next token depends on the previous token only. Parameters are one
//! logit per (context, next) pair stored row-major.
//!
//! The start token is never produced as a next token; its column is masked
//! out of every distribution.

use crate::error::{PolicyError, PolicyResult};
use crate::vocabulary::{END, START, Vocabulary};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const CHECKPOINT_FORMAT: &str = "molforge-policy/1";

/// Result of sampling one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSequence {
    /// Token indices starting with `^`, ending with `$` unless truncated.
    pub tokens: Vec<usize>,
    pub log_likelihood: f64,
    /// The length limit was reached before `$` was drawn.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenPolicy {
    vocabulary: Vocabulary,
    max_sequence_length: usize,
    logits: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckpointFile {
    format: String,
    vocabulary: Vocabulary,
    max_sequence_length: usize,
    logits: Vec<Vec<f64>>,
}

impl TokenPolicy {
    /// A policy with all logits zero: uniform over every non-start token.
    pub fn uniform(vocabulary: Vocabulary, max_sequence_length: usize) -> Self {
        let n = vocabulary.len();
        Self {
            vocabulary,
            max_sequence_length,
            logits: vec![0.0; n * n],
        }
    }

    /// Vocabulary and bigram logits estimated from a SMILES corpus with
    /// add-one smoothing. Corpus entries longer than `max_sequence_length`
    /// tokens still contribute counts.
    pub fn from_smiles_corpus(corpus: &[String], max_sequence_length: usize) -> PolicyResult<Self> {
        let vocabulary = Vocabulary::from_smiles(corpus.iter().map(String::as_str))?;
        if vocabulary.len() <= 2 {
            return Err(PolicyError::EmptyCorpus);
        }
        let n = vocabulary.len();
        let mut counts = vec![0.0_f64; n * n];
        for smiles in corpus {
            if let Some(tokens) = vocabulary.encode(smiles) {
                for pair in tokens.windows(2) {
                    counts[pair[0] * n + pair[1]] += 1.0;
                }
            }
        }

        let mut policy = Self::uniform(vocabulary, max_sequence_length);
        for context in 0..n {
            let row = &counts[context * n..(context + 1) * n];
            let total: f64 = row[1..].iter().sum::<f64>() + (n - 1) as f64;
            for next in 1..n {
                policy.logits[context * n + next] = ((row[next] + 1.0) / total).ln();
            }
        }
        debug!(tokens = n, sequences = corpus.len(), "Built policy from corpus");
        Ok(policy)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn max_sequence_length(&self) -> usize {
        self.max_sequence_length
    }

    pub fn num_tokens(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn parameters(&self) -> &[f64] {
        &self.logits
    }

    pub fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.logits
    }

    /// Next-token probabilities after `context`; index 0 is always 0.
    pub fn distribution(&self, context: usize) -> Vec<f64> {
        let n = self.num_tokens();
        let row = &self.logits[context * n..(context + 1) * n];
        let max = row[1..].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut probs = vec![0.0; n];
        let mut total = 0.0;
        for next in 1..n {
            let p = (row[next] - max).exp();
            probs[next] = p;
            total += p;
        }
        for p in &mut probs[1..] {
            *p /= total;
        }
        probs
    }

    fn log_probability(&self, context: usize, next: usize) -> f64 {
        if next == START {
            return f64::NEG_INFINITY;
        }
        let n = self.num_tokens();
        let row = &self.logits[context * n..(context + 1) * n];
        let max = row[1..].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_total = max + row[1..].iter().map(|x| (x - max).exp()).sum::<f64>().ln();
        row[next] - log_total
    }

    /// Summed log-probability of every transition in `tokens` under forced
    /// decoding. `tokens` starts with `^`.
    pub fn log_likelihood(&self, tokens: &[usize]) -> f64 {
        tokens
            .windows(2)
            .map(|pair| self.log_probability(pair[0], pair[1]))
            .sum()
    }

    /// Draws tokens until `$` or until `max_sequence_length` tokens follow
    /// the start token.
    pub fn sample_sequence<R: Rng + ?Sized>(&self, rng: &mut R) -> SampledSequence {
        let mut tokens = Vec::with_capacity(self.max_sequence_length + 1);
        tokens.push(START);
        let mut log_likelihood = 0.0;
        let mut context = START;
        for _ in 0..self.max_sequence_length {
            let probs = self.distribution(context);
            let next = draw(&probs, rng.random::<f64>());
            log_likelihood += probs[next].ln();
            tokens.push(next);
            if next == END {
                return SampledSequence {
                    tokens,
                    log_likelihood,
                    truncated: false,
                };
            }
            context = next;
        }
        SampledSequence {
            tokens,
            log_likelihood,
            truncated: true,
        }
    }

    /// Adds `scale * d log p(tokens) / d logits` to `grad`. For one
    /// transition the derivative is `onehot(next) - softmax(row)`.
    pub fn accumulate_log_likelihood_gradient(&self, tokens: &[usize], scale: f64, grad: &mut [f64]) {
        let n = self.num_tokens();
        for pair in tokens.windows(2) {
            let (context, next) = (pair[0], pair[1]);
            let probs = self.distribution(context);
            let row = &mut grad[context * n..(context + 1) * n];
            for j in 1..n {
                row[j] -= scale * probs[j];
            }
            row[next] += scale;
        }
    }

    /// Reads a JSON checkpoint. A missing file is a resource error, anything
    /// unreadable as a policy is a checkpoint error.
    pub fn load(path: &Path) -> PolicyResult<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(PolicyError::CheckpointNotFound { path: display });
        }
        let invalid = |reason: String| PolicyError::InvalidCheckpoint {
            path: display.clone(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let file: CheckpointFile =
            serde_json::from_str(&contents).map_err(|e| invalid(e.to_string()))?;
        if file.format != CHECKPOINT_FORMAT {
            return Err(invalid(format!("unsupported format {:?}", file.format)));
        }
        let n = file.vocabulary.len();
        if file.logits.len() != n || file.logits.iter().any(|row| row.len() != n) {
            return Err(invalid(format!("logits must be a {n}x{n} matrix")));
        }
        if file.max_sequence_length == 0 {
            return Err(invalid("max_sequence_length must be positive".to_string()));
        }
        Ok(Self {
            vocabulary: file.vocabulary,
            max_sequence_length: file.max_sequence_length,
            logits: file.logits.into_iter().flatten().collect(),
        })
    }

    pub fn save(&self, path: &Path) -> PolicyResult<()> {
        let n = self.num_tokens();
        let file = CheckpointFile {
            format: CHECKPOINT_FORMAT.to_string(),
            vocabulary: self.vocabulary.clone(),
            max_sequence_length: self.max_sequence_length,
            logits: self.logits.chunks(n).map(<[f64]>::to_vec).collect(),
        };
        let write_failed = |reason: String| PolicyError::WriteFailed {
            path: path.display().to_string(),
            reason,
        };
        let json = serde_json::to_string(&file).map_err(|e| write_failed(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| write_failed(e.to_string()))?;
        debug!(path = %path.display(), "Saved policy checkpoint");
        Ok(())
    }

    /// Fails unless `other` uses the identical vocabulary, in order.
    pub fn ensure_compatible(&self, other: &TokenPolicy) -> PolicyResult<()> {
        if self.vocabulary == other.vocabulary {
            Ok(())
        } else {
            Err(PolicyError::VocabularyMismatch {
                reason: format!(
                    "{} tokens vs {} tokens",
                    self.vocabulary.len(),
                    other.vocabulary.len()
                ),
            })
        }
    }
}

fn draw(probs: &[f64], u: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last = END;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last = i;
        if u < cumulative {
            return i;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn corpus() -> Vec<String> {
        ["CCO", "CCN", "CCCO", "OCCO"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_uniform_distribution_masks_start() {
        let vocab = Vocabulary::from_smiles(["CO"]).unwrap();
        let policy = TokenPolicy::uniform(vocab, 10);
        let probs = policy.distribution(START);
        assert_eq!(probs[START], 0.0);
        for p in &probs[1..] {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_log_likelihood_matches_sampled_likelihood() {
        let policy = TokenPolicy::from_smiles_corpus(&corpus(), 20).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let sampled = policy.sample_sequence(&mut rng);
            let forced = policy.log_likelihood(&sampled.tokens);
            assert!((forced - sampled.log_likelihood).abs() < 1e-9);
        }
    }

    #[test]
    fn test_corpus_counts_favour_observed_transitions() {
        let policy = TokenPolicy::from_smiles_corpus(&corpus(), 20).unwrap();
        let vocab = policy.vocabulary();
        let cco = vocab.encode("CCO").unwrap();
        let ooo = vocab.encode("OOO").unwrap();
        assert!(policy.log_likelihood(&cco) > policy.log_likelihood(&ooo));
    }

    #[test]
    fn test_truncation_at_max_length() {
        let vocab = Vocabulary::from_smiles(["C"]).unwrap();
        let mut policy = TokenPolicy::uniform(vocab, 3);
        let n = policy.num_tokens();
        // make `$` practically impossible
        for context in 0..n {
            policy.parameters_mut()[context * n + END] = -1e6;
        }
        let sampled = policy.sample_sequence(&mut StdRng::seed_from_u64(1));
        assert!(sampled.truncated);
        assert_eq!(sampled.tokens.len(), 4);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let mut policy = TokenPolicy::from_smiles_corpus(&corpus(), 20).unwrap();
        let tokens = policy.vocabulary().encode("CCO").unwrap();
        let mut grad = vec![0.0; policy.parameters().len()];
        policy.accumulate_log_likelihood_gradient(&tokens, 1.0, &mut grad);

        let eps = 1e-6;
        for index in [0, 3, 7, 12] {
            let base = policy.log_likelihood(&tokens);
            policy.parameters_mut()[index] += eps;
            let bumped = policy.log_likelihood(&tokens);
            policy.parameters_mut()[index] -= eps;
            let numeric = (bumped - base) / eps;
            assert!((numeric - grad[index]).abs() < 1e-4, "index {index}");
        }
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prior.ckpt");
        let policy = TokenPolicy::from_smiles_corpus(&corpus(), 32).unwrap();
        policy.save(&path).unwrap();
        assert_eq!(TokenPolicy::load(&path).unwrap(), policy);
    }

    #[test]
    fn test_missing_and_malformed_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TokenPolicy::load(&dir.path().join("absent.ckpt"));
        assert!(matches!(missing, Err(PolicyError::CheckpointNotFound { .. })));

        let path = dir.path().join("bad.ckpt");
        std::fs::write(&path, r#"{"format": "molforge-policy/1"}"#).unwrap();
        assert!(matches!(
            TokenPolicy::load(&path),
            Err(PolicyError::InvalidCheckpoint { .. })
        ));

        std::fs::write(
            &path,
            r#"{"format": "molforge-policy/1", "vocabulary": ["^", "$"],
                "max_sequence_length": 4, "logits": [[0.0]]}"#,
        )
        .unwrap();
        assert!(matches!(
            TokenPolicy::load(&path),
            Err(PolicyError::InvalidCheckpoint { .. })
        ));
    }

    #[test]
    fn test_incompatible_vocabularies() {
        let a = TokenPolicy::from_smiles_corpus(&corpus(), 8).unwrap();
        let b = TokenPolicy::from_smiles_corpus(&["CS".to_string()], 8).unwrap();
        assert!(a.ensure_compatible(&b).is_err());
        assert!(a.ensure_compatible(&a.clone()).is_ok());
    }
}
