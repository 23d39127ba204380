//! Maximum-likelihood fitting of a policy to encoded sequences.

use crate::model::TokenPolicy;
use crate::optimizer::Adam;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Settings for [`fit_maximum_likelihood`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub shuffle: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 128,
            learning_rate: 0.001,
            shuffle: true,
        }
    }
}

/// Mean negative log-likelihood of `sequences`, `None` for an empty set.
pub fn mean_negative_log_likelihood(policy: &TokenPolicy, sequences: &[Vec<usize>]) -> Option<f64> {
    if sequences.is_empty() {
        return None;
    }
    let total: f64 = sequences.iter().map(|s| -policy.log_likelihood(s)).sum();
    Some(total / sequences.len() as f64)
}

/// Minimizes the mean negative log-likelihood of `sequences` with Adam.
///
/// `on_epoch` is called after every epoch with the 1-based epoch number,
/// the policy and the epoch's mean loss, so callers can checkpoint. Returns
/// the mean loss per epoch.
pub fn fit_maximum_likelihood<R, F>(
    policy: &mut TokenPolicy,
    sequences: &[Vec<usize>],
    options: FitOptions,
    rng: &mut R,
    mut on_epoch: F,
) -> Vec<f64>
where
    R: Rng + ?Sized,
    F: FnMut(usize, &TokenPolicy, f64),
{
    let mut optimizer = Adam::new(options.learning_rate, policy.parameters().len());
    let mut order: Vec<usize> = (0..sequences.len()).collect();
    let mut losses = Vec::with_capacity(options.epochs);
    let batch_size = options.batch_size.max(1);

    for epoch in 1..=options.epochs {
        if options.shuffle {
            order.shuffle(rng);
        }
        let mut epoch_loss = 0.0;
        for batch in order.chunks(batch_size) {
            let mut grad = vec![0.0; policy.parameters().len()];
            let scale = -1.0 / batch.len() as f64;
            for &i in batch {
                epoch_loss -= policy.log_likelihood(&sequences[i]);
                policy.accumulate_log_likelihood_gradient(&sequences[i], scale, &mut grad);
            }
            optimizer.step(policy.parameters_mut(), &grad);
        }
        let mean = if sequences.is_empty() {
            0.0
        } else {
            epoch_loss / sequences.len() as f64
        };
        debug!(epoch, loss = mean, "Finished epoch");
        on_epoch(epoch, policy, mean);
        losses.push(mean);
    }

    if let (Some(first), Some(last)) = (losses.first(), losses.last()) {
        info!(epochs = options.epochs, first_loss = first, last_loss = last, "Fitted policy");
    }
    losses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_fitting_lowers_loss() {
        let vocab = Vocabulary::from_smiles(["CCO", "CCN"]).unwrap();
        let mut policy = TokenPolicy::uniform(vocab, 16);
        let sequences: Vec<Vec<usize>> = ["CCO", "CCO", "CCN"]
            .iter()
            .map(|s| policy.vocabulary().encode(s).unwrap())
            .collect();

        let before = mean_negative_log_likelihood(&policy, &sequences).unwrap();
        let options = FitOptions {
            epochs: 50,
            batch_size: 2,
            learning_rate: 0.05,
            shuffle: true,
        };
        let mut seen = Vec::new();
        let losses = fit_maximum_likelihood(
            &mut policy,
            &sequences,
            options,
            &mut StdRng::seed_from_u64(0),
            |epoch, _, _| seen.push(epoch),
        );
        let after = mean_negative_log_likelihood(&policy, &sequences).unwrap();

        assert_eq!(losses.len(), 50);
        assert_eq!(seen, (1..=50).collect::<Vec<_>>());
        assert!(after < before);
    }

    #[test]
    fn test_empty_set_has_no_loss() {
        let vocab = Vocabulary::from_smiles(["C"]).unwrap();
        let policy = TokenPolicy::uniform(vocab, 4);
        assert_eq!(mean_negative_log_likelihood(&policy, &[]), None);
    }
}
