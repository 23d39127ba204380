//! # Training Guards
//!
//! Two independent checks that re-initialise the agent from the prior:
//! - [`ResetGuard`]: the agent has scored above a cutoff for long enough,
//!   so exploration restarts from the prior.
//! - [`MarginGuard`]: scores stay low while the agent already sits close to
//!   its targets, so the reward signal is too weak to learn from. Sigma is
//!   raised before the reset.

use std::collections::VecDeque;

/// Steps observed by the margin guard before it may fire.
pub const MARGIN_WINDOW: usize = 10;
/// Mean score below which the margin guard considers the run stalled.
pub const MARGIN_SCORE_CEILING: f64 = 0.15;
pub const SIGMA_GROWTH: f64 = 1.5;
/// Sigma never grows beyond this multiple of the configured value.
pub const SIGMA_CAP_FACTOR: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct ResetGuard {
    patience: usize,
    cutoff: f64,
    streak: usize,
}

impl ResetGuard {
    /// `patience == 0` disables the guard.
    pub fn new(patience: usize, cutoff: f64) -> Self {
        Self {
            patience,
            cutoff,
            streak: 0,
        }
    }

    pub fn streak(&self) -> usize {
        self.streak
    }

    /// Returns true when the agent should be reset after this step.
    pub fn observe(&mut self, mean_score: f64) -> bool {
        if self.patience == 0 {
            return false;
        }
        if mean_score > self.cutoff {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        if self.streak >= self.patience {
            self.streak = 0;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarginGuard {
    threshold: f64,
    base_sigma: f64,
    window: VecDeque<(f64, f64)>,
}

impl MarginGuard {
    /// `threshold <= 0` disables the guard.
    pub fn new(threshold: f64, base_sigma: f64) -> Self {
        Self {
            threshold,
            base_sigma,
            window: VecDeque::with_capacity(MARGIN_WINDOW),
        }
    }

    /// Records one step. Returns the raised sigma when the guard fires; the
    /// window is cleared in that case.
    pub fn observe(&mut self, mean_score: f64, mean_margin: f64, sigma: f64) -> Option<f64> {
        if self.threshold <= 0.0 {
            return None;
        }
        if self.window.len() == MARGIN_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back((mean_score, mean_margin));
        if self.window.len() < MARGIN_WINDOW {
            return None;
        }

        let n = self.window.len() as f64;
        let score = self.window.iter().map(|(s, _)| s).sum::<f64>() / n;
        let margin = self.window.iter().map(|(_, m)| m).sum::<f64>() / n;
        if score < MARGIN_SCORE_CEILING && margin < self.threshold {
            self.window.clear();
            Some((sigma * SIGMA_GROWTH).min(self.base_sigma * SIGMA_CAP_FACTOR))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_after_consecutive_high_scores() {
        let mut guard = ResetGuard::new(3, 0.5);
        assert!(!guard.observe(0.6));
        assert!(!guard.observe(0.7));
        assert!(!guard.observe(0.4));
        assert_eq!(guard.streak(), 0);
        assert!(!guard.observe(0.6));
        assert!(!guard.observe(0.6));
        assert!(guard.observe(0.6));
        assert_eq!(guard.streak(), 0);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let mut guard = ResetGuard::new(1, 0.5);
        assert!(!guard.observe(0.5));
        assert!(guard.observe(0.51));
    }

    #[test]
    fn test_disabled_reset_guard() {
        let mut guard = ResetGuard::new(0, 0.0);
        assert!((0..100).all(|_| !guard.observe(1.0)));
    }

    #[test]
    fn test_margin_guard_needs_a_full_window() {
        let mut guard = MarginGuard::new(50.0, 100.0);
        for _ in 0..MARGIN_WINDOW - 1 {
            assert_eq!(guard.observe(0.0, 1.0, 100.0), None);
        }
        assert_eq!(guard.observe(0.0, 1.0, 100.0), Some(150.0));
        for _ in 0..MARGIN_WINDOW - 1 {
            assert_eq!(guard.observe(0.0, 1.0, 150.0), None);
        }
    }

    #[test]
    fn test_margin_guard_ignores_healthy_runs() {
        let mut guard = MarginGuard::new(50.0, 100.0);
        for _ in 0..3 * MARGIN_WINDOW {
            assert_eq!(guard.observe(0.3, 1.0, 100.0), None);
        }
        let mut guard = MarginGuard::new(50.0, 100.0);
        for _ in 0..3 * MARGIN_WINDOW {
            assert_eq!(guard.observe(0.0, 80.0, 100.0), None);
        }
    }

    #[test]
    fn test_sigma_is_capped() {
        let mut guard = MarginGuard::new(50.0, 100.0);
        let mut sigma = 100.0;
        for _ in 0..20 * MARGIN_WINDOW {
            if let Some(raised) = guard.observe(0.0, 0.0, sigma) {
                sigma = raised;
            }
        }
        assert_eq!(sigma, 1000.0);
    }

    #[test]
    fn test_disabled_margin_guard() {
        let mut guard = MarginGuard::new(0.0, 100.0);
        assert!((0..100).all(|_| guard.observe(0.0, 0.0, 100.0).is_none()));
    }
}
