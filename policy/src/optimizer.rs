//! Adam over a flat parameter vector.

/// Adam optimizer state.
///
/// Minimizes: `step` moves parameters against the supplied gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    first_moment: Vec<f64>,
    second_moment: Vec<f64>,
    steps: u32,
}

impl Adam {
    pub fn new(learning_rate: f64, num_parameters: usize) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            first_moment: vec![0.0; num_parameters],
            second_moment: vec![0.0; num_parameters],
            steps: 0,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Forget all moment estimates, as for a freshly constructed optimizer.
    pub fn reset(&mut self) {
        self.first_moment.fill(0.0);
        self.second_moment.fill(0.0);
        self.steps = 0;
    }

    pub fn step(&mut self, parameters: &mut [f64], gradient: &[f64]) {
        debug_assert_eq!(parameters.len(), gradient.len());
        debug_assert_eq!(parameters.len(), self.first_moment.len());

        self.steps = self.steps.saturating_add(1);
        let t = i32::try_from(self.steps).unwrap_or(i32::MAX);
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);

        for (i, (param, &g)) in parameters.iter_mut().zip(gradient).enumerate() {
            if !g.is_finite() {
                continue;
            }
            let m = &mut self.first_moment[i];
            let v = &mut self.second_moment[i];
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *param -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut adam = Adam::new(0.1, 2);
        let mut params = vec![1.0, -1.0];
        adam.step(&mut params, &[3.0, -0.5]);
        assert!((params[0] - 0.9).abs() < 1e-6);
        assert!((params[1] + 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_minimizes_quadratic() {
        let mut adam = Adam::new(0.05, 1);
        let mut x = vec![5.0];
        for _ in 0..2000 {
            let grad = [2.0 * (x[0] - 2.0)];
            adam.step(&mut x, &grad);
        }
        assert!((x[0] - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut adam = Adam::new(0.1, 1);
        let mut x = vec![0.0];
        adam.step(&mut x, &[1.0]);
        adam.reset();
        assert_eq!(adam, Adam::new(0.1, 1));
    }

    #[test]
    fn test_non_finite_gradients_are_skipped() {
        let mut adam = Adam::new(0.1, 2);
        let mut params = vec![1.0, 1.0];
        adam.step(&mut params, &[f64::NAN, 1.0]);
        assert_eq!(params[0], 1.0);
        assert!(params[1] < 1.0);
    }
}
