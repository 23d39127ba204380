//! # Score Transforms
//!
//! Map a component's raw value into [0, 1].
//!
//! The sigmoid family uses base-10 logistic curves parameterised by the
//! interval `[low, high]`; `k` controls steepness around the midpoint.

use crate::error::{ScoringError, ScoringResult};
use config::{SpecificParameters, TransformationType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Clamp to [0, 1].
    Identity,
    Sigmoid { low: f64, high: f64, k: f64 },
    ReverseSigmoid { low: f64, high: f64, k: f64 },
    /// Rises around `low`, falls around `high`.
    DoubleSigmoid {
        low: f64,
        high: f64,
        coef_div: f64,
        coef_si: f64,
        coef_se: f64,
    },
    /// 1 inside `[low, high]`, 0 outside.
    Step { low: f64, high: f64 },
    /// 1 at or below `low`.
    LeftStep { low: f64 },
    /// 1 at or above `high`.
    RightStep { high: f64 },
}

impl Transform {
    pub fn from_parameters(component: &str, params: &SpecificParameters) -> ScoringResult<Self> {
        let need = |value: Option<f64>, parameter: &str| {
            value.ok_or_else(|| ScoringError::MissingTransformParameter {
                component: component.to_string(),
                parameter: parameter.to_string(),
            })
        };
        let transform = match params.transformation_type() {
            TransformationType::NoTransformation => Self::Identity,
            TransformationType::Sigmoid => Self::Sigmoid {
                low: need(params.low, "low")?,
                high: need(params.high, "high")?,
                k: need(params.k, "k")?,
            },
            TransformationType::ReverseSigmoid => Self::ReverseSigmoid {
                low: need(params.low, "low")?,
                high: need(params.high, "high")?,
                k: need(params.k, "k")?,
            },
            TransformationType::DoubleSigmoid => Self::DoubleSigmoid {
                low: need(params.low, "low")?,
                high: need(params.high, "high")?,
                coef_div: need(params.coef_div, "coef_div")?,
                coef_si: need(params.coef_si, "coef_si")?,
                coef_se: need(params.coef_se, "coef_se")?,
            },
            TransformationType::Step => Self::Step {
                low: need(params.low, "low")?,
                high: need(params.high, "high")?,
            },
            TransformationType::LeftStep => Self::LeftStep {
                low: need(params.low, "low")?,
            },
            TransformationType::RightStep => Self::RightStep {
                high: need(params.high, "high")?,
            },
        };

        let invalid = |reason: &str| ScoringError::InvalidTransform {
            component: component.to_string(),
            reason: reason.to_string(),
        };
        match transform {
            Self::Sigmoid { low, high, .. } | Self::ReverseSigmoid { low, high, .. }
                if high <= low =>
            {
                Err(invalid("high must be greater than low"))
            }
            Self::DoubleSigmoid { coef_div, .. } if coef_div == 0.0 => {
                Err(invalid("coef_div must not be zero"))
            }
            _ => Ok(transform),
        }
    }

    /// The transformed value in [0, 1]; NaN stays NaN so callers can apply
    /// their fallback.
    pub fn apply(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let y = match *self {
            Self::Identity => x,
            Self::Sigmoid { low, high, k } => {
                logistic10(10.0 * k * ((low + high) / 2.0 - x) / (high - low))
            }
            Self::ReverseSigmoid { low, high, k } => {
                logistic10(10.0 * k * (x - (low + high) / 2.0) / (high - low))
            }
            Self::DoubleSigmoid {
                low,
                high,
                coef_div,
                coef_si,
                coef_se,
            } => {
                let rising = logistic10(coef_se * (low - x) / coef_div);
                let falling = logistic10(coef_si * (high - x) / coef_div);
                rising - falling
            }
            Self::Step { low, high } => indicator(low <= x && x <= high),
            Self::LeftStep { low } => indicator(x <= low),
            Self::RightStep { high } => indicator(x >= high),
        };
        y.clamp(0.0, 1.0)
    }
}

/// `1 / (1 + 10^z)`, saturating instead of overflowing.
fn logistic10(z: f64) -> f64 {
    if z > 300.0 {
        0.0
    } else if z < -300.0 {
        1.0
    } else {
        1.0 / (1.0 + 10f64.powf(z))
    }
}

fn indicator(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigmoid() -> Transform {
        Transform::Sigmoid {
            low: 200.0,
            high: 400.0,
            k: 0.5,
        }
    }

    #[test]
    fn test_sigmoid_midpoint_and_tails() {
        let t = sigmoid();
        assert!((t.apply(300.0) - 0.5).abs() < 1e-12);
        assert!(t.apply(100.0) < 0.01);
        assert!(t.apply(500.0) > 0.99);
        assert!(t.apply(250.0) < t.apply(350.0));
    }

    #[test]
    fn test_reverse_sigmoid_mirrors_sigmoid() {
        let forward = sigmoid();
        let reverse = Transform::ReverseSigmoid {
            low: 200.0,
            high: 400.0,
            k: 0.5,
        };
        for x in [150.0, 260.0, 300.0, 333.0, 420.0] {
            assert!((forward.apply(x) + reverse.apply(x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_double_sigmoid_is_a_window() {
        let t = Transform::DoubleSigmoid {
            low: 2.0,
            high: 6.0,
            coef_div: 3.0,
            coef_si: 10.0,
            coef_se: 10.0,
        };
        assert!(t.apply(4.0) > 0.9);
        assert!(t.apply(-2.0) < 0.05);
        assert!(t.apply(10.0) < 0.05);
        assert_eq!(t.apply(1e9), 0.0);
        assert_eq!(t.apply(-1e9), 0.0);
    }

    #[test]
    fn test_steps() {
        let step = Transform::Step {
            low: 1.0,
            high: 3.0,
        };
        assert_eq!(step.apply(1.0), 1.0);
        assert_eq!(step.apply(3.5), 0.0);
        assert_eq!(Transform::LeftStep { low: 2.0 }.apply(2.0), 1.0);
        assert_eq!(Transform::LeftStep { low: 2.0 }.apply(2.1), 0.0);
        assert_eq!(Transform::RightStep { high: 2.0 }.apply(2.0), 1.0);
        assert_eq!(Transform::RightStep { high: 2.0 }.apply(1.9), 0.0);
    }

    #[test]
    fn test_identity_clamps_and_keeps_nan() {
        assert_eq!(Transform::Identity.apply(3.0), 1.0);
        assert_eq!(Transform::Identity.apply(-1.0), 0.0);
        assert!(Transform::Identity.apply(f64::NAN).is_nan());
    }

    #[test]
    fn test_from_parameters() {
        let params = SpecificParameters {
            transformation_type: Some(TransformationType::Sigmoid),
            low: Some(1.0),
            high: Some(2.0),
            ..SpecificParameters::default()
        };
        let err = Transform::from_parameters("mw", &params).unwrap_err();
        assert!(err.to_string().contains("needs k"));

        let params = SpecificParameters {
            k: Some(0.25),
            ..params
        };
        assert_eq!(
            Transform::from_parameters("mw", &params).unwrap(),
            Transform::Sigmoid {
                low: 1.0,
                high: 2.0,
                k: 0.25
            }
        );
        assert_eq!(
            Transform::from_parameters("mw", &SpecificParameters::default()).unwrap(),
            Transform::Identity
        );
    }
}
