//! Node-interpolated function of model time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use convex_math::interpolation::{Interpolator, LinearInterpolator, LogLinearInterpolator};
use convex_math::MathResult;

/// Interpolation scheme between curve nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Linear on node values.
    #[default]
    Linear,
    /// Linear on the log of node values; node values must be positive.
    LogLinear,
}

/// Node values at increasing times, interpolated with flat extrapolation.
#[derive(Clone)]
pub struct InterpolatedCurve {
    xs: Vec<f64>,
    ys: Vec<f64>,
    method: InterpolationMethod,
    interpolator: Arc<dyn Interpolator>,
}

impl fmt::Debug for InterpolatedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpolatedCurve")
            .field("xs", &self.xs)
            .field("ys", &self.ys)
            .field("method", &self.method)
            .finish()
    }
}

impl InterpolatedCurve {
    /// Builds the curve; fails on empty, unsorted or (log-linear) non-positive nodes.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, method: InterpolationMethod) -> MathResult<Self> {
        let interpolator: Arc<dyn Interpolator> = match method {
            InterpolationMethod::Linear => {
                Arc::new(LinearInterpolator::new(xs.clone(), ys.clone())?.with_extrapolation())
            }
            InterpolationMethod::LogLinear => {
                Arc::new(LogLinearInterpolator::new(xs.clone(), ys.clone())?.with_extrapolation())
            }
        };
        Ok(Self {
            xs,
            ys,
            method,
            interpolator,
        })
    }

    /// Value at `t`.
    pub fn value(&self, t: f64) -> MathResult<f64> {
        self.interpolator.interpolate(t)
    }

    /// Derivative of the value at `t` with respect to each node value.
    pub fn node_sensitivity(&self, t: f64) -> MathResult<Vec<f64>> {
        self.interpolator.node_sensitivity(t)
    }

    /// Node times.
    #[must_use]
    pub fn x_data(&self) -> &[f64] {
        &self.xs
    }

    /// Node values.
    #[must_use]
    pub fn y_data(&self) -> &[f64] {
        &self.ys
    }

    /// Interpolation scheme.
    #[must_use]
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false; construction rejects empty node sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_extrapolation_both_sides() {
        let curve =
            InterpolatedCurve::new(vec![1.0, 2.0], vec![0.03, 0.04], InterpolationMethod::Linear)
                .unwrap();
        assert_relative_eq!(curve.value(0.0).unwrap(), 0.03);
        assert_relative_eq!(curve.value(1.5).unwrap(), 0.035);
        assert_relative_eq!(curve.value(10.0).unwrap(), 0.04);
        assert_eq!(curve.node_sensitivity(10.0).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_log_linear_rejects_non_positive_nodes() {
        assert!(InterpolatedCurve::new(
            vec![1.0, 2.0],
            vec![0.03, -0.01],
            InterpolationMethod::LogLinear
        )
        .is_err());
    }

    #[test]
    fn test_single_node_is_flat() {
        let curve =
            InterpolatedCurve::new(vec![0.5], vec![0.02], InterpolationMethod::LogLinear).unwrap();
        assert_relative_eq!(curve.value(3.0).unwrap(), 0.02, epsilon = 1e-15);
        assert_eq!(curve.len(), 1);
    }
}
