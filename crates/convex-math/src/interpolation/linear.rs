//! Linear interpolation.

use crate::error::MathResult;
use crate::interpolation::{bracket, validate_nodes, Bracket, Interpolator};

/// Linear interpolation between data points.
///
/// A single node is accepted and yields a flat function.
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::{LinearInterpolator, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let interp = LinearInterpolator::new(xs, ys).unwrap();
/// let y = interp.interpolate(1.5).unwrap();
/// assert!((y - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no points, if lengths differ or if the
    /// x values are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys)?;
        Ok(Self {
            xs,
            ys,
            allow_extrapolation: false,
        })
    }

    /// Enables flat extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Returns the node values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.ys
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        Ok(match bracket(&self.xs, x, self.allow_extrapolation)? {
            Bracket::Node(i) => self.ys[i],
            Bracket::Segment(i, w) => self.ys[i] + w * (self.ys[i + 1] - self.ys[i]),
        })
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        let mut sensitivity = vec![0.0; self.ys.len()];
        match bracket(&self.xs, x, self.allow_extrapolation)? {
            Bracket::Node(i) => sensitivity[i] = 1.0,
            Bracket::Segment(i, w) => {
                sensitivity[i] = 1.0 - w;
                sensitivity[i + 1] = w;
            }
        }
        Ok(sensitivity)
    }

    fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}
