//! Log-linear interpolation.
//!
//! Interpolates the logarithm of values, which keeps interpolated values
//! positive. Used for discount factors, zero rates and price index levels.

use crate::error::{MathError, MathResult};
use crate::interpolation::{bracket, validate_nodes, Bracket, Interpolator};

/// Log-linear interpolation between data points.
///
/// ```text
/// y(x) = y_i^(1 - w) * y_{i+1}^w,   w = (x - x_i) / (x_{i+1} - x_i)
/// ```
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::{LogLinearInterpolator, Interpolator};
///
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Precomputed log(y) values
    log_ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no points, lengths differ, the x values
    /// are not strictly increasing, or any y value is non-positive.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys)?;

        let mut log_ys = Vec::with_capacity(ys.len());
        for (i, &y) in ys.iter().enumerate() {
            if y <= 0.0 {
                return Err(MathError::invalid_input(format!(
                    "y[{i}] = {y} is not positive; log-linear requires positive values"
                )));
            }
            log_ys.push(y.ln());
        }

        Ok(Self {
            xs,
            ys,
            log_ys,
            allow_extrapolation: false,
        })
    }

    /// Enables flat extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Returns the original y values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.ys
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        Ok(match bracket(&self.xs, x, self.allow_extrapolation)? {
            Bracket::Node(i) => self.ys[i],
            Bracket::Segment(i, w) => {
                (self.log_ys[i] + w * (self.log_ys[i + 1] - self.log_ys[i])).exp()
            }
        })
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        let mut sensitivity = vec![0.0; self.ys.len()];
        match bracket(&self.xs, x, self.allow_extrapolation)? {
            Bracket::Node(i) => sensitivity[i] = 1.0,
            Bracket::Segment(i, w) => {
                // dy/dy_i = (1 - w) y / y_i, dy/dy_{i+1} = w y / y_{i+1}
                let y = (self.log_ys[i] + w * (self.log_ys[i + 1] - self.log_ys[i])).exp();
                sensitivity[i] = (1.0 - w) * y / self.ys[i];
                sensitivity[i + 1] = w * y / self.ys[i + 1];
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
