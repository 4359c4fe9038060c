//! Interpolation on curve nodes.
//!
//! Curve calibration needs two things from an interpolator: the interpolated
//! value and the sensitivity of that value to every node value. The second
//! one is what turns a curve sensitivity (expressed at arbitrary times) into
//! a sensitivity to the curve's calibrated parameters.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: piecewise linear on the node values
//! - [`LogLinearInterpolator`]: piecewise linear on the log of the node values
//!
//! Both extrapolate flat when built with `with_extrapolation()`.

mod linear;
mod log_linear;

pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use crate::error::{MathError, MathResult};

/// Trait for node-based interpolation methods.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the derivative of the interpolated value at x with respect to
    /// each node value, in node order.
    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>>;

    /// Returns whether extrapolation is allowed.
    fn allows_extrapolation(&self) -> bool;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Returns true if x is within the data range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Position of a query point relative to the nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Bracket {
    /// Flat on a single node (single-node data, or flat extrapolation).
    Node(usize),
    /// Between node `i` and `i + 1` with weight `w` on node `i + 1`.
    Segment(usize, f64),
}

/// Validates node abscissae: non-empty, equal length, strictly increasing.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64]) -> MathResult<()> {
    if xs.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(MathError::invalid_input(format!(
                "x values must be strictly increasing (index {i}: {} <= {})",
                xs[i],
                xs[i - 1]
            )));
        }
    }
    if let Some(bad) = ys.iter().find(|y| !y.is_finite()) {
        return Err(MathError::invalid_input(format!("non-finite node value {bad}")));
    }
    Ok(())
}

/// Locates x among the nodes.
pub(crate) fn bracket(xs: &[f64], x: f64, allow_extrapolation: bool) -> MathResult<Bracket> {
    let n = xs.len();
    let (min, max) = (xs[0], xs[n - 1]);
    if !allow_extrapolation && (x < min || x > max) {
        return Err(MathError::ExtrapolationNotAllowed { x, min, max });
    }
    if x <= min {
        return Ok(Bracket::Node(0));
    }
    if x >= max {
        return Ok(Bracket::Node(n - 1));
    }
    let i = match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => return Ok(Bracket::Node(i)),
        Err(i) => i - 1,
    };
    let w = (x - xs[i]) / (xs[i + 1] - xs[i]);
    Ok(Bracket::Segment(i, w))
}
