//! Central finite-difference Jacobians.
//!
//! Used to cross-check analytic Jacobians; calibration itself runs on
//! analytic sensitivities.

use nalgebra::{DMatrix, DVector};

/// Computes `d f_i / d x_j` by central differences with absolute step `h`.
pub fn finite_difference_jacobian<E, F>(f: F, x: &DVector<f64>, h: f64) -> Result<DMatrix<f64>, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    let n = x.len();
    let mut columns = Vec::with_capacity(n);
    for j in 0..n {
        let mut up = x.clone();
        up[j] += h;
        let mut down = x.clone();
        down[j] -= h;
        columns.push((f(&up)? - f(&down)?) / (2.0 * h));
    }
    let m = columns.first().map_or(0, |c| c.len());
    Ok(DMatrix::from_fn(m, n, |i, j| columns[j][i]))
}
