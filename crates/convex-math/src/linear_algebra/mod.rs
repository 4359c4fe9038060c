//! Dense linear algebra for calibration systems.
//!
//! Calibration systems are square and small (tens to low hundreds of
//! unknowns), so a direct LU solve with partial pivoting is used. Every
//! factorisation is guarded by the pivot ratio `min |u_ii| / max |u_ii|`:
//! below the caller's threshold the matrix is reported as singular instead
//! of producing a meaningless step.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector, Dyn, LU};

/// Default guard on the LU pivot ratio.
pub const DEFAULT_SINGULARITY_THRESHOLD: f64 = 1e-14;

/// Returns `min |u_ii| / max |u_ii|` of an LU factorisation.
///
/// Zero means exactly singular.
#[must_use]
pub fn pivot_ratio(lu: &LU<f64, Dyn, Dyn>) -> f64 {
    let u = lu.u();
    let diagonal = u.diagonal();
    let (min, max) = diagonal.iter().fold((f64::INFINITY, 0.0_f64), |(lo, hi), d| {
        (lo.min(d.abs()), hi.max(d.abs()))
    });
    if max == 0.0 || !min.is_finite() {
        0.0
    } else {
        min / max
    }
}

fn factorise(a: &DMatrix<f64>, singularity_threshold: f64) -> MathResult<LU<f64, Dyn, Dyn>> {
    if a.nrows() != a.ncols() {
        return Err(MathError::invalid_input(format!(
            "matrix must be square, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("matrix contains non-finite entries"));
    }
    let lu = a.clone().lu();
    let ratio = pivot_ratio(&lu);
    if ratio < singularity_threshold {
        return Err(MathError::singular_matrix(ratio));
    }
    Ok(lu)
}

/// Solves the square system `A x = b`.
///
/// # Errors
///
/// Returns [`MathError::SingularMatrix`] when the pivot ratio falls below
/// `singularity_threshold`, and a dimension error for non-conforming inputs.
pub fn solve_linear_system(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    singularity_threshold: f64,
) -> MathResult<DVector<f64>> {
    if a.nrows() != b.len() {
        return Err(MathError::dimension_mismatch(a.shape(), (b.len(), 1)));
    }
    let lu = factorise(a, singularity_threshold)?;
    lu.solve(b)
        .ok_or_else(|| MathError::singular_matrix(0.0))
}

/// Inverts a square matrix.
///
/// # Errors
///
/// Same conditions as [`solve_linear_system`].
pub fn invert(a: &DMatrix<f64>, singularity_threshold: f64) -> MathResult<DMatrix<f64>> {
    let lu = factorise(a, singularity_threshold)?;
    lu.try_inverse()
        .ok_or_else(|| MathError::singular_matrix(0.0))
}

/// Infinity norm of a vector (largest absolute component).
#[must_use]
pub fn inf_norm(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}
