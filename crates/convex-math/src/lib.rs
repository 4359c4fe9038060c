//! # Convex Math
//!
//! Numerical building blocks for multi-curve calibration.
//!
//! This crate provides:
//!
//! - **Interpolation**: node-based interpolators exposing node sensitivities
//! - **Linear Algebra**: guarded dense LU solves and inverses on `nalgebra`
//! - **Solvers**: a multi-dimensional Newton root finder for square systems
//!
//! ## Design Philosophy
//!
//! - **Analytic sensitivities**: every interpolated value can be differentiated
//!   with respect to its nodes, so calibration Jacobians never need bumping
//! - **Fail loudly**: singular systems and exhausted iteration budgets are
//!   errors, never silent partial results

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{Interpolator, LinearInterpolator, LogLinearInterpolator};
    pub use crate::linear_algebra::{invert, solve_linear_system};
    pub use crate::solvers::{
        finite_difference_jacobian, NewtonSolverConfig, NewtonVectorSolver, VectorFunction,
        VectorSolverResult,
    };
}

pub use error::{MathError, MathResult};
