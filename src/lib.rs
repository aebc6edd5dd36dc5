//! Structural analysis of differential-algebraic equation systems.
//!
//! This crate determines which state variables every residual of a DAE depends on, and at
//! which differentiation order, without integrating the system. The residual function is
//! evaluated over [`Signature`] values instead of numbers: each signature is either a
//! constant or a sparse set of `(variable, order)` pairs, and its operators propagate
//! dependency information rather than magnitudes. The result is a sparse sigma matrix
//! suited as input for index reduction or sparse solvers.
//!
//! # Features
//!
//! - Signature algebra with arithmetic, transcendental functions, powers and `diff`
//! - Sparse sigma matrices that scale to tens of millions of equations
//! - DAE residuals as plain Rust functions or as evalexpr expression strings
//! - Configurable progress reporting, failure and column policies
//! - Dense rendering and export of small matrices
//!
//! # Example
//!
//! ```rust
//! use sparse_sigma::prelude::*;
//!
//! fn pendulum(y: &[Signature], f: &mut [Signature], _: &()) -> Result<(), EvaluatorError> {
//!     // x'' = -λx, y'' = -λy - g, x² + y² = 1 over states (x, y, λ)
//!     f[0] = y[0].diff(2) + &y[2] * &y[0];
//!     f[1] = y[1].diff(2) + &y[2] * &y[1] + 9.81;
//!     f[2] = y[0].sqr() + y[1].sqr() - 1.0;
//!     Ok(())
//! }
//!
//! let mut matrix = SigmaMatrix::new(3);
//! matrix.compute_structure(&pendulum, &()).unwrap();
//!
//! assert_eq!(matrix.order_at(0, 0), Some(2));
//! assert_eq!(matrix.order_at(0, 2), Some(0));
//! assert_eq!(matrix.order_at(2, 2), None);
//! assert_eq!(matrix.nonzero_count(), 6);
//! ```

pub use matrix::SigmaMatrix;
pub use signature::Signature;
pub use system::ExpressionSystem;

pub mod prelude {
    pub use crate::backends::matrix::DenseMatrix;
    pub use crate::builder::{
        ColumnPolicy, FailurePolicy, LogProgress, NoProgress, ProgressObserver, StructureBuilder,
        StructureSummary,
    };
    pub use crate::errors::{EvaluatorError, StructureError};
    pub use crate::evaluator::DaeEvaluator;
    pub use crate::matrix::{SigmaMatrix, DEFAULT_RENDER_LIMIT};
    pub use crate::models::{self, Model};
    pub use crate::signature::Signature;
    pub use crate::system::ExpressionSystem;
    pub use crate::vector::SignatureVector;
}

/// Dense containers small matrices can be exported into
pub mod backends {
    pub mod matrix;
}
/// Structural computation driver
pub mod builder;
/// Conversion from parsed expressions to internal AST
pub mod convert;
/// Error types for the various failure modes
pub mod errors;
/// The DAE evaluator contract
pub mod evaluator;
/// Expression tree representation interpreted over signatures
pub mod expr;
/// The sparse sigma matrix
pub mod matrix;
/// Demonstration DAE systems
pub mod models;
/// Signature values and their algebra
pub mod signature;
/// Systems of residual expressions
pub mod system;
/// Fixed-length signature vectors
pub mod vector;
