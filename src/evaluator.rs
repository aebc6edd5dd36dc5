//! The DAE evaluator contract.
//!
//! A DAE evaluator computes residuals `f` from states `y` using only the [`Signature`]
//! algebra. Problem data (system size, physical constants) is passed through an opaque
//! parameter value `P`.

use crate::errors::EvaluatorError;
use crate::signature::Signature;

/// A DAE residual function that can be evaluated over signature values.
///
/// Implementations must be deterministic and must build every output slot from
/// [`Signature`] operators; plain `f64` arithmetic on extracted values would lose the
/// dependency information.
///
/// Functions and closures with a matching signature implement this trait:
///
/// ```rust
/// use sparse_sigma::prelude::*;
///
/// fn chain(y: &[Signature], f: &mut [Signature], _: &()) -> Result<(), EvaluatorError> {
///     f[0] = y[0].diff(1) - &y[1];
///     f[1] = y[1].sqr() + &y[0];
///     Ok(())
/// }
///
/// let mut matrix = SigmaMatrix::new(2);
/// matrix.compute_structure(&chain, &()).unwrap();
/// assert_eq!(matrix.order_at(0, 0), Some(1));
/// ```
pub trait DaeEvaluator<P: ?Sized> {
    /// Writes the residuals for states `y` into `f`.
    fn evaluate(&self, y: &[Signature], f: &mut [Signature], params: &P)
        -> Result<(), EvaluatorError>;
}

impl<P, F> DaeEvaluator<P> for F
where
    P: ?Sized,
    F: Fn(&[Signature], &mut [Signature], &P) -> Result<(), EvaluatorError>,
{
    fn evaluate(
        &self,
        y: &[Signature],
        f: &mut [Signature],
        params: &P,
    ) -> Result<(), EvaluatorError> {
        self(y, f, params)
    }
}

/// Checks that a state or residual slice has the expected length.
pub fn check_len(slice: &[Signature], expected: usize) -> Result<(), EvaluatorError> {
    if slice.len() != expected {
        return Err(EvaluatorError::LengthMismatch {
            expected,
            got: slice.len(),
        });
    }
    Ok(())
}
