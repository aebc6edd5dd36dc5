//! Demonstration DAE systems.
//!
//! Both models take the problem size `n` as their parameter and operate on `n + 1`
//! states and residuals:
//!
//! - [`molecular_diffusion`]: a chain of `n` molecules diffusing along a line, closed by an
//!   algebraic constraint. Its sigma matrix is tridiagonal.
//! - [`arc_length`]: the arc-length parametrised homotopy system of Layne Watson. Its first
//!   residual depends on the derivative of every state.

use std::fmt;

use crate::errors::EvaluatorError;
use crate::evaluator::{check_len, DaeEvaluator};
use crate::signature::Signature;

/// Lower end of the space interval of the diffusion model.
const X0: f64 = 0.0;
/// Upper end of the space interval of the diffusion model.
const XN: f64 = 10.0;
/// Diffusion constant.
const DIFFUSION: f64 = 0.96;
/// Boundary condition at the left end of the chain.
const BOUNDARY: f64 = 0.1;

/// Molecular diffusion: `f_i = -h²·u_i' + D·(u_{i+1} - 2·u_i + u_{i-1})`.
///
/// The first residual uses the boundary value in place of `u_{-1}`, the last residual is
/// the algebraic constraint `u_n - u_{n-2}`.
///
/// # Arguments
/// * `u` - States, length `n + 1`
/// * `f` - Residuals, length `n + 1`
/// * `n` - Number of molecules, at least 2
pub fn molecular_diffusion(
    u: &[Signature],
    f: &mut [Signature],
    n: &usize,
) -> Result<(), EvaluatorError> {
    let n = *n;
    if n < 2 {
        return Err(EvaluatorError::InvalidParameters(format!(
            "molecular diffusion needs at least 2 molecules, got {n}"
        )));
    }
    check_len(u, n + 1)?;
    check_len(f, n + 1)?;

    let h = (XN - X0) / 10.0;
    let h2 = h * h;

    f[0] = -h2 * u[0].diff(1) + DIFFUSION * (&u[1] - 2.0 * &u[0] + BOUNDARY);
    for i in 1..n {
        f[i] = -h2 * u[i].diff(1) + DIFFUSION * (&u[i + 1] - 2.0 * &u[i] + &u[i - 1]);
    }
    f[n] = &u[n] - &u[n - 2];

    Ok(())
}

/// Arc-length homotopy system.
///
/// `f_0 = -1 + Σ_k (x_k')²` fixes `s` to be the arc length, and the algebraic equations are
/// `f_i = x_i - λ·exp(cos(i·Σ_{k≥1} x_k))` with `λ = x_0`.
///
/// # Arguments
/// * `x` - States, length `n + 1`
/// * `f` - Residuals, length `n + 1`
/// * `n` - Number of algebraic equations, at least 1
pub fn arc_length(x: &[Signature], f: &mut [Signature], n: &usize) -> Result<(), EvaluatorError> {
    let n = *n;
    if n < 1 {
        return Err(EvaluatorError::InvalidParameters(
            "arc-length system needs at least 1 equation".to_string(),
        ));
    }
    check_len(x, n + 1)?;
    check_len(f, n + 1)?;

    let lambda = &x[0];

    f[0] = x
        .iter()
        .fold(Signature::constant(-1.0), |acc, xk| acc + xk.diff(1).sqr());

    let sum: Signature = x[1..=n].iter().sum();
    for i in 1..=n {
        f[i] = &x[i] - lambda * (i as f64 * &sum).cos().exp();
    }

    Ok(())
}

/// Selects one of the demonstration models by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// [`molecular_diffusion`]
    Diffusion,
    /// [`arc_length`]
    ArcLength,
}

impl Model {
    /// Number of equations for problem size `n`.
    pub fn system_size(&self, n: usize) -> usize {
        n + 1
    }
}

impl DaeEvaluator<usize> for Model {
    fn evaluate(
        &self,
        y: &[Signature],
        f: &mut [Signature],
        params: &usize,
    ) -> Result<(), EvaluatorError> {
        match self {
            Model::Diffusion => molecular_diffusion(y, f, params),
            Model::ArcLength => arc_length(y, f, params),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Diffusion => write!(f, "molecular diffusion"),
            Model::ArcLength => write!(f, "arc length"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::matrix::SigmaMatrix;

    fn compute(model: Model, n: usize) -> SigmaMatrix {
        let mut matrix = SigmaMatrix::new(model.system_size(n));
        matrix.compute_structure(&model, &n).unwrap();
        matrix
    }

    #[test]
    fn test_diffusion_is_tridiagonal() {
        let n = 10;
        let matrix = compute(Model::Diffusion, n);

        assert_eq!(matrix.row(0), Some(&BTreeMap::from([(0, 1), (1, 0)])));
        for i in 1..n {
            assert_eq!(
                matrix.row(i),
                Some(&BTreeMap::from([(i - 1, 0), (i, 1), (i + 1, 0)])),
                "row {i}"
            );
        }
        // closing algebraic constraint
        assert_eq!(matrix.row(n), Some(&BTreeMap::from([(n - 2, 0), (n, 0)])));
        assert_eq!(matrix.nonzero_count(), 3 * n + 1);
    }

    #[test]
    fn test_arc_length_dense_first_row() {
        let n = 10;
        let matrix = compute(Model::ArcLength, n);

        for col in 0..=n {
            assert_eq!(matrix.order_at(0, col), Some(1), "column {col}");
        }
        // no residual after the first involves a derivative
        for row in 1..=n {
            for col in 0..=n {
                assert_eq!(matrix.order_at(row, col), Some(0), "entry ({row}, {col})");
            }
        }
        assert_eq!(matrix.max_order(), Some(1));
        assert_eq!(matrix.nonzero_count(), (n + 1) * (n + 1));
    }

    #[test]
    fn test_diffusion_scales_sparsely() {
        let n = 200_000;
        let matrix = compute(Model::Diffusion, n);
        assert_eq!(matrix.row_count(), n + 1);
        assert_eq!(matrix.nonzero_count(), 3 * n + 1);
        assert!(matrix.rows().all(|row| row.len() <= 3));
        assert_eq!(matrix.order_at(n / 2, n / 2), Some(1));
    }

    #[test]
    fn test_invalid_parameters() {
        let mut matrix = SigmaMatrix::new(2);
        assert!(matrix.compute_structure(&Model::Diffusion, &1).is_err());
        assert!(matrix.compute_structure(&Model::ArcLength, &0).is_err());

        let mut y = vec![Signature::variable(0); 3];
        let mut f = vec![Signature::zero(); 3];
        assert_eq!(
            molecular_diffusion(&y, &mut f, &5),
            Err(EvaluatorError::LengthMismatch {
                expected: 6,
                got: 3
            })
        );
        y.push(Signature::variable(3));
        assert_eq!(
            arc_length(&y, &mut f, &3),
            Err(EvaluatorError::LengthMismatch {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn test_model_display() {
        assert_eq!(Model::Diffusion.to_string(), "molecular diffusion");
        assert_eq!(Model::ArcLength.system_size(10), 11);
    }
}
