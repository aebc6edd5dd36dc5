//! DAE systems written as expression strings.
//!
//! This module lets a DAE be specified as a list of residual strings instead of a Rust
//! function. Every residual is parsed with evalexpr, converted into an [`Expr`] tree and
//! interpreted over signature values, so an [`ExpressionSystem`] can be handed to the
//! structure builder like any other [`DaeEvaluator`].
//!
//! # Features
//!
//! - Automatic variable extraction and alphabetical ordering
//! - Explicit variable ordering through a variable map
//! - Identifiers bound to numeric constants (physical parameters)
//! - `diff(expr, d)` to mark a term as differentiated `d` times
//!
//! # Example
//!
//! ```
//! use sparse_sigma::system::ExpressionSystem;
//!
//! let system = ExpressionSystem::new(vec![
//!     "diff(x, 1) - y".to_string(),
//!     "x^2 + y^2 - 1".to_string(),
//! ]).unwrap();
//!
//! // Variables are sorted alphabetically (x, y)
//! let matrix = system.sigma_matrix().unwrap();
//! assert_eq!(matrix.order_at(0, 0), Some(1));
//! assert_eq!(matrix.order_at(0, 1), Some(0));
//! assert_eq!(matrix.order_at(1, 0), Some(0));
//! ```

use std::collections::HashMap;

use evalexpr::{build_operator_tree, Node};
use itertools::Itertools;
use tracing::debug;

use crate::convert::{build_ast, extract_all_symbols};
use crate::errors::{EquationError, EvaluatorError, StructureError};
use crate::evaluator::{check_len, DaeEvaluator};
use crate::expr::Expr;
use crate::matrix::SigmaMatrix;
use crate::signature::Signature;

/// A square system of residual expressions over named state variables.
#[derive(Debug, Clone)]
pub struct ExpressionSystem {
    /// The original string representations of the equations
    equations: Vec<String>,
    /// The AST representations of the equations
    asts: Vec<Expr>,
    /// Maps variable names to their indices in the state vector
    variable_map: HashMap<String, usize>,
    /// Variables in index order
    sorted_variables: Vec<String>,
}

impl ExpressionSystem {
    /// Creates a new system from residual strings.
    ///
    /// Variables are extracted from all expressions and assigned indices in alphabetical
    /// order. The number of equations must equal the number of variables.
    ///
    /// # Arguments
    /// * `expressions` - Vector of residual expressions as strings
    pub fn new(expressions: Vec<String>) -> Result<Self, EquationError> {
        Self::with_constants(expressions, HashMap::new())
    }

    /// Creates a new system in which the identifiers in `constants` are numeric parameters.
    ///
    /// # Example
    /// ```
    /// # use std::collections::HashMap;
    /// # use sparse_sigma::system::ExpressionSystem;
    /// let system = ExpressionSystem::with_constants(
    ///     vec!["-h2 * diff(u, 1) + D * v".to_string(), "v - u".to_string()],
    ///     HashMap::from([("h2".to_string(), 1.0), ("D".to_string(), 0.96)]),
    /// ).unwrap();
    /// assert_eq!(system.sorted_variables(), &["u".to_string(), "v".to_string()]);
    /// ```
    pub fn with_constants(
        expressions: Vec<String>,
        constants: HashMap<String, f64>,
    ) -> Result<Self, EquationError> {
        let sorted_variables = extract_all_symbols(&expressions, &constants)?;
        let variable_map = sorted_variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();

        Self::build(expressions, variable_map, &constants)
    }

    /// Creates a new system with an explicit variable ordering.
    ///
    /// # Example
    /// ```
    /// # use std::collections::HashMap;
    /// # use sparse_sigma::system::ExpressionSystem;
    /// let var_map: HashMap<String, usize> = [
    ///     ("y".to_string(), 0),
    ///     ("x".to_string(), 1),
    /// ].into_iter().collect();
    ///
    /// let system = ExpressionSystem::from_var_map(
    ///     vec!["diff(y, 2) + x".to_string(), "x - y".to_string()],
    ///     &var_map,
    /// ).unwrap();
    /// let matrix = system.sigma_matrix().unwrap();
    /// assert_eq!(matrix.order_at(0, 0), Some(2));
    /// ```
    pub fn from_var_map(
        expressions: Vec<String>,
        variable_map: &HashMap<String, usize>,
    ) -> Result<Self, EquationError> {
        Self::build(expressions, variable_map.clone(), &HashMap::new())
    }

    /// Same as [`ExpressionSystem::from_var_map`], with bound constants.
    pub fn from_var_map_with_constants(
        expressions: Vec<String>,
        variable_map: &HashMap<String, usize>,
        constants: &HashMap<String, f64>,
    ) -> Result<Self, EquationError> {
        Self::build(expressions, variable_map.clone(), constants)
    }

    fn build(
        equations: Vec<String>,
        variable_map: HashMap<String, usize>,
        constants: &HashMap<String, f64>,
    ) -> Result<Self, EquationError> {
        if equations.len() != variable_map.len() {
            return Err(EquationError::NotSquare {
                equations: equations.len(),
                variables: variable_map.len(),
            });
        }

        let asts = equations
            .iter()
            .map(|equation| -> Result<Expr, EquationError> {
                let node: Node = build_operator_tree(equation)?;
                Ok(build_ast(&node, &variable_map, constants)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sorted_variables = variable_map
            .iter()
            .sorted_by_key(|(_, index)| **index)
            .map(|(name, _)| name.clone())
            .collect();

        debug!(size = equations.len(), "built expression system");

        Ok(Self {
            equations,
            asts,
            variable_map,
            sorted_variables,
        })
    }

    /// Number of equations, equal to the number of variables.
    pub fn size(&self) -> usize {
        self.equations.len()
    }

    pub fn equations(&self) -> &[String] {
        &self.equations
    }

    pub fn asts(&self) -> &[Expr] {
        &self.asts
    }

    pub fn variables(&self) -> &HashMap<String, usize> {
        &self.variable_map
    }

    /// Returns the variable names in state vector order.
    pub fn sorted_variables(&self) -> &[String] {
        &self.sorted_variables
    }

    /// Interprets every residual over the given state signatures.
    pub fn eval(&self, y: &[Signature]) -> Result<Vec<Signature>, EquationError> {
        if y.len() != self.size() {
            return Err(EquationError::InvalidInputLength {
                expected: self.size(),
                got: y.len(),
            });
        }
        Ok(self
            .asts
            .iter()
            .map(|ast| ast.eval(y))
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Computes the sigma matrix of the system with the default builder configuration.
    pub fn sigma_matrix(&self) -> Result<SigmaMatrix, StructureError> {
        let mut matrix = SigmaMatrix::new(self.size());
        matrix.compute_structure(self, &())?;
        Ok(matrix)
    }
}

impl DaeEvaluator<()> for ExpressionSystem {
    fn evaluate(&self, y: &[Signature], f: &mut [Signature], _: &()) -> Result<(), EvaluatorError> {
        check_len(y, self.size())?;
        check_len(f, self.size())?;
        for (out, ast) in f.iter_mut().zip(&self.asts) {
            *out = ast.eval(y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models;

    fn diffusion_equations(n: usize) -> Vec<String> {
        let mut equations = vec!["-h2 * diff(u0, 1) + D * (u1 - 2 * u0 + ub)".to_string()];
        for i in 1..n {
            equations.push(format!(
                "-h2 * diff(u{i}, 1) + D * (u{} - 2 * u{i} + u{})",
                i + 1,
                i - 1
            ));
        }
        equations.push(format!("u{n} - u{}", n - 2));
        equations
    }

    #[test]
    fn test_matches_diffusion_model() {
        let n = 6;
        let var_map: HashMap<String, usize> = (0..=n).map(|i| (format!("u{i}"), i)).collect();
        let constants = HashMap::from([
            ("h2".to_string(), 1.0),
            ("D".to_string(), 0.96),
            ("ub".to_string(), 0.1),
        ]);
        let system =
            ExpressionSystem::from_var_map_with_constants(diffusion_equations(n), &var_map, &constants)
                .unwrap();

        let mut expected = SigmaMatrix::new(n + 1);
        expected
            .compute_structure(&models::molecular_diffusion, &n)
            .unwrap();

        assert_eq!(system.sigma_matrix().unwrap(), expected);
    }

    #[test]
    fn test_alphabetical_ordering() {
        let system = ExpressionSystem::new(vec![
            "c + diff(a, 1)".to_string(),
            "b".to_string(),
            "a * c".to_string(),
        ])
        .unwrap();
        assert_eq!(system.sorted_variables(), &["a", "b", "c"]);
        assert_eq!(system.variables()["c"], 2);
        assert_eq!(system.size(), 3);
        assert_eq!(system.equations()[1], "b");
        assert_eq!(system.asts().len(), 3);
    }

    #[test]
    fn test_eval() {
        let system =
            ExpressionSystem::new(vec!["diff(x, 2) * y".to_string(), "0 * x + y".to_string()])
                .unwrap();
        let y = crate::vector::SignatureVector::seeded(2);
        let f = system.eval(&y).unwrap();
        assert_eq!(f[0].order(0), 2);
        assert_eq!(f[0].order(1), 0);
        assert_eq!(f[1], Signature::variable(1));

        assert!(matches!(
            system.eval(&y[..1]),
            Err(EquationError::InvalidInputLength {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_not_square() {
        assert!(matches!(
            ExpressionSystem::new(vec!["x + y".to_string()]),
            Err(EquationError::NotSquare {
                equations: 1,
                variables: 2
            })
        ));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(matches!(
            ExpressionSystem::new(vec!["x + )".to_string()]),
            Err(EquationError::BuildEvalexprError(_))
        ));
        let var_map = HashMap::from([("x".to_string(), 0)]);
        assert!(matches!(
            ExpressionSystem::from_var_map(vec!["x + q".to_string()], &var_map),
            Err(EquationError::BuildSignatureError(_))
        ));
    }

    #[test]
    fn test_diff_order_overflow() {
        let system =
            ExpressionSystem::new(vec!["diff(diff(x, 4294967295), 1)".to_string()]).unwrap();
        assert!(matches!(
            system.sigma_matrix(),
            Err(StructureError::EvaluatorFailure(
                EvaluatorError::OrderOverflow(_)
            ))
        ));

        let system = ExpressionSystem::new(vec![
            "diff(x, 4294967295) + y".to_string(),
            "x - y".to_string(),
        ])
        .unwrap();
        let matrix = system.sigma_matrix().unwrap();
        assert_eq!(matrix.order_at(0, 0), Some(u32::MAX));
        assert_eq!(matrix.order_at(0, 1), Some(0));
    }

    #[test]
    fn test_out_of_range_var_map() {
        let var_map = HashMap::from([("x".to_string(), 3)]);
        let system = ExpressionSystem::from_var_map(vec!["diff(x, 1)".to_string()], &var_map).unwrap();
        assert_eq!(
            system.sigma_matrix(),
            Err(StructureError::EvaluatorFailure(
                EvaluatorError::IndexOutOfRange { index: 3, len: 1 }
            ))
        );
    }
}
