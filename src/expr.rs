//! Expression module for representing DAE residuals.
//!
//! This module defines the expression tree that parsed residual strings are converted into.
//! The main types are:
//!
//! - `Expr`: An enum representing different kinds of mathematical expressions
//! - `VarRef`: A struct containing metadata about variables in expressions
//!
//! Instead of being evaluated numerically, an expression is interpreted over
//! [`Signature`] values: every node maps to the corresponding operator of the signature
//! algebra, so the result of interpreting a residual is its dependency structure.
//!
//! # Expression Tree Structure
//! The expression tree is built recursively with each node being one of:
//! - Leaf nodes: Constants and Variables
//! - Unary operations: Neg, Exp, Ln, Sqrt, Sqr and the trigonometric functions
//! - Binary operations: Add, Sub, Mul, Div, PowExpr
//! - Special nodes: PowFloat (constant exponent) and Diff (differentiation order)

use std::fmt;

use crate::errors::EvaluatorError;
use crate::signature::Signature;

/// Represents a reference to a variable in an expression.
///
/// Contains the variable's name as written in the residual and its index in the state
/// vector.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub index: usize,
}

/// An expression tree node representing mathematical operations.
///
/// The expression tree is built recursively using Box<Expr> for nested expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant floating point value
    Const(f64),
    /// A reference to a state variable
    Var(VarRef),
    /// Addition of two expressions
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction of two expressions
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication of two expressions
    Mul(Box<Expr>, Box<Expr>),
    /// Division of two expressions
    Div(Box<Expr>, Box<Expr>),
    /// Negation of an expression
    Neg(Box<Expr>),
    /// Exponentiation of an expression by a constant
    PowFloat(Box<Expr>, f64),
    /// Exponentiation of an expression by another expression
    PowExpr(Box<Expr>, Box<Expr>),
    /// Square of an expression
    Sqr(Box<Expr>),
    /// Square root of an expression
    Sqrt(Box<Expr>),
    /// Exponential function of an expression
    Exp(Box<Expr>),
    /// Natural logarithm of an expression
    Ln(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
    Asin(Box<Expr>),
    Acos(Box<Expr>),
    Atan(Box<Expr>),
    /// The expression differentiated the given number of times
    Diff(Box<Expr>, u32),
}

impl Expr {
    /// Interprets the expression over signature values.
    ///
    /// # Arguments
    /// * `y` - State signatures, indexed by `VarRef::index`
    ///
    /// # Returns
    /// The signature of the expression, or `EvaluatorError::IndexOutOfRange` if a variable
    /// refers past the end of `y`
    pub fn eval(&self, y: &[Signature]) -> Result<Signature, EvaluatorError> {
        Ok(match self {
            Expr::Const(value) => Signature::constant(*value),
            Expr::Var(var_ref) => {
                y.get(var_ref.index)
                    .cloned()
                    .ok_or(EvaluatorError::IndexOutOfRange {
                        index: var_ref.index,
                        len: y.len(),
                    })?
            }
            Expr::Add(left, right) => left.eval(y)? + right.eval(y)?,
            Expr::Sub(left, right) => left.eval(y)? - right.eval(y)?,
            Expr::Mul(left, right) => left.eval(y)? * right.eval(y)?,
            Expr::Div(left, right) => left.eval(y)? / right.eval(y)?,
            Expr::Neg(expr) => -expr.eval(y)?,
            Expr::PowFloat(base, exp) => base.eval(y)?.powf(*exp),
            Expr::PowExpr(base, exponent) => base.eval(y)?.pow(&exponent.eval(y)?),
            Expr::Sqr(expr) => expr.eval(y)?.sqr(),
            Expr::Sqrt(expr) => expr.eval(y)?.sqrt(),
            Expr::Exp(expr) => expr.eval(y)?.exp(),
            Expr::Ln(expr) => expr.eval(y)?.ln(),
            Expr::Sin(expr) => expr.eval(y)?.sin(),
            Expr::Cos(expr) => expr.eval(y)?.cos(),
            Expr::Tan(expr) => expr.eval(y)?.tan(),
            Expr::Asin(expr) => expr.eval(y)?.asin(),
            Expr::Acos(expr) => expr.eval(y)?.acos(),
            Expr::Atan(expr) => expr.eval(y)?.atan(),
            Expr::Diff(expr, order) => expr
                .eval(y)?
                .checked_diff(*order)
                .ok_or_else(|| EvaluatorError::OrderOverflow(self.to_string()))?,
        })
    }

    /// Largest variable index referenced by the expression.
    pub fn max_var_index(&self) -> Option<usize> {
        match self {
            Expr::Const(_) => None,
            Expr::Var(var_ref) => Some(var_ref.index),
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::PowExpr(left, right) => left.max_var_index().max(right.max_var_index()),
            Expr::Neg(expr)
            | Expr::PowFloat(expr, _)
            | Expr::Sqr(expr)
            | Expr::Sqrt(expr)
            | Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::Sin(expr)
            | Expr::Cos(expr)
            | Expr::Tan(expr)
            | Expr::Asin(expr)
            | Expr::Acos(expr)
            | Expr::Atan(expr)
            | Expr::Diff(expr, _) => expr.max_var_index(),
        }
    }
}

/// Implements string formatting for expressions.
///
/// Binary operations are wrapped in parentheses, functions use call notation and
/// differentiation is written as `diff(expr, order)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{val}"),
            Expr::Var(var_ref) => write!(f, "{0}", var_ref.name),
            Expr::Add(left, right) => write!(f, "({left} + {right})"),
            Expr::Sub(left, right) => write!(f, "({left} - {right})"),
            Expr::Mul(left, right) => write!(f, "({left} * {right})"),
            Expr::Div(left, right) => write!(f, "({left} / {right})"),
            Expr::Neg(expr) => write!(f, "-({expr})"),
            Expr::PowFloat(base, exp) => write!(f, "({base}^{exp})"),
            Expr::PowExpr(base, exponent) => write!(f, "({base}^{exponent})"),
            Expr::Sqr(expr) => write!(f, "sqr({expr})"),
            Expr::Sqrt(expr) => write!(f, "sqrt({expr})"),
            Expr::Exp(expr) => write!(f, "exp({expr})"),
            Expr::Ln(expr) => write!(f, "ln({expr})"),
            Expr::Sin(expr) => write!(f, "sin({expr})"),
            Expr::Cos(expr) => write!(f, "cos({expr})"),
            Expr::Tan(expr) => write!(f, "tan({expr})"),
            Expr::Asin(expr) => write!(f, "asin({expr})"),
            Expr::Acos(expr) => write!(f, "acos({expr})"),
            Expr::Atan(expr) => write!(f, "atan({expr})"),
            Expr::Diff(expr, order) => write!(f, "diff({expr}, {order})"),
        }
    }
}
