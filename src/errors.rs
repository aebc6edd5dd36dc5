//! Error types for the sparse-sigma crate.
//!
//! This module defines the error types that can occur while evaluating a DAE over
//! signature values, assembling the sigma matrix, and building expression systems.
//! The main error types are:
//!
//! - `EvaluatorError`: Raised by a DAE evaluator (malformed parameters, bad indices)
//! - `StructureError`: Failures of a structural computation or of matrix presentation
//! - `ConvertError`: Errors during conversion from evalexpr AST to internal representation
//! - `EquationError`: High-level errors when working with expression systems
//!
//! Each error type implements the standard Error trait and provides detailed error messages.

use evalexpr::{DefaultNumericTypes, EvalexprError};
use thiserror::Error;

/// Errors signalled by a DAE evaluator while it runs over signature values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    /// The opaque problem parameters cannot describe a valid system
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Input or output slices do not have the length the parameters imply
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    /// A formula addressed a variable slot that does not exist
    #[error("variable index {index} out of range for {len} variables")]
    IndexOutOfRange { index: usize, len: usize },
    /// Differentiating would raise a dependency order past `u32::MAX`
    #[error("differentiation order overflow in {0}")]
    OrderOverflow(String),
}

/// Errors that can occur while computing or presenting a sigma matrix.
///
/// A failed computation never modifies the matrix it was invoked on, unless the
/// builder was explicitly configured to keep going after evaluator failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructureError {
    /// The DAE evaluator returned an error
    #[error("error in evaluating the DAE function: {0}")]
    EvaluatorFailure(#[source] EvaluatorError),
    /// A residual depends on a column outside of `[0, size)`
    #[error("row {row} depends on column {column}, outside of a system of size {size}")]
    ColumnOutOfRange {
        row: usize,
        column: usize,
        size: usize,
    },
    /// Dense presentation was requested for a matrix above the allowed size
    #[error("matrix of size {size} is too large to render densely (limit {limit})")]
    TooLargeToRender { size: usize, limit: usize },
}

/// Errors that can occur during conversion from evalexpr AST to our internal AST representation.
///
/// This enum represents the failure modes when converting the evalexpr expression tree
/// into the `Expr` format that is interpreted over signature values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Error when encountering an operator that is not supported by our implementation
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Error when encountering a function that is not supported by our implementation
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),
    /// Error when a function is called with the wrong number of arguments
    #[error("Function {name} expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Error when the differentiation order of `diff` is not a non-negative integer literal
    #[error("Differentiation order must be a non-negative integer constant: {0}")]
    DiffOrder(String),
    /// Error when the root node does not have exactly one child
    #[error("Expected single child for root node: {0}")]
    RootNode(String),
    /// Error when a constant value is not numeric
    #[error("Expected numeric constant: {0}")]
    ConstOperator(String),
    /// Error when an identifier is neither a variable nor a bound constant
    #[error("Variable not found: {0}")]
    VariableNotFound(String),
}

/// High-level errors that can occur when working with expression systems.
#[derive(Debug, Error)]
pub enum EquationError {
    /// Error when parsing an expression string with evalexpr
    #[error("Failed to build Evalexpr AST")]
    BuildEvalexprError(#[from] EvalexprError<DefaultNumericTypes>),
    /// Error when converting from evalexpr AST to our signature AST
    #[error("Failed to build signature AST")]
    BuildSignatureError(#[from] ConvertError),
    /// Error when the number of equations differs from the number of variables
    #[error("System is not square: {equations} equations over {variables} variables")]
    NotSquare { equations: usize, variables: usize },
    /// Error when the input length is not the same as the number of variables
    #[error("Invalid input length: expected {expected}, got {got}")]
    InvalidInputLength { expected: usize, got: usize },
    /// Error raised while interpreting an equation
    #[error("Failed to evaluate equation")]
    Evaluation(#[from] EvaluatorError),
}
