//! Conversion module for transforming evalexpr AST nodes into our internal expression representation.
//!
//! This module handles converting the AST nodes from the evalexpr crate into the `Expr`
//! trees that are interpreted over signature values. It maps variables, bound constants,
//! operators, and function calls into our internal representation.
//!
//! The main entry point is the `build_ast` function which recursively traverses the
//! evalexpr AST and builds up our expression tree.

use std::collections::{HashMap, HashSet};

use crate::{
    errors::{ConvertError, EquationError},
    expr::{Expr, VarRef},
};
use evalexpr::{build_operator_tree, Node, Operator};

/// Converts an evalexpr AST node into our internal expression representation.
///
/// # Arguments
/// * `node` - The evalexpr AST node to convert
/// * `var_map` - A mapping of variable names to their indices in the state vector
/// * `constants` - Identifiers bound to numeric values instead of state variables
///
/// # Returns
/// * `Result<Expr, ConvertError>` - The converted expression or an error if conversion fails
///
/// # Examples of supported operations:
/// * Basic arithmetic: +, -, *, /
/// * Variables: x, y, etc.
/// * Constants: integer and floating point numbers, bound identifiers
/// * Functions: sqr, sqrt, exp, ln, log, sin, cos, tan, asin, acos, atan, pow(a, b)
/// * Differentiation: diff(x, d) where d is a non-negative integer constant
/// * Exponentiation: x^y
pub fn build_ast(
    node: &Node,
    var_map: &HashMap<String, usize>,
    constants: &HashMap<String, f64>,
) -> Result<Expr, ConvertError> {
    let convert = |child: &Node| build_ast(child, var_map, constants).map(Box::new);

    match node.operator() {
        // Addition operator - combines multiple children into a series of binary Add expressions
        Operator::Add => {
            let children = node.children();
            children
                .iter()
                .skip(1)
                .try_fold(build_ast(&children[0], var_map, constants)?, |acc, child| {
                    Ok(Expr::Add(Box::new(acc), convert(child)?))
                })
        }
        // Multiplication operator - combines multiple children into a series of binary Mul expressions
        Operator::Mul => {
            let children = node.children();
            children
                .iter()
                .skip(1)
                .try_fold(build_ast(&children[0], var_map, constants)?, |acc, child| {
                    Ok(Expr::Mul(Box::new(acc), convert(child)?))
                })
        }
        Operator::Sub => {
            let children = node.children();
            Ok(Expr::Sub(convert(&children[0])?, convert(&children[1])?))
        }
        Operator::Div => {
            let children = node.children();
            Ok(Expr::Div(convert(&children[0])?, convert(&children[1])?))
        }
        Operator::Neg => {
            let children = node.children();
            Ok(Expr::Neg(convert(&children[0])?))
        }
        Operator::Const { value } => numeric_value(value).map(Expr::Const),
        // Variable reference - either a state variable or a bound constant
        Operator::VariableIdentifierRead { identifier } => {
            if let Some(index) = var_map.get(identifier.as_str()) {
                Ok(Expr::Var(VarRef {
                    name: identifier.to_string(),
                    index: *index,
                }))
            } else if let Some(value) = constants.get(identifier.as_str()) {
                Ok(Expr::Const(*value))
            } else {
                Err(ConvertError::VariableNotFound(identifier.to_string()))
            }
        }
        Operator::FunctionIdentifier { identifier } => {
            let args = function_args(node);
            let name = identifier.as_str();
            let unary = |build: fn(Box<Expr>) -> Expr| -> Result<Expr, ConvertError> {
                expect_arity(name, &args, 1)?;
                Ok(build(convert(args[0])?))
            };
            match name {
                "sqr" => unary(Expr::Sqr),
                "sqrt" => unary(Expr::Sqrt),
                "exp" => unary(Expr::Exp),
                "ln" | "log" => unary(Expr::Ln),
                "sin" => unary(Expr::Sin),
                "cos" => unary(Expr::Cos),
                "tan" => unary(Expr::Tan),
                "asin" => unary(Expr::Asin),
                "acos" => unary(Expr::Acos),
                "atan" => unary(Expr::Atan),
                "pow" => {
                    expect_arity(name, &args, 2)?;
                    power(convert(args[0])?, args[1], var_map, constants)
                }
                "diff" => {
                    expect_arity(name, &args, 2)?;
                    Ok(Expr::Diff(convert(args[0])?, diff_order(args[1])?))
                }
                _ => Err(ConvertError::UnsupportedFunction(identifier.to_string())),
            }
        }
        // Root node - should have exactly one child
        Operator::RootNode => {
            let children = node.children();
            if children.len() == 1 {
                build_ast(&children[0], var_map, constants)
            } else {
                Err(ConvertError::RootNode(format!(
                    "Expected single child for root node: {:?}",
                    children
                )))
            }
        }
        // Exponentiation - constant exponents are kept as scalars
        Operator::Exp => {
            let children = node.children();
            power(convert(&children[0])?, &children[1], var_map, constants)
        }
        // Any other operator is unsupported
        _ => Err(ConvertError::UnsupportedOperator(format!(
            "{:?}",
            node.operator()
        ))),
    }
}

/// Builds `base ^ exponent`, using a scalar exponent when it is a numeric literal.
fn power(
    base: Box<Expr>,
    exponent: &Node,
    var_map: &HashMap<String, usize>,
    constants: &HashMap<String, f64>,
) -> Result<Expr, ConvertError> {
    if let Operator::Const { value } = unwrap_root(exponent).operator() {
        return Ok(Expr::PowFloat(base, numeric_value(value)?));
    }
    Ok(Expr::PowExpr(
        base,
        Box::new(build_ast(exponent, var_map, constants)?),
    ))
}

fn numeric_value(value: &evalexpr::Value) -> Result<f64, ConvertError> {
    match value {
        evalexpr::Value::Float(f) => Ok(*f),
        evalexpr::Value::Int(i) => Ok(*i as f64),
        _ => Err(ConvertError::ConstOperator(format!("{:?}", value))),
    }
}

fn diff_order(node: &Node) -> Result<u32, ConvertError> {
    match unwrap_root(node).operator() {
        Operator::Const {
            value: evalexpr::Value::Int(order),
        } => u32::try_from(*order).map_err(|_| ConvertError::DiffOrder(order.to_string())),
        other => Err(ConvertError::DiffOrder(format!("{:?}", other))),
    }
}

fn expect_arity(name: &str, args: &[&Node], expected: usize) -> Result<(), ConvertError> {
    if args.len() != expected {
        return Err(ConvertError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Strips parenthesis nodes that wrap a single child.
fn unwrap_root(mut node: &Node) -> &Node {
    while matches!(node.operator(), Operator::RootNode) && node.children().len() == 1 {
        node = &node.children()[0];
    }
    node
}

/// Collects the arguments of a function call node, splitting tuples.
fn function_args(node: &Node) -> Vec<&Node> {
    let Some(arg) = node.children().first().map(unwrap_root) else {
        return Vec::new();
    };
    match arg.operator() {
        Operator::Tuple => arg.children().iter().collect(),
        Operator::RootNode if arg.children().is_empty() => Vec::new(),
        _ => vec![arg],
    }
}

/// Extracts variables from an expression tree and assigns them indices.
///
/// Identifiers listed in `constants` are not variables and are skipped.
///
/// # Arguments
/// * `node` - Root node of the expression tree
///
/// # Returns
/// HashMap mapping variable names to their indices in alphabetical order
pub fn extract_symbols(node: &Node, constants: &HashMap<String, f64>) -> HashMap<String, usize> {
    let mut symbols = HashSet::new();
    extract_symbols_from_node(node, &mut symbols);

    let mut symbols: Vec<String> = symbols
        .into_iter()
        .filter(|s| !constants.contains_key(s))
        .collect();
    symbols.sort();

    symbols
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect()
}

/// Extracts and sorts all unique variables from a collection of equation strings.
///
/// # Arguments
/// * `equations` - Slice of strings containing mathematical expressions
/// * `constants` - Identifiers that are bound to values and therefore not variables
///
/// # Returns
/// A sorted `Vec<String>` containing all unique variable names found in the equations
///
/// # Example
/// ```
/// # use std::collections::HashMap;
/// # use sparse_sigma::convert::extract_all_symbols;
/// let equations = vec!["diff(x, 1) + y".to_string(), "z + x^2".to_string()];
/// let variables = extract_all_symbols(&equations, &HashMap::new()).unwrap();
/// assert_eq!(variables, vec!["x".to_string(), "y".to_string(), "z".to_string()]);
/// ```
pub fn extract_all_symbols(
    equations: &[String],
    constants: &HashMap<String, f64>,
) -> Result<Vec<String>, EquationError> {
    let mut all_symbols = HashSet::new();
    for equation in equations {
        let tree: Node = build_operator_tree(equation)?;
        extract_symbols_from_node(&tree, &mut all_symbols);
    }

    let mut all_symbols: Vec<String> = all_symbols
        .into_iter()
        .filter(|s| !constants.contains_key(s))
        .collect();
    all_symbols.sort();

    Ok(all_symbols)
}

/// Recursively extracts variable names from an expression tree node.
fn extract_symbols_from_node(node: &Node, symbols: &mut HashSet<String>) {
    match node.operator() {
        Operator::VariableIdentifierRead { identifier } => {
            symbols.insert(identifier.to_string());
        }
        _ => {
            for child in node.children() {
                extract_symbols_from_node(child, symbols);
            }
        }
    }
}
