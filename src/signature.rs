//! Signature values: scalars that carry dependency structure instead of magnitude.
//!
//! A [`Signature`] is either a numeric constant or a sparse map from variable index to
//! the order at which that variable is differentiated. Running a DAE residual over
//! signatures instead of `f64`s yields, for every equation, the set of variables it
//! depends on together with the highest derivative order required for each.
//!
//! # Combination rules
//!
//! For `+`, `-`, `*` and `/`, in order of precedence:
//! - Two constants combine through ordinary scalar arithmetic
//! - Multiplying by the constant zero yields the constant zero, dropping all dependencies
//! - A constant combined with a dependency map yields that map unchanged
//! - Two dependency maps merge key-wise, keeping the larger order for shared keys
//!
//! Dividing the constant zero by a non-constant yields the constant zero, so a zero
//! numerator absorbs like a zero factor does. A non-constant over the constant zero keeps
//! its dependencies.
//!
//! Transcendental functions evaluate constants and pass dependency maps through untouched.
//!
//! # Example
//!
//! ```
//! use sparse_sigma::signature::Signature;
//!
//! let x = Signature::variable(0);
//! let y = Signature::variable(1);
//!
//! let f = -1.0 * x.diff(1) + 0.96 * (&y - 2.0 * &x);
//! assert_eq!(f.order(0), 1);
//! assert_eq!(f.order(1), 0);
//! assert!((&f * 0.0).is_zero());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

use itertools::Itertools;

/// Sparse map from variable index to dependency order.
pub type SparseOrders = BTreeMap<usize, u32>;

static ABSENT_ORDER: u32 = 0;

/// A symbolic scalar tracking either a constant or a set of `(variable, order)` pairs.
///
/// The `Deps` variant never holds an empty map when built through the constructors and
/// operators of this module.
#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    /// A numeric constant; carries no structural information
    Const(f64),
    /// Dependencies on variables, keyed by variable index
    Deps(SparseOrders),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

/// Merges `other` into `into`, keeping the larger order for keys present in both.
pub(crate) fn max_combine(into: &mut SparseOrders, other: &SparseOrders) {
    for (&variable, &order) in other {
        into.entry(variable)
            .and_modify(|existing| *existing = (*existing).max(order))
            .or_insert(order);
    }
}

impl Signature {
    /// Creates a constant signature.
    pub fn constant(value: f64) -> Self {
        Signature::Const(value)
    }

    /// The constant zero.
    pub fn zero() -> Self {
        Signature::Const(0.0)
    }

    /// A raw state variable: depends on variable `index` at order 0.
    pub fn variable(index: usize) -> Self {
        Signature::Deps(BTreeMap::from([(index, 0)]))
    }

    /// Builds a signature from a dependency map.
    ///
    /// An empty map carries no structure and becomes a constant with an unspecified
    /// (NaN) value.
    pub fn from_orders(orders: SparseOrders) -> Self {
        if orders.is_empty() {
            Signature::Const(f64::NAN)
        } else {
            Signature::Deps(orders)
        }
    }

    /// Returns true if the signature carries no dependencies.
    pub fn is_constant(&self) -> bool {
        matches!(self, Signature::Const(_))
    }

    /// Returns true for the constant zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Signature::Const(v) if *v == 0.0)
    }

    /// Numeric value of a constant, `None` for a dependency map.
    pub fn value(&self) -> Option<f64> {
        match self {
            Signature::Const(v) => Some(*v),
            Signature::Deps(_) => None,
        }
    }

    /// Dependency map of a non-constant, `None` for a constant.
    pub fn dependencies(&self) -> Option<&SparseOrders> {
        match self {
            Signature::Const(_) => None,
            Signature::Deps(orders) => Some(orders),
        }
    }

    /// Consumes the signature and returns its dependencies (empty for constants).
    pub fn into_dependencies(self) -> SparseOrders {
        match self {
            Signature::Const(_) => SparseOrders::new(),
            Signature::Deps(orders) => orders,
        }
    }

    /// Number of variables this signature depends on.
    pub fn dependency_count(&self) -> usize {
        self.dependencies().map_or(0, BTreeMap::len)
    }

    /// Order of the dependency on `variable`, or 0 when there is none.
    pub fn order(&self, variable: usize) -> u32 {
        self[variable]
    }

    /// Highest dependency order, `None` for constants.
    pub fn max_order(&self) -> Option<u32> {
        self.dependencies()
            .and_then(|orders| orders.values().copied().max())
    }

    /// Raises every dependency order by `d`, saturating at `u32::MAX`.
    ///
    /// The derivative of a constant carries no dependency and is the constant zero.
    pub fn diff(&self, d: u32) -> Signature {
        match self {
            Signature::Const(_) => Signature::zero(),
            Signature::Deps(orders) => Signature::Deps(
                orders
                    .iter()
                    .map(|(&variable, &order)| (variable, order.saturating_add(d)))
                    .collect(),
            ),
        }
    }

    /// Same as [`Signature::diff`], but returns `None` if an order would exceed `u32::MAX`.
    pub fn checked_diff(&self, d: u32) -> Option<Signature> {
        match self {
            Signature::Const(_) => Some(Signature::zero()),
            Signature::Deps(orders) => orders
                .iter()
                .map(|(&variable, &order)| order.checked_add(d).map(|raised| (variable, raised)))
                .collect::<Option<SparseOrders>>()
                .map(Signature::Deps),
        }
    }

    /// Raises the signature to a scalar power.
    pub fn powf(&self, d: f64) -> Signature {
        if d == 0.0 {
            return Signature::Const(1.0);
        }
        self.map_constant(|v| v.powf(d))
    }

    /// Raises the signature to a signature-valued power.
    pub fn pow(&self, exponent: &Signature) -> Signature {
        match (self, exponent) {
            (_, e) if e.is_zero() => Signature::Const(1.0),
            (Signature::Const(b), Signature::Const(e)) => Signature::Const(b.powf(*e)),
            (base, Signature::Const(_)) => base.clone(),
            (Signature::Const(_), e) => e.clone(),
            (Signature::Deps(base), Signature::Deps(e)) => {
                let mut orders = base.clone();
                max_combine(&mut orders, e);
                Signature::Deps(orders)
            }
        }
    }

    /// Squares the signature.
    pub fn sqr(&self) -> Signature {
        self.map_constant(|v| v * v)
    }

    pub fn cos(&self) -> Signature {
        self.map_constant(f64::cos)
    }

    pub fn sin(&self) -> Signature {
        self.map_constant(f64::sin)
    }

    pub fn tan(&self) -> Signature {
        self.map_constant(f64::tan)
    }

    pub fn sqrt(&self) -> Signature {
        self.map_constant(f64::sqrt)
    }

    pub fn exp(&self) -> Signature {
        self.map_constant(f64::exp)
    }

    /// Natural logarithm.
    pub fn ln(&self) -> Signature {
        self.map_constant(f64::ln)
    }

    /// Natural logarithm, same as [`Signature::ln`].
    pub fn log(&self) -> Signature {
        self.ln()
    }

    pub fn asin(&self) -> Signature {
        self.map_constant(f64::asin)
    }

    pub fn acos(&self) -> Signature {
        self.map_constant(f64::acos)
    }

    pub fn atan(&self) -> Signature {
        self.map_constant(f64::atan)
    }

    /// Applies `f` to a constant; dependency maps pass through unchanged.
    fn map_constant(&self, f: impl FnOnce(f64) -> f64) -> Signature {
        match self {
            Signature::Const(v) => Signature::Const(f(*v)),
            deps => deps.clone(),
        }
    }

    fn combine(self, rhs: &Signature, op: BinaryOp) -> Signature {
        match (self, rhs) {
            (Signature::Const(a), Signature::Const(b)) => Signature::Const(op.apply(a, *b)),
            (lhs, rhs) if op == BinaryOp::Mul && (lhs.is_zero() || rhs.is_zero()) => {
                Signature::zero()
            }
            (Signature::Const(a), Signature::Deps(_)) if op == BinaryOp::Div && a == 0.0 => {
                Signature::Const(a)
            }
            (Signature::Const(_), Signature::Deps(orders)) => Signature::Deps(orders.clone()),
            (lhs @ Signature::Deps(_), Signature::Const(_)) => lhs,
            (Signature::Deps(mut orders), Signature::Deps(other)) => {
                max_combine(&mut orders, other);
                Signature::Deps(orders)
            }
        }
    }

    /// Same as `combine`, but hands over the right operand's map instead of cloning it.
    fn combine_owned(self, rhs: Signature, op: BinaryOp) -> Signature {
        let adopt = match &self {
            Signature::Const(a) => {
                !rhs.is_constant() && (*a != 0.0 || matches!(op, BinaryOp::Add | BinaryOp::Sub))
            }
            Signature::Deps(_) => false,
        };
        if adopt {
            rhs
        } else {
            self.combine(&rhs, op)
        }
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::zero()
    }
}

impl From<f64> for Signature {
    fn from(value: f64) -> Self {
        Signature::Const(value)
    }
}

impl Index<usize> for Signature {
    type Output = u32;

    fn index(&self, variable: usize) -> &u32 {
        match self {
            Signature::Deps(orders) => orders.get(&variable).unwrap_or(&ABSENT_ORDER),
            Signature::Const(_) => &ABSENT_ORDER,
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:expr) => {
        impl $assign_trait<&Signature> for Signature {
            fn $assign_method(&mut self, rhs: &Signature) {
                let lhs = std::mem::take(self);
                *self = lhs.combine(rhs, $op);
            }
        }

        impl $assign_trait<Signature> for Signature {
            fn $assign_method(&mut self, rhs: Signature) {
                let lhs = std::mem::take(self);
                *self = lhs.combine_owned(rhs, $op);
            }
        }

        impl $assign_trait<f64> for Signature {
            fn $assign_method(&mut self, rhs: f64) {
                let lhs = std::mem::take(self);
                *self = lhs.combine(&Signature::Const(rhs), $op);
            }
        }

        impl $trait<Signature> for Signature {
            type Output = Signature;

            fn $method(self, rhs: Signature) -> Signature {
                self.combine_owned(rhs, $op)
            }
        }

        impl $trait<&Signature> for Signature {
            type Output = Signature;

            fn $method(self, rhs: &Signature) -> Signature {
                self.combine(rhs, $op)
            }
        }

        impl $trait<Signature> for &Signature {
            type Output = Signature;

            fn $method(self, rhs: Signature) -> Signature {
                self.clone().combine_owned(rhs, $op)
            }
        }

        impl $trait<&Signature> for &Signature {
            type Output = Signature;

            fn $method(self, rhs: &Signature) -> Signature {
                self.clone().combine(rhs, $op)
            }
        }

        impl $trait<f64> for Signature {
            type Output = Signature;

            fn $method(self, rhs: f64) -> Signature {
                self.combine(&Signature::Const(rhs), $op)
            }
        }

        impl $trait<f64> for &Signature {
            type Output = Signature;

            fn $method(self, rhs: f64) -> Signature {
                self.clone().combine(&Signature::Const(rhs), $op)
            }
        }

        impl $trait<Signature> for f64 {
            type Output = Signature;

            fn $method(self, rhs: Signature) -> Signature {
                Signature::Const(self).combine_owned(rhs, $op)
            }
        }

        impl $trait<&Signature> for f64 {
            type Output = Signature;

            fn $method(self, rhs: &Signature) -> Signature {
                Signature::Const(self).combine(rhs, $op)
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, BinaryOp::Add);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, BinaryOp::Sub);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, BinaryOp::Mul);
impl_binary_op!(Div, div, DivAssign, div_assign, BinaryOp::Div);

impl Neg for Signature {
    type Output = Signature;

    fn neg(self) -> Signature {
        match self {
            Signature::Const(v) => Signature::Const(-v),
            deps => deps,
        }
    }
}

impl Neg for &Signature {
    type Output = Signature;

    fn neg(self) -> Signature {
        self.map_constant(|v| -v)
    }
}

impl Sum for Signature {
    fn sum<I: Iterator<Item = Signature>>(iter: I) -> Self {
        iter.fold(Signature::zero(), |acc, s| acc + s)
    }
}

impl<'a> Sum<&'a Signature> for Signature {
    fn sum<I: Iterator<Item = &'a Signature>>(iter: I) -> Self {
        iter.fold(Signature::zero(), |acc, s| acc + s)
    }
}

/// Constants print as numbers, dependency maps as `{variable: order, ...}`.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Const(v) => write!(f, "{v}"),
            Signature::Deps(orders) => write!(
                f,
                "{{{}}}",
                orders
                    .iter()
                    .map(|(variable, order)| format!("{variable}: {order}"))
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(pairs: &[(usize, u32)]) -> Signature {
        Signature::from_orders(pairs.iter().copied().collect())
    }

    #[test]
    fn test_seed_identity() {
        let x = Signature::variable(7);
        assert!(!x.is_constant());
        assert_eq!(x.dependencies(), Some(&BTreeMap::from([(7, 0)])));
        assert_eq!(x.dependency_count(), 1);
    }

    #[test]
    fn test_constant_arithmetic() {
        let a = Signature::constant(6.0);
        let b = Signature::constant(3.0);
        assert_eq!(&a + &b, Signature::Const(9.0));
        assert_eq!(&a - &b, Signature::Const(3.0));
        assert_eq!(&a * &b, Signature::Const(18.0));
        assert_eq!(&a / &b, Signature::Const(2.0));
        assert_eq!(2.0 * a + 1.0, Signature::Const(13.0));
    }

    #[test]
    fn test_zero_absorbs_dependencies() {
        let x = deps(&[(0, 2), (3, 1)]);
        let product = &x * Signature::zero();
        assert!(product.is_zero());
        assert_eq!(product.dependency_count(), 0);

        assert!((0.0 * &x).is_zero());

        let mut y = x.clone();
        y *= 0.0;
        assert!(y.is_zero());
    }

    #[test]
    fn test_constant_adopts_other_map() {
        let x = deps(&[(2, 1)]);
        for result in [
            3.0 + &x,
            &x + 3.0,
            3.0 - &x,
            &x - 3.0,
            3.0 * &x,
            &x * 3.0,
            3.0 / &x,
            &x / 3.0,
        ] {
            assert_eq!(result, x);
        }
        // Zero is not absorbing for addition
        assert_eq!(Signature::zero() + &x, x);
    }

    #[test]
    fn test_max_combine_all_operators() {
        let a = deps(&[(0, 2), (1, 0)]);
        let b = deps(&[(1, 3), (4, 1)]);
        let expected = deps(&[(0, 2), (1, 3), (4, 1)]);

        assert_eq!(&a + &b, expected);
        assert_eq!(&a - &b, expected);
        assert_eq!(&a * &b, expected);
        assert_eq!(&a / &b, expected);
        assert_eq!(&b + &a, expected);
        assert_eq!(a.clone() * b.clone(), expected);
    }

    #[test]
    fn test_division_zero_cases() {
        let x = deps(&[(1, 0)]);

        // A zero numerator stays zero
        assert!((Signature::zero() / &x).is_zero());
        assert!((0.0 / x.clone()).is_zero());

        // A zero denominator contributes no structure
        assert_eq!(&x / Signature::zero(), x);

        // Two constants follow scalar arithmetic
        assert!((Signature::zero() / Signature::zero())
            .value()
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_compound_assignment() {
        let mut acc = Signature::constant(-1.0);
        acc += Signature::variable(0).diff(1).sqr();
        acc += &Signature::variable(2);
        acc -= 4.0;
        assert_eq!(acc, deps(&[(0, 1), (2, 0)]));

        let mut c = Signature::constant(8.0);
        c /= 2.0;
        c *= Signature::constant(3.0);
        assert_eq!(c, Signature::Const(12.0));
    }

    #[test]
    fn test_unary_functions() {
        let c = Signature::constant(0.5);
        assert_eq!(c.cos(), Signature::Const(0.5f64.cos()));
        assert_eq!(c.sin(), Signature::Const(0.5f64.sin()));
        assert_eq!(c.tan(), Signature::Const(0.5f64.tan()));
        assert_eq!(c.sqrt(), Signature::Const(0.5f64.sqrt()));
        assert_eq!(c.exp(), Signature::Const(0.5f64.exp()));
        assert_eq!(c.ln(), Signature::Const(0.5f64.ln()));
        assert_eq!(c.log(), c.ln());
        assert_eq!(c.asin(), Signature::Const(0.5f64.asin()));
        assert_eq!(c.acos(), Signature::Const(0.5f64.acos()));
        assert_eq!(c.atan(), Signature::Const(0.5f64.atan()));
        assert_eq!(c.sqr(), Signature::Const(0.25));
        assert_eq!(-&c, Signature::Const(-0.5));

        let x = deps(&[(3, 2)]);
        for result in [
            x.cos(),
            x.sin(),
            x.tan(),
            x.sqrt(),
            x.exp(),
            x.ln(),
            x.asin(),
            x.acos(),
            x.atan(),
            x.sqr(),
            -x.clone(),
        ] {
            assert_eq!(result, x);
        }
    }

    #[test]
    fn test_pow_scalar() {
        let x = deps(&[(1, 1)]);
        assert_eq!(x.powf(0.0), Signature::Const(1.0));
        assert_eq!(x.powf(2.5), x);
        assert_eq!(Signature::constant(2.0).powf(3.0), Signature::Const(8.0));
    }

    #[test]
    fn test_pow_signature() {
        let x = deps(&[(0, 1), (2, 0)]);
        let y = deps(&[(2, 2), (5, 0)]);
        let two = Signature::constant(2.0);

        assert_eq!(x.pow(&Signature::zero()), Signature::Const(1.0));
        assert_eq!(x.pow(&two), x);
        assert_eq!(two.pow(&y), y);
        assert_eq!(two.pow(&Signature::constant(3.0)), Signature::Const(8.0));
        assert_eq!(x.pow(&y), deps(&[(0, 1), (2, 2), (5, 0)]));
    }

    #[test]
    fn test_diff_additivity() {
        let x = deps(&[(0, 0), (4, 2)]);
        assert_eq!(x.diff(2).diff(3), x.diff(5));
        assert_eq!(x.diff(1), deps(&[(0, 1), (4, 3)]));
        assert_eq!(x.diff(0), x);

        assert!(Signature::constant(42.0).diff(3).is_zero());
        assert!(Signature::zero().diff(0).is_zero());
    }

    #[test]
    fn test_diff_order_overflow() {
        let x = deps(&[(0, u32::MAX), (1, 0)]);
        assert_eq!(x.diff(1), deps(&[(0, u32::MAX), (1, 1)]));
        assert_eq!(x.checked_diff(1), None);
        assert_eq!(x.checked_diff(0), Some(x.clone()));
        assert_eq!(
            deps(&[(2, 3)]).checked_diff(4),
            Some(deps(&[(2, 7)]))
        );
        assert_eq!(
            Signature::constant(1.0).checked_diff(u32::MAX),
            Some(Signature::zero())
        );
    }

    #[test]
    fn test_order_lookup() {
        let x = deps(&[(0, 2), (9, 1)]);
        assert_eq!(x[0], 2);
        assert_eq!(x[9], 1);
        assert_eq!(x[5], 0);
        assert_eq!(x.order(9), 1);
        assert_eq!(Signature::constant(3.0)[0], 0);
        assert_eq!(x.max_order(), Some(2));
        assert_eq!(Signature::constant(3.0).max_order(), None);
    }

    #[test]
    fn test_from_orders_empty_is_constant() {
        let s = Signature::from_orders(SparseOrders::new());
        assert!(s.is_constant());
        assert!(!s.is_zero());
    }

    #[test]
    fn test_sum() {
        let vars: Vec<Signature> = (0..4).map(Signature::variable).collect();
        let total: Signature = vars.iter().sum();
        assert_eq!(total, deps(&[(0, 0), (1, 0), (2, 0), (3, 0)]));

        let empty: Signature = Vec::<Signature>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Signature::constant(1.5).to_string(), "1.5");
        assert_eq!(deps(&[(0, 1), (4, 0)]).to_string(), "{0: 1, 4: 0}");
    }
}
