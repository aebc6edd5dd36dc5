//! Fixed-length vectors of signatures used as DAE inputs and outputs.

use std::ops::{Deref, DerefMut};

use crate::signature::Signature;

/// An ordered, fixed-length sequence of [`Signature`]s.
///
/// The builder allocates one seeded vector for the DAE inputs and one unset vector for
/// its outputs on every structural computation. Both dereference to `[Signature]`, which
/// is what DAE evaluators operate on.
///
/// # Examples
///
/// ```rust
/// use sparse_sigma::vector::SignatureVector;
///
/// let y = SignatureVector::seeded(3);
/// assert_eq!(y.len(), 3);
/// assert_eq!(y[2].order(2), 0);
/// assert!(!y[2].is_constant());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureVector {
    slots: Vec<Signature>,
}

impl SignatureVector {
    /// Creates a vector whose slot `i` is variable `i` at order 0.
    pub fn seeded(len: usize) -> Self {
        Self {
            slots: (0..len).map(Signature::variable).collect(),
        }
    }

    /// Creates a vector of constants with unspecified (NaN) value.
    ///
    /// Slots an evaluator never writes therefore harvest as empty rows.
    pub fn unset(len: usize) -> Self {
        Self {
            slots: vec![Signature::Const(f64::NAN); len],
        }
    }

    /// Total number of dependency entries across all slots.
    pub fn dependency_count(&self) -> usize {
        self.slots.iter().map(Signature::dependency_count).sum()
    }

    /// Consumes the vector and returns its slots.
    pub fn into_inner(self) -> Vec<Signature> {
        self.slots
    }
}

impl From<Vec<Signature>> for SignatureVector {
    fn from(slots: Vec<Signature>) -> Self {
        Self { slots }
    }
}

impl FromIterator<Signature> for SignatureVector {
    fn from_iter<I: IntoIterator<Item = Signature>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SignatureVector {
    type Item = Signature;
    type IntoIter = std::vec::IntoIter<Signature>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

impl Deref for SignatureVector {
    type Target = [Signature];

    fn deref(&self) -> &[Signature] {
        &self.slots
    }
}

impl DerefMut for SignatureVector {
    fn deref_mut(&mut self) -> &mut [Signature] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded() {
        let y = SignatureVector::seeded(4);
        for (i, slot) in y.iter().enumerate() {
            assert_eq!(slot, &Signature::variable(i));
            assert_eq!(slot.dependency_count(), 1);
        }
        assert_eq!(y.dependency_count(), 4);
    }

    #[test]
    fn test_unset() {
        let f = SignatureVector::unset(3);
        assert_eq!(f.len(), 3);
        assert!(f.iter().all(Signature::is_constant));
        assert_eq!(f.dependency_count(), 0);
    }

    #[test]
    fn test_slots_are_mutable() {
        let y = SignatureVector::seeded(2);
        let mut f = SignatureVector::unset(2);
        f[0] = &y[0] + &y[1];
        f[1] = y[1].diff(2);
        assert_eq!(f[0].order(1), 0);
        assert_eq!(f[1].order(1), 2);
        assert_eq!(f.into_inner().len(), 2);
    }

    #[test]
    fn test_empty() {
        let y = SignatureVector::seeded(0);
        assert!(y.is_empty());
        assert_eq!(SignatureVector::default(), y);
    }
}
