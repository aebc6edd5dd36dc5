//! The sparse sigma matrix.
//!
//! Row `i` of a [`SigmaMatrix`] maps column `j` to the order at which equation `i` depends
//! on variable `j`. A missing key means no dependency. Only populated entries are stored,
//! so the memory footprint is proportional to the number of nonzeros, not to `n²`.

use std::collections::BTreeMap;
use std::fmt;

use colored::Colorize;

use crate::backends::matrix::DenseMatrix;
use crate::builder::{StructureBuilder, StructureSummary};
use crate::errors::StructureError;
use crate::evaluator::DaeEvaluator;
use crate::signature::SparseOrders;

/// Largest matrix rendered or exported densely by default.
pub const DEFAULT_RENDER_LIMIT: usize = 16;

/// Equation-by-variable table of dependency orders.
///
/// # Example
///
/// ```
/// use sparse_sigma::prelude::*;
///
/// let mut matrix = SigmaMatrix::new(11);
/// let summary = matrix
///     .compute_structure(&models::molecular_diffusion, &10)
///     .unwrap();
///
/// assert_eq!(summary.nonzeros, matrix.nonzero_count());
/// assert_eq!(matrix.order_at(4, 4), Some(1));
/// assert_eq!(matrix.order_at(4, 5), Some(0));
/// assert_eq!(matrix.order_at(4, 6), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SigmaMatrix {
    rows: Vec<SparseOrders>,
    nonzeros: usize,
}

impl SigmaMatrix {
    /// Creates an empty matrix for a system of `size` equations.
    pub fn new(size: usize) -> Self {
        Self {
            rows: vec![SparseOrders::new(); size],
            nonzeros: 0,
        }
    }

    /// Runs `evaluator` over seeded signatures and replaces the matrix contents with the
    /// resulting dependency structure.
    ///
    /// Uses the default [`StructureBuilder`] configuration: no progress reporting,
    /// evaluator failures abort, out-of-range columns are rejected. On error the matrix
    /// keeps its previous contents.
    pub fn compute_structure<E, P>(
        &mut self,
        evaluator: &E,
        params: &P,
    ) -> Result<StructureSummary, StructureError>
    where
        E: DaeEvaluator<P> + ?Sized,
        P: ?Sized,
    {
        StructureBuilder::new().compute(self, evaluator, params)
    }

    /// Order of the dependency of equation `row` on variable `col`, if any.
    pub fn order_at(&self, row: usize, col: usize) -> Option<u32> {
        self.rows.get(row)?.get(&col).copied()
    }

    /// Number of entries harvested by the last structural computation.
    pub fn nonzero_count(&self) -> usize {
        self.nonzeros
    }

    /// Number of equations.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sparse row of equation `row`.
    pub fn row(&self, row: usize) -> Option<&SparseOrders> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &SparseOrders> {
        self.rows.iter()
    }

    /// Highest order stored anywhere in the matrix.
    pub fn max_order(&self) -> Option<u32> {
        self.rows
            .iter()
            .flat_map(|row| row.values().copied())
            .max()
    }

    pub(crate) fn replace(&mut self, rows: Vec<SparseOrders>, nonzeros: usize) {
        debug_assert_eq!(rows.len(), self.rows.len());
        self.rows = rows;
        self.nonzeros = nonzeros;
    }

    /// Returns a printable dense grid of the matrix.
    ///
    /// Dense rendering scans all `n²` cells and is refused for matrices with more than
    /// `limit` rows.
    pub fn dense_view(&self, limit: usize) -> Result<DenseView<'_>, StructureError> {
        self.check_dense_limit(limit)?;
        Ok(DenseView {
            matrix: self,
            highlight: false,
        })
    }

    /// Exports the matrix into a dense container, `None` marking absent entries.
    ///
    /// # Example
    ///
    /// ```
    /// use sparse_sigma::prelude::*;
    ///
    /// let mut matrix = SigmaMatrix::new(3);
    /// matrix.compute_structure(&models::molecular_diffusion, &2).unwrap();
    ///
    /// let dense: Vec<Vec<Option<u32>>> = matrix.to_dense(DEFAULT_RENDER_LIMIT).unwrap();
    /// assert_eq!(dense[2], vec![Some(0), None, Some(0)]);
    /// ```
    pub fn to_dense<M: DenseMatrix>(&self, limit: usize) -> Result<M, StructureError> {
        self.check_dense_limit(limit)?;
        let n = self.row_count();
        let mut dense = M::absent(n, n);
        for (i, row) in self.rows.iter().enumerate() {
            for (&j, &order) in row.range(..n) {
                dense.set_order(i, j, order);
            }
        }
        Ok(dense)
    }

    fn check_dense_limit(&self, limit: usize) -> Result<(), StructureError> {
        if self.row_count() > limit {
            return Err(StructureError::TooLargeToRender {
                size: self.row_count(),
                limit,
            });
        }
        Ok(())
    }
}

/// Dense rendering of a small [`SigmaMatrix`]: the order of every entry, `-` where absent.
pub struct DenseView<'a> {
    matrix: &'a SigmaMatrix,
    highlight: bool,
}

impl DenseView<'_> {
    /// Enables terminal colors: differentiated entries bold, absent entries dimmed.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

impl fmt::Display for DenseView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.matrix.row_count();
        for row in self.matrix.rows() {
            for col in 0..n {
                let cell = match row.get(&col) {
                    Some(order) => format!(" {order} "),
                    None => " - ".to_string(),
                };
                match (self.highlight, row.get(&col)) {
                    (false, _) => write!(f, "{cell}")?,
                    (true, Some(&order)) if order > 0 => write!(f, "{}", cell.yellow().bold())?,
                    (true, Some(_)) => write!(f, "{}", cell.cyan())?,
                    (true, None) => write!(f, "{}", cell.dimmed())?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
