//! Structural computation of sigma matrices.
//!
//! This module drives a DAE evaluator through the signature algebra and harvests the
//! result into a [`SigmaMatrix`]. The process involves:
//!
//! 1. Seeding an input vector so that slot `i` is variable `i` at order 0
//! 2. Evaluating the DAE into an output vector of the same length
//! 3. Moving each output's dependency map into a fresh set of matrix rows
//! 4. Counting nonzeros and reporting progress every `progress_interval` rows
//! 5. Swapping the fresh rows into the matrix once every row has been harvested
//!
//! A failed computation leaves the matrix untouched, unless the builder is configured with
//! [`FailurePolicy::ContinuePartial`].
//!
//! # Example
//!
//! ```
//! use sparse_sigma::prelude::*;
//!
//! let mut seen = Vec::new();
//! let mut matrix = SigmaMatrix::new(2501);
//! let summary = StructureBuilder::new()
//!     .progress_interval(1000)
//!     .observer(|row: usize, _total: usize| seen.push(row))
//!     .compute(&mut matrix, &models::molecular_diffusion, &2500)
//!     .unwrap();
//!
//! assert_eq!(summary.rows, 2501);
//! assert_eq!(seen, vec![1000, 2000]);
//! ```

use tracing::{debug, error, info};

use crate::errors::StructureError;
use crate::evaluator::DaeEvaluator;
use crate::matrix::SigmaMatrix;
use crate::signature::SparseOrders;
use crate::vector::SignatureVector;

/// Rows harvested between two progress notifications by default.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Receives progress notifications while rows are harvested.
pub trait ProgressObserver {
    /// Called once the row with 0-based index `row` has been harvested, that is after
    /// `row + 1` of `total` rows.
    fn on_progress(&mut self, row: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressObserver for F {
    fn on_progress(&mut self, row: usize, total: usize) {
        self(row, total)
    }
}

/// Discards all progress notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _row: usize, _total: usize) {}
}

/// Forwards progress notifications to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, row: usize, total: usize) {
        info!(row, total, "harvesting sigma rows");
    }
}

/// What to do when the DAE evaluator returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return [`StructureError::EvaluatorFailure`] and leave the matrix untouched
    #[default]
    Abort,
    /// Log the error and harvest whatever the output vector holds
    ContinuePartial,
}

/// What to do with dependencies on columns outside of `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPolicy {
    /// Return [`StructureError::ColumnOutOfRange`] and leave the matrix untouched
    #[default]
    Reject,
    /// Store the entry as is
    Tolerate,
}

/// Outcome of a successful structural computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureSummary {
    /// Number of harvested rows
    pub rows: usize,
    /// Number of harvested dependency entries
    pub nonzeros: usize,
    /// Highest dependency order found, `None` if the matrix is empty
    pub max_order: Option<u32>,
}

/// Configurable driver for structural computations.
#[derive(Debug, Clone)]
pub struct StructureBuilder<O = NoProgress> {
    progress_interval: usize,
    failure_policy: FailurePolicy,
    column_policy: ColumnPolicy,
    observer: O,
}

impl Default for StructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureBuilder {
    /// Creates a builder that aborts on failures, rejects out-of-range columns and does not
    /// report progress.
    pub fn new() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            failure_policy: FailurePolicy::default(),
            column_policy: ColumnPolicy::default(),
            observer: NoProgress,
        }
    }
}

impl<O: ProgressObserver> StructureBuilder<O> {
    /// Sets the number of rows between progress notifications; `0` disables them.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.column_policy = policy;
        self
    }

    /// Replaces the progress observer.
    pub fn observer<T: ProgressObserver>(self, observer: T) -> StructureBuilder<T> {
        StructureBuilder {
            progress_interval: self.progress_interval,
            failure_policy: self.failure_policy,
            column_policy: self.column_policy,
            observer,
        }
    }

    /// Computes the sigma matrix of `evaluator` into `matrix`.
    ///
    /// The system size is the matrix's row count. All rows are replaced on success; on
    /// error the matrix keeps its previous contents and nonzero count.
    ///
    /// # Arguments
    /// * `matrix` - Matrix sized to the system, repopulated by this call
    /// * `evaluator` - The DAE residual function
    /// * `params` - Opaque problem data handed to the evaluator
    ///
    /// # Returns
    /// The number of harvested rows and nonzeros, and the highest order found
    pub fn compute<E, P>(
        &mut self,
        matrix: &mut SigmaMatrix,
        evaluator: &E,
        params: &P,
    ) -> Result<StructureSummary, StructureError>
    where
        E: DaeEvaluator<P> + ?Sized,
        P: ?Sized,
    {
        let n = matrix.row_count();
        debug!(size = n, "computing sparse sigma matrix");

        let f = {
            let y = SignatureVector::seeded(n);
            let mut f = SignatureVector::unset(n);
            if let Err(err) = evaluator.evaluate(&y, &mut f, params) {
                match self.failure_policy {
                    FailurePolicy::Abort => return Err(StructureError::EvaluatorFailure(err)),
                    FailurePolicy::ContinuePartial => {
                        error!(
                            error = %err,
                            "error in evaluating the DAE function, harvesting partial output"
                        );
                    }
                }
            }
            f
        };

        let mut rows: Vec<SparseOrders> = Vec::with_capacity(n);
        let mut nonzeros = 0;
        let mut max_order = None;
        for (i, slot) in f.into_iter().enumerate() {
            let orders = slot.into_dependencies();
            if self.column_policy == ColumnPolicy::Reject {
                let last = orders.last_key_value().map(|(&column, _)| column);
                if let Some(column) = last.filter(|&column| column >= n) {
                    return Err(StructureError::ColumnOutOfRange {
                        row: i,
                        column,
                        size: n,
                    });
                }
            }
            nonzeros += orders.len();
            max_order = max_order.max(orders.values().copied().max());
            rows.push(orders);

            if self.progress_interval > 0 && i > 0 && i % self.progress_interval == 0 {
                self.observer.on_progress(i, n);
            }
        }

        matrix.replace(rows, nonzeros);
        debug!(nonzeros, "computed sparse sigma matrix");

        Ok(StructureSummary {
            rows: n,
            nonzeros,
            max_order,
        })
    }
}
