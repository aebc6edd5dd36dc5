/// A trait for dense matrix types a small sigma matrix can be exported into.
///
/// This trait provides a common interface for different dense matrix implementations,
/// allowing [`SigmaMatrix::to_dense`](crate::matrix::SigmaMatrix::to_dense) to fill any of
/// them. Cells hold `Option<u32>`: the dependency order, or `None` where an equation does
/// not depend on a variable.
///
/// # Examples
///
/// ```rust
/// use sparse_sigma::prelude::DenseMatrix;
///
/// let mut mat: Vec<Vec<Option<u32>>> = DenseMatrix::absent(2, 3);
/// mat.set_order(1, 2, 4);
/// assert_eq!(mat.dims(), (2, 3));
/// assert_eq!(mat.order_at(1, 2), Some(4));
/// assert_eq!(mat.order_at(0, 0), None);
/// ```
pub trait DenseMatrix {
    /// Creates a matrix of the specified dimensions with every cell absent.
    ///
    /// # Arguments
    /// * `rows` - Number of rows in the matrix
    /// * `cols` - Number of columns in the matrix
    fn absent(rows: usize, cols: usize) -> Self;

    /// Stores the dependency order at `(row, col)`.
    fn set_order(&mut self, row: usize, col: usize, order: u32);

    /// Returns the dependency order at `(row, col)`, `None` if absent.
    fn order_at(&self, row: usize, col: usize) -> Option<u32>;

    /// Returns the dimensions of the matrix as (rows, columns).
    fn dims(&self) -> (usize, usize);
}

/// Implementation of DenseMatrix for nested standard vectors, one inner vector per row.
impl DenseMatrix for Vec<Vec<Option<u32>>> {
    fn absent(rows: usize, cols: usize) -> Self {
        vec![vec![None; cols]; rows]
    }

    fn set_order(&mut self, row: usize, col: usize, order: u32) {
        self[row][col] = Some(order);
    }

    fn order_at(&self, row: usize, col: usize) -> Option<u32> {
        self[row][col]
    }

    fn dims(&self) -> (usize, usize) {
        (self.len(), self.first().map_or(0, Vec::len))
    }
}

/// Implementation of DenseMatrix for ndarray's Array2<Option<u32>>.
///
/// # Examples
///
/// ```rust
/// use sparse_sigma::prelude::*;
/// use ndarray::Array2;
///
/// let mut matrix = SigmaMatrix::new(3);
/// matrix.compute_structure(&models::molecular_diffusion, &2).unwrap();
///
/// let dense: Array2<Option<u32>> = matrix.to_dense(DEFAULT_RENDER_LIMIT).unwrap();
/// assert_eq!(dense[[0, 0]], Some(1));
/// assert_eq!(dense[[0, 2]], None);
/// ```
#[cfg(feature = "ndarray")]
impl DenseMatrix for ndarray::Array2<Option<u32>> {
    fn absent(rows: usize, cols: usize) -> Self {
        ndarray::Array2::from_elem((rows, cols), None)
    }

    fn set_order(&mut self, row: usize, col: usize, order: u32) {
        self[[row, col]] = Some(order);
    }

    fn order_at(&self, row: usize, col: usize) -> Option<u32> {
        self[[row, col]]
    }

    fn dims(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

/// Implementation of DenseMatrix for nalgebra's DMatrix<Option<u32>>.
///
/// # Examples
///
/// ```rust
/// use sparse_sigma::prelude::*;
/// use nalgebra::DMatrix;
///
/// let mut matrix = SigmaMatrix::new(3);
/// matrix.compute_structure(&models::molecular_diffusion, &2).unwrap();
///
/// let dense: DMatrix<Option<u32>> = matrix.to_dense(DEFAULT_RENDER_LIMIT).unwrap();
/// assert_eq!(dense[(1, 1)], Some(1));
/// assert_eq!(dense[(2, 1)], None);
/// ```
#[cfg(feature = "nalgebra")]
impl DenseMatrix for nalgebra::DMatrix<Option<u32>> {
    fn absent(rows: usize, cols: usize) -> Self {
        nalgebra::DMatrix::from_element(rows, cols, None)
    }

    fn set_order(&mut self, row: usize, col: usize, order: u32) {
        self[(row, col)] = Some(order);
    }

    fn order_at(&self, row: usize, col: usize) -> Option<u32> {
        self[(row, col)]
    }

    fn dims(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_diagonal<M: DenseMatrix>(n: usize) -> M {
        let mut mat = M::absent(n, n);
        for i in 0..n {
            mat.set_order(i, i, i as u32);
        }
        mat
    }

    #[test]
    fn test_vec_matrix_operations() {
        let mat: Vec<Vec<Option<u32>>> = fill_diagonal(3);
        assert_eq!(mat.dims(), (3, 3));
        assert_eq!(mat.order_at(2, 2), Some(2));
        assert_eq!(mat.order_at(2, 1), None);
        assert_eq!(mat[0], vec![Some(0), None, None]);

        let empty: Vec<Vec<Option<u32>>> = DenseMatrix::absent(0, 0);
        assert_eq!(empty.dims(), (0, 0));
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn test_ndarray_matrix_operations() {
        let mat: ndarray::Array2<Option<u32>> = fill_diagonal(3);
        assert_eq!(mat.dims(), (3, 3));
        assert_eq!(mat.order_at(1, 1), Some(1));
        assert_eq!(mat.order_at(0, 1), None);
    }

    #[cfg(feature = "nalgebra")]
    #[test]
    fn test_nalgebra_matrix_operations() {
        let mat: nalgebra::DMatrix<Option<u32>> = fill_diagonal(3);
        assert_eq!(mat.dims(), (3, 3));
        assert_eq!(mat.order_at(1, 1), Some(1));
        assert_eq!(mat.order_at(1, 0), None);
    }
}
