//! Sparse problem matrices and the small amount of structure the solver needs from them.
//!
//! Problem matrices are stored as [`faer::sparse::SparseColMat`] with `usize` indices.
//! The solver never modifies them; it only reads their shape and, in the direct backend,
//! their entries.

use crate::{
    element::Element,
    error::{EigenError, EigenErrorKind},
};
use faer::{
    Mat,
    sparse::{SparseColMat, Triplet},
};

/// The sparse matrix type accepted for `A` and `B`.
pub type SparseMatrix<T> = SparseColMat<usize, T>;

/// Returns the order of a square, non-empty matrix.
pub fn problem_size<T: Element>(a: &SparseMatrix<T>) -> Result<usize, EigenError> {
    let (nrows, ncols) = (a.nrows(), a.ncols());
    if nrows != ncols || nrows == 0 {
        return Err(EigenErrorKind::NotSquare { nrows, ncols }.into());
    }
    Ok(nrows)
}

/// Checks that an auxiliary matrix has the shape `n x n`.
pub(crate) fn check_operand<T: Element>(
    operand: &'static str,
    m: &SparseMatrix<T>,
    n: usize,
) -> Result<(), EigenError> {
    if m.nrows() != n || m.ncols() != n {
        return Err(EigenErrorKind::DimensionMismatch {
            operand,
            expected: n,
            actual_rows: m.nrows(),
            actual_cols: m.ncols(),
        }
        .into());
    }
    Ok(())
}

/// Expands a sparse matrix into a dense one. Duplicate entries are summed.
pub fn to_dense<T: Element>(m: &SparseMatrix<T>) -> Mat<T> {
    let mut dense = Mat::<T>::zeros(m.nrows(), m.ncols());
    for triplet in m.triplet_iter() {
        let current = dense[(triplet.row, triplet.col)];
        dense[(triplet.row, triplet.col)] = current.plus(*triplet.val);
    }
    dense
}

/// Builds a sparse matrix from triplets, mapping construction failures to [`EigenError`].
pub fn from_triplets<T: Element>(
    nrows: usize,
    ncols: usize,
    triplets: &[Triplet<usize, usize, T>],
) -> Result<SparseMatrix<T>, EigenError> {
    SparseColMat::try_new_from_triplets(nrows, ncols, triplets)
        .map_err(|_| EigenErrorKind::SparseMatrixConstruction.into())
}

/// Returns the diagonal of a square sparse matrix.
pub fn diagonal<T: Element>(m: &SparseMatrix<T>) -> Vec<T> {
    let mut diag = vec![T::from_f64(0.0); m.nrows().min(m.ncols())];
    for triplet in m.triplet_iter() {
        if triplet.row == triplet.col {
            diag[triplet.row] = diag[triplet.row].plus(*triplet.val);
        }
    }
    diag
}
