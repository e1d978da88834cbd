//! The preconditioner capability.
//!
//! A preconditioner is, roughly, an approximate inverse of `A`. The solver only ever asks
//! one thing of it: apply yourself to a block of vectors. Anything that can do that is a
//! preconditioner; there is no base type to derive from, and plain closures qualify.
//!
//! Blocks are `n x m` matrices whose columns are the vectors to precondition, `n` being
//! the problem size. The operator must be self-adjoint and positive definite: for any
//! block `X`, the Gram matrix `Xᴴ · apply(X)` must be Hermitian positive definite.

use crate::{
    element::Element,
    error::{EigenError, EigenErrorKind},
    matrix::{SparseMatrix, diagonal},
};
use faer::{Mat, MatRef};
use num_traits::{Float, Zero};

/// A self-adjoint positive definite operator applied column-wise to a block of vectors.
///
/// # Example
///
/// ```rust
/// use faer::{Mat, MatRef};
/// use partial_hevp::Preconditioner;
///
/// // Scaling by 1/4 is a (crude) preconditioner for a matrix with diagonal 4.
/// let scale = |x: MatRef<'_, f64>| Mat::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] / 4.0);
/// let x = Mat::from_fn(3, 2, |_, _| 1.0);
/// let y = scale.apply(x.as_ref());
/// assert_eq!(y[(2, 1)], 0.25);
/// ```
pub trait Preconditioner<T: Element> {
    /// Applies the preconditioner to every column of `x`, returning a block of the same shape.
    fn apply(&self, x: MatRef<'_, T>) -> Mat<T>;
}

impl<T, F> Preconditioner<T> for F
where
    T: Element,
    F: Fn(MatRef<'_, T>) -> Mat<T>,
{
    fn apply(&self, x: MatRef<'_, T>) -> Mat<T> {
        self(x)
    }
}

/// Checks the shape half of the preconditioner contract with a single test vector.
///
/// The self-adjointness and definiteness halves are properties of the operator that only
/// the backend can observe while it iterates.
pub(crate) fn check_shape<T: Element>(
    preconditioner: &dyn Preconditioner<T>,
    n: usize,
) -> Result<(), EigenError> {
    let x = Mat::from_fn(n, 1, |_, _| T::from_f64(1.0));
    let y = preconditioner.apply(x.as_ref());
    if y.nrows() != n || y.ncols() != 1 {
        return Err(EigenErrorKind::PreconditionerShape {
            rows: n,
            cols: 1,
            out_rows: y.nrows(),
            out_cols: y.ncols(),
        }
        .into());
    }
    Ok(())
}

/// Diagonal (Jacobi) preconditioner: scales row `i` by `1 / a_ii`.
#[derive(Debug, Clone)]
pub struct JacobiPreconditioner<T: Element> {
    inverse_diagonal: Vec<T::Real>,
}

impl<T: Element> JacobiPreconditioner<T> {
    /// Builds the preconditioner from the diagonal of `a`, which must be strictly positive.
    pub fn new(a: &SparseMatrix<T>) -> Result<Self, EigenError> {
        let inverse_diagonal = diagonal(a)
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let d = d.real_part();
                if d > T::Real::zero() && d.is_finite() {
                    Ok(d.recip())
                } else {
                    Err(EigenErrorKind::InvalidPreconditioner(format!(
                        "Jacobi preconditioner needs a positive diagonal, a[{i}, {i}] = {d}"
                    ))
                    .into())
                }
            })
            .collect::<Result<Vec<_>, EigenError>>()?;
        Ok(JacobiPreconditioner { inverse_diagonal })
    }

    pub fn len(&self) -> usize {
        self.inverse_diagonal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse_diagonal.is_empty()
    }
}

impl<T: Element> Preconditioner<T> for JacobiPreconditioner<T> {
    fn apply(&self, x: MatRef<'_, T>) -> Mat<T> {
        assert_eq!(
            x.nrows(),
            self.inverse_diagonal.len(),
            "Dimension mismatch: preconditioner size ({}) does not match block rows ({}).",
            self.inverse_diagonal.len(),
            x.nrows(),
        );
        Mat::from_fn(x.nrows(), x.ncols(), |i, j| {
            x[(i, j)].scale_by(self.inverse_diagonal[i])
        })
    }
}
