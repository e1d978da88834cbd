//! This module defines the error type returned by the request builder and the backends.
//!
//! Numerical outcomes of a solve (non-convergence, missing eigenvalues, fatal backend
//! failures) are NOT errors: they travel back to the caller as a [`crate::Status`] next
//! to whatever partial result exists. [`EigenError`] is reserved for requests that cannot
//! be executed at all, and for backends that break their side of the contract.
//!
//! As with the other error types built on [`thiserror`], the public type is an opaque
//! newtype around a private enum so the set of variants can grow without breaking callers.
use thiserror::Error;

/// Represents all possible errors that can occur while preparing or dispatching a solve.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct EigenError(#[from] EigenErrorKind);

/// Private enum containing the distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum EigenErrorKind {
    /// The problem matrix is empty or not square.
    #[error("The problem matrix must be square and non-empty, got {nrows}x{ncols}.")]
    NotSquare { nrows: usize, ncols: usize },

    /// An auxiliary operand does not match the size of the problem matrix.
    #[error("Dimension mismatch: {operand} is {actual_rows}x{actual_cols}, expected {expected}x{expected}.")]
    DimensionMismatch {
        operand: &'static str,
        expected: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// The preconditioner returned a block whose shape differs from its input.
    #[error(
        "Preconditioner contract violated: applied to a {rows}x{cols} block it returned a {out_rows}x{out_cols} block."
    )]
    PreconditionerShape {
        rows: usize,
        cols: usize,
        out_rows: usize,
        out_cols: usize,
    },

    /// A preconditioner could not be built from the given matrix.
    #[error("Invalid preconditioner: {0}")]
    InvalidPreconditioner(String),

    /// The `which` selection cannot be honoured for this problem.
    #[error("Invalid eigenvalue selection: {0}")]
    InvalidSelection(String),

    /// The shift is not usable in the selected mode.
    #[error("Invalid shift: {0}")]
    InvalidShift(String),

    /// The eigenvector tolerance is negative or not finite.
    #[error("Invalid tolerance {0}: must be finite and non-negative.")]
    InvalidTolerance(f64),

    /// No eigensolver backend was compiled into this build.
    #[error("The eigensolver backend `{backend}` is unavailable. {guidance}")]
    BackendUnavailable {
        backend: &'static str,
        guidance: String,
    },

    /// A backend returned output that does not satisfy the documented result contract.
    #[error("Backend `{backend}` violated the result contract: {reason}")]
    BackendContract {
        backend: &'static str,
        reason: String,
    },

    /// Assembling a sparse matrix from triplets failed.
    #[error("Internal error: Failed to construct the sparse matrix from triplets.")]
    SparseMatrixConstruction,
}

// Manually implement PartialEq for the public error type.
// We compare the inner `EigenErrorKind`.
impl PartialEq for EigenError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl EigenError {
    /// Returns `true` if the error reports a build without any eigensolver backend.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self.0, EigenErrorKind::BackendUnavailable { .. })
    }

    /// Returns `true` if the request itself was rejected before reaching a backend.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self.0,
            EigenErrorKind::NotSquare { .. }
                | EigenErrorKind::DimensionMismatch { .. }
                | EigenErrorKind::PreconditionerShape { .. }
                | EigenErrorKind::InvalidPreconditioner(_)
                | EigenErrorKind::InvalidSelection(_)
                | EigenErrorKind::InvalidShift(_)
                | EigenErrorKind::InvalidTolerance(_)
        )
    }
}
