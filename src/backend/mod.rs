//! The eigensolver backend contract.
//!
//! The numerical work of a partial eigenvalue solve lives behind the [`Backend`] trait.
//! A backend receives one fully canonicalized [`SolveRequest`] per call: the mode has
//! already been decided and `which`/`sigma` already reinterpreted into a [`Selection`],
//! so a backend never has to guess what the caller meant.
//!
//! A backend reports numerical outcomes through the integer status of its [`Solution`]
//! (see [`crate::Status`]) and keeps `Err` for the cases where it could not run at all.
//!
//! [`Selection`]: crate::request::Selection

#[cfg(feature = "direct")]
pub mod direct;

use crate::{
    element::Element,
    error::{EigenError, EigenErrorKind},
    matrix::SparseMatrix,
    preconditioner::Preconditioner,
    request::{Plan, Verbosity},
};
use faer::Mat;

#[cfg(feature = "direct")]
pub use direct::DirectBackend;

/// Everything a backend needs to execute one solve.
pub struct SolveRequest<'a, T: Element> {
    /// The (stiffness) matrix.
    pub a: &'a SparseMatrix<T>,
    /// The mass matrix, or the stress stiffness matrix in buckling mode.
    pub b: Option<&'a SparseMatrix<T>>,
    /// Present exactly when the plan's mode is preconditioned.
    pub preconditioner: Option<&'a dyn Preconditioner<T>>,
    pub plan: Plan<T::Real>,
    pub tol: T::Real,
    pub verbosity: Verbosity,
}

impl<T: Element> SolveRequest<'_, T> {
    /// The problem size `n`.
    pub fn size(&self) -> usize {
        self.a.nrows()
    }
}

/// Raw backend output, before the dispatcher checks it against the result contract.
#[derive(Debug, Clone)]
pub struct Solution<T: Element> {
    pub eigenvalues: Vec<T::Real>,
    /// Eigenvectors as columns, `n x eigenvalues.len()`.
    pub eigenvectors: Mat<T>,
    /// Status code from the taxonomy of [`crate::Status`].
    pub status: i32,
}

/// An eigensolver able to execute a [`SolveRequest`].
pub trait Backend {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Executes the request once. No retries are expected from the caller.
    fn solve<T: Element>(&self, request: &SolveRequest<'_, T>) -> Result<Solution<T>, EigenError>;
}

impl<B: Backend> Backend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve<T: Element>(&self, request: &SolveRequest<'_, T>) -> Result<Solution<T>, EigenError> {
        (**self).solve(request)
    }
}

/// The backend used when none is given explicitly.
#[cfg(feature = "direct")]
pub type DefaultBackend = DirectBackend;

/// The backend used when none is given explicitly.
#[cfg(not(feature = "direct"))]
pub type DefaultBackend = MissingBackend;

/// Stand-in for a backend that was not compiled in.
///
/// Every solve fails with a descriptive error that names the missing backend and how to
/// enable it, so a build without a backend is never mistaken for a working one.
///
/// # Example
///
/// ```rust
/// use partial_hevp::{MissingBackend, PartialEigenproblem, utils::laplacian::lap1d};
///
/// let a = lap1d::<f64>(8, 1.0).unwrap();
/// let err = PartialEigenproblem::new(&a)
///     .which(2usize)
///     .verbosity(-1)
///     .solve_with(&MissingBackend)
///     .unwrap_err();
/// assert!(err.is_backend_unavailable());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingBackend;

impl MissingBackend {
    const BACKEND: &'static str = "direct";

    /// Installation guidance for the current platform.
    pub fn guidance() -> String {
        let shell = if cfg!(windows) { "PowerShell" } else { "your shell" };
        format!(
            "This build of partial_hevp has no eigensolver backend; rebuild with the `{}` feature, \
             e.g. run `cargo add partial_hevp --features {}` from {shell}.",
            Self::BACKEND,
            Self::BACKEND,
        )
    }
}

impl Backend for MissingBackend {
    fn name(&self) -> &'static str {
        "missing"
    }

    fn solve<T: Element>(&self, request: &SolveRequest<'_, T>) -> Result<Solution<T>, EigenError> {
        let guidance = Self::guidance();
        if request.verbosity.reports_errors() {
            log::error!("{guidance}");
        }
        Err(EigenErrorKind::BackendUnavailable {
            backend: Self::BACKEND,
            guidance,
        }
        .into())
    }
}
