//! This module provides the high-level entry points for computing a few eigenpairs of a
//! sparse real symmetric or Hermitian eigenvalue problem.
//!
//! Three problem forms are supported:
//!
//! - standard, `A x = λ x`;
//! - generalized, `A x = λ B x` with `B` positive definite;
//! - buckling, `A x = -α B x` with `A` positive definite.
//!
//! Each call validates the request, decides the solution mode once (see
//! [`crate::request::Plan`]), forwards the canonical request to a [`Backend`] exactly once
//! and checks what comes back against the result contract before returning it.

use crate::{
    backend::{Backend, DefaultBackend, Solution, SolveRequest},
    element::Element,
    error::{EigenError, EigenErrorKind},
    matrix::{SparseMatrix, check_operand, problem_size},
    preconditioner::{Preconditioner, check_shape},
    request::{Mode, Options, Plan, Verbosity, Which},
    status::Status,
};
use faer::Mat;
use num_traits::Float;

/// Result of a partial eigenvalue solve.
///
/// Partial results are kept: when `status` is not [`Status::Converged`], the pairs that
/// were found are still returned, and callers must inspect `status` before trusting the
/// count.
#[derive(Debug, Clone)]
pub struct PartialEigen<T: Element> {
    /// Eigenvalues in ascending order. Always real, whatever the element kind.
    pub eigenvalues: Vec<T::Real>,
    /// The matching eigenvectors as columns, of the same element kind as the matrix.
    pub eigenvectors: Mat<T>,
    pub status: Status,
}

impl<T: Element> PartialEigen<T> {
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

/// Computes several eigenpairs of a sparse real symmetric/Hermitian eigenvalue problem
/// using the default backend.
///
/// # Arguments
/// * `a`: The (stiffness) matrix. Must be positive definite in buckling mode or when a
///   preconditioner is supplied.
/// * `b`: In buckling mode the stress stiffness matrix, otherwise the mass matrix, which
///   must be positive definite. `None` selects the standard problem.
/// * `t`: Optional preconditioner (roughly, an approximate inverse of `a`). Overrides the
///   buckling flag and the shift.
/// * `options`: Shift, selection, tolerance and verbosity (see [`Options`]).
///
/// # Returns
/// The eigenvalues in ascending order, the eigenvectors as columns and the execution
/// status, or an [`EigenError`] if the request cannot be executed.
pub fn solve_partial_eigenproblem<T: Element>(
    a: &SparseMatrix<T>,
    b: Option<&SparseMatrix<T>>,
    t: Option<&dyn Preconditioner<T>>,
    options: &Options<T::Real>,
) -> Result<PartialEigen<T>, EigenError> {
    solve_partial_eigenproblem_with(&DefaultBackend::default(), a, b, t, options)
}

/// Same as [`solve_partial_eigenproblem`], with an explicit backend.
pub fn solve_partial_eigenproblem_with<T, B>(
    backend: &B,
    a: &SparseMatrix<T>,
    b: Option<&SparseMatrix<T>>,
    t: Option<&dyn Preconditioner<T>>,
    options: &Options<T::Real>,
) -> Result<PartialEigen<T>, EigenError>
where
    T: Element,
    B: Backend,
{
    let n = problem_size(a)?;
    if let Some(b) = b {
        check_operand("B", b, n)?;
    }
    if let Some(t) = t {
        check_shape(t, n)?;
    }

    let plan = Plan::new(options, t.is_some(), n)?;
    let verbosity = options.verbosity;
    if verbosity.reports_progress() {
        log::info!(
            "partial_hevp: n = {n}, {} problem, {}, mode {}, backend `{}`",
            T::KIND,
            if b.is_some() { "generalized" } else { "standard" },
            describe(&plan.mode),
            backend.name(),
        );
    }

    let request = SolveRequest {
        a,
        b,
        preconditioner: t,
        plan,
        tol: options.tol,
        verbosity,
    };
    let solution = backend.solve(&request)?;
    let result = check_solution(backend.name(), &plan, n, solution)?;

    if verbosity.reports_progress() {
        log::info!(
            "partial_hevp: {} eigenpairs returned, status {} ({})",
            result.len(),
            result.status.code(),
            result.status
        );
    }
    Ok(result)
}

fn describe<R: std::fmt::Display>(mode: &Mode<R>) -> String {
    match mode {
        Mode::Preconditioned => "preconditioned".to_string(),
        Mode::Buckling { sigma } => format!("buckling shift-invert (sigma = {sigma})"),
        Mode::ShiftInvert { sigma } => format!("shift-invert (sigma = {sigma})"),
    }
}

/// Checks a backend's output against the result contract and restores ascending order.
fn check_solution<T: Element>(
    backend: &'static str,
    plan: &Plan<T::Real>,
    n: usize,
    solution: Solution<T>,
) -> Result<PartialEigen<T>, EigenError> {
    let contract = |reason: String| -> EigenError {
        EigenErrorKind::BackendContract { backend, reason }.into()
    };

    let Solution {
        eigenvalues,
        eigenvectors,
        status,
    } = solution;
    let status =
        Status::from_code(status).ok_or_else(|| contract(format!("unknown status code {status}")))?;

    let m = eigenvalues.len();
    if eigenvectors.ncols() != m || (m > 0 && eigenvectors.nrows() != n) {
        return Err(contract(format!(
            "{m} eigenvalues but a {}x{} eigenvector block for n = {n}",
            eigenvectors.nrows(),
            eigenvectors.ncols()
        )));
    }
    if let Some(i) = eigenvalues.iter().position(|v| !v.is_finite()) {
        return Err(contract(format!(
            "eigenvalue {i} is {}, not a finite number",
            eigenvalues[i]
        )));
    }
    let requested = plan.selection.count();
    if status.is_success() && m != requested {
        return Err(contract(format!(
            "status 0 with {m} eigenpairs, {requested} requested"
        )));
    }

    let (eigenvalues, eigenvectors) = sort_ascending(eigenvalues, eigenvectors);
    Ok(PartialEigen {
        eigenvalues,
        eigenvectors,
        status,
    })
}

/// Sorts eigenpairs by eigenvalue, keeping each eigenvector with its eigenvalue.
fn sort_ascending<T: Element>(values: Vec<T::Real>, vectors: Mat<T>) -> (Vec<T::Real>, Mat<T>) {
    if values.windows(2).all(|w| w[0] <= w[1]) {
        return (values, vectors);
    }
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| {
        values[i]
            .partial_cmp(&values[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let sorted_vectors = Mat::from_fn(vectors.nrows(), order.len(), |row, col| {
        vectors[(row, order[col])]
    });
    (order.iter().map(|&i| values[i]).collect(), sorted_vectors)
}

/// Builder over [`solve_partial_eigenproblem`] with the documented defaults:
/// no `B`, no preconditioner, `buckling = false`, `sigma = 0`, `which = 6`,
/// `tol = 1e-4`, `verbosity = 0`.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "direct")] {
/// use partial_hevp::{PartialEigenproblem, Status, utils::laplacian::lap1d};
///
/// let a = lap1d::<f64>(50, 1.0).unwrap();
/// let result = PartialEigenproblem::new(&a)
///     .sigma(0.0)
///     .which(3usize)
///     .tol(0.0)
///     .verbosity(-1)
///     .solve()
///     .unwrap();
/// assert_eq!(result.status, Status::Converged);
/// assert_eq!(result.eigenvalues.len(), 3);
/// assert!(result.eigenvalues.windows(2).all(|w| w[0] <= w[1]));
/// # }
/// ```
pub struct PartialEigenproblem<'a, T: Element> {
    a: &'a SparseMatrix<T>,
    b: Option<&'a SparseMatrix<T>>,
    t: Option<&'a dyn Preconditioner<T>>,
    options: Options<T::Real>,
}

impl<'a, T: Element> PartialEigenproblem<'a, T> {
    pub fn new(a: &'a SparseMatrix<T>) -> Self {
        PartialEigenproblem {
            a,
            b: None,
            t: None,
            options: Options::default(),
        }
    }

    /// Sets the mass matrix, or the stress stiffness matrix in buckling mode.
    pub fn mass(mut self, b: &'a SparseMatrix<T>) -> Self {
        self.b = Some(b);
        self
    }

    pub fn preconditioner(mut self, t: &'a dyn Preconditioner<T>) -> Self {
        self.t = Some(t);
        self
    }

    pub fn buckling(mut self, buckling: bool) -> Self {
        self.options.buckling = buckling;
        self
    }

    pub fn sigma(mut self, sigma: T::Real) -> Self {
        self.options.sigma = sigma;
        self
    }

    pub fn which(mut self, which: impl Into<Which>) -> Self {
        self.options.which = which.into();
        self
    }

    pub fn tol(mut self, tol: T::Real) -> Self {
        self.options.tol = tol;
        self
    }

    pub fn verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.options.verbosity = verbosity.into();
        self
    }

    /// Solves with the default backend.
    pub fn solve(&self) -> Result<PartialEigen<T>, EigenError> {
        solve_partial_eigenproblem(self.a, self.b, self.t, &self.options)
    }

    /// Solves with an explicit backend.
    pub fn solve_with<B: Backend>(&self, backend: &B) -> Result<PartialEigen<T>, EigenError> {
        solve_partial_eigenproblem_with(backend, self.a, self.b, self.t, &self.options)
    }
}
