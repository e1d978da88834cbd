//! Partial eigenvalue solver for sparse real symmetric and complex Hermitian matrices.
//!
//! This crate computes a few eigenpairs of large sparse eigenvalue problems in one of three
//! forms:
//!
//! - standard, $\mathbf{A}\mathbf{x} = \lambda \mathbf{x}$;
//! - generalized, $\mathbf{A}\mathbf{x} = \lambda \mathbf{B}\mathbf{x}$ with $\mathbf{B}$
//!   positive definite;
//! - buckling, $\mathbf{A}\mathbf{x} = -\alpha \mathbf{B}\mathbf{x}$ with $\mathbf{A}$
//!   positive definite.
//!
//! All four element kinds are supported: `f32`, `f64`, [`faer::c32`] and [`faer::c64`].
//! Eigenvalues are always real and returned in ascending order; eigenvectors are returned
//! as the columns of a dense [`faer::Mat`] of the same element kind as the matrix.
//!
//! ## Solution modes
//!
//! The same parameters mean different things depending on the inputs, and the mode is
//! decided once per call:
//!
//! **Preconditioned**: a [`Preconditioner`] is supplied. `which = k` selects the `k`
//! smallest eigenvalues; the shift and the buckling flag are ignored.
//!
//! **Buckling**: no preconditioner and `buckling = true`. `sigma` must be negative and
//! selects the eigenvalues immediately to its right.
//!
//! **Shift-invert**: otherwise. `which = k` selects the `k` eigenvalues nearest to `sigma`,
//! `which = (l, r)` the `l` immediately left of it and the `r` immediately right of it.
//!
//! ## Backends
//!
//! The numerical work is delegated to a [`Backend`]. With the default `direct` feature the
//! crate ships [`DirectBackend`], a dense reference solver built on [`faer`]'s self-adjoint
//! eigendecomposition. Without it, every solve fails with an error explaining how to enable
//! a backend.
//!
//! ## Example Usage
//!
//! The following example computes the ten eigenvalues of a 3D Laplacian nearest to zero and
//! compares them with the analytic spectrum.
//!
//! ```rust
//! # #[cfg(feature = "direct")] {
//! use partial_hevp::{PartialEigenproblem, Status};
//! use partial_hevp::utils::laplacian::{lap3d, lap3d_eigenvalues};
//!
//! let a = lap3d::<f64>(5, 4, 3, 1.0, 1.0, 1.0).unwrap();
//!
//! let result = PartialEigenproblem::new(&a)
//!     .which(10usize)
//!     .tol(0.0)
//!     .verbosity(-1)
//!     .solve()
//!     .unwrap();
//!
//! assert_eq!(result.status, Status::Converged);
//! let exact = lap3d_eigenvalues(5, 4, 3, 1.0, 1.0, 1.0);
//! for (computed, expected) in result.eigenvalues.iter().zip(&exact) {
//!     assert!((computed - expected).abs() <= 1e-9 * expected.abs());
//! }
//! # }
//! ```

pub mod backend;
pub mod element;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod request;
pub mod solvers;
pub mod status;
pub mod utils;

#[cfg(feature = "direct")]
pub use backend::DirectBackend;
pub use backend::{Backend, MissingBackend};
pub use element::{Element, ElementKind};
pub use error::EigenError;
pub use matrix::SparseMatrix;
pub use preconditioner::{JacobiPreconditioner, Preconditioner};
pub use request::{Options, Verbosity, Which};
pub use solvers::{
    PartialEigen, PartialEigenproblem, solve_partial_eigenproblem, solve_partial_eigenproblem_with,
};
pub use status::Status;
