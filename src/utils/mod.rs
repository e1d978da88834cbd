//! Helpers for building test problems.
//!
//! - **`laplacian`**: finite-difference discrete Laplacians on uniform 1D, 2D and 3D grids
//!   with Dirichlet boundary conditions, together with their analytic spectra. These are
//!   the reference problems used by the regression tests and the `laplace_spectrum` binary.

pub mod laplacian;
