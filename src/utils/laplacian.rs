//! Discrete Laplacians on uniform grids with homogeneous Dirichlet boundary conditions.
//!
//! The grid over `[0, a]` with `n` interior points has spacing `h = a / (n + 1)`, and the
//! 1D operator is the tridiagonal matrix `(2, -1, -1) / h²`. Higher dimensions are
//! Kronecker sums of 1D operators, with the unknown at `(i, j, k)` stored at index
//! `i + nx * (j + ny * k)`.
//!
//! The 1D operator has the closed-form spectrum `(4 / h²) sin²(jπ / (2(n + 1)))`,
//! `j = 1..=n`, and the spectrum of a Kronecker sum is the set of sums of the factor
//! eigenvalues, which makes these matrices convenient regression problems.

use crate::{
    element::Element,
    error::{EigenError, EigenErrorKind},
    matrix::{SparseMatrix, from_triplets},
};
use faer::sparse::Triplet;
use std::f64::consts::PI;

/// One axis of a grid: its number of interior points and its extent.
#[derive(Debug, Clone, Copy)]
struct Axis {
    points: usize,
    extent: f64,
}

impl Axis {
    /// `1 / h²`.
    fn inverse_spacing_squared(self) -> f64 {
        let h = self.extent / (self.points + 1) as f64;
        1.0 / (h * h)
    }

    fn eigenvalues(self) -> impl Iterator<Item = f64> {
        let scale = 4.0 * self.inverse_spacing_squared();
        let denominator = 2.0 * (self.points + 1) as f64;
        (1..=self.points).map(move |j| {
            let s = (j as f64 * PI / denominator).sin();
            scale * s * s
        })
    }
}

fn check_axes(axes: &[Axis]) -> Result<(), EigenError> {
    for (d, axis) in axes.iter().enumerate() {
        if axis.points == 0 {
            return Err(EigenErrorKind::InvalidSelection(format!(
                "grid axis {d} has no interior points"
            ))
            .into());
        }
        if !(axis.extent.is_finite() && axis.extent > 0.0) {
            return Err(EigenErrorKind::InvalidSelection(format!(
                "grid axis {d} has a non-positive extent {}",
                axis.extent
            ))
            .into());
        }
    }
    Ok(())
}

fn laplacian<T: Element>(axes: &[Axis]) -> Result<SparseMatrix<T>, EigenError> {
    check_axes(axes)?;
    let n: usize = axes.iter().map(|axis| axis.points).product();
    let diagonal: f64 = axes
        .iter()
        .map(|axis| 2.0 * axis.inverse_spacing_squared())
        .sum();

    let mut triplets = Vec::with_capacity(n * (1 + 2 * axes.len()));
    let mut coords = vec![0usize; axes.len()];
    for index in 0..n {
        triplets.push(Triplet {
            row: index,
            col: index,
            val: T::from_f64(diagonal),
        });

        // Neighbours along each axis; stride is the distance in index space.
        let mut stride = 1;
        for (d, axis) in axes.iter().enumerate() {
            if coords[d] + 1 < axis.points {
                let off = T::from_f64(-axis.inverse_spacing_squared());
                triplets.push(Triplet {
                    row: index,
                    col: index + stride,
                    val: off,
                });
                triplets.push(Triplet {
                    row: index + stride,
                    col: index,
                    val: off,
                });
            }
            stride *= axis.points;
        }

        for (d, axis) in axes.iter().enumerate() {
            coords[d] += 1;
            if coords[d] < axis.points {
                break;
            }
            coords[d] = 0;
        }
    }

    from_triplets(n, n, &triplets)
}

/// 1D Laplacian on `n` interior points of `[0, a]`.
pub fn lap1d<T: Element>(n: usize, a: f64) -> Result<SparseMatrix<T>, EigenError> {
    laplacian(&[Axis {
        points: n,
        extent: a,
    }])
}

/// 2D Laplacian on an `nx x ny` interior grid of `[0, ax] x [0, ay]`.
pub fn lap2d<T: Element>(
    nx: usize,
    ny: usize,
    ax: f64,
    ay: f64,
) -> Result<SparseMatrix<T>, EigenError> {
    laplacian(&[
        Axis {
            points: nx,
            extent: ax,
        },
        Axis {
            points: ny,
            extent: ay,
        },
    ])
}

/// 3D Laplacian on an `nx x ny x nz` interior grid of `[0, ax] x [0, ay] x [0, az]`.
pub fn lap3d<T: Element>(
    nx: usize,
    ny: usize,
    nz: usize,
    ax: f64,
    ay: f64,
    az: f64,
) -> Result<SparseMatrix<T>, EigenError> {
    laplacian(&[
        Axis {
            points: nx,
            extent: ax,
        },
        Axis {
            points: ny,
            extent: ay,
        },
        Axis {
            points: nz,
            extent: az,
        },
    ])
}

fn sorted_sums(axes: &[Axis]) -> Vec<f64> {
    let mut sums = vec![0.0];
    for axis in axes {
        let factor: Vec<f64> = axis.eigenvalues().collect();
        sums = sums
            .iter()
            .flat_map(|&s| factor.iter().map(move |&lambda| s + lambda))
            .collect();
    }
    sums.sort_by(f64::total_cmp);
    sums
}

/// Analytic spectrum of [`lap1d`], ascending.
pub fn lap1d_eigenvalues(n: usize, a: f64) -> Vec<f64> {
    sorted_sums(&[Axis {
        points: n,
        extent: a,
    }])
}

/// Analytic spectrum of [`lap3d`], ascending.
pub fn lap3d_eigenvalues(nx: usize, ny: usize, nz: usize, ax: f64, ay: f64, az: f64) -> Vec<f64> {
    sorted_sums(&[
        Axis {
            points: nx,
            extent: ax,
        },
        Axis {
            points: ny,
            extent: ay,
        },
        Axis {
            points: nz,
            extent: az,
        },
    ])
}
