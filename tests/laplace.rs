//! Regression tests on discrete Laplacians with known spectra.
//!
//! # Test Methodology
//!
//! A 3D Dirichlet Laplacian has a closed-form spectrum (sums of the 1D eigenvalues
//! `(4 / h²) sin²(jπ / (2(n + 1)))`), so every solve can be checked against exact values
//! rather than against another solver:
//!
//! 1.  **Assemble** the same Laplacian in each element kind (`f64`, `c64`, `f32`, `c32`).
//! 2.  **Solve** for the 10 eigenvalues nearest to a zero shift with the strictest tolerance.
//! 3.  **Verify** the status, the ascending order, the agreement with the analytic spectrum
//!     and the residuals `‖A x - λ x‖`, with a tight bound for 64-bit kinds and a looser one
//!     for 32-bit kinds.
//!
//! The remaining tests exercise the generalized and buckling forms, the preconditioned
//! mode and a random Hermitian problem through the same public entry points.

#![cfg(feature = "direct")]

use anyhow::{Result, ensure};
use faer::{Mat, c32, c64, sparse::Triplet};
use partial_hevp::{
    Element, JacobiPreconditioner, Options, PartialEigen, PartialEigenproblem, SparseMatrix,
    Status, Verbosity, Which,
    element::RealScalar,
    matrix::{from_triplets, to_dense},
    solve_partial_eigenproblem,
    utils::laplacian::{lap1d, lap1d_eigenvalues, lap3d, lap3d_eigenvalues},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Grid used by the regression scenarios: 210 unknowns, no degenerate eigenvalue straddling
/// the 10th/11th boundary.
const GRID: (usize, usize, usize) = (7, 6, 5);
const NEV: usize = 10;

/// Relative agreement expected from 64-bit element kinds.
const TIGHT_TOLERANCE: f64 = 1e-9;

/// Relative agreement expected from 32-bit element kinds. Single precision carries about
/// seven significant digits and the spectrum spans two orders of magnitude.
const LOOSE_TOLERANCE: f64 = 1e-4;

fn laplacian<T: Element>() -> Result<SparseMatrix<T>> {
    let (nx, ny, nz) = GRID;
    Ok(lap3d::<T>(nx, ny, nz, 1.0, 1.0, 1.0)?)
}

fn analytic() -> Vec<f64> {
    let (nx, ny, nz) = GRID;
    lap3d_eigenvalues(nx, ny, nz, 1.0, 1.0, 1.0)
}

fn solve_laplacian<T: Element>(tol: f64) -> Result<PartialEigen<T>> {
    let a = laplacian::<T>()?;
    let result = PartialEigenproblem::new(&a)
        .sigma(<T::Real as RealScalar>::from_f64(0.0))
        .which(NEV)
        .tol(<T::Real as RealScalar>::from_f64(tol))
        .verbosity(-1)
        .solve()?;
    Ok(result)
}

fn eigenvalues_f64<T: Element>(result: &PartialEigen<T>) -> Vec<f64> {
    result.eigenvalues.iter().map(|&v| v.into()).collect()
}

/// Largest relative residual `‖A x - λ B x‖ / (|λ| ‖B x‖)` over the returned pairs.
fn max_relative_residual<T: Element>(
    a: &SparseMatrix<T>,
    b: Option<&SparseMatrix<T>>,
    result: &PartialEigen<T>,
) -> f64 {
    let a = to_dense(a);
    let x = &result.eigenvectors;
    let ax = &a * x;
    let bx = match b {
        Some(b) => &to_dense(b) * x,
        None => x.clone(),
    };
    let mut worst = 0.0f64;
    for (j, &lambda) in result.eigenvalues.iter().enumerate() {
        let mut residual = 0.0f64;
        let mut scale = 0.0f64;
        for i in 0..x.nrows() {
            let r = ax[(i, j)].plus(bx[(i, j)].scale_by(-lambda));
            let r2: f64 = r.abs2().into();
            let b2: f64 = bx[(i, j)].abs2().into();
            residual += r2;
            scale += b2;
        }
        let lambda: f64 = lambda.into();
        worst = worst.max(residual.sqrt() / (lambda.abs() * scale.sqrt()));
    }
    worst
}

fn check_laplace<T: Element>(tol: f64, bound: f64) -> Result<()> {
    let result = solve_laplacian::<T>(tol)?;
    let (nx, ny, nz) = GRID;
    let n = nx * ny * nz;

    ensure!(
        result.status == Status::Converged,
        "{}: expected status 0, got {}",
        T::KIND,
        result.status.code()
    );
    ensure!(result.len() == NEV, "{}: {} eigenvalues returned", T::KIND, result.len());
    ensure!(
        result.eigenvectors.nrows() == n && result.eigenvectors.ncols() == NEV,
        "{}: eigenvector block is {}x{}",
        T::KIND,
        result.eigenvectors.nrows(),
        result.eigenvectors.ncols()
    );

    let computed = eigenvalues_f64(&result);
    ensure!(
        computed.windows(2).all(|w| w[0] <= w[1]),
        "{}: eigenvalues not ascending: {:?}",
        T::KIND,
        computed
    );
    for (i, (c, e)) in computed.iter().zip(analytic()).enumerate() {
        let rel_err = (c - e).abs() / e.abs();
        ensure!(
            rel_err < bound,
            "{}: eigenvalue {} is {}, expected {} (relative error {:e})",
            T::KIND,
            i,
            c,
            e,
            rel_err
        );
    }

    let a = laplacian::<T>()?;
    let residual = max_relative_residual(&a, None, &result);
    ensure!(
        residual < bound * 10.0,
        "{}: relative residual too high: {:e}",
        T::KIND,
        residual
    );
    Ok(())
}

macro_rules! generate_laplace_test {
    ($test_name:ident, $element:ty, $tol:expr, $bound:expr) => {
        #[test]
        fn $test_name() -> Result<()> {
            check_laplace::<$element>($tol, $bound)
        }
    };
}

generate_laplace_test!(laplace_float64, f64, 0.0, TIGHT_TOLERANCE);
generate_laplace_test!(laplace_complex128, c64, 0.0, TIGHT_TOLERANCE);
generate_laplace_test!(laplace_float32, f32, 0.0, LOOSE_TOLERANCE);
generate_laplace_test!(laplace_complex64, c32, 0.0, LOOSE_TOLERANCE);
generate_laplace_test!(laplace_float32_relaxed_tolerance, f32, 1e-3, 1e-3);

/// Ten smallest eigenvalues of the 10x10x10 Laplacian on the unit cube, as tabulated.
const UNIT_CUBE_REFERENCE: [f64; 10] = [
    29.40810116,
    58.02204583,
    58.02204583,
    58.02204583,
    86.6359905,
    86.6359905,
    86.6359905,
    103.12910316,
    103.12910316,
    103.12910316,
];

#[test]
fn laplace_unit_cube_reference_values() -> Result<()> {
    let a = lap3d::<f64>(10, 10, 10, 1.0, 1.0, 1.0)?;
    let result = PartialEigenproblem::new(&a)
        .sigma(0.0)
        .which(NEV)
        .tol(0.0)
        .verbosity(-1)
        .solve()?;
    ensure!(result.status == Status::Converged, "status {}", result.status.code());
    ensure!(result.len() == NEV);
    for (i, (c, e)) in result.eigenvalues.iter().zip(UNIT_CUBE_REFERENCE).enumerate() {
        ensure!(
            (c - e).abs() <= 1e-7 * e,
            "eigenvalue {i} is {c}, tabulated {e}"
        );
    }
    Ok(())
}

#[test]
fn element_kinds_agree() -> Result<()> {
    let reference = eigenvalues_f64(&solve_laplacian::<f64>(0.0)?);
    let complex = eigenvalues_f64(&solve_laplacian::<c64>(0.0)?);
    let single = eigenvalues_f64(&solve_laplacian::<f32>(0.0)?);
    let relaxed = eigenvalues_f64(&solve_laplacian::<f32>(1e-3)?);

    for i in 0..NEV {
        let r = reference[i];
        ensure!(
            (complex[i] - r).abs() <= TIGHT_TOLERANCE * r,
            "complex128 disagrees at {i}: {} vs {r}",
            complex[i]
        );
        ensure!(
            (single[i] - r).abs() <= LOOSE_TOLERANCE * r,
            "float32 disagrees at {i}: {} vs {r}",
            single[i]
        );
        ensure!(
            (relaxed[i] - r).abs() <= 1e-3 * r,
            "relaxed float32 disagrees at {i}: {} vs {r}",
            relaxed[i]
        );
    }
    Ok(())
}

#[test]
fn complex_eigenvectors_keep_their_kind() -> Result<()> {
    let result = solve_laplacian::<c32>(0.0)?;
    ensure!(<c32 as Element>::KIND.is_complex());
    ensure!(!<f32 as Element>::KIND.is_complex());
    // Eigenvectors are unit-norm columns whatever their phase.
    for j in 0..result.len() {
        let norm2: f32 = (0..result.eigenvectors.nrows())
            .map(|i| result.eigenvectors[(i, j)].abs2())
            .sum();
        ensure!((norm2 - 1.0).abs() < 1e-4, "column {j} has squared norm {norm2}");
    }
    Ok(())
}

#[test]
fn shift_inside_the_spectrum() -> Result<()> {
    let a = laplacian::<f64>()?;
    let exact = analytic();
    let sigma = 60.0;

    let nearest = PartialEigenproblem::new(&a)
        .sigma(sigma)
        .which(4usize)
        .tol(0.0)
        .verbosity(-1)
        .solve()?;
    ensure!(nearest.status == Status::Converged);
    let mut expected: Vec<f64> = exact.clone();
    expected.sort_by(|x, y| (x - sigma).abs().total_cmp(&(y - sigma).abs()));
    expected.truncate(4);
    expected.sort_by(f64::total_cmp);
    for (c, e) in nearest.eigenvalues.iter().zip(&expected) {
        ensure!((c - e).abs() < TIGHT_TOLERANCE * e, "nearest: {c} vs {e}");
    }

    // Two immediately left of the shift and three immediately right of it.
    let split = PartialEigenproblem::new(&a)
        .sigma(sigma)
        .which((2usize, 3usize))
        .tol(0.0)
        .verbosity(-1)
        .solve()?;
    ensure!(split.status == Status::Converged);
    let boundary = exact.partition_point(|&v| v <= sigma);
    let expected = &exact[boundary - 2..boundary + 3];
    ensure!(split.len() == 5);
    for (c, e) in split.eigenvalues.iter().zip(expected) {
        ensure!((c - e).abs() < TIGHT_TOLERANCE * e, "split: {c} vs {e}");
    }
    Ok(())
}

#[test]
fn split_beyond_the_lower_end_reports_missing_left() -> Result<()> {
    let a = lap1d::<f64>(20, 1.0)?;
    let exact = lap1d_eigenvalues(20, 1.0);
    // Only one eigenvalue lies below this shift.
    let sigma = 0.5 * (exact[0] + exact[1]);
    let result = PartialEigenproblem::new(&a)
        .sigma(sigma)
        .which((3usize, 2usize))
        .verbosity(-1)
        .solve()?;
    ensure!(
        result.status == Status::MissingLeft,
        "expected status 3, got {}",
        result.status.code()
    );
    ensure!(result.len() == 3, "partial result should be kept, got {}", result.len());
    ensure!((result.eigenvalues[0] - exact[0]).abs() < TIGHT_TOLERANCE * exact[0]);
    Ok(())
}

fn scaled_identity<T: Element>(n: usize, value: f64) -> Result<SparseMatrix<T>> {
    let triplets: Vec<_> = (0..n)
        .map(|i| Triplet {
            row: i,
            col: i,
            val: T::from_f64(value),
        })
        .collect();
    Ok(from_triplets(n, n, &triplets)?)
}

#[test]
fn generalized_problem_with_scaled_mass() -> Result<()> {
    let n = 30;
    let a = lap1d::<c64>(n, 1.0)?;
    let b = scaled_identity::<c64>(n, 2.0)?;
    let exact = lap1d_eigenvalues(n, 1.0);

    let result = PartialEigenproblem::new(&a)
        .mass(&b)
        .which(5usize)
        .tol(0.0)
        .verbosity(-1)
        .solve()?;
    ensure!(result.status == Status::Converged);
    for (c, e) in result.eigenvalues.iter().zip(&exact) {
        ensure!((c - e / 2.0).abs() < TIGHT_TOLERANCE * e, "{c} vs {}", e / 2.0);
    }
    ensure!(max_relative_residual(&a, Some(&b), &result) < 1e-8);

    // Eigenvectors are B-orthonormal: xᴴ B x = 1.
    for j in 0..result.len() {
        let norm_b: f64 = (0..n)
            .map(|i| 2.0 * result.eigenvectors[(i, j)].abs2())
            .sum();
        ensure!((norm_b - 1.0).abs() < 1e-10, "column {j}: xᴴ B x = {norm_b}");
    }
    Ok(())
}

#[test]
fn buckling_problem_with_negated_identity() -> Result<()> {
    // A x = -α (-I) x is the standard problem for A, so α runs over the spectrum of A.
    let n = 25;
    let a = lap1d::<f64>(n, 1.0)?;
    let b = scaled_identity::<f64>(n, -1.0)?;
    let exact = lap1d_eigenvalues(n, 1.0);

    let options = Options {
        buckling: true,
        sigma: -1.0,
        which: Which::Count(4),
        tol: 0.0,
        verbosity: Verbosity::SILENT,
    };
    let result = solve_partial_eigenproblem(&a, Some(&b), None, &options)?;
    ensure!(result.status == Status::Converged, "status {}", result.status.code());
    ensure!(result.len() == 4);
    for (c, e) in result.eigenvalues.iter().zip(&exact) {
        ensure!((c - e).abs() < TIGHT_TOLERANCE * e, "{c} vs {e}");
    }
    Ok(())
}

#[test]
fn buckling_with_indefinite_stiffness_is_fatal() -> Result<()> {
    let n = 10;
    let a = scaled_identity::<f64>(n, -1.0)?;
    let b = scaled_identity::<f64>(n, 1.0)?;
    let result = PartialEigenproblem::new(&a)
        .mass(&b)
        .buckling(true)
        .sigma(-1.0)
        .which(2usize)
        .verbosity(-1)
        .solve()?;
    ensure!(result.status.is_fatal());
    ensure!(result.status == Status::Fatal(-2));
    ensure!(result.is_empty());
    Ok(())
}

#[test]
fn jacobi_preconditioned_smallest() -> Result<()> {
    let a = laplacian::<f64>()?;
    let jacobi = JacobiPreconditioner::new(&a)?;
    // Buckling and the shift are ignored once a preconditioner is supplied.
    let result = PartialEigenproblem::new(&a)
        .preconditioner(&jacobi)
        .buckling(true)
        .sigma(500.0)
        .which(6usize)
        .verbosity(-1)
        .solve()?;
    ensure!(result.status == Status::Converged);
    for (c, e) in result.eigenvalues.iter().zip(analytic()) {
        ensure!((c - e).abs() < TIGHT_TOLERANCE * e, "{c} vs {e}");
    }
    Ok(())
}

#[test]
fn random_hermitian_residuals() -> Result<()> {
    let n = 40;
    let mut rng = StdRng::seed_from_u64(42);

    // Sparse random Hermitian matrix: a few off-diagonal couplings per row.
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push(Triplet {
            row: i,
            col: i,
            val: c64::new(rng.random_range(-5.0..5.0), 0.0),
        });
        for _ in 0..3 {
            let j = rng.random_range(0..n);
            if j == i {
                continue;
            }
            let val = c64::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5);
            triplets.push(Triplet { row: i, col: j, val });
            triplets.push(Triplet {
                row: j,
                col: i,
                val: val.conj(),
            });
        }
    }
    let a: SparseMatrix<c64> = from_triplets(n, n, &triplets)?;

    let result = PartialEigenproblem::new(&a)
        .sigma(0.3)
        .which(6usize)
        .tol(0.0)
        .verbosity(-1)
        .solve()?;
    ensure!(result.status == Status::Converged);
    ensure!(result.eigenvalues.windows(2).all(|w| w[0] <= w[1]));

    // Absolute residuals: eigenvalues near the shift may be close to zero.
    let dense = to_dense(&a);
    let ax = &dense * &result.eigenvectors;
    for (j, &lambda) in result.eigenvalues.iter().enumerate() {
        let residual: f64 = (0..n)
            .map(|i| (ax[(i, j)] - result.eigenvectors[(i, j)] * lambda).norm_sqr())
            .sum::<f64>()
            .sqrt();
        ensure!(residual < 1e-10, "pair {j} residual {residual:e}");
    }

    // Columns are orthonormal.
    let x = &result.eigenvectors;
    let gram: Mat<c64> = x.adjoint() * x.as_ref();
    for i in 0..gram.nrows() {
        for j in 0..gram.ncols() {
            let expected = if i == j { 1.0 } else { 0.0 };
            ensure!(
                (gram[(i, j)] - c64::new(expected, 0.0)).norm() < 1e-10,
                "gram[{i}, {j}] = {}",
                gram[(i, j)]
            );
        }
    }
    Ok(())
}
