//! Dense reference backend.
//!
//! [`DirectBackend`] densifies the problem and hands it to [`faer`]'s self-adjoint
//! eigendecomposition, then picks the requested eigenpairs out of the full spectrum.
//! It is exact to working precision, so the tolerance has no effect, and it never needs
//! the preconditioner. Its cost is `O(n^3)` time and `O(n^2)` memory, which makes it the
//! right tool for moderate problem sizes and for validating other backends.
//!
//! Generalized problems are reduced to standard form with the inverse square root of
//! the metric matrix: if `M = Q D Qᴴ` is positive definite, `W = Q D^{-1/2}` satisfies
//! `Wᴴ M W = I`, eigenpairs `(λ, y)` of `Wᴴ K W` give eigenpairs `(λ, W y)` of
//! `K x = λ M x`, and the eigenvectors come out `M`-orthonormal.

use super::{Backend, Solution, SolveRequest};
use crate::{
    element::{Element, RealScalar},
    error::EigenError,
    matrix::to_dense,
    request::{Mode, Selection, Verbosity},
    status::{FATAL_MASS_NOT_POSITIVE_DEFINITE, FATAL_STIFFNESS_NOT_POSITIVE_DEFINITE, Status},
};
use faer::{Mat, Side};
use num_traits::{Float, One, Zero};

/// Dense eigensolver backend built on [`faer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectBackend;

/// Eigenvalues in ascending order with their eigenvectors as matching columns.
struct Spectrum<T: Element> {
    values: Vec<T::Real>,
    vectors: Mat<T>,
}

impl Backend for DirectBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn solve<T: Element>(&self, request: &SolveRequest<'_, T>) -> Result<Solution<T>, EigenError> {
        let verbosity = request.verbosity;
        let n = request.size();
        let plan = &request.plan;

        if verbosity.reports_progress() {
            log::info!(
                "direct backend: {} problem of size {n}, mode {:?}, {} eigenpairs requested",
                T::KIND,
                plan.mode,
                plan.selection.count(),
            );
            log::info!(
                "direct backend: tolerance {} has no effect on a dense solve",
                request.tol
            );
        }

        let a = to_dense(request.a);
        let b = request.b.map(to_dense);

        let spectrum = match plan.mode {
            Mode::Buckling { .. } => buckling_spectrum(&a, b.as_ref()),
            Mode::ShiftInvert { .. } => pencil_spectrum(&a, b.as_ref()),
            Mode::Preconditioned => pencil_spectrum(&a, b.as_ref()).and_then(|spectrum| {
                // Preconditioned solves are only defined for a positive definite A.
                match spectrum.values.first() {
                    Some(&lowest) if lowest <= T::Real::zero() => {
                        Err(Status::Fatal(FATAL_STIFFNESS_NOT_POSITIVE_DEFINITE))
                    }
                    _ => Ok(spectrum),
                }
            }),
        };

        let spectrum = match spectrum {
            Ok(spectrum) => spectrum,
            Err(status) => {
                report_status(status, verbosity);
                return Ok(Solution {
                    eigenvalues: Vec::new(),
                    eigenvectors: Mat::zeros(n, 0),
                    status: status.code(),
                });
            }
        };

        let (indices, status) = select(&spectrum.values, plan.selection, plan.mode.sigma());
        let eigenvalues: Vec<T::Real> = indices.iter().map(|&i| spectrum.values[i]).collect();
        let eigenvectors = Mat::from_fn(n, indices.len(), |row, col| {
            spectrum.vectors[(row, indices[col])]
        });

        report_status(status, verbosity);
        if verbosity.reports_progress() {
            log::info!(
                "direct backend: {} of {} requested eigenpairs converged",
                eigenvalues.len(),
                plan.selection.count()
            );
        }
        if verbosity.reports_iterates() {
            let residuals = residual_norms(&a, b.as_ref(), &eigenvalues, &eigenvectors, plan.mode);
            for (i, (lambda, residual)) in eigenvalues.iter().zip(residuals).enumerate() {
                log::debug!("eigenvalue {i:4}: {lambda:>24e}  residual {residual:.3e}");
            }
        }

        Ok(Solution {
            eigenvalues,
            eigenvectors,
            status: status.code(),
        })
    }
}

fn report_status(status: Status, verbosity: Verbosity) {
    if status.is_success() || !verbosity.reports_errors() {
        return;
    }
    if status.is_fatal() {
        log::error!("direct backend: {status}");
    } else {
        log::warn!("direct backend: {status}");
    }
}

/// Full eigendecomposition of a dense Hermitian matrix, ascending.
fn hermitian_eigen<T: Element>(m: &Mat<T>) -> Result<Spectrum<T>, Status> {
    let evd = m
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|_| Status::MaxIterations)?;
    let s = evd.S();
    let u = evd.U();
    let raw: Vec<T::Real> = (0..m.nrows()).map(|i| s[i].real_part()).collect();

    let mut order: Vec<usize> = (0..raw.len()).collect();
    order.sort_by(|&i, &j| raw[i].partial_cmp(&raw[j]).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Spectrum {
        values: order.iter().map(|&i| raw[i]).collect(),
        vectors: Mat::from_fn(u.nrows(), order.len(), |row, col| u[(row, order[col])]),
    })
}

/// Returns `W` with `Wᴴ M W = I`, or `None` if `M` is not positive definite.
fn inverse_sqrt_factor<T: Element>(m: &Mat<T>) -> Option<Mat<T>> {
    let spectrum = hermitian_eigen(m).ok()?;
    let largest = spectrum.values.last().copied()?.abs();
    let floor = T::Real::epsilon() * largest;
    if spectrum.values.iter().any(|&d| d <= floor) {
        return None;
    }
    let scales: Vec<T::Real> = spectrum.values.iter().map(|d| d.sqrt().recip()).collect();
    Some(Mat::from_fn(m.nrows(), m.ncols(), |i, j| {
        spectrum.vectors[(i, j)].scale_by(scales[j])
    }))
}

fn adjoint<T: Element>(m: &Mat<T>) -> Mat<T> {
    Mat::from_fn(m.ncols(), m.nrows(), |i, j| m[(j, i)].conjugate())
}

/// Eigenpairs of `A x = λ x`, or of `A x = λ B x` with `B` positive definite.
fn pencil_spectrum<T: Element>(a: &Mat<T>, b: Option<&Mat<T>>) -> Result<Spectrum<T>, Status> {
    let Some(b) = b else {
        return hermitian_eigen(a);
    };
    let w = inverse_sqrt_factor(b).ok_or(Status::Fatal(FATAL_MASS_NOT_POSITIVE_DEFINITE))?;
    let reduced = &(&adjoint(&w) * a) * &w;
    let spectrum = hermitian_eigen(&reduced)?;
    Ok(Spectrum {
        values: spectrum.values,
        vectors: &w * &spectrum.vectors,
    })
}

/// Eigenpairs of the buckling problem `A x = -α B x` with `A` positive definite.
///
/// With `A` as the metric, `B x = μ A x` is solved instead and `α = -1/μ`. Eigenvalues
/// with `μ` numerically zero correspond to infinite `α` and are dropped.
fn buckling_spectrum<T: Element>(a: &Mat<T>, b: Option<&Mat<T>>) -> Result<Spectrum<T>, Status> {
    let w = inverse_sqrt_factor(a).ok_or(Status::Fatal(FATAL_STIFFNESS_NOT_POSITIVE_DEFINITE))?;
    let wh = adjoint(&w);
    let reduced = match b {
        Some(b) => &(&wh * b) * &w,
        None => &wh * &w,
    };
    let mu = hermitian_eigen(&reduced)?;

    let scale = mu
        .values
        .iter()
        .fold(T::Real::zero(), |acc, &m| acc.max(m.abs()));
    let floor = T::Real::epsilon() * scale * <T::Real as RealScalar>::from_f64(a.nrows() as f64);

    let mut pairs: Vec<(T::Real, usize)> = mu
        .values
        .iter()
        .enumerate()
        .filter(|(_, m)| m.abs() > floor)
        .map(|(i, &m)| (-m.recip(), i))
        .collect();
    pairs.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));

    let x = &w * &mu.vectors;
    Ok(Spectrum {
        values: pairs.iter().map(|&(alpha, _)| alpha).collect(),
        vectors: Mat::from_fn(x.nrows(), pairs.len(), |row, col| x[(row, pairs[col].1)]),
    })
}

/// Picks the requested eigenvalues out of an ascending spectrum.
///
/// Returns ascending indices into `values` and the status describing any shortfall.
pub(crate) fn select<R: RealScalar>(
    values: &[R],
    selection: Selection,
    sigma: Option<R>,
) -> (Vec<usize>, Status) {
    let sigma = sigma.unwrap_or_else(R::zero);
    match selection {
        Selection::Smallest(k) => {
            let take = k.min(values.len());
            let status = if take < k {
                Status::MissingRight
            } else {
                Status::Converged
            };
            ((0..take).collect(), status)
        }
        Selection::Nearest(k) => {
            let mut order: Vec<usize> = (0..values.len()).collect();
            // Stable sort: on equal distance the eigenvalue below the shift wins.
            order.sort_by(|&i, &j| {
                (values[i] - sigma)
                    .abs()
                    .partial_cmp(&(values[j] - sigma).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            order.truncate(k);
            order.sort_unstable();
            let status = if order.len() < k {
                Status::MissingRight
            } else {
                Status::Converged
            };
            (order, status)
        }
        Selection::Straddle { left, right } => {
            let split = values.partition_point(|&v| v <= sigma);
            let first = split.saturating_sub(left);
            let last = split.saturating_add(right).min(values.len());
            let status = if split < left {
                Status::MissingLeft
            } else if values.len() - split < right {
                Status::MissingRight
            } else {
                Status::Converged
            };
            ((first..last).collect(), status)
        }
    }
}

/// Residual norms `‖A x - λ B x‖` (or `‖A x + α B x‖` in buckling mode) per eigenpair.
fn residual_norms<T: Element>(
    a: &Mat<T>,
    b: Option<&Mat<T>>,
    values: &[T::Real],
    vectors: &Mat<T>,
    mode: Mode<T::Real>,
) -> Vec<T::Real> {
    let ax = a * vectors;
    let bx = match b {
        Some(b) => b * vectors,
        None => vectors.clone(),
    };
    let sign = match mode {
        Mode::Buckling { .. } => T::Real::one(),
        _ => -T::Real::one(),
    };
    values
        .iter()
        .enumerate()
        .map(|(j, &lambda)| {
            (0..ax.nrows())
                .map(|i| ax[(i, j)].plus(bx[(i, j)].scale_by(sign * lambda)).abs2())
                .fold(T::Real::zero(), |acc, r| acc + r)
                .sqrt()
        })
        .collect()
}
