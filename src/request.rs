//! Interpretation of the caller's parameters.
//!
//! One call signature serves three solution semantics. The meaning of `which` and `sigma`
//! depends on whether a preconditioner is supplied and on the buckling flag, so the mode
//! is decided exactly once, in [`Plan::new`], and everything downstream branches on the
//! resulting [`Mode`] tag instead of re-deriving it from the raw parameters.

use crate::{
    element::RealScalar,
    error::{EigenError, EigenErrorKind},
};

/// Which eigenvalues are wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    /// `k` eigenvalues: the smallest ones with a preconditioner or in buckling mode,
    /// otherwise the ones nearest to the shift.
    Count(usize),
    /// `left` eigenvalues immediately left of the shift and `right` immediately right of it.
    Split { left: usize, right: usize },
}

impl Default for Which {
    fn default() -> Self {
        Which::Count(6)
    }
}

impl From<usize> for Which {
    fn from(k: usize) -> Self {
        Which::Count(k)
    }
}

impl From<(usize, usize)> for Which {
    fn from((left, right): (usize, usize)) -> Self {
        Which::Split { left, right }
    }
}

/// Verbosity level of a solve.
///
/// * `< 0`: nothing is reported
/// * `0`: error and warning messages
/// * `1`: + number of iterations and converged eigenvalues
/// * `2`: + current eigenvalue iterates, residuals and error estimates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub i32);

impl Verbosity {
    pub const SILENT: Verbosity = Verbosity(-1);

    pub fn reports_errors(self) -> bool {
        self.0 >= 0
    }

    pub fn reports_progress(self) -> bool {
        self.0 >= 1
    }

    pub fn reports_iterates(self) -> bool {
        self.0 >= 2
    }
}

impl From<i32> for Verbosity {
    fn from(level: i32) -> Self {
        Verbosity(level)
    }
}

/// Scalar controls of a solve, with the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options<R> {
    /// Buckling mode flag. Ignored when a preconditioner is supplied.
    pub buckling: bool,
    /// Shift inside the spectrum. Must be negative in buckling mode. Ignored when a
    /// preconditioner is supplied.
    pub sigma: R,
    pub which: Which,
    /// Eigenvector error tolerance; `0` requests the strictest setting.
    pub tol: R,
    pub verbosity: Verbosity,
}

impl<R: RealScalar> Default for Options<R> {
    fn default() -> Self {
        Options {
            buckling: false,
            sigma: R::zero(),
            which: Which::default(),
            tol: R::from_f64(1e-4),
            verbosity: Verbosity::default(),
        }
    }
}

/// The solution mode, decided once per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode<R> {
    /// A preconditioner drives the solve; sigma and buckling play no role.
    Preconditioned,
    /// Shift-invert on the buckling problem `A x = -alpha B x`, with a negative shift.
    Buckling { sigma: R },
    /// Shift-invert around `sigma`.
    ShiftInvert { sigma: R },
}

impl<R: Copy> Mode<R> {
    /// The expansion point, if the mode has one.
    pub fn sigma(&self) -> Option<R> {
        match self {
            Mode::Preconditioned => None,
            Mode::Buckling { sigma } | Mode::ShiftInvert { sigma } => Some(*sigma),
        }
    }
}

/// The eigenvalues a backend must deliver, in unambiguous form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The `k` algebraically smallest eigenvalues.
    Smallest(usize),
    /// The `k` eigenvalues nearest to the shift.
    Nearest(usize),
    /// The `left` largest eigenvalues not above the shift and the `right` smallest above it.
    Straddle { left: usize, right: usize },
}

impl Selection {
    /// Total number of requested eigenpairs, saturating at `usize::MAX`.
    pub fn count(&self) -> usize {
        match *self {
            Selection::Smallest(k) | Selection::Nearest(k) => k,
            Selection::Straddle { left, right } => left.saturating_add(right),
        }
    }
}

/// The canonical request: the mode tag and what it selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan<R> {
    pub mode: Mode<R>,
    pub selection: Selection,
}

impl<R: RealScalar> Plan<R> {
    /// Decides the solution mode and validates the scalar parameters against it.
    ///
    /// Precedence is preconditioner, then buckling, then plain shift-invert. `n` is the
    /// problem size and bounds the number of eigenpairs that can be requested.
    pub fn new(options: &Options<R>, has_preconditioner: bool, n: usize) -> Result<Self, EigenError> {
        let tol: f64 = options.tol.into();
        if !tol.is_finite() || tol < 0.0 {
            return Err(EigenErrorKind::InvalidTolerance(tol).into());
        }
        if let Which::Split { left, right } = options.which {
            if left.checked_add(right).is_none() {
                return Err(EigenErrorKind::InvalidSelection(format!(
                    "a ({left}, {right}) split overflows the eigenpair count"
                ))
                .into());
            }
        }

        let plan = if has_preconditioner {
            let selection = match options.which {
                Which::Count(k) => Selection::Smallest(k),
                Which::Split { left, right } => {
                    return Err(EigenErrorKind::InvalidSelection(format!(
                        "a ({left}, {right}) split needs a shift, which preconditioned solves ignore"
                    ))
                    .into());
                }
            };
            Plan {
                mode: Mode::Preconditioned,
                selection,
            }
        } else {
            let sigma = options.sigma;
            if !sigma.is_finite() {
                return Err(EigenErrorKind::InvalidShift(format!("sigma = {sigma} is not finite")).into());
            }
            if options.buckling {
                if sigma >= R::zero() {
                    return Err(EigenErrorKind::InvalidShift(format!(
                        "buckling mode requires a negative sigma, got {sigma}"
                    ))
                    .into());
                }
                let selection = match options.which {
                    Which::Count(k) => Selection::Straddle { left: 0, right: k },
                    Which::Split { left, right } => Selection::Straddle { left, right },
                };
                Plan {
                    mode: Mode::Buckling { sigma },
                    selection,
                }
            } else {
                let selection = match options.which {
                    Which::Count(k) => Selection::Nearest(k),
                    Which::Split { left, right } => Selection::Straddle { left, right },
                };
                Plan {
                    mode: Mode::ShiftInvert { sigma },
                    selection,
                }
            }
        };

        let requested = plan.selection.count();
        if requested > n {
            return Err(EigenErrorKind::InvalidSelection(format!(
                "{requested} eigenpairs requested from a problem of size {n}"
            ))
            .into());
        }
        Ok(plan)
    }
}
