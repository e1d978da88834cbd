//! Execution status of a partial eigenvalue solve.
//!
//! The taxonomy is closed and the integer codes are part of the public contract: callers
//! key their behaviour off exact codes, so a backend's status travels to the caller
//! unchanged.

use std::fmt;

/// Fatal code reported when the mass matrix `B` is not positive definite.
pub const FATAL_MASS_NOT_POSITIVE_DEFINITE: i32 = -1;

/// Fatal code reported when `A` must be positive definite (buckling or preconditioned
/// solves) and is not.
pub const FATAL_STIFFNESS_NOT_POSITIVE_DEFINITE: i32 = -2;

/// Outcome reported by the eigensolver backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// All requested eigenpairs converged.
    Converged,
    /// The maximal number of iterations was exceeded before full convergence.
    MaxIterations,
    /// No search directions left (bad problem data or preconditioner).
    NoSearchDirections,
    /// Some of the requested eigenvalues left of the shift may not exist.
    MissingLeft,
    /// Some of the requested eigenvalues right of the shift may not exist.
    MissingRight,
    /// Fatal backend error, carrying the (negative) backend code.
    Fatal(i32),
}

impl Status {
    /// The integer code of this status.
    pub fn code(self) -> i32 {
        match self {
            Status::Converged => 0,
            Status::MaxIterations => 1,
            Status::NoSearchDirections => 2,
            Status::MissingLeft => 3,
            Status::MissingRight => 4,
            Status::Fatal(code) => code,
        }
    }

    /// Decodes a backend status code. Codes outside the taxonomy yield `None`.
    pub fn from_code(code: i32) -> Option<Status> {
        match code {
            0 => Some(Status::Converged),
            1 => Some(Status::MaxIterations),
            2 => Some(Status::NoSearchDirections),
            3 => Some(Status::MissingLeft),
            4 => Some(Status::MissingRight),
            c if c < 0 => Some(Status::Fatal(c)),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Converged
    }

    pub fn is_fatal(self) -> bool {
        matches!(self, Status::Fatal(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Converged => write!(f, "success"),
            Status::MaxIterations => write!(f, "maximal number of iterations exceeded"),
            Status::NoSearchDirections => {
                write!(f, "no search directions left (bad problem data or preconditioner)")
            }
            Status::MissingLeft => write!(f, "some of the requested left eigenvalues may not exist"),
            Status::MissingRight => {
                write!(f, "some of the requested right eigenvalues may not exist")
            }
            Status::Fatal(code) => write!(f, "fatal error (code {code})"),
        }
    }
}
