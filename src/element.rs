//! Numeric element kinds accepted by the solver.
//!
//! A problem is posed over one of four element types: `f32`, `f64`, [`c32`] and [`c64`].
//! The [`Element`] trait ties each of them to its real component type, which is the type
//! of the shift, of the tolerance band and of every returned eigenvalue.

use faer::{c32, c64, traits::ComplexField};
use num_traits::Float;
use std::fmt::{Debug, Display, LowerExp};

/// The dtype family of a problem, as reported in logs and by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl ElementKind {
    /// Whether eigenvectors of this kind carry an imaginary part.
    pub fn is_complex(self) -> bool {
        matches!(self, ElementKind::Complex64 | ElementKind::Complex128)
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Complex64 => "complex64",
            ElementKind::Complex128 => "complex128",
        };
        f.write_str(name)
    }
}

/// Real scalar type of an [`Element`]: `f32` or `f64`.
pub trait RealScalar:
    Float + Into<f64> + Debug + Display + LowerExp + Send + Sync + 'static
{
    /// Lossy conversion used for constants and test problem assembly.
    fn from_f64(value: f64) -> Self;
}

impl RealScalar for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl RealScalar for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for faer::c32 {}
    impl Sealed for faer::c64 {}
}

/// Trait for the element types a problem matrix may hold.
///
/// The trait is sealed: the solver's result contract (real eigenvalues, eigenvectors of
/// the same kind as the matrix) is only defined for these four kinds.
pub trait Element:
    ComplexField<Real: RealScalar> + Copy + Debug + Send + Sync + sealed::Sealed + 'static
{
    /// The dtype tag of this element type.
    const KIND: ElementKind;

    /// Embeds a real number.
    fn from_real(value: Self::Real) -> Self;

    /// Conversion from `f64`, rounding to the element's precision.
    fn from_f64(value: f64) -> Self {
        Self::from_real(<Self::Real as RealScalar>::from_f64(value))
    }

    /// The real component.
    fn real_part(self) -> Self::Real;

    /// The complex conjugate (identity for real kinds).
    fn conjugate(self) -> Self;

    /// Multiplication by a real scalar.
    fn scale_by(self, factor: Self::Real) -> Self;

    /// Squared modulus.
    fn abs2(self) -> Self::Real;

    fn plus(self, rhs: Self) -> Self;
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float32;

    fn from_real(value: f32) -> Self {
        value
    }
    fn real_part(self) -> f32 {
        self
    }
    fn conjugate(self) -> Self {
        self
    }
    fn scale_by(self, factor: f32) -> Self {
        self * factor
    }
    fn abs2(self) -> f32 {
        self * self
    }
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    fn from_real(value: f64) -> Self {
        value
    }
    fn real_part(self) -> f64 {
        self
    }
    fn conjugate(self) -> Self {
        self
    }
    fn scale_by(self, factor: f64) -> Self {
        self * factor
    }
    fn abs2(self) -> f64 {
        self * self
    }
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
}

impl Element for c32 {
    const KIND: ElementKind = ElementKind::Complex64;

    fn from_real(value: f32) -> Self {
        c32::new(value, 0.0)
    }
    fn real_part(self) -> f32 {
        self.re
    }
    fn conjugate(self) -> Self {
        c32::new(self.re, -self.im)
    }
    fn scale_by(self, factor: f32) -> Self {
        c32::new(self.re * factor, self.im * factor)
    }
    fn abs2(self) -> f32 {
        self.re * self.re + self.im * self.im
    }
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
}

impl Element for c64 {
    const KIND: ElementKind = ElementKind::Complex128;

    fn from_real(value: f64) -> Self {
        c64::new(value, 0.0)
    }
    fn real_part(self) -> f64 {
        self.re
    }
    fn conjugate(self) -> Self {
        c64::new(self.re, -self.im)
    }
    fn scale_by(self, factor: f64) -> Self {
        c64::new(self.re * factor, self.im * factor)
    }
    fn abs2(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
}
