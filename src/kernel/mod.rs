//! Correlation kernel implementations.
//!
//! A [`Kernel`] supplies the three slice reductions every match method is
//! built from. The scalar kernel is the reference; the `simd` feature swaps
//! in a `wide`-vectorized kernel and the `rayon` feature adds a row-parallel
//! driver.

use crate::util::{MatchError, MatchResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::ScalarKernel as ActiveKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::SimdKernel as ActiveKernel;

/// Scoring formula used to compare a scene window with the template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `Σ (W - t)²`; lower is better.
    SqDiff,
    /// `SqDiff / sqrt(Σ W² · Σ t²)` saturated to `[0, 1]`; lower is better.
    SqDiffNormed,
    /// `Σ W · t`; higher is better.
    CCorr,
    /// `CCorr / sqrt(Σ W² · Σ t²)`, in `[-1, 1]`.
    CCorrNormed,
    /// `Σ (W - mean W)(t - mean t)`; higher is better.
    CCoeff,
    /// `CCoeff` divided by both centered energies, in `[-1, 1]`.
    CCoeffNormed,
}

impl Method {
    /// Every method, in code order.
    pub const ALL: [Method; 6] = [
        Method::SqDiff,
        Method::SqDiffNormed,
        Method::CCorr,
        Method::CCorrNormed,
        Method::CCoeff,
        Method::CCoeffNormed,
    ];

    /// Returns the boundary code (`0..=5`).
    pub const fn code(self) -> i32 {
        match self {
            Method::SqDiff => 0,
            Method::SqDiffNormed => 1,
            Method::CCorr => 2,
            Method::CCorrNormed => 3,
            Method::CCoeff => 4,
            Method::CCoeffNormed => 5,
        }
    }

    /// Resolves a boundary code.
    pub fn from_code(code: i32) -> MatchResult<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(MatchError::UnknownMethodCode(code))
    }

    /// Returns whether lower or higher scores are better.
    pub const fn polarity(self) -> Polarity {
        match self {
            Method::SqDiff | Method::SqDiffNormed => Polarity::Minimize,
            _ => Polarity::Maximize,
        }
    }

    /// Returns true for the scale-invariant variants.
    pub const fn is_normed(self) -> bool {
        matches!(
            self,
            Method::SqDiffNormed | Method::CCorrNormed | Method::CCoeffNormed
        )
    }

    /// Short snake-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Method::SqDiff => "sqdiff",
            Method::SqDiffNormed => "sqdiff_normed",
            Method::CCorr => "ccorr",
            Method::CCorrNormed => "ccorr_normed",
            Method::CCoeff => "ccoeff",
            Method::CCoeffNormed => "ccoeff_normed",
        }
    }
}

/// Direction in which a method's scores improve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Lower scores are better.
    Minimize,
    /// Higher scores are better.
    Maximize,
}

impl Polarity {
    /// The value that can never be selected as a best match.
    pub const fn worst(self) -> f64 {
        match self {
            Polarity::Minimize => f64::INFINITY,
            Polarity::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Returns true if `score` passes `threshold` in this direction.
    pub fn accepts(self, score: f64, threshold: f64) -> bool {
        match self {
            Polarity::Minimize => score <= threshold,
            Polarity::Maximize => score >= threshold,
        }
    }
}

/// Slice reductions used by the scoring loops.
///
/// Implementations must return the same value as the plain scalar sum up to
/// floating-point reassociation.
pub trait Kernel {
    /// `Σ a·b`.
    fn dot(a: &[f64], b: &[f64]) -> f64;

    /// `Σ (a - b)²`.
    fn sq_diff(a: &[f64], b: &[f64]) -> f64;

    /// `Σ a²`.
    fn sum_sq(a: &[f64]) -> f64;
}

/// Cooperative cancellation flag, polled between output rows.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every scan holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(token: Option<&CancelToken>) -> MatchResult<()> {
        match token {
            Some(token) if token.is_cancelled() => Err(MatchError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Execution options for a dense scan.
#[derive(Clone, Debug, Default)]
pub struct ScanOptions {
    /// Score rows in parallel (requires the `rayon` feature; ignored otherwise).
    pub parallel: bool,
    /// Optional cancellation flag.
    pub cancel: Option<CancelToken>,
}
