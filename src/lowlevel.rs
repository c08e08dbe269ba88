//! Low-level building blocks for custom matching pipelines.
//!
//! These items expose the reduction kernels and the suppression loop for
//! callers that produce or post-process score surfaces themselves. Most users
//! should prefer [`Matcher`](crate::Matcher) or [`find_matches`](crate::find_matches).

pub use crate::kernel::scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdKernel;
pub use crate::kernel::Kernel;
pub use crate::search::suppress::{suppress_peaks, suppression_rect};
pub use crate::template::TemplatePlan;
