//! Template planning utilities.
//!
//! A [`TemplatePlan`] is built once per template and reused across scenes.

mod plan;

pub(crate) use plan::{FLAT_EPS, MAX_CHANNELS};
pub use plan::TemplatePlan;
