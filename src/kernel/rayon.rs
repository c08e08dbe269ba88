//! Rayon-parallel scan driver (feature-gated).
//!
//! Output rows are independent, so each thread scores whole rows of the
//! surface. Every row is computed exactly as in the sequential driver, which
//! keeps parallel and sequential surfaces bit-identical.

use crate::image::plane::Plane;
use crate::kernel::{ActiveKernel, CancelToken, Method};
use crate::search::scan::score_row;
use crate::template::TemplatePlan;
use crate::util::MatchResult;
use rayon::prelude::*;

/// Row-parallel fill of a score surface.
///
/// The cancel token is checked before each row.
pub(crate) fn score_rows_par(
    scene: &Plane,
    plan: &TemplatePlan,
    method: Method,
    scores: &mut [f32],
    out_cols: usize,
    cancel: Option<&CancelToken>,
) -> MatchResult<()> {
    scores
        .par_chunks_exact_mut(out_cols)
        .enumerate()
        .try_for_each(|(y, row)| {
            CancelToken::check(cancel)?;
            score_row::<ActiveKernel>(scene, plan, method, y, row);
            Ok(())
        })
}
