//! Dense correlation scan producing score surfaces.
//!
//! For every valid top-left offset the scene window is scored against the
//! template under one [`Method`]. All sums accumulate in `f64`; the surface is
//! stored as `F32C1`.

use crate::image::plane::Plane;
use crate::image::{Mat, MatView};
use crate::kernel::{ActiveKernel, CancelToken, Kernel, Method, ScanOptions};
use crate::template::{TemplatePlan, FLAT_EPS, MAX_CHANNELS};
use crate::trace::{enter_span, record};
use crate::util::{MatchError, MatchResult};

/// Scores `templ` against every offset of `scene`.
///
/// The surface has `scene.rows() - templ.rows() + 1` rows and
/// `scene.cols() - templ.cols() + 1` columns.
pub fn match_template(scene: &Mat, templ: &Mat, method: Method) -> MatchResult<Mat> {
    let plan = TemplatePlan::from_mat(templ)?;
    match_template_with(scene, &plan, method, &ScanOptions::default())
}

/// Scores a precomputed template plan against every offset of `scene`.
pub fn match_template_with(
    scene: &Mat,
    plan: &TemplatePlan,
    method: Method,
    opts: &ScanOptions,
) -> MatchResult<Mat> {
    let (out_rows, out_cols) = surface_size(scene.view(), plan)?;
    let _span = enter_span!(
        "match_template",
        method = method.name(),
        scene_rows = scene.rows(),
        scene_cols = scene.cols(),
        templ_rows = plan.rows(),
        templ_cols = plan.cols()
    );

    let scene_plane = Plane::from_view(scene.view())?;
    let len = out_rows * out_cols;
    let mut scores = Vec::new();
    scores
        .try_reserve_exact(len)
        .map_err(|_| MatchError::AllocationFailure {
            bytes: len * std::mem::size_of::<f32>(),
        })?;
    scores.resize(len, 0.0f32);

    let cancel = opts.cancel.as_ref();
    #[cfg(feature = "rayon")]
    {
        if opts.parallel {
            crate::kernel::rayon::score_rows_par(
                &scene_plane,
                plan,
                method,
                &mut scores,
                out_cols,
                cancel,
            )?;
        } else {
            score_rows(&scene_plane, plan, method, &mut scores, out_cols, cancel)?;
        }
    }
    #[cfg(not(feature = "rayon"))]
    score_rows(&scene_plane, plan, method, &mut scores, out_cols, cancel)?;

    record!(info, "surface_ready", rows = out_rows, cols = out_cols);
    Mat::from_f32(out_rows, out_cols, &scores)
}

/// Validates a scene/template pair and returns the surface size `(rows, cols)`.
pub(crate) fn surface_size(scene: MatView<'_>, plan: &TemplatePlan) -> MatchResult<(usize, usize)> {
    if plan.rows() > scene.rows() || plan.cols() > scene.cols() {
        return Err(MatchError::TemplateTooLarge {
            templ_rows: plan.rows(),
            templ_cols: plan.cols(),
            scene_rows: scene.rows(),
            scene_cols: scene.cols(),
        });
    }
    if plan.format() != scene.format() {
        return Err(MatchError::FormatMismatch {
            scene: scene.format().name(),
            template: plan.format().name(),
        });
    }
    Ok((
        scene.rows() - plan.rows() + 1,
        scene.cols() - plan.cols() + 1,
    ))
}

fn score_rows(
    scene: &Plane,
    plan: &TemplatePlan,
    method: Method,
    scores: &mut [f32],
    out_cols: usize,
    cancel: Option<&CancelToken>,
) -> MatchResult<()> {
    for (y, row) in scores.chunks_exact_mut(out_cols).enumerate() {
        CancelToken::check(cancel)?;
        score_row::<ActiveKernel>(scene, plan, method, y, row);
    }
    Ok(())
}

/// Scores output row `y` into `out` (one slot per column offset).
pub(crate) fn score_row<K: Kernel>(
    scene: &Plane,
    plan: &TemplatePlan,
    method: Method,
    y: usize,
    out: &mut [f32],
) {
    debug_assert!(y + plan.rows() <= scene.rows());
    for (x, slot) in out.iter_mut().enumerate() {
        *slot = score_at::<K>(scene, plan, method, x, y) as f32;
    }
}

/// Computes the score of the window whose top-left corner is `(x, y)`.
pub(crate) fn score_at<K: Kernel>(
    scene: &Plane,
    plan: &TemplatePlan,
    method: Method,
    x: usize,
    y: usize,
) -> f64 {
    let channels = plan.channels();
    let len = plan.cols() * channels;
    let sx = x * channels;
    let window = |ty: usize| scene.span(sx, y + ty, len);

    match method {
        Method::SqDiff => (0..plan.rows())
            .map(|ty| K::sq_diff(window(ty), plan.row(ty)))
            .sum(),
        Method::SqDiffNormed => {
            let mut ssd = 0.0;
            let mut energy = 0.0;
            for ty in 0..plan.rows() {
                let w = window(ty);
                ssd += K::sq_diff(w, plan.row(ty));
                energy += K::sum_sq(w);
            }
            // Saturates at 1 once the difference outweighs both energies.
            normalize(ssd, energy, plan.sum_sq()).clamp(0.0, 1.0)
        }
        Method::CCorr => (0..plan.rows())
            .map(|ty| K::dot(window(ty), plan.row(ty)))
            .sum(),
        Method::CCorrNormed => {
            let mut dot = 0.0;
            let mut energy = 0.0;
            for ty in 0..plan.rows() {
                let w = window(ty);
                dot += K::dot(w, plan.row(ty));
                energy += K::sum_sq(w);
            }
            normalize(dot, energy, plan.sum_sq()).clamp(-1.0, 1.0)
        }
        Method::CCoeff => (0..plan.rows())
            .map(|ty| K::dot(window(ty), plan.zero_mean_row(ty)))
            .sum(),
        Method::CCoeffNormed => {
            let mut dot = 0.0;
            let mut energy = 0.0;
            let mut sums = [0.0f64; MAX_CHANNELS];
            for ty in 0..plan.rows() {
                let w = window(ty);
                dot += K::dot(w, plan.zero_mean_row(ty));
                energy += K::sum_sq(w);
                for px in w.chunks_exact(channels) {
                    for (sum, value) in sums.iter_mut().zip(px) {
                        *sum += value;
                    }
                }
            }
            let count = (plan.rows() * plan.cols()) as f64;
            let mean_energy: f64 = sums[..channels].iter().map(|s| s * s / count).sum();
            let mut centered = energy - mean_energy;
            if centered <= FLAT_EPS * energy {
                centered = 0.0;
            }
            normalize(dot, centered, plan.centered_sum_sq()).clamp(-1.0, 1.0)
        }
    }
}

/// `num / sqrt(a · b)`, defined as zero when either energy vanishes.
#[inline]
fn normalize(num: f64, a: f64, b: f64) -> f64 {
    if a <= 0.0 || b <= 0.0 {
        return 0.0;
    }
    num / (a.sqrt() * b.sqrt())
}
