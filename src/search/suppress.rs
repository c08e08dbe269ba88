//! Iterative peak extraction with region suppression.
//!
//! Each round takes the best cell of the working surface, accepts it if it
//! passes the threshold, then overwrites every offset whose template footprint
//! would intersect the accepted footprint with the polarity's worst value.
//! Accepted footprints therefore never overlap.

use crate::image::{Mat, PixelFormat};
use crate::kernel::{Method, Polarity};
use crate::search::extremum::min_max_loc;
use crate::search::{Match, Point, Rect};
use crate::trace::record;
use crate::util::{MatchError, MatchResult};

/// Surface rectangle to suppress after accepting a match at `loc`.
///
/// Covers offsets within `tpl_cols - 1` columns and `tpl_rows - 1` rows of
/// `loc`, clamped to the surface.
pub fn suppression_rect(
    loc: Point,
    tpl_cols: usize,
    tpl_rows: usize,
    surface_cols: usize,
    surface_rows: usize,
) -> Rect {
    let reach_x = tpl_cols.saturating_sub(1);
    let reach_y = tpl_rows.saturating_sub(1);
    let x0 = loc.x.saturating_sub(reach_x);
    let y0 = loc.y.saturating_sub(reach_y);
    let x1 = loc
        .x
        .saturating_add(reach_x)
        .min(surface_cols.saturating_sub(1));
    let y1 = loc
        .y
        .saturating_add(reach_y)
        .min(surface_rows.saturating_sub(1));
    Rect {
        x: x0,
        y: y0,
        width: x1 + 1 - x0,
        height: y1 + 1 - y0,
    }
}

/// Extracts up to `max_matches` distinct matches from a score surface.
///
/// `surface` is the working copy and is modified in place. Matches are
/// returned in acceptance order. The loop stops when the best remaining cell
/// fails the threshold, when the cap is reached, or when every cell has been
/// suppressed. Any failure discards the matches accepted so far.
pub fn suppress_peaks(
    surface: &mut Mat,
    method: Method,
    tpl_cols: usize,
    tpl_rows: usize,
    threshold: f64,
    max_matches: usize,
) -> MatchResult<Vec<Match>> {
    if threshold.is_nan() {
        return Err(MatchError::InvalidThreshold(threshold));
    }
    // Sentinels are infinities, which only a float surface can hold.
    if surface.format() != PixelFormat::F32C1 {
        return Err(MatchError::UnsupportedFormat {
            format: surface.format().name(),
            context: "suppress_peaks",
        });
    }

    let polarity = method.polarity();
    let worst = polarity.worst();
    let mut accepted = Vec::new();
    while accepted.len() < max_matches {
        let ext = min_max_loc(surface)?;
        let (score, loc) = match polarity {
            Polarity::Minimize => (ext.min_val, ext.min_loc),
            Polarity::Maximize => (ext.max_val, ext.max_loc),
        };
        if score == worst {
            record!(info, "surface_exhausted", accepted = accepted.len());
            break;
        }
        if !polarity.accepts(score, threshold) {
            break;
        }

        record!(debug, "match_accepted", x = loc.x, y = loc.y, score = score);
        accepted.push(Match {
            score,
            location: loc,
            width: tpl_cols,
            height: tpl_rows,
        });

        let rect = suppression_rect(loc, tpl_cols, tpl_rows, surface.cols(), surface.rows());
        surface.set_region(
            rect.x as i64,
            rect.y as i64,
            rect.width as i64,
            rect.height as i64,
            worst,
        )?;
    }

    Ok(accepted)
}
