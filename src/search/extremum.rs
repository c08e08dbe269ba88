//! Global extremum search over single-channel surfaces.

use crate::image::Mat;
use crate::search::Point;
use crate::util::{MatchError, MatchResult};

/// Smallest and largest values of a surface with their locations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxLoc {
    /// Smallest value.
    pub min_val: f64,
    /// Largest value.
    pub max_val: f64,
    /// Location of the first smallest value in row-major order.
    pub min_loc: Point,
    /// Location of the first largest value in row-major order.
    pub max_loc: Point,
}

/// Finds the global minimum and maximum of a single-channel surface.
///
/// Cells are visited once in row-major order and only strictly better values
/// replace the current extremum, so the first occurrence wins ties. NaN cells
/// are skipped.
pub fn min_max_loc(surface: &Mat) -> MatchResult<MinMaxLoc> {
    let format = surface.format();
    if format.channels() != 1 {
        return Err(MatchError::UnsupportedFormat {
            format: format.name(),
            context: "min_max_loc",
        });
    }

    let mut best: Option<MinMaxLoc> = None;
    for y in 0..surface.rows() {
        let samples = surface.samples(y).ok_or(MatchError::EmptySurface)?;
        for (x, value) in samples.enumerate() {
            if value.is_nan() {
                continue;
            }
            let here = Point { x, y };
            match best.as_mut() {
                None => {
                    best = Some(MinMaxLoc {
                        min_val: value,
                        max_val: value,
                        min_loc: here,
                        max_loc: here,
                    });
                }
                Some(b) => {
                    if value < b.min_val {
                        b.min_val = value;
                        b.min_loc = here;
                    }
                    if value > b.max_val {
                        b.max_val = value;
                        b.max_loc = here;
                    }
                }
            }
        }
    }

    best.ok_or(MatchError::EmptySurface)
}
