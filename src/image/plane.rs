//! Widened `f64` sample planes used by the correlation kernels.

use crate::image::MatView;
use crate::util::{MatchError, MatchResult};

/// Row-major `f64` copy of an image with channels interleaved.
pub(crate) struct Plane {
    data: Vec<f64>,
    rows: usize,
    /// Samples per row (`cols * channels`).
    width: usize,
}

impl Plane {
    pub(crate) fn from_view(view: MatView<'_>) -> MatchResult<Self> {
        let rows = view.rows();
        let width = view.cols() * view.format().channels();
        let len = rows * width;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MatchError::AllocationFailure {
                bytes: len * std::mem::size_of::<f64>(),
            })?;
        for y in 0..rows {
            let samples = view.samples(y).ok_or(MatchError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: view.as_bytes().len(),
            })?;
            data.extend(samples);
        }
        Ok(Self { data, rows, width })
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns `len` samples of row `y` starting at sample `x`.
    #[inline]
    pub(crate) fn span(&self, x: usize, y: usize, len: usize) -> &[f64] {
        let start = y * self.width + x;
        &self.data[start..start + len]
    }
}
