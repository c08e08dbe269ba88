//! Template plan precomputation shared by all match methods.

use crate::image::plane::Plane;
use crate::image::{Mat, MatView, PixelFormat};
use crate::util::MatchResult;

/// Most channels any supported format carries.
pub(crate) const MAX_CHANNELS: usize = 4;

/// Relative energy below which a window or template counts as flat.
pub(crate) const FLAT_EPS: f64 = 1e-12;

/// Precomputed statistics and widened buffers for template matching.
///
/// Means are per channel, so `CCOEFF` reduces to a plain dot product
/// between the scene window and [`zero_mean`](Self::zero_mean).
pub struct TemplatePlan {
    rows: usize,
    cols: usize,
    format: PixelFormat,
    plane: Plane,
    zero_mean: Vec<f64>,
    means: [f64; MAX_CHANNELS],
    sum_sq: f64,
    centered_sum_sq: f64,
}

impl TemplatePlan {
    /// Builds a plan from an owned template.
    pub fn from_mat(tpl: &Mat) -> MatchResult<Self> {
        Self::from_view(tpl.view())
    }

    /// Builds a plan from a template view.
    pub fn from_view(tpl: MatView<'_>) -> MatchResult<Self> {
        let rows = tpl.rows();
        let cols = tpl.cols();
        let format = tpl.format();
        let channels = format.channels();
        let plane = Plane::from_view(tpl)?;

        let mut sums = [0.0f64; MAX_CHANNELS];
        let mut sum_sq = 0.0f64;
        for px in plane.data().chunks_exact(channels) {
            for (sum, &value) in sums.iter_mut().zip(px) {
                *sum += value;
                sum_sq += value * value;
            }
        }

        let count = (rows * cols) as f64;
        let mut means = [0.0f64; MAX_CHANNELS];
        for (mean, sum) in means.iter_mut().zip(sums).take(channels) {
            *mean = sum / count;
        }

        let mut zero_mean = Vec::with_capacity(plane.data().len());
        let mut centered_sum_sq = 0.0f64;
        for px in plane.data().chunks_exact(channels) {
            for (&value, mean) in px.iter().zip(means) {
                let centered = value - mean;
                centered_sum_sq += centered * centered;
                zero_mean.push(centered);
            }
        }
        if centered_sum_sq <= FLAT_EPS * sum_sq {
            centered_sum_sq = 0.0;
        }

        Ok(Self {
            rows,
            cols,
            format,
            plane,
            zero_mean,
            means,
            sum_sq,
            centered_sum_sq,
        })
    }

    /// Returns the template height in pixels.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the template width in pixels.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the template pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// Returns the per-channel means.
    pub fn means(&self) -> &[f64] {
        &self.means[..self.channels()]
    }

    /// Returns `Σ t²` over all pixels and channels.
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    /// Returns `Σ (t - mean)²`, zero for a flat template.
    pub fn centered_sum_sq(&self) -> f64 {
        self.centered_sum_sq
    }

    /// Returns the widened template samples in row-major order.
    pub fn samples(&self) -> &[f64] {
        self.plane.data()
    }

    /// Returns the per-channel zero-mean template in row-major order.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }

    #[inline]
    pub(crate) fn row(&self, y: usize) -> &[f64] {
        self.plane.span(0, y, self.plane.width())
    }

    #[inline]
    pub(crate) fn zero_mean_row(&self, y: usize) -> &[f64] {
        let width = self.plane.width();
        &self.zero_mean[y * width..(y + 1) * width]
    }
}
