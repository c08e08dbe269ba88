//! Owned image buffer.

use crate::image::{packed_row_bytes, ElemType, MatView, PixelFormat, Samples};
use crate::util::{MatchError, MatchResult};

/// Owned, tightly packed image buffer.
///
/// Every constructor copies, so a `Mat` never borrows caller memory.
#[derive(Clone, Debug, PartialEq)]
pub struct Mat {
    data: Vec<u8>,
    rows: usize,
    cols: usize,
    format: PixelFormat,
    stride: usize,
}

impl Mat {
    /// Creates a zero-initialized buffer.
    pub fn zeros(rows: usize, cols: usize, format: PixelFormat) -> MatchResult<Self> {
        let stride = packed_row_bytes(rows, cols, format)?;
        let len = rows
            .checked_mul(stride)
            .ok_or(MatchError::InvalidDimensions { rows, cols })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MatchError::AllocationFailure { bytes: len })?;
        data.resize(len, 0);
        Ok(Self {
            data,
            rows,
            cols,
            format,
            stride,
        })
    }

    /// Copies caller pixel data laid out with `stride` bytes per row.
    ///
    /// A `stride` of zero means the rows are tightly packed.
    pub fn from_data(
        rows: usize,
        cols: usize,
        format: PixelFormat,
        data: &[u8],
        stride: usize,
    ) -> MatchResult<Self> {
        let view = if stride == 0 {
            MatView::from_slice(data, rows, cols, format)?
        } else {
            MatView::new(data, rows, cols, format, stride)?
        };
        Self::from_view(view)
    }

    /// Copies a borrowed view into a new packed buffer.
    pub fn from_view(view: MatView<'_>) -> MatchResult<Self> {
        let mut mat = Self::zeros(view.rows(), view.cols(), view.format())?;
        let stride = mat.stride;
        for (y, dst) in mat.data.chunks_exact_mut(stride).enumerate() {
            let src = view.row(y).ok_or(MatchError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: view.as_bytes().len(),
            })?;
            dst.copy_from_slice(src);
        }
        Ok(mat)
    }

    /// Copies tightly packed 8-bit samples.
    pub fn from_u8(rows: usize, cols: usize, format: PixelFormat, data: &[u8]) -> MatchResult<Self> {
        if format.depth() != ElemType::U8 {
            return Err(MatchError::UnsupportedFormat {
                format: format.name(),
                context: "u8 construction",
            });
        }
        Self::from_data(rows, cols, format, data, 0)
    }

    /// Builds an `F32C1` buffer from row-major values.
    pub fn from_f32(rows: usize, cols: usize, values: &[f32]) -> MatchResult<Self> {
        let needed = rows
            .checked_mul(cols)
            .ok_or(MatchError::InvalidDimensions { rows, cols })?;
        if values.len() != needed {
            return Err(MatchError::BufferTooSmall {
                needed: needed.saturating_mul(4),
                got: values.len().saturating_mul(4),
            });
        }
        let mut mat = Self::zeros(rows, cols, PixelFormat::F32C1)?;
        for (dst, value) in mat.data.chunks_exact_mut(4).zip(values) {
            dst.copy_from_slice(&value.to_ne_bytes());
        }
        Ok(mat)
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the stride in bytes between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw bytes for in-place writes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns a borrowed view of the whole buffer.
    pub fn view(&self) -> MatView<'_> {
        MatView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
            format: self.format,
            stride: self.stride,
        }
    }

    /// Returns the bytes of row `y`.
    pub fn row_bytes(&self, y: usize) -> Option<&[u8]> {
        self.view().row(y)
    }

    /// Returns the samples of row `y` widened to `f64`.
    pub fn samples(&self, y: usize) -> Option<Samples<'_>> {
        self.view().samples(y)
    }

    /// Returns sample `c` of pixel `(x, y)`.
    pub fn sample(&self, x: usize, y: usize, c: usize) -> Option<f64> {
        self.view().sample(x, y, c)
    }

    /// Sets every sample of a rectangle, across all channels, to `value`.
    ///
    /// 8-bit buffers receive `value` rounded and saturated to `0..=255`.
    /// Rejected rectangles leave the buffer untouched.
    pub fn set_region(
        &mut self,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        value: f64,
    ) -> MatchResult<()> {
        let fits = |start: i64, len: i64, limit: usize| {
            start >= 0 && len > 0 && start.checked_add(len).is_some_and(|end| end <= limit as i64)
        };
        if !fits(x, width, self.cols) || !fits(y, height, self.rows) {
            return Err(MatchError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                cols: self.cols,
                rows: self.rows,
            });
        }

        let pixel_size = self.format.pixel_size();
        let pattern = encode(value, self.format.depth());
        let start = x as usize * pixel_size;
        let end = start + width as usize * pixel_size;
        for row in self
            .data
            .chunks_exact_mut(self.stride)
            .skip(y as usize)
            .take(height as usize)
        {
            for sample in row[start..end].chunks_exact_mut(pattern.len()) {
                sample.copy_from_slice(&pattern);
            }
        }
        Ok(())
    }

    /// FNV-1a hash over the pixel bytes.
    pub fn checksum(&self) -> u64 {
        let mut hash = 0xcbf2_9ce4_8422_2325u64;
        for y in 0..self.rows {
            for &byte in self.row_bytes(y).unwrap_or_default() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
        hash
    }
}

fn encode(value: f64, depth: ElemType) -> Vec<u8> {
    match depth {
        // `as` saturates and maps NaN to zero.
        ElemType::U8 => vec![value.round() as u8],
        ElemType::F32 => (value as f32).to_ne_bytes().to_vec(),
    }
}
