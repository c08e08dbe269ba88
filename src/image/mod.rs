//! Image buffers, borrowed views and pixel formats.
//!
//! `MatView` is a borrowed 2D view into a byte buffer with an explicit stride.
//! The stride counts bytes between the starts of consecutive rows, so a stride
//! larger than `cols * pixel_size` represents padded rows. ROI slices are
//! zero-copy views into the same backing slice and retain the original stride.
//!
//! `Mat` is the owned counterpart. It is always built by copying, so the
//! engine never aliases caller memory after construction.

use crate::util::{MatchError, MatchResult};

#[cfg(feature = "image-io")]
pub mod io;
mod mat;
pub(crate) mod plane;

pub use mat::Mat;

/// Element type of a single sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElemType {
    /// Unsigned 8-bit sample.
    U8,
    /// 32-bit IEEE float sample.
    F32,
}

impl ElemType {
    /// Returns the size of one sample in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElemType::U8 => 1,
            ElemType::F32 => 4,
        }
    }
}

/// Supported pixel layouts.
///
/// The numeric codes match the constants used at the host boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One 8-bit channel (code 0).
    U8C1,
    /// Three interleaved 8-bit channels (code 16).
    U8C3,
    /// Four interleaved 8-bit channels (code 24).
    U8C4,
    /// One 32-bit float channel (code 5). Score surfaces use this format.
    F32C1,
}

impl PixelFormat {
    /// Returns the boundary code of this format.
    pub const fn code(self) -> i32 {
        match self {
            PixelFormat::U8C1 => 0,
            PixelFormat::U8C3 => 16,
            PixelFormat::U8C4 => 24,
            PixelFormat::F32C1 => 5,
        }
    }

    /// Resolves a boundary code.
    pub fn from_code(code: i32) -> MatchResult<Self> {
        match code {
            0 => Ok(PixelFormat::U8C1),
            16 => Ok(PixelFormat::U8C3),
            24 => Ok(PixelFormat::U8C4),
            5 => Ok(PixelFormat::F32C1),
            other => Err(MatchError::UnknownFormatCode(other)),
        }
    }

    /// Returns the number of interleaved channels.
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::U8C1 | PixelFormat::F32C1 => 1,
            PixelFormat::U8C3 => 3,
            PixelFormat::U8C4 => 4,
        }
    }

    /// Returns the sample element type.
    pub const fn depth(self) -> ElemType {
        match self {
            PixelFormat::F32C1 => ElemType::F32,
            _ => ElemType::U8,
        }
    }

    /// Returns the size of one sample in bytes.
    pub const fn elem_size(self) -> usize {
        self.depth().size()
    }

    /// Returns the size of one pixel (all channels) in bytes.
    pub const fn pixel_size(self) -> usize {
        self.channels() * self.elem_size()
    }

    /// Short human-readable name, e.g. `8UC3`.
    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::U8C1 => "8UC1",
            PixelFormat::U8C3 => "8UC3",
            PixelFormat::U8C4 => "8UC4",
            PixelFormat::F32C1 => "32FC1",
        }
    }
}

/// Borrowed 2D image view with an explicit byte stride.
#[derive(Copy, Clone, Debug)]
pub struct MatView<'a> {
    data: &'a [u8],
    rows: usize,
    cols: usize,
    format: PixelFormat,
    stride: usize,
}

impl<'a> MatView<'a> {
    /// Creates a tightly packed view.
    pub fn from_slice(
        data: &'a [u8],
        rows: usize,
        cols: usize,
        format: PixelFormat,
    ) -> MatchResult<Self> {
        let stride = packed_row_bytes(rows, cols, format)?;
        Self::new(data, rows, cols, format, stride)
    }

    /// Creates a view with an explicit stride in bytes.
    pub fn new(
        data: &'a [u8],
        rows: usize,
        cols: usize,
        format: PixelFormat,
        stride: usize,
    ) -> MatchResult<Self> {
        let needed = required_len(rows, cols, format, stride)?;
        if data.len() < needed {
            return Err(MatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            rows,
            cols,
            format,
            stride,
        })
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

    /// Returns the backing slice including any row padding.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the bytes of row `y` without padding.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.rows {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.cols * self.format.pixel_size())?;
        self.data.get(start..end)
    }

    /// Returns the samples of row `y` widened to `f64`, channels interleaved.
    pub fn samples(&self, y: usize) -> Option<Samples<'a>> {
        self.row(y).map(|bytes| Samples {
            bytes,
            depth: self.format.depth(),
        })
    }

    /// Returns sample `c` of pixel `(x, y)`.
    pub fn sample(&self, x: usize, y: usize, c: usize) -> Option<f64> {
        if x >= self.cols || c >= self.format.channels() {
            return None;
        }
        let row = self.row(y)?;
        let offset = (x * self.format.channels() + c) * self.format.elem_size();
        decode(&row[offset..], self.format.depth())
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(&self, x: usize, y: usize, cols: usize, rows: usize) -> MatchResult<MatView<'a>> {
        if cols == 0 || rows == 0 {
            return Err(MatchError::InvalidDimensions { rows, cols });
        }
        let out_of_bounds = MatchError::RegionOutOfBounds {
            x: x as i64,
            y: y as i64,
            width: cols as i64,
            height: rows as i64,
            cols: self.cols,
            rows: self.rows,
        };
        let end_x = x.checked_add(cols).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(rows).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.cols || end_y > self.rows {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x * self.format.pixel_size();
        let data = self
            .data
            .get(start..)
            .ok_or(MatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;
        MatView::new(data, rows, cols, self.format, self.stride)
    }
}

/// Iterator over the samples of one row, widened to `f64`.
#[derive(Clone, Debug)]
pub struct Samples<'a> {
    bytes: &'a [u8],
    depth: ElemType,
}

impl Iterator for Samples<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let size = self.depth.size();
        if self.bytes.len() < size {
            return None;
        }
        let (head, rest) = self.bytes.split_at(size);
        self.bytes = rest;
        decode(head, self.depth)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bytes.len() / self.depth.size();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Samples<'_> {}

fn decode(bytes: &[u8], depth: ElemType) -> Option<f64> {
    match depth {
        ElemType::U8 => bytes.first().map(|&v| v as f64),
        ElemType::F32 => {
            let b = bytes.get(..4)?;
            Some(f32::from_ne_bytes([b[0], b[1], b[2], b[3]]) as f64)
        }
    }
}

pub(crate) fn packed_row_bytes(rows: usize, cols: usize, format: PixelFormat) -> MatchResult<usize> {
    if rows == 0 || cols == 0 {
        return Err(MatchError::InvalidDimensions { rows, cols });
    }
    cols.checked_mul(format.pixel_size())
        .ok_or(MatchError::InvalidDimensions { rows, cols })
}

fn required_len(
    rows: usize,
    cols: usize,
    format: PixelFormat,
    stride: usize,
) -> MatchResult<usize> {
    let row_bytes = packed_row_bytes(rows, cols, format)?;
    if stride < row_bytes {
        return Err(MatchError::InvalidStride { row_bytes, stride });
    }
    (rows - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_bytes))
        .ok_or(MatchError::InvalidDimensions { rows, cols })
}
