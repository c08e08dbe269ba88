//! Error types for scenematch.

use thiserror::Error;

/// Result alias for scenematch operations.
pub type MatchResult<T> = std::result::Result<T, MatchError>;

/// Coarse failure classes shared by every operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad handle, non-positive dimension, template larger than scene,
    /// out-of-bounds region and similar caller mistakes.
    InvalidArgument,
    /// Buffer storage could not be obtained.
    AllocationFailure,
    /// A numeric precondition was violated (mismatched formats, empty surface).
    ComputationFailure,
    /// The caller cancelled a running scan.
    Cancelled,
}

/// Errors that can occur when running scenematch operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MatchError {
    /// Rows or columns are zero or overflow the address space.
    #[error("invalid dimensions: rows={rows}, cols={cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    /// The row stride is smaller than one packed row.
    #[error("invalid stride: row needs {row_bytes} bytes, stride is {stride}")]
    InvalidStride { row_bytes: usize, stride: usize },
    /// The backing buffer is too small for the requested layout.
    #[error("buffer too small: needed {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A rectangle does not fit inside the buffer.
    #[error(
        "region out of bounds: x={x}, y={y}, width={width}, height={height}, cols={cols}, rows={rows}"
    )]
    RegionOutOfBounds {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        cols: usize,
        rows: usize,
    },
    /// The template does not fit inside the scene.
    #[error(
        "template {templ_rows}x{templ_cols} does not fit scene {scene_rows}x{scene_cols} (rows x cols)"
    )]
    TemplateTooLarge {
        templ_rows: usize,
        templ_cols: usize,
        scene_rows: usize,
        scene_cols: usize,
    },
    /// A handle is null, released, or belongs to a reused slot.
    #[error("invalid buffer handle")]
    InvalidHandle,
    /// The acceptance threshold is NaN.
    #[error("invalid threshold: {0}")]
    InvalidThreshold(f64),
    /// A numeric pixel format code is not one of the supported constants.
    #[error("unknown pixel format code: {0}")]
    UnknownFormatCode(i32),
    /// A numeric method code is outside `0..=5`.
    #[error("unknown match method code: {0}")]
    UnknownMethodCode(i32),
    /// Storage for a buffer could not be reserved.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailure { bytes: usize },
    /// Scene and template differ in channel count or element type.
    #[error("format mismatch: scene is {scene}, template is {template}")]
    FormatMismatch {
        scene: &'static str,
        template: &'static str,
    },
    /// The operation does not support this pixel format.
    #[error("unsupported format {format} for {context}")]
    UnsupportedFormat {
        format: &'static str,
        context: &'static str,
    },
    /// The surface holds no comparable value.
    #[error("surface has no comparable values")]
    EmptySurface,
    /// A scan was stopped through its cancel token.
    #[error("scan cancelled")]
    Cancelled,
    /// Image decoding failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}

impl MatchError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::InvalidDimensions { .. }
            | MatchError::InvalidStride { .. }
            | MatchError::BufferTooSmall { .. }
            | MatchError::RegionOutOfBounds { .. }
            | MatchError::TemplateTooLarge { .. }
            | MatchError::InvalidHandle
            | MatchError::InvalidThreshold(_)
            | MatchError::UnknownFormatCode(_)
            | MatchError::UnknownMethodCode(_)
            | MatchError::ImageIo { .. } => ErrorKind::InvalidArgument,
            MatchError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            MatchError::FormatMismatch { .. }
            | MatchError::UnsupportedFormat { .. }
            | MatchError::EmptySurface => ErrorKind::ComputationFailure,
            MatchError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
