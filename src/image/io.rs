//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{Mat, PixelFormat};
use crate::util::{MatchError, MatchResult};
use std::path::Path;

/// Channel layout to convert decoded images into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Single luma channel (`U8C1`).
    #[default]
    Gray,
    /// Interleaved RGB (`U8C3`).
    Rgb,
    /// Interleaved RGBA (`U8C4`).
    Rgba,
}

impl ColorMode {
    /// Returns the pixel format produced by this mode.
    pub fn format(self) -> PixelFormat {
        match self {
            ColorMode::Gray => PixelFormat::U8C1,
            ColorMode::Rgb => PixelFormat::U8C3,
            ColorMode::Rgba => PixelFormat::U8C4,
        }
    }
}

/// Copies a grayscale image buffer into a `U8C1` mat.
pub fn mat_from_gray_image(img: &image::GrayImage) -> MatchResult<Mat> {
    Mat::from_u8(
        img.height() as usize,
        img.width() as usize,
        PixelFormat::U8C1,
        img.as_raw(),
    )
}

/// Converts a dynamic image into a mat with the requested channel layout.
pub fn mat_from_dynamic_image(img: &image::DynamicImage, mode: ColorMode) -> MatchResult<Mat> {
    let rows = img.height() as usize;
    let cols = img.width() as usize;
    match mode {
        ColorMode::Gray => mat_from_gray_image(&img.to_luma8()),
        ColorMode::Rgb => Mat::from_u8(rows, cols, mode.format(), img.to_rgb8().as_raw()),
        ColorMode::Rgba => Mat::from_u8(rows, cols, mode.format(), img.to_rgba8().as_raw()),
    }
}

/// Loads an image from disk and converts it to the requested layout.
pub fn load_image<P: AsRef<Path>>(path: P, mode: ColorMode) -> MatchResult<Mat> {
    let img = image::open(path).map_err(|err| MatchError::ImageIo {
        reason: err.to_string(),
    })?;
    mat_from_dynamic_image(&img, mode)
}
