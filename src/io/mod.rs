// Copyright @yucwang 2026

pub mod exr_utils;
pub mod image_utils;

use crate::math::bitmap::Bitmap;
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum ImageIoError {
    Io(std::io::Error),
    Exr(String),
    Image(String),
}

impl From<std::io::Error> for ImageIoError {
    fn from(err: std::io::Error) -> Self {
        ImageIoError::Io(err)
    }
}

impl From<exr::error::Error> for ImageIoError {
    fn from(err: exr::error::Error) -> Self {
        ImageIoError::Exr(err.to_string())
    }
}

impl From<image::ImageError> for ImageIoError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => ImageIoError::Io(e),
            other => ImageIoError::Image(other.to_string()),
        }
    }
}

impl fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageIoError::Io(e) => write!(f, "i/o error: {}", e),
            ImageIoError::Exr(msg) => write!(f, "exr error: {}", msg),
            ImageIoError::Image(msg) => write!(f, "image error: {}", msg),
        }
    }
}

impl std::error::Error for ImageIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageIoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

fn is_exr(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("exr"))
}

/// Writes `bitmap` as EXR when the path ends in `.exr`, otherwise through
/// the `image` encoders picked by extension.
pub fn write_bitmap<P: AsRef<Path>>(path: P, bitmap: &Bitmap) -> Result<(), ImageIoError> {
    let path = path.as_ref();
    if is_exr(path) {
        exr_utils::write_bitmap_exr(path, bitmap)
    } else {
        image_utils::write_bitmap_ldr(path, bitmap)
    }
}

/// Reads an RGBA frame, linear for EXR and sRGB-decoded otherwise.
pub fn read_bitmap<P: AsRef<Path>>(path: P) -> Result<Bitmap, ImageIoError> {
    let path = path.as_ref();
    if is_exr(path) {
        exr_utils::read_bitmap_exr(path)
    } else {
        image_utils::read_bitmap_ldr(path)
    }
}
