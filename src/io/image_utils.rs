// Copyright @yucwang 2026

use crate::io::ImageIoError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector4f};

use image::io::Reader as ImageReader;
use image::{Rgba, RgbaImage};
use std::path::Path;

fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: Float) -> Float {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn to_byte(v: Float) -> u8 {
    let v = if v.is_finite() { v.max(0.0).min(1.0) } else { 0.0 };
    (v * 255.0 + 0.5) as u8
}

/// Encodes `bitmap` as 8-bit sRGB, the format follows the extension.
pub fn write_bitmap_ldr(path: &Path, bitmap: &Bitmap) -> Result<(), ImageIoError> {
    log::info!("Writing {}x{} image to: {}.", bitmap.width(), bitmap.height(), path.display());
    let image = RgbaImage::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        let p = bitmap[(x as usize, y as usize)];
        Rgba([to_byte(linear_to_srgb(p.x)),
              to_byte(linear_to_srgb(p.y)),
              to_byte(linear_to_srgb(p.z)),
              to_byte(p.w)])
    });
    image.save(path)?;
    Ok(())
}

pub fn read_bitmap_ldr(path: &Path) -> Result<Bitmap, ImageIoError> {
    let image = ImageReader::open(path)?
        .decode()?
        .to_rgba32f();
    let (width, height) = image.dimensions();
    log::info!("Loaded image {}, width = {}, height = {}.", path.display(), width, height);

    let mut bitmap = Bitmap::new(width as usize, height as usize);
    for (x, y, p) in image.enumerate_pixels() {
        bitmap[(x as usize, y as usize)] = Vector4f::new(srgb_to_linear(p[0]),
                                                         srgb_to_linear(p[1]),
                                                         srgb_to_linear(p[2]),
                                                         p[3]);
    }
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_curve() {
        for v in [0.0, 0.002, 0.18, 0.5, 1.0] {
            assert!((srgb_to_linear(linear_to_srgb(v)) - v).abs() < 1e-5);
        }
        assert_eq!(to_byte(-1.0), 0);
        assert_eq!(to_byte(Float::NAN), 0);
        assert_eq!(to_byte(2.0), 255);
    }

    #[test]
    fn test_png_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut bitmap = Bitmap::filled(5, 2, Vector4f::new(0.0, 0.0, 0.0, 1.0));
        bitmap[(4, 0)] = Vector4f::new(1.0, 0.5, 0.0, 1.0);

        write_bitmap_ldr(&path, &bitmap).unwrap();
        let read_back = read_bitmap_ldr(&path).unwrap();
        assert_eq!(read_back.dimensions(), (5, 2));
        assert!((read_back[(4, 0)] - bitmap[(4, 0)]).norm() < 1e-2);
        assert_eq!(read_back[(0, 1)], bitmap[(0, 1)]);
    }
}
