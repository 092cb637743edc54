// Copyright 2020 @TwoCookingMice

use super::constants::Vector4f;
use crate::core::error::RenderError;

use std::ops;
use std::vec::Vec;

/// Row-major RGBA float frame, row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    data: Vec<Vector4f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector4f;

    fn index(&self, index: (usize, usize)) -> &Vector4f {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector4f {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Vector4f::zeros())
    }

    pub fn filled(width: usize, height: usize, value: Vector4f) -> Self {
        Self { data: vec![value; width * height],
               width: width,
               height: height }
    }

    /// Fallible allocation used for the frame buffers the renderer keeps
    /// around between frames.
    pub fn try_new(width: usize, height: usize) -> Result<Self, RenderError> {
        let pixel_number = width.checked_mul(height)
            .ok_or(RenderError::Allocation { width, height })?;
        let mut data = Vec::new();
        data.try_reserve_exact(pixel_number)
            .map_err(|_| RenderError::Allocation { width, height })?;
        data.resize(pixel_number, Vector4f::zeros());
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Vector4f] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Vector4f] {
        &mut self.data
    }

    /// Copies `other` into `self`. Both frames must have the same size.
    pub fn copy_from(&mut self, other: &Bitmap) -> Result<(), RenderError> {
        if self.dimensions() != other.dimensions() {
            return Err(RenderError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|p| !p.iter().all(|c| c.is_finite()))
    }
}

/* Test for Bitmap */
#[cfg(test)]
mod tests {
    use super::Bitmap;
    use super::Vector4f;
    use crate::core::error::RenderError;

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 128usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 128);

        bitmap[(5, 6)] = Vector4f::new(1.0, 0.5, 0.6, 1.0);
        assert_eq!(bitmap[(5, 6)], Vector4f::new(1.0, 0.5, 0.6, 1.0));
        assert_eq!(bitmap[(2, 6)], Vector4f::zeros());
        assert_eq!(bitmap.pixels()[5 + 256 * 6].y, 0.5);
    }

    #[test]
    fn test_bitmap_copy_requires_matching_size() {
        let src = Bitmap::filled(4, 4, Vector4f::new(0.25, 0.5, 0.75, 1.0));
        let mut dst = Bitmap::try_new(4, 4).unwrap();
        dst.copy_from(&src).unwrap();
        assert_eq!(dst, src);

        let mut small = Bitmap::new(2, 2);
        match small.copy_from(&src) {
            Err(RenderError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, (2, 2));
                assert_eq!(found, (4, 4));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bitmap_oversized_allocation_fails() {
        assert!(Bitmap::try_new(usize::MAX, 2).is_err());
    }
}
