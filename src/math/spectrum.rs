// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

/// Linear RGBA colour. Lighting math only touches the rgb part, alpha is
/// carried through for the authoring side and the output surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBASpectrum {
    rgba: [Float; 4]
}

impl Default for RGBASpectrum {
    fn default() -> Self {
        Self { rgba: [0.0f32, 0.0f32, 0.0f32, 1.0f32] }
    }
}

impl RGBASpectrum {
    pub const WHITE: RGBASpectrum = RGBASpectrum::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: RGBASpectrum = RGBASpectrum::new(0.0, 0.0, 0.0, 1.0);
    pub const BLUE: RGBASpectrum = RGBASpectrum::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: Float, g: Float, b: Float, a: Float) -> Self {
        Self { rgba: [r, g, b, a] }
    }

    pub fn from_rgb(rgb: Vector3f) -> Self {
        Self::new(rgb.x, rgb.y, rgb.z, 1.0)
    }

    pub fn from_array(v: [Float; 4]) -> Self {
        Self { rgba: v }
    }

    pub fn rgb(&self) -> Vector3f {
        Vector3f::new(self.rgba[0], self.rgba[1], self.rgba[2])
    }

    pub fn to_array(&self) -> [Float; 4] {
        self.rgba
    }
}
