// Copyright @yucwang 2026

use crate::math::constants::Float;

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generator for one pixel of one frame. Neighbouring pixels and
    /// consecutive frames land on unrelated streams.
    pub fn for_pixel(x: usize, y: usize, width: usize, frame_index: u32) -> Self {
        let pixel_index = (y as u64).wrapping_mul(width as u64).wrapping_add(x as u64);
        let seed = pixel_index ^ ((frame_index as u64) << 32);
        Self::new(splitmix64(seed))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> Float {
        // top 24 bits keep the result strictly below 1
        ((self.next_u32() >> 8) as Float) * (1.0 / 16777216.0)
    }

    /// Uniform in [-1, 1).
    pub fn next_signed_f32(&mut self) -> Float {
        2.0 * self.next_f32() - 1.0
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
