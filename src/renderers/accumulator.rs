// Copyright @yucwang 2026

use crate::core::device::FramePool;
use crate::core::error::RenderError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

/// Running mean of the frames rendered since the last reset.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    result: Option<Bitmap>,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self { result: None }
    }

    /// Blends `current` into the history with weight `1 / frame_index`.
    /// Index 1 starts a new mean; 0 is treated as 1.
    pub fn accumulate(&mut self,
                      current: &Bitmap,
                      frame_index: u32,
                      pool: &FramePool) -> Result<&Bitmap, RenderError> {
        let (width, height) = current.dimensions();
        let reallocate = match &self.result {
            Some(result) => result.dimensions() != (width, height),
            None => true,
        };
        if reallocate {
            log::debug!("Allocating accumulation buffer, width = {}, height = {}.", width, height);
            self.result = Some(Bitmap::try_new(width, height)?);
        }
        let result = match self.result.as_mut() {
            Some(result) => result,
            None => return Err(RenderError::Allocation { width, height }),
        };

        let mut previous = pool.acquire(width, height)?;
        previous.copy_from(result)?;

        let weight = 1.0 / (frame_index.max(1) as Float);
        for ((out, prev), cur) in result.pixels_mut().iter_mut()
                                        .zip(previous.pixels().iter())
                                        .zip(current.pixels().iter()) {
            *out = prev + (cur - prev) * weight;
        }

        Ok(result)
    }

    pub fn result(&self) -> Option<&Bitmap> {
        self.result.as_ref()
    }

    pub fn is_allocated_for(&self, width: usize, height: usize) -> bool {
        matches!(&self.result, Some(r) if r.dimensions() == (width, height))
    }

    /// Drops the history and its buffer.
    pub fn reset(&mut self) {
        self.result = None;
    }
}
