// Copyright @yucwang 2026

use crate::core::device::GpuSphere;
use crate::core::rng::LcgRng;
use crate::core::sensor::Sensor;
use crate::emitters::sky::SkyEnvironment;
use crate::math::constants::{Float, Vector2f, Vector3f};

/// Everything one frame of tracing reads. Immutable for the whole pass.
pub struct TraceContext<'a> {
    pub spheres: &'a [GpuSphere],
    pub environment: &'a SkyEnvironment,
    pub sensor: &'a dyn Sensor,
    pub width: usize,
    pub height: usize,
}

pub trait Integrator: Sync {
    /// One jittered sample for pixel (x, y), row 0 at the top.
    fn trace_ray_forward(&self, ctx: &TraceContext<'_>, pixel: Vector2f, rng: &mut LcgRng) -> Vector3f;
    fn samples_per_pixel(&self) -> u32;

    /// Mean of `samples_per_pixel` samples of pixel (x, y). Depends only on
    /// the context, the pixel and the frame index.
    fn trace_pixel(&self, ctx: &TraceContext<'_>, x: usize, y: usize, frame_index: u32) -> Vector3f {
        let mut rng = LcgRng::for_pixel(x, y, ctx.width, frame_index);
        let pixel = Vector2f::new(x as Float, y as Float);
        let spp = self.samples_per_pixel().max(1);

        let mut color = Vector3f::zeros();
        for _ in 0..spp {
            color += self.trace_ray_forward(ctx, pixel, &mut rng);
        }
        color / (spp as Float)
    }
}
