// Copyright @yucwang 2021

use crate::core::integrator::{Integrator, TraceContext};
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Vector3f, Vector4f};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

pub const BLOCK_SIZE: usize = 64;

/// Traces every pixel of `target` for `frame_index`. Blocks are handed out
/// to worker threads, each pixel seeds its own generator so the image does
/// not depend on the thread count.
pub fn render_frame(integrator: &dyn Integrator,
                    ctx: &TraceContext<'_>,
                    frame_index: u32,
                    target: &mut Bitmap) {
    render_frame_with_threads(integrator, ctx, frame_index, target, available_threads())
}

pub fn render_frame_with_threads(integrator: &dyn Integrator,
                                 ctx: &TraceContext<'_>,
                                 frame_index: u32,
                                 target: &mut Bitmap,
                                 thread_count: usize) {
    let (width, height) = target.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    debug_assert_eq!((ctx.width, ctx.height), (width, height));

    let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
    let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
    let total_blocks = blocks_x * blocks_y;
    let thread_count = thread_count.max(1).min(total_blocks);

    let next_block = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel::<(usize, usize, usize, usize, Vec<Vector3f>)>();

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let next_block = Arc::clone(&next_block);
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }

                    let bx = block_index % blocks_x;
                    let by = block_index / blocks_x;
                    let x0 = bx * BLOCK_SIZE;
                    let y0 = by * BLOCK_SIZE;
                    let x1 = (x0 + BLOCK_SIZE).min(width);
                    let y1 = (y0 + BLOCK_SIZE).min(height);

                    let mut block = Vec::with_capacity((x1 - x0) * (y1 - y0));
                    for y in y0..y1 {
                        for x in x0..x1 {
                            block.push(integrator.trace_pixel(ctx, x, y, frame_index));
                        }
                    }
                    if tx.send((x0, y0, x1, y1, block)).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx);
        for (x0, y0, x1, y1, block) in rx.iter() {
            for y in y0..y1 {
                for x in x0..x1 {
                    let c = block[(x - x0) + (x1 - x0) * (y - y0)];
                    target[(x, y)] = Vector4f::new(c.x, c.y, c.z, 1.0);
                }
            }
        }
    });
}

fn available_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::SphereBuffer;
    use crate::emitters::sky::SkyEnvironment;
    use crate::integrators::path::PathIntegrator;
    use crate::math::spectrum::RGBASpectrum;
    use crate::sensors::pinhole::{CameraState, PinholeCamera};
    use crate::shapes::sphere::{Material, Sphere};

    #[test]
    fn test_frame_is_independent_of_thread_count() {
        let mut buffer = SphereBuffer::new();
        buffer.upload(&[
            Sphere::new(Vector3f::zeros(), 1.0, Material::diffuse(RGBASpectrum::new(0.7, 0.7, 0.2, 1.0))),
            Sphere::new(Vector3f::new(1.5, 0.5, 0.0), 0.5,
                        Material::diffuse(RGBASpectrum::WHITE).with_emission(RGBASpectrum::WHITE, 4.0)),
        ]);
        let spheres = buffer.decode();
        let env = SkyEnvironment::default();
        let (width, height) = (70, 45);
        let cam = PinholeCamera::new(&CameraState::look_at(Vector3f::new(0.0, 0.0, -5.0),
                                                           Vector3f::zeros(),
                                                           Vector3f::new(0.0, 1.0, 0.0),
                                                           50.0, 0.1, width as f32 / height as f32));
        let ctx = TraceContext { spheres: &spheres, environment: &env, sensor: &cam, width, height };
        let integrator = PathIntegrator::new(4, 2, 100);

        let mut single = Bitmap::new(width, height);
        render_frame_with_threads(&integrator, &ctx, 3, &mut single, 1);
        let mut many = Bitmap::new(width, height);
        render_frame_with_threads(&integrator, &ctx, 3, &mut many, 4);

        let bits = |b: &Bitmap| b.pixels().iter().map(|p| p.map(|c| c.to_bits())).collect::<Vec<_>>();
        assert_eq!(bits(&single), bits(&many));
        assert!(!single.has_non_finite());
        assert!(single.pixels().iter().all(|p| p.w == 1.0));
    }
}
