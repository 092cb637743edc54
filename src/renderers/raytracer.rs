// Copyright @yucwang 2026

use crate::core::config::RayTracerSettings;
use crate::core::device::{FramePool, SphereBuffer};
use crate::core::error::RenderError;
use crate::core::integrator::TraceContext;
use crate::core::scene::{build_scene_snapshot, SceneQuery};
use crate::emitters::sky::SkyEnvironment;
use crate::integrators::path::PathIntegrator;
use crate::math::bitmap::Bitmap;
use crate::renderers::accumulator::FrameAccumulator;
use crate::renderers::tiled;
use crate::sensors::pinhole::{CameraState, PinholeCamera};

/// What `RayTracer::render_frame` did with the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Tracing disabled, the source was copied through.
    PassThrough,
    /// Traced straight into the destination.
    Direct,
    /// Blended into the running mean as frame `frame_index`.
    Accumulated { frame_index: u32 },
    /// Paused on a frame that is already in the mean, the mean was shown as is.
    Held { frame_index: u32 },
    /// Accumulation buffers were unavailable, traced directly instead.
    Fallback,
}

/// Per-frame driver: snapshot the scene, trace it and optionally fold the
/// result into the running mean. Owns every buffer it uses and reconfigures
/// them in place from the settings on each call.
pub struct RayTracer {
    settings: RayTracerSettings,
    integrator: PathIntegrator,
    environment: SkyEnvironment,
    spheres: SphereBuffer,
    pool: FramePool,
    accumulator: FrameAccumulator,
    frame_index: u32,
    blended_index: Option<u32>,
    last_camera: Option<CameraState>,
}

impl Default for RayTracer {
    fn default() -> Self {
        Self::new(RayTracerSettings::default())
    }
}

impl RayTracer {
    pub fn new(settings: RayTracerSettings) -> Self {
        Self::with_frame_pool(settings, FramePool::new())
    }

    /// Tracer drawing its transient frames from `pool`.
    pub fn with_frame_pool(settings: RayTracerSettings, pool: FramePool) -> Self {
        Self {
            settings,
            integrator: PathIntegrator::default(),
            environment: SkyEnvironment::default(),
            spheres: SphereBuffer::new(),
            pool,
            accumulator: FrameAccumulator::new(),
            frame_index: 1,
            blended_index: None,
            last_camera: None,
        }
    }

    pub fn settings(&self) -> &RayTracerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RayTracerSettings {
        &mut self.settings
    }

    /// Index the next accumulated frame will be blended with.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn sphere_buffer(&self) -> &SphereBuffer {
        &self.spheres
    }

    pub fn frame_pool(&self) -> &FramePool {
        &self.pool
    }

    pub fn accumulated(&self) -> Option<&Bitmap> {
        self.accumulator.result()
    }

    /// Starts a new running mean with the next frame.
    pub fn reset_accumulation(&mut self) {
        self.frame_index = 1;
        self.blended_index = None;
        self.accumulator.reset();
    }

    /// Turns tracing off and frees the scene and accumulation buffers.
    pub fn disable(&mut self) {
        self.settings.enabled = false;
        self.release();
    }

    /// Renders one output frame. `playing` tells whether the host is
    /// advancing time, a paused view keeps the frame counter where it is.
    pub fn render_frame(&mut self,
                        source: &Bitmap,
                        destination: &mut Bitmap,
                        camera: &CameraState,
                        scene: &dyn SceneQuery,
                        playing: bool) -> FrameOutcome {
        if !self.settings.enabled {
            destination.clone_from(source);
            if !self.spheres.is_released() {
                self.release();
            }
            return FrameOutcome::PassThrough;
        }

        let (width, height) = source.dimensions();
        if destination.dimensions() != (width, height) {
            *destination = Bitmap::new(width, height);
        }

        let snapshot = build_scene_snapshot(scene);
        let scene_changed = snapshot.upload(&mut self.spheres);
        let camera_changed = self.last_camera.as_ref() != Some(camera);
        self.last_camera = Some(*camera);

        self.settings.apply_to(&mut self.environment);
        self.integrator.configure(self.settings.bounces(),
                                  self.settings.rays_per_pixel(),
                                  self.settings.safety_rejection_tries());

        if self.settings.texture_accumulation {
            if self.settings.accumulation_reset_on_change && (scene_changed || camera_changed) && self.frame_index > 1 {
                log::debug!("Scene or camera changed, restarting accumulation at frame {}.", self.frame_index);
                self.reset_accumulation();
            }
            if self.accumulator.result().is_some() && !self.accumulator.is_allocated_for(width, height) {
                log::debug!("Resolution changed to {}x{}, restarting accumulation.", width, height);
                self.reset_accumulation();
                self.pool.clear();
            }
            if playing && self.blended_index == Some(self.frame_index) {
                // resumed after a paused blend
                self.frame_index = self.frame_index.saturating_add(1);
            }
            // a paused host asks for the same frame again, it is already in the mean
            let unchanged = !scene_changed && !camera_changed;
            if !playing && unchanged && self.blended_index == Some(self.frame_index) {
                if let Some(result) = self.accumulator.result() {
                    if destination.copy_from(result).is_ok() {
                        return FrameOutcome::Held { frame_index: self.frame_index };
                    }
                }
            }
        } else if self.accumulator.result().is_some() {
            self.accumulator.reset();
            self.blended_index = None;
        }

        let spheres = self.spheres.decode();
        let sensor = PinholeCamera::new(camera);
        let ctx = TraceContext {
            spheres: &spheres,
            environment: &self.environment,
            sensor: &sensor,
            width,
            height,
        };

        if !self.settings.texture_accumulation {
            tiled::render_frame(&self.integrator, &ctx, self.frame_index, destination);
            return FrameOutcome::Direct;
        }

        let frame_index = self.frame_index;
        let accumulated = accumulate_into(&self.integrator, &ctx, frame_index,
                                          &self.pool, &mut self.accumulator, destination);
        match accumulated {
            Ok(()) => {
                self.blended_index = Some(frame_index);
                if playing {
                    self.frame_index = self.frame_index.saturating_add(1);
                }
                FrameOutcome::Accumulated { frame_index }
            }
            Err(e) => {
                log::warn!("Skipping accumulation for this frame: {}.", e);
                tiled::render_frame(&self.integrator, &ctx, frame_index, destination);
                FrameOutcome::Fallback
            }
        }
    }

    fn release(&mut self) {
        log::debug!("Releasing sphere buffer ({} spheres) and accumulation buffers.", self.spheres.len());
        self.spheres.release();
        self.accumulator.reset();
        self.pool.clear();
        self.frame_index = 1;
        self.blended_index = None;
        self.last_camera = None;
    }
}

impl Drop for RayTracer {
    fn drop(&mut self) {
        self.spheres.release();
    }
}

fn accumulate_into(integrator: &PathIntegrator,
                   ctx: &TraceContext<'_>,
                   frame_index: u32,
                   pool: &FramePool,
                   accumulator: &mut FrameAccumulator,
                   destination: &mut Bitmap) -> Result<(), RenderError> {
    let mut current = pool.acquire(ctx.width, ctx.height)?;
    tiled::render_frame(integrator, ctx, frame_index, &mut current);
    let blended = accumulator.accumulate(&current, frame_index, pool)?;
    destination.copy_from(blended)
}
