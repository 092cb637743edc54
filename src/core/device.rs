// Copyright @yucwang 2026

//! Explicitly owned buffers shared between the frame orchestration and the
//! tracer: the packed sphere upload and a pool of transient frames.

use crate::core::error::RenderError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;
use crate::math::spectrum::RGBASpectrum;
use crate::shapes::sphere::{ Material, Sphere };
use bytemuck::{ Pod, Zeroable };
use std::ops::{ Deref, DerefMut };
use std::sync::Mutex;

/// Packed material record: colour, emission colour, emission intensity,
/// smoothness.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub color: [f32; 4],
    pub emission_color: [f32; 4],
    pub emission_intensity: f32,
    pub smoothness: f32,
}

/// Packed sphere record: position, radius, material. 14 floats, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuSphere {
    pub position: [f32; 3],
    pub radius: f32,
    pub material: GpuMaterial,
}

pub const MATERIAL_STRIDE: usize = std::mem::size_of::<f32>() * 4 * 2 + std::mem::size_of::<f32>() * 2;
pub const SPHERE_STRIDE: usize = std::mem::size_of::<f32>() * 3 + std::mem::size_of::<f32>() + MATERIAL_STRIDE;

impl From<&Sphere> for GpuSphere {
    fn from(sphere: &Sphere) -> Self {
        let p = sphere.position();
        let m = sphere.material();
        GpuSphere {
            position: [p.x, p.y, p.z],
            radius: sphere.radius(),
            material: GpuMaterial {
                color: m.base_color().to_array(),
                emission_color: m.emission_color().to_array(),
                emission_intensity: m.emission_intensity(),
                smoothness: m.smoothness(),
            },
        }
    }
}

impl GpuSphere {
    pub fn center(&self) -> Vector3f {
        Vector3f::new(self.position[0], self.position[1], self.position[2])
    }

    pub fn to_sphere(&self) -> Sphere {
        let material = Material::new(RGBASpectrum::from_array(self.material.color),
                                     RGBASpectrum::from_array(self.material.emission_color),
                                     self.material.emission_intensity,
                                     self.material.smoothness);
        Sphere::new(self.center(), self.radius, material)
    }
}

/// Byte buffer holding the packed snapshot for one frame. The allocation is
/// kept across uploads and only dropped by `release`.
#[derive(Debug, Default)]
pub struct SphereBuffer {
    bytes: Vec<u8>,
    count: usize,
    uploads: u64,
}

impl SphereBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content with `spheres`. Returns true when the packed
    /// bytes differ from the previous upload.
    pub fn upload(&mut self, spheres: &[Sphere]) -> bool {
        let records: Vec<GpuSphere> = spheres.iter().map(GpuSphere::from).collect();
        let packed: &[u8] = bytemuck::cast_slice(&records);

        let changed = self.uploads == 0 || self.bytes.as_slice() != packed;
        self.bytes.clear();
        self.bytes.extend_from_slice(packed);
        self.count = records.len();
        self.uploads += 1;
        changed
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes every record, in upload order.
    pub fn decode(&self) -> Vec<GpuSphere> {
        self.bytes
            .chunks_exact(SPHERE_STRIDE)
            .map(bytemuck::pod_read_unaligned::<GpuSphere>)
            .collect()
    }

    pub fn is_released(&self) -> bool {
        self.uploads == 0 && self.bytes.capacity() == 0
    }

    pub fn release(&mut self) {
        self.bytes = Vec::new();
        self.count = 0;
        self.uploads = 0;
    }
}

/// Recycles RGBA float frames between calls. Frames handed out by `acquire`
/// come back when their guard drops. Only frames of the last requested size
/// are kept for reuse.
#[derive(Debug, Default)]
pub struct FramePool {
    free: Mutex<Vec<Bitmap>>,
    outstanding: Mutex<usize>,
    max_pixels: Option<usize>,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool that refuses frames larger than `max_pixels`.
    pub fn with_pixel_budget(max_pixels: usize) -> Self {
        Self { max_pixels: Some(max_pixels), ..Self::default() }
    }

    pub fn acquire(&self, width: usize, height: usize) -> Result<PooledFrame<'_>, RenderError> {
        let recycled = {
            let mut free = lock(&self.free);
            free.retain(|b| b.dimensions() == (width, height));
            free.pop()
        };
        let frame = match recycled {
            Some(frame) => frame,
            None => {
                let over_budget = match (self.max_pixels, width.checked_mul(height)) {
                    (Some(max), Some(pixels)) => pixels > max,
                    (_, None) => true,
                    (None, Some(_)) => false,
                };
                if over_budget {
                    return Err(RenderError::Allocation { width, height });
                }
                Bitmap::try_new(width, height)?
            }
        };
        *lock(&self.outstanding) += 1;
        Ok(PooledFrame { pool: self, frame })
    }

    /// Frames currently checked out.
    pub fn outstanding(&self) -> usize {
        *lock(&self.outstanding)
    }

    /// Frames waiting for reuse.
    pub fn available(&self) -> usize {
        lock(&self.free).len()
    }

    pub fn clear(&self) {
        lock(&self.free).clear();
    }

    fn give_back(&self, frame: Bitmap) {
        let mut outstanding = lock(&self.outstanding);
        *outstanding = outstanding.saturating_sub(1);
        lock(&self.free).push(frame);
    }
}

pub struct PooledFrame<'a> {
    pool: &'a FramePool,
    frame: Bitmap,
}

impl Deref for PooledFrame<'_> {
    type Target = Bitmap;

    fn deref(&self) -> &Bitmap {
        &self.frame
    }
}

impl DerefMut for PooledFrame<'_> {
    fn deref_mut(&mut self) -> &mut Bitmap {
        &mut self.frame
    }
}

impl Drop for PooledFrame<'_> {
    fn drop(&mut self) {
        let frame = std::mem::replace(&mut self.frame, Bitmap::new(0, 0));
        self.pool.give_back(frame);
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
