// Copyright @yucwang 2026

use crate::core::device::GpuSphere;
use crate::core::integrator::{Integrator, TraceContext};
use crate::core::rng::LcgRng;
use crate::emitters::sky::SkyEnvironment;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::warp::{lerp3, reflect, sample_cosine_direction, sample_pixel_jitter};
use crate::shapes::sphere::intersect_sphere;

pub const MIN_BOUNCES: u32 = 1;
pub const MAX_BOUNCES: u32 = 50;
pub const MIN_RAYS_PER_PIXEL: u32 = 1;
pub const MAX_RAYS_PER_PIXEL: u32 = 100;
pub const MIN_REJECTION_TRIES: u32 = 10;
pub const MAX_REJECTION_TRIES: u32 = 100;

/// Diffuse/mirror path tracer over a flat list of spheres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathIntegrator {
    pub max_depth: u32,
    pub samples_per_pixel: u32,
    pub rejection_tries: u32,
}

struct Hit {
    t: Float,
    index: usize,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self::new(10, 1, 100)
    }
}

impl PathIntegrator {
    pub fn new(max_depth: u32, samples_per_pixel: u32, rejection_tries: u32) -> Self {
        let mut integrator = Self { max_depth: 0, samples_per_pixel: 0, rejection_tries: 0 };
        integrator.configure(max_depth, samples_per_pixel, rejection_tries);
        integrator
    }

    /// Updates the sampling budget in place, values are clamped to the
    /// supported ranges.
    pub fn configure(&mut self, max_depth: u32, samples_per_pixel: u32, rejection_tries: u32) {
        self.max_depth = max_depth.max(MIN_BOUNCES).min(MAX_BOUNCES);
        self.samples_per_pixel = samples_per_pixel.max(MIN_RAYS_PER_PIXEL).min(MAX_RAYS_PER_PIXEL);
        self.rejection_tries = rejection_tries.max(MIN_REJECTION_TRIES).min(MAX_REJECTION_TRIES);
    }

    pub fn trace_path(&self, spheres: &[GpuSphere], environment: &SkyEnvironment,
                      mut ray: Ray3f, rng: &mut LcgRng) -> Vector3f {
        let mut radiance = Vector3f::zeros();
        let mut throughput = Vector3f::new(1.0, 1.0, 1.0);

        for _ in 0..self.max_depth {
            let hit = match closest_hit(spheres, &ray) {
                Some(h) => h,
                None => {
                    radiance += throughput.component_mul(&environment.eval(&ray.dir()));
                    break;
                }
            };

            let sphere = &spheres[hit.index];
            let material = &sphere.material;
            let p = ray.at(hit.t);
            let n = (p - sphere.center()) / sphere.radius;

            let emitted = Vector3f::new(material.emission_color[0],
                                        material.emission_color[1],
                                        material.emission_color[2]) * material.emission_intensity;
            radiance += throughput.component_mul(&emitted);
            throughput = throughput.component_mul(&Vector3f::new(material.color[0],
                                                                 material.color[1],
                                                                 material.color[2]));

            let diffuse = match sample_cosine_direction(&n, rng, self.rejection_tries) {
                Some(d) => d,
                None => break,
            };
            let mirror = reflect(&ray.dir(), &n);
            let dir = lerp3(&diffuse, &mirror, material.smoothness);
            if dir.norm() <= EPSILON {
                break;
            }

            ray = Ray3f::new(p + n * EPSILON, dir, None, None);
        }

        radiance
    }
}

impl Integrator for PathIntegrator {
    fn trace_ray_forward(&self, ctx: &TraceContext<'_>, pixel: Vector2f, rng: &mut LcgRng) -> Vector3f {
        let jitter = sample_pixel_jitter(rng);
        let u = (pixel.x + jitter.x) / (ctx.width as Float);
        let v = 1.0 - (pixel.y + jitter.y) / (ctx.height as Float);
        let ray = ctx.sensor.sample_ray(&Vector2f::new(u, v));
        self.trace_path(ctx.spheres, ctx.environment, ray, rng)
    }

    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }
}

/// Nearest sphere hit along the ray. On equal distances the sphere listed
/// first wins.
fn closest_hit(spheres: &[GpuSphere], ray: &Ray3f) -> Option<Hit> {
    let mut closest: Option<Hit> = None;
    for (index, sphere) in spheres.iter().enumerate() {
        if let Some(t) = intersect_sphere(&sphere.center(), sphere.radius, ray) {
            let nearer = match &closest {
                Some(h) => t < h.t,
                None => true,
            };
            if nearer {
                closest = Some(Hit { t, index });
            }
        }
    }
    closest
}
