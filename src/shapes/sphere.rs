// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBASpectrum;

pub const MAX_EMISSION_INTENSITY: Float = 100.0;

/// Diffuse + emissive surface description of a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    base_color: RGBASpectrum,
    emission_color: RGBASpectrum,
    emission_intensity: Float,
    smoothness: Float,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: RGBASpectrum::WHITE,
            emission_color: RGBASpectrum::BLACK,
            emission_intensity: 0.0,
            smoothness: 0.0,
        }
    }
}

impl Material {
    pub fn new(base_color: RGBASpectrum,
               emission_color: RGBASpectrum,
               emission_intensity: Float,
               smoothness: Float) -> Self {
        Self {
            base_color,
            emission_color,
            emission_intensity: clamp_or_zero(emission_intensity, 0.0, MAX_EMISSION_INTENSITY),
            smoothness: clamp_or_zero(smoothness, 0.0, 1.0),
        }
    }

    pub fn diffuse(base_color: RGBASpectrum) -> Self {
        Self::new(base_color, RGBASpectrum::BLACK, 0.0, 0.0)
    }

    pub fn with_emission(self, emission_color: RGBASpectrum, emission_intensity: Float) -> Self {
        Self::new(self.base_color, emission_color, emission_intensity, self.smoothness)
    }

    pub fn with_smoothness(self, smoothness: Float) -> Self {
        Self::new(self.base_color, self.emission_color, self.emission_intensity, smoothness)
    }

    pub fn base_color(&self) -> RGBASpectrum {
        self.base_color
    }

    pub fn emission_color(&self) -> RGBASpectrum {
        self.emission_color
    }

    pub fn emission_intensity(&self) -> Float {
        self.emission_intensity
    }

    pub fn smoothness(&self) -> Float {
        self.smoothness
    }

    /// Emitted radiance, emission colour scaled by intensity.
    pub fn emitted(&self) -> Vector3f {
        self.emission_color.rgb() * self.emission_intensity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    position: Vector3f,
    radius: Float,
    material: Material,
}

impl Sphere {
    pub fn new(position: Vector3f, radius: Float, material: Material) -> Self {
        Self { position, radius: clamp_radius(radius), material }
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_position(&mut self, position: Vector3f) {
        self.position = position;
    }

    pub fn set_radius(&mut self, radius: Float) {
        self.radius = clamp_radius(radius);
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }
}

/// Distance to the nearest intersection with t inside the ray segment, the
/// far root is used when the origin lies inside the sphere.
pub fn intersect_sphere(center: &Vector3f, radius: Float, ray: &Ray3f) -> Option<Float> {
    if !(radius > 0.0) {
        return None;
    }

    // |o + t d - c|^2 = r^2 with |d| = 1
    let oc = ray.origin() - center;
    let half_b = oc.dot(&ray.dir());
    let c = oc.norm_squared() - radius * radius;
    let discriminant = half_b * half_b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = -half_b - sqrt_d;
    if ray.test_segment(near) {
        return Some(near);
    }
    let far = -half_b + sqrt_d;
    if ray.test_segment(far) {
        return Some(far);
    }
    None
}

fn clamp_radius(radius: Float) -> Float {
    // NaN radii collapse to 0 as well
    if radius > 0.0 { radius } else { 0.0 }
}

fn clamp_or_zero(v: Float, lo: Float, hi: Float) -> Float {
    if v.is_nan() { lo } else { v.max(lo).min(hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_radius_is_clamped() {
        for r in [-0.001, -1.0, -1e9, Float::NAN] {
            let mut s = Sphere::new(Vector3f::zeros(), r, Material::default());
            assert_eq!(s.radius(), 0.0);
            s.set_radius(2.0);
            assert_eq!(s.radius(), 2.0);
            s.set_radius(r);
            assert_eq!(s.radius(), 0.0);
        }
    }

    #[test]
    fn test_material_ranges() {
        let m = Material::new(RGBASpectrum::WHITE, RGBASpectrum::WHITE, 250.0, 1.5);
        assert_eq!(m.emission_intensity(), 100.0);
        assert_eq!(m.smoothness(), 1.0);
        let m = Material::new(RGBASpectrum::WHITE, RGBASpectrum::WHITE, -3.0, -0.5);
        assert_eq!(m.emission_intensity(), 0.0);
        assert_eq!(m.smoothness(), 0.0);
        assert!(m.emitted().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_sphere_roots() {
        let center = Vector3f::zeros();
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let t = intersect_sphere(&center, 1.0, &ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        let inside = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let t = intersect_sphere(&center, 1.0, &inside).unwrap();
        assert!((t - 1.0).abs() < 1e-5);

        let away = Ray3f::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(intersect_sphere(&center, 1.0, &away).is_none());

        let miss = Ray3f::new(Vector3f::new(0.0, 2.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(intersect_sphere(&center, 1.0, &miss).is_none());

        assert!(intersect_sphere(&center, 0.0, &ray).is_none());
    }
}
