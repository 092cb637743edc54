// Copyright @yucwang 2026

use crate::emitters::sky::{default_sun_direction, SkyEnvironment};
use crate::integrators::path::{
    MAX_BOUNCES, MAX_RAYS_PER_PIXEL, MAX_REJECTION_TRIES,
    MIN_BOUNCES, MIN_RAYS_PER_PIXEL, MIN_REJECTION_TRIES,
};
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBASpectrum;

/// Per-instance settings of the ray tracer. Integer ranges are enforced by
/// the setters, the fields read back are always in range.
#[derive(Debug, Clone, PartialEq)]
pub struct RayTracerSettings {
    pub enabled: bool,
    bounces: u32,
    rays_per_pixel: u32,
    safety_rejection_tries: u32,
    pub sky_color: RGBASpectrum,
    pub sky_bottom: RGBASpectrum,
    pub horizon_color: RGBASpectrum,
    pub sun_color: RGBASpectrum,
    pub sun_strength: Float,
    pub sun_focus: Float,
    sun_direction: Vector3f,
    pub texture_accumulation: bool,
    /// Restart the running mean when the spheres or the camera change.
    pub accumulation_reset_on_change: bool,
}

impl Default for RayTracerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bounces: 10,
            rays_per_pixel: 1,
            safety_rejection_tries: 100,
            sky_color: RGBASpectrum::WHITE,
            sky_bottom: RGBASpectrum::BLUE,
            horizon_color: RGBASpectrum::BLUE,
            sun_color: RGBASpectrum::BLUE,
            sun_strength: 300.0,
            sun_focus: 500.0,
            sun_direction: default_sun_direction(),
            texture_accumulation: false,
            accumulation_reset_on_change: false,
        }
    }
}

impl RayTracerSettings {
    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub fn set_bounces(&mut self, bounces: u32) {
        self.bounces = bounces.max(MIN_BOUNCES).min(MAX_BOUNCES);
    }

    pub fn rays_per_pixel(&self) -> u32 {
        self.rays_per_pixel
    }

    pub fn set_rays_per_pixel(&mut self, rays_per_pixel: u32) {
        self.rays_per_pixel = rays_per_pixel.max(MIN_RAYS_PER_PIXEL).min(MAX_RAYS_PER_PIXEL);
    }

    pub fn safety_rejection_tries(&self) -> u32 {
        self.safety_rejection_tries
    }

    pub fn set_safety_rejection_tries(&mut self, tries: u32) {
        self.safety_rejection_tries = tries.max(MIN_REJECTION_TRIES).min(MAX_REJECTION_TRIES);
    }

    pub fn sun_direction(&self) -> Vector3f {
        self.sun_direction
    }

    pub fn set_sun_direction(&mut self, direction: Vector3f) {
        self.sun_direction = direction;
    }

    /// Writes the lighting part of the settings into `environment`.
    pub fn apply_to(&self, environment: &mut SkyEnvironment) {
        environment.sky_color = self.sky_color;
        environment.sky_bottom = self.sky_bottom;
        environment.horizon_color = self.horizon_color;
        environment.sun_color = self.sun_color;
        environment.sun_strength = self.sun_strength;
        environment.sun_focus = self.sun_focus;
        environment.set_sun_direction(self.sun_direction);
    }
}
