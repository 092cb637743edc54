// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBASpectrum;
use crate::math::warp::{lerp3, smoothstep};

/// Gradient sky with a sun lobe, seen by every ray that leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyEnvironment {
    pub sky_color: RGBASpectrum,
    pub sky_bottom: RGBASpectrum,
    pub horizon_color: RGBASpectrum,
    pub sun_color: RGBASpectrum,
    pub sun_strength: Float,
    pub sun_focus: Float,
    sun_direction: Vector3f,
}

impl Default for SkyEnvironment {
    fn default() -> Self {
        Self {
            sky_color: RGBASpectrum::WHITE,
            sky_bottom: RGBASpectrum::BLUE,
            horizon_color: RGBASpectrum::BLUE,
            sun_color: RGBASpectrum::BLUE,
            sun_strength: 300.0,
            sun_focus: 500.0,
            sun_direction: default_sun_direction(),
        }
    }
}

pub fn default_sun_direction() -> Vector3f {
    Vector3f::new(0.3, 0.8, 0.5).normalize()
}

impl SkyEnvironment {
    /// Direction towards the sun. A zero vector switches the sun off.
    pub fn set_sun_direction(&mut self, direction: Vector3f) {
        let len = direction.norm();
        self.sun_direction = if len > 0.0 && len.is_finite() {
            direction / len
        } else {
            Vector3f::zeros()
        };
    }

    pub fn sun_direction(&self) -> Vector3f {
        self.sun_direction
    }

    /// Radiance arriving along `dir` (unit length) from outside the scene.
    pub fn eval(&self, dir: &Vector3f) -> Vector3f {
        let horizon = self.horizon_color.rgb();
        let gradient = if dir.y >= 0.0 {
            let t = smoothstep(0.0, 1.0, dir.y).powf(0.35);
            lerp3(&horizon, &self.sky_color.rgb(), t)
        } else {
            let t = smoothstep(0.0, 1.0, -dir.y);
            lerp3(&horizon, &self.sky_bottom.rgb(), t)
        };

        gradient + self.sun(dir)
    }

    fn sun(&self, dir: &Vector3f) -> Vector3f {
        let cos = dir.dot(&self.sun_direction).max(0.0);
        if cos <= 0.0 {
            return Vector3f::zeros();
        }
        self.sun_color.rgb() * (self.sun_strength * cos.powf(self.sun_focus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_sky() -> SkyEnvironment {
        let mut env = SkyEnvironment {
            sky_color: RGBASpectrum::new(0.0, 0.0, 1.0, 1.0),
            sky_bottom: RGBASpectrum::new(0.0, 1.0, 0.0, 1.0),
            horizon_color: RGBASpectrum::new(1.0, 0.0, 0.0, 1.0),
            sun_color: RGBASpectrum::WHITE,
            sun_strength: 0.0,
            sun_focus: 1.0,
            ..SkyEnvironment::default()
        };
        env.set_sun_direction(Vector3f::new(0.0, 1.0, 0.0));
        env
    }

    #[test]
    fn test_gradient_pivots_on_horizon() {
        let env = plain_sky();
        let up = env.eval(&Vector3f::new(0.0, 1.0, 0.0));
        let down = env.eval(&Vector3f::new(0.0, -1.0, 0.0));
        let side = env.eval(&Vector3f::new(1.0, 0.0, 0.0));
        assert!((up - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert!((down - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!((side - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_sun_lobe_sharpens_with_focus() {
        let mut env = plain_sky();
        env.sun_strength = 10.0;
        let off_axis = Vector3f::new(0.2, 1.0, 0.0).normalize();
        let wide = env.eval(&off_axis) - plain_sky().eval(&off_axis);
        env.sun_focus = 200.0;
        let tight = env.eval(&off_axis) - plain_sky().eval(&off_axis);
        assert!(wide.x > tight.x);
        let at_sun = env.eval(&Vector3f::new(0.0, 1.0, 0.0));
        assert!((at_sun.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_sun_direction_disables_sun() {
        let mut env = SkyEnvironment::default();
        env.set_sun_direction(Vector3f::zeros());
        let base = env.eval(&default_sun_direction());
        assert!(base.iter().all(|c| c.is_finite() && *c <= 1.0));
    }
}
