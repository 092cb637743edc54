// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{degree_to_radian, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Camera parameters as exposed by the host, sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Local-to-world transform, the camera looks down local +z.
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub field_of_view: Float,
    pub near_clip: Float,
    pub aspect: Float,
}

impl CameraState {
    pub fn new(transform: Transform, field_of_view: Float, near_clip: Float, aspect: Float) -> Self {
        Self { transform, field_of_view, near_clip, aspect }
    }

    pub fn look_at(eye: Vector3f,
                   target: Vector3f,
                   up: Vector3f,
                   field_of_view: Float,
                   near_clip: Float,
                   aspect: Float) -> Self {
        Self::new(Transform::look_at(eye, target, up), field_of_view, near_clip, aspect)
    }

    pub fn position(&self) -> Vector3f {
        self.transform.translation()
    }
}

/// Pinhole ray generator: no lens, no distortion.
pub struct PinholeCamera {
    to_world: Transform,
    origin: Vector3f,
    plane_width: Float,
    plane_height: Float,
    near_clip: Float,
}

impl PinholeCamera {
    pub fn new(state: &CameraState) -> Self {
        let plane_height = 2.0 * state.near_clip * (0.5 * degree_to_radian(state.field_of_view)).tan();
        let plane_width = plane_height * state.aspect;

        Self {
            to_world: state.transform,
            origin: state.transform.translation(),
            plane_width,
            plane_height,
            near_clip: state.near_clip,
        }
    }

    /// (plane width, plane height, near clip), the view plane rectangle.
    pub fn view_params(&self) -> Vector3f {
        Vector3f::new(self.plane_width, self.plane_height, self.near_clip)
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }
}

impl Sensor for PinholeCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let local = Vector3f::new((u.x - 0.5) * self.plane_width,
                                  (u.y - 0.5) * self.plane_height,
                                  self.near_clip);
        Ray3f::new(self.origin, self.to_world.apply_vector(local), None, None)
    }

    fn describe(&self) -> String {
        format!("PinholeCamera\n  origin: {:?}\n  plane: {} x {}\n  near_clip: {}",
                self.origin, self.plane_width, self.plane_height, self.near_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3f, b: Vector3f) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_view_plane_for_right_angle_fov() {
        let cam = PinholeCamera::new(&CameraState::new(Transform::default(), 90.0, 1.0, 1.0));
        let params = cam.view_params();
        assert!((params.x - 2.0).abs() < 1e-5);
        assert!((params.y - 2.0).abs() < 1e-5);
        assert_eq!(params.z, 1.0);

        let wide = PinholeCamera::new(&CameraState::new(Transform::default(), 90.0, 0.5, 2.0));
        assert!((wide.view_params().y - 1.0).abs() < 1e-5);
        assert!((wide.view_params().x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_corner_rays() {
        let cam = PinholeCamera::new(&CameraState::new(Transform::default(), 90.0, 1.0, 1.0));
        let k = 1.0 / (3.0 as Float).sqrt();
        let corners = [
            (Vector2f::new(0.0, 0.0), Vector3f::new(-k, -k, k)),
            (Vector2f::new(1.0, 0.0), Vector3f::new(k, -k, k)),
            (Vector2f::new(0.0, 1.0), Vector3f::new(-k, k, k)),
            (Vector2f::new(1.0, 1.0), Vector3f::new(k, k, k)),
        ];
        for (uv, expected) in corners.iter() {
            let ray = cam.sample_ray(uv);
            assert_eq!(ray.origin(), Vector3f::zeros());
            assert_close(ray.dir(), *expected);
        }
        assert_close(cam.sample_ray(&Vector2f::new(0.5, 0.5)).dir(), Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rays_follow_camera_transform() {
        let state = CameraState::look_at(Vector3f::new(5.0, 0.0, 0.0),
                                         Vector3f::zeros(),
                                         Vector3f::new(0.0, 1.0, 0.0),
                                         60.0, 0.3, 1.5);
        let cam = PinholeCamera::new(&state);
        let ray = cam.sample_ray(&Vector2f::new(0.5, 0.5));
        assert_close(ray.origin(), Vector3f::new(5.0, 0.0, 0.0));
        assert_close(ray.dir(), Vector3f::new(-1.0, 0.0, 0.0));
        // top of the film tilts upwards
        assert!(cam.sample_ray(&Vector2f::new(0.5, 1.0)).dir().y > 0.0);
    }
}
