// Copyright 2020 @TwoCookingMice

use super::constants::{ Matrix4f, Vector3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix }
    }

    /// Local-to-world matrix of a frame placed at `eye` whose local +z axis
    /// points at `target`. The local x axis is `up × forward`.
    pub fn look_at(eye: Vector3f, target: Vector3f, up: Vector3f) -> Self {
        let forward = (target - eye).normalize();
        let mut right = up.cross(&forward);
        if right.norm() <= 0.0 {
            // up is parallel to the view direction, pick any perpendicular axis
            let fallback = if forward.x.abs() < 0.9 {
                Vector3f::new(1.0, 0.0, 0.0)
            } else {
                Vector3f::new(0.0, 0.0, 1.0)
            };
            right = fallback.cross(&forward);
        }
        let right = right.normalize();
        let up = forward.cross(&right).normalize();

        #[rustfmt::skip]
        let matrix = Matrix4f::new(
            right.x, up.x, forward.x, eye.x,
            right.y, up.y, forward.y, eye.y,
            right.z, up.z, forward.z, eye.z,
            0.0,     0.0,  0.0,       1.0,
        );
        Self::new(matrix)
    }

    pub fn translation(&self) -> Vector3f {
        Vector3f::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        let x = v[0] * self.matrix[(0, 0)] + v[1] * self.matrix[(0, 1)] + v[2] * self.matrix[(0, 2)];
        let y = v[0] * self.matrix[(1, 0)] + v[1] * self.matrix[(1, 1)] + v[2] * self.matrix[(1, 2)];
        let z = v[0] * self.matrix[(2, 0)] + v[1] * self.matrix[(2, 1)] + v[2] * self.matrix[(2, 2)];

        Vector3f::new(x, y, z)
    }
}
