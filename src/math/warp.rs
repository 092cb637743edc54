// Copyright @yucwang 2023

use super::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::core::rng::LcgRng;

/// Uniform offset inside a pixel footprint.
pub fn sample_pixel_jitter(rng: &mut LcgRng) -> Vector2f {
    let jx = rng.next_f32();
    let jy = rng.next_f32();
    Vector2f::new(jx, jy)
}

/// Cosine-weighted direction around `n`: the normal plus a unit vector drawn
/// by rejection from the enclosing cube. A candidate that cancels the normal
/// is rejected like any other, so the whole draw is bounded by `max_tries`.
pub fn sample_cosine_direction(n: &Vector3f, rng: &mut LcgRng, max_tries: u32) -> Option<Vector3f> {
    (0..max_tries).find_map(|_| {
        let d = n + unit_vector_candidate(rng)?;
        let len = d.norm();
        if len > EPSILON {
            Some(d / len)
        } else {
            None
        }
    })
}

fn unit_vector_candidate(rng: &mut LcgRng) -> Option<Vector3f> {
    let p = Vector3f::new(rng.next_signed_f32(), rng.next_signed_f32(), rng.next_signed_f32());
    let len_sq = p.norm_squared();
    if len_sq <= 1.0 && len_sq > EPSILON * EPSILON {
        Some(p / len_sq.sqrt())
    } else {
        None
    }
}

pub fn reflect(d: &Vector3f, n: &Vector3f) -> Vector3f {
    d - n * (2.0 * d.dot(n))
}

pub fn lerp3(a: &Vector3f, b: &Vector3f, t: Float) -> Vector3f {
    a + (b - a) * t
}

pub fn smoothstep(edge0: Float, edge1: Float, x: Float) -> Float {
    let t = ((x - edge0) / (edge1 - edge0)).max(0.0).min(1.0);
    t * t * (3.0 - 2.0 * t)
}
