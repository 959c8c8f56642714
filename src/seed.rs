//! Reference seeder (§6, §15): uniform random placement inside a box, with a
//! margin inset and a floor derived from `min_height_ratio`. Not part of
//! `Engine`; callers build a `Vec<Particle>` with this and hand it to
//! `Engine::init`, the same way an application would.
//!
//! Grounded in the teacher's `sim_impl.rs::place_particles`, generalized
//! from a 2D rectangle to a 3D box.

use glam::Vec3;
use rand::Rng;

use crate::particle::Particle;

/// Seed `count` particles uniformly inside a box of size `bounds` centered
/// on the origin, inset by `margin` on every axis, with the minimum y
/// coordinate raised to `max(-bounds.y / 2 + margin, min_height_ratio *
/// bounds.y / 2)` (§6). All particles start at rest.
pub fn uniform_box(
    rng: &mut impl Rng,
    count: usize,
    bounds: Vec3,
    margin: f32,
    min_height_ratio: f32,
) -> Vec<Particle> {
    let half = bounds / 2.0;
    let min_y = (-half.y + margin).max(min_height_ratio * half.y);

    (0..count)
        .map(|_| {
            let x = rng.gen_range((-half.x + margin)..=(half.x - margin));
            let y = rng.gen_range(min_y..=(half.y - margin));
            let z = rng.gen_range((-half.z + margin)..=(half.z - margin));
            Particle::at_rest(Vec3::new(x, y, z))
        })
        .collect()
}
