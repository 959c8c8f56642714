use glam::Vec3;

/// A single point-mass particle owned exclusively by the [`Engine`](crate::engine::Engine)
/// after `init`. Fields are mutated only by the engine's physics passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub predicted: Vec3,
    pub velocity: Vec3,
    pub density: f32,
    pub near_density: f32,
}

impl Particle {
    /// A particle at rest at `position`. `predicted` starts out equal to
    /// `position`, per the invariant in the data model.
    pub fn at_rest(position: Vec3) -> Self {
        Particle {
            position,
            predicted: position,
            velocity: Vec3::ZERO,
            density: 0.0,
            near_density: 0.0,
        }
    }
}
