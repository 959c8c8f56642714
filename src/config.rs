use std::f32::consts::PI;

use glam::Vec3;

use crate::error::EngineError;

/// Simulation configuration. Immutable within a step; replaced atomically
/// between steps by [`Engine::set_config`](crate::engine::Engine::set_config).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    pub gravity: f32,
    pub smoothing_radius: f32,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    pub near_pressure_multiplier: f32,
    pub viscosity_strength: f32,
    pub collision_damping: f32,
    pub bounds: Vec3,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            gravity: -9.81,
            smoothing_radius: 0.2,
            target_density: 1000.0,
            pressure_multiplier: 30.0,
            near_pressure_multiplier: 25.0,
            viscosity_strength: 0.035,
            collision_damping: 0.85,
            bounds: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Configuration {
    /// Validate per §7: non-positive `smoothing_radius`, negative
    /// `collision_damping`, or non-positive `bounds` on any axis are
    /// configuration errors. Callers (`Engine::init`/`set_config`) must
    /// leave prior state untouched when this returns `Err`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.smoothing_radius <= 0.0 || !self.smoothing_radius.is_finite() {
            return Err(EngineError::InvalidSmoothingRadius(self.smoothing_radius));
        }
        if !(0.0..=1.0).contains(&self.collision_damping) {
            return Err(EngineError::InvalidCollisionDamping(self.collision_damping));
        }
        if self.bounds.x <= 0.0 || self.bounds.y <= 0.0 || self.bounds.z <= 0.0 {
            return Err(EngineError::InvalidBounds(self.bounds));
        }
        Ok(())
    }
}

/// Kernel coefficients derived from `smoothing_radius`, recomputed at `init`
/// and whenever the smoothing radius changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelCoefficients {
    pub h: f32,
    pub spiky2: f32,
    pub spiky3: f32,
    pub spiky2_grad: f32,
    pub spiky3_grad: f32,
    pub poly6: f32,
}

impl KernelCoefficients {
    pub fn new(h: f32) -> Self {
        KernelCoefficients {
            h,
            spiky2: 15.0 / (2.0 * PI * h.powi(5)),
            spiky3: 15.0 / (PI * h.powi(6)),
            spiky2_grad: 15.0 / (PI * h.powi(5)),
            spiky3_grad: 45.0 / (PI * h.powi(6)),
            poly6: 315.0 / (64.0 * PI * h.powi(9)),
        }
    }
}
