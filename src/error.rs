use glam::Vec3;
use thiserror::Error;

/// Errors the engine can report. The core is a pure in-memory numerical
/// engine and has no recoverable error kinds in steady state (see §7 of the
/// spec): configuration is validated up front, and the only runtime failure
/// mode is a poisoned worker pool, which is fatal for the lifetime of the
/// engine.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EngineError {
    #[error("smoothing_radius must be positive, got {0}")]
    InvalidSmoothingRadius(f32),
    #[error("collision_damping must be in [0, 1], got {0}")]
    InvalidCollisionDamping(f32),
    #[error("bounds must be positive on every axis, got {0}")]
    InvalidBounds(Vec3),
    #[error("a worker thread panicked during a previous step; engine must be re-initialized")]
    WorkersPoisoned,
}
