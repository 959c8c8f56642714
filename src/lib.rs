//! A real-time 3D SPH fluid simulation core: spatial-hash neighbor search,
//! dual-pressure (density + near-density) force resolution, and scoped-thread
//! data parallelism across fixed physics passes.
//!
//! See `Engine` for the lifecycle entry point and `seed` for a reference
//! particle placement helper external collaborators can use to build an
//! initial `Vec<Particle>`.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod kernels;
pub mod particle;
pub mod passes;
pub mod seed;
pub mod spatial_hash;

pub use config::Configuration;
pub use engine::Engine;
pub use error::EngineError;
pub use particle::Particle;
