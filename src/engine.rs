//! The `Engine` lifecycle (§4.4–4.5, §6): owns the particle array and every
//! scratch buffer, and drives one `step` through the passes of `passes.rs`
//! on a fixed-size, persistent `rayon` thread pool (§11 of `SPEC_FULL.md`).
//!
//! Grounded in the teacher's `Simulation` (`sim_struct.rs`) as the
//! owning-struct shape, in `sim_impl.rs::update_particles`'s pass ordering,
//! and in `calculate_densities`/`calculate_pressures`'
//! `(0..n).into_par_iter().map(...).collect()` idiom, which this engine
//! reuses verbatim on top of a pool sized to the spec's fixed `T` instead of
//! `rayon`'s default global pool.

use glam::Vec3;
use log::{debug, info, trace};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::{Configuration, KernelCoefficients};
use crate::error::EngineError;
use crate::index;
use crate::particle::Particle;
use crate::passes;

/// Owns the particle array, every buffer the physics passes need, and the
/// persistent worker pool they run on. `step` is the only method that
/// mutates particle state; it is atomic with respect to errors (§7: a
/// rejected `step` leaves prior state untouched, and a `WorkersPoisoned`
/// engine accepts no further steps).
pub struct Engine {
    particles: Vec<Particle>,
    config: Configuration,
    coeffs: KernelCoefficients,
    pool: ThreadPool,
    poisoned: bool,

    keys: Vec<u32>,
    sorted_indices: Vec<u32>,
    offsets: Vec<u32>,
    scratch_particles: Vec<Particle>,
    scratch_keys: Vec<u32>,
    density_scratch: Vec<(f32, f32)>,
    velocity_scratch: Vec<Vec3>,
    velocity_snapshot: Vec<Vec3>,
}

impl Engine {
    /// Validate `config`, then take ownership of `particles`, size every
    /// scratch buffer to `particles.len()`, and build the fixed-arity
    /// worker pool (`T = clamp(available_parallelism, 1, N)`, §5) that every
    /// subsequent `step` dispatches passes on. On a validation error, no
    /// field is touched (the engine is constructed only on success).
    pub fn init(config: Configuration, particles: Vec<Particle>) -> Result<Self, EngineError> {
        config.validate()?;
        let n = particles.len();
        let thread_count = build_thread_count(n);
        let pool = build_pool(thread_count);
        info!("engine initialized with {n} particles on {thread_count} threads");
        Ok(Engine {
            particles,
            coeffs: KernelCoefficients::new(config.smoothing_radius),
            config,
            pool,
            poisoned: false,
            keys: vec![0; n],
            sorted_indices: vec![0; n],
            offsets: vec![0; n],
            scratch_particles: Vec::with_capacity(n),
            scratch_keys: Vec::with_capacity(n),
            density_scratch: vec![(0.0, 0.0); n],
            velocity_scratch: vec![Vec3::ZERO; n],
            velocity_snapshot: vec![Vec3::ZERO; n],
        })
    }

    /// Replace the configuration, revalidating and recomputing derived
    /// kernel coefficients and, if the particle count implies a different
    /// `T`, rebuilding the worker pool. Leaves `particles` untouched.
    /// Rejected on the same terms as `init`; the prior configuration stays
    /// in effect on `Err`.
    pub fn set_config(&mut self, config: Configuration) -> Result<(), EngineError> {
        config.validate()?;
        debug!("configuration updated: {config:?}");
        self.coeffs = KernelCoefficients::new(config.smoothing_radius);
        let thread_count = build_thread_count(self.particles.len());
        if thread_count != self.pool.current_num_threads() {
            self.pool = build_pool(thread_count);
        }
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> Configuration {
        self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance the simulation by `dt` seconds. A no-op `Ok(())` if there are
    /// no particles (§7). Returns `Err(EngineError::WorkersPoisoned)` without
    /// mutating state if a prior step's worker thread panicked.
    pub fn step(&mut self, dt: f32) -> Result<(), EngineError> {
        if self.poisoned {
            return Err(EngineError::WorkersPoisoned);
        }
        if self.particles.is_empty() {
            return Ok(());
        }

        // A panic inside pool-dispatched work surfaces here as a normal
        // `Err` from `rayon`'s `catch_unwind`-wrapped job execution; treat
        // any such panic as poisoning the engine, per §7.
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.step_inner(dt)));
        match outcome {
            Ok(()) => Ok(()),
            Err(payload) => {
                self.poisoned = true;
                std::panic::resume_unwind(payload);
            }
        }
    }

    /// Release the particle array and every scratch buffer, and drop the
    /// worker pool. Dropping `rayon::ThreadPool` signals its persistent
    /// workers to exit and joins them, realizing §4.5's "signal workers to
    /// exit, join them" half of the `destroy` contract.
    pub fn destroy(mut self) {
        self.particles.clear();
        self.particles.shrink_to_fit();
        self.keys.clear();
        self.sorted_indices.clear();
        self.offsets.clear();
        self.scratch_particles.clear();
        self.scratch_keys.clear();
        self.density_scratch.clear();
        self.velocity_scratch.clear();
        self.velocity_snapshot.clear();
        // `self.pool` is dropped here, joining its threads.
    }

    fn step_inner(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let bounds = self.config.bounds;
        let collision_damping = self.config.collision_damping;

        // Pass 1: external forces + prediction. Local per particle.
        self.pool.install(|| {
            self.particles.par_iter_mut().for_each(|p| passes::external_forces(p, gravity, dt));
        });

        // Pass 2: rebuild the spatial index. Serial (§4.4 step 3).
        index::compute_keys(&self.particles, self.coeffs.h, &mut self.keys);
        index::sort_indices(&self.keys, &mut self.sorted_indices);
        index::reorder(
            &mut self.particles,
            &mut self.keys,
            &self.sorted_indices,
            &mut self.scratch_particles,
            &mut self.scratch_keys,
        );
        index::compute_offsets(&self.keys, &mut self.offsets);

        // Pass 3: densities, the same `(0..n).into_par_iter().map(...).collect()`
        // shape as the teacher's `calculate_densities`.
        let particles = &self.particles;
        let keys = &self.keys;
        let offsets = &self.offsets;
        let coeffs = &self.coeffs;
        self.density_scratch = self.pool.install(|| {
            (0..particles.len())
                .into_par_iter()
                .map(|i| passes::calculate_density(i, particles, keys, offsets, coeffs))
                .collect()
        });
        for (p, &(density, near_density)) in self.particles.iter_mut().zip(&self.density_scratch) {
            p.density = density;
            p.near_density = near_density;
        }
        trace!(
            "density summary: min={:.3} max={:.3}",
            self.particles.iter().map(|p| p.density).fold(f32::MAX, f32::min),
            self.particles.iter().map(|p| p.density).fold(f32::MIN, f32::max),
        );

        // Pass 4: pressure force, same idiom as `calculate_pressures`.
        let particles = &self.particles;
        let keys = &self.keys;
        let offsets = &self.offsets;
        let coeffs = &self.coeffs;
        let target_density = self.config.target_density;
        let pressure_multiplier = self.config.pressure_multiplier;
        let near_pressure_multiplier = self.config.near_pressure_multiplier;
        self.velocity_scratch = self.pool.install(|| {
            (0..particles.len())
                .into_par_iter()
                .map(|i| {
                    passes::calculate_pressure(
                        i,
                        particles,
                        keys,
                        offsets,
                        coeffs,
                        target_density,
                        pressure_multiplier,
                        near_pressure_multiplier,
                        dt,
                    )
                })
                .collect()
        });
        for (p, &v) in self.particles.iter_mut().zip(&self.velocity_scratch) {
            p.velocity = v;
        }

        // Passes 5-6: viscosity snapshot + viscosity. §4.4 step 4: skipped
        // entirely when `viscosity_strength == 0` (§4.3).
        if self.config.viscosity_strength != 0.0 {
            self.velocity_snapshot.clear();
            self.velocity_snapshot.extend(self.particles.iter().map(|p| p.velocity));

            let particles = &self.particles;
            let keys = &self.keys;
            let offsets = &self.offsets;
            let coeffs = &self.coeffs;
            let snapshot = &self.velocity_snapshot;
            let viscosity_strength = self.config.viscosity_strength;
            self.velocity_scratch = self.pool.install(|| {
                (0..particles.len())
                    .into_par_iter()
                    .map(|i| passes::calculate_viscosity(i, particles, keys, offsets, coeffs, snapshot, viscosity_strength, dt))
                    .collect()
            });
            for (p, &v) in self.particles.iter_mut().zip(&self.velocity_scratch) {
                p.velocity = v;
            }
        }

        // Pass 7: position update + collision resolution. Local per particle.
        self.pool.install(|| {
            self.particles
                .par_iter_mut()
                .for_each(|p| passes::position_update(p, dt, bounds, collision_damping));
        });
    }
}

fn build_thread_count(n: usize) -> usize {
    std::thread::available_parallelism().map(|p| p.get()).unwrap_or(1).clamp(1, n.max(1))
}

fn build_pool(thread_count: usize) -> ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .expect("building a fixed-size rayon pool should never fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use glam::Vec3;

    #[test]
    fn init_rejects_invalid_config_without_constructing() {
        let mut config = Configuration::default();
        config.smoothing_radius = -1.0;
        let err = Engine::init(config, vec![Particle::at_rest(Vec3::ZERO)]).unwrap_err();
        assert_eq!(err, EngineError::InvalidSmoothingRadius(-1.0));
    }

    #[test]
    fn step_on_empty_engine_is_a_noop() {
        let config = Configuration::default();
        let mut engine = Engine::init(config, Vec::new()).unwrap();
        assert!(engine.step(1.0 / 60.0).is_ok());
        assert!(engine.particles().is_empty());
    }

    #[test]
    fn single_particle_falls_under_gravity() {
        let config = Configuration::default();
        let particles = vec![Particle::at_rest(Vec3::new(0.0, 0.5, 0.0))];
        let mut engine = Engine::init(config, particles).unwrap();
        let before = engine.particles()[0].position.y;
        for _ in 0..10 {
            engine.step(1.0 / 60.0).unwrap();
        }
        let after = engine.particles()[0].position.y;
        assert!(after < before, "particle should have fallen: {before} -> {after}");
    }

    #[test]
    fn set_config_rejects_bad_damping_and_keeps_prior() {
        let config = Configuration::default();
        let mut engine = Engine::init(config, vec![Particle::at_rest(Vec3::ZERO)]).unwrap();
        let mut bad = config;
        bad.collision_damping = -1.0;
        assert!(engine.set_config(bad).is_err());
        assert_eq!(engine.config(), config);
    }

    #[test]
    fn zero_viscosity_strength_skips_the_viscosity_pass() {
        let mut config = Configuration::default();
        config.viscosity_strength = 0.0;
        let particles = vec![
            Particle::at_rest(Vec3::new(0.0, 0.0, 0.0)),
            Particle::at_rest(Vec3::new(0.01, 0.0, 0.0)),
        ];
        let mut engine = Engine::init(config, particles).unwrap();
        // Should not panic or index out of bounds with an empty snapshot
        // buffer; the pass is simply never dispatched.
        assert!(engine.step(1.0 / 60.0).is_ok());
    }
}
