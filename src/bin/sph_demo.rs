//! Headless demo binary (§10): seeds a box of particles, steps the engine
//! for a fixed number of frames, and prints summary statistics. Stands in
//! for the rendering/ECS collaborator the core never depends on, the way
//! the teacher's own `main.rs` wired `Simulation` up to Bevy.

use clap::Parser;
use glam::Vec3;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use sph_core::{Configuration, Engine};

/// Run a headless SPH simulation and print per-frame density summaries.
#[derive(Parser, Debug)]
struct Args {
    /// Number of particles to seed.
    #[arg(long, default_value_t = 1000)]
    particles: usize,

    /// Number of simulation steps to run.
    #[arg(long, default_value_t = 300)]
    steps: usize,

    /// Fixed timestep in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// RNG seed for particle placement.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = Configuration::default();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let particles = sph_core::seed::uniform_box(&mut rng, args.particles, config.bounds, 0.05, 0.1);

    let mut engine = Engine::init(config, particles).expect("default configuration is valid");
    info!("seeded {} particles, running {} steps", args.particles, args.steps);

    for frame in 0..args.steps {
        if let Err(err) = engine.step(args.dt) {
            eprintln!("step {frame} failed: {err}");
            std::process::exit(1);
        }
        if frame % 50 == 0 || frame == args.steps - 1 {
            print_summary(frame, engine.particles());
        }
    }

    engine.destroy();
}

fn print_summary(frame: usize, particles: &[sph_core::Particle]) {
    let n = particles.len() as f32;
    let (mut min, mut max, mut sum) = (f32::MAX, f32::MIN, 0.0);
    let mut centroid = Vec3::ZERO;
    for p in particles {
        min = min.min(p.density);
        max = max.max(p.density);
        sum += p.density;
        centroid += p.position;
    }
    centroid /= n.max(1.0);
    println!(
        "frame {frame:4}: density min={min:.2} max={max:.2} mean={:.2} centroid={centroid:.3}",
        sum / n.max(1.0)
    );
}
