use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sph_core::{Configuration, Engine};

fn bench_step(c: &mut Criterion) {
    let config = Configuration::default();
    let mut rng = StdRng::seed_from_u64(0);
    let particles = sph_core::seed::uniform_box(&mut rng, 2000, config.bounds, 0.05, 0.1);
    let mut engine = Engine::init(config, particles).unwrap();

    c.bench_function("step_2000_particles", |b| {
        b.iter(|| {
            engine.step(black_box(1.0 / 60.0)).unwrap();
        })
    });
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
