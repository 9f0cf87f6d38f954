//! Performance Benchmarks for the Validation Harness
//!
//! Run with: cargo bench
//!
//! Benchmarks cover:
//! - Histogram fills
//! - Conservation accounting of one outcome
//! - Toy generator sampling
//! - Full event loop, with and without checkpointing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hadronic_fs_validator::{
    checkpoint::MemoryCheckpointStore,
    config::{Configuration, PhysicsModel},
    engine::RandomEngine,
    event_loop::EventLoop,
    generator::{InteractionGenerator, InteractionRequest, ToyCascadeGenerator},
    histogram::Histogram,
    physics::{account, Material, Species},
};

fn config(events: u64, save_random: bool) -> Configuration {
    let mut config = Configuration::new(
        PhysicsModel::FtfpBert,
        Species::Proton,
        100.0,
        Material::from_name("G4_Fe").expect("known material"),
    );
    config.events = events;
    config.save_random = save_random;
    config
}

// ═══════════════════════════════════════════════════════════════════════════
// BOOKKEEPING BENCHMARKS
// ═══════════════════════════════════════════════════════════════════════════

fn bench_histogram_fill(c: &mut Criterion) {
    let mut hist = Histogram::new("Momentum_conservation", 2000, -0.02, 0.02).expect("valid binning");
    let mut engine = RandomEngine::new(1);

    c.bench_function("histogram_fill", |b| {
        b.iter(|| {
            let value = engine.uniform_range(-0.03, 0.03);
            hist.accumulate(black_box(value), 1.0);
        })
    });
}

fn bench_account(c: &mut Criterion) {
    let request = InteractionRequest::from_config(&config(1, false));
    let mut generator = ToyCascadeGenerator::new(PhysicsModel::FtfpBert);
    let mut engine = RandomEngine::new(2);
    let outcome = generator.generate(&request, &mut engine).expect("toy generator always yields");

    c.bench_function("conservation_account", |b| {
        b.iter(|| account(black_box(&request), black_box(&outcome)))
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// GENERATOR BENCHMARKS
// ═══════════════════════════════════════════════════════════════════════════

fn bench_toy_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("toy_generator");

    for energy in [1.0, 10.0, 100.0, 1000.0] {
        let request =
            InteractionRequest::along_z(Species::Proton, energy, Material::from_name("G4_Pb").expect("known material"));
        let mut generator = ToyCascadeGenerator::new(PhysicsModel::FtfpBert);
        let mut engine = RandomEngine::new(3);

        group.bench_with_input(BenchmarkId::new("energy_gev", energy), &request, |b, request| {
            b.iter(|| generator.generate(black_box(request), &mut engine))
        });
    }

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// EVENT LOOP BENCHMARKS
// ═══════════════════════════════════════════════════════════════════════════

fn bench_event_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_loop");
    let events = 1000;
    group.throughput(Throughput::Elements(events));

    for save_random in [false, true] {
        let label = if save_random { "checkpointed" } else { "plain" };
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut event_loop = EventLoop::new(
                    config(events, save_random),
                    ToyCascadeGenerator::new(PhysicsModel::FtfpBert),
                    MemoryCheckpointStore::new(),
                )
                .expect("valid configuration");
                event_loop.run().expect("toy run succeeds")
            })
        });
    }

    group.finish();
}

criterion_group!(bookkeeping_benches, bench_histogram_fill, bench_account);

criterion_group!(generator_benches, bench_toy_generator);

criterion_group!(event_loop_benches, bench_event_loop);

criterion_main!(bookkeeping_benches, generator_benches, event_loop_benches);
