//! Simulation benchmarks for pitch_core.
//!
//! Run with: `cargo bench -p pitch_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pitch_core::data::MatchSetup;
use pitch_core::simulation::MatchSimulation;

/// Benchmarks single periods and a full ten-minute match.
pub fn simulation_benchmark(c: &mut Criterion) {
    let setup = MatchSetup::new("Home", "Away", 42).with_minutes(10);

    c.bench_function("tick_100_periods", |b| {
        b.iter_batched(
            || MatchSimulation::new(&setup).expect("valid setup"),
            |mut sim| {
                for _ in 0..100 {
                    black_box(sim.tick());
                }
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("ten_minute_match", |b| {
        b.iter(|| {
            let mut sim = MatchSimulation::new(&setup).expect("valid setup");
            black_box(sim.run().final_score())
        });
    });

    c.bench_function("state_hash", |b| {
        let mut sim = MatchSimulation::new(&setup).expect("valid setup");
        for _ in 0..50 {
            sim.tick();
        }
        b.iter(|| black_box(sim.state_hash()));
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
