//! Benchmark: save and load of generated games
//!
//! Generates games of increasing population on a 64x64 map and measures
//! encoding, decoding and hashing separately. Throughput "elements" are the
//! live objects in the game.
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use lockstep_sim::prelude::*;

const SEED: u64 = 0x5EED;

fn settings() -> GameSettings {
    GameSettings {
        players: 4,
        map_width: 64,
        map_height: 64,
        ..GameSettings::default()
    }
}

fn population(scale: usize) -> Population {
    Population {
        flags_per_player: 4 * scale,
        decorations: 40 * scale,
        ships_per_player: scale,
    }
}

fn build_game(scale: usize) -> Game {
    generate_with(settings(), &population(scale), SEED).expect("generate")
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_save");
    group
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(6));
    for &scale in &[1usize, 4, 12] {
        let game = build_game(scale);
        group.throughput(Throughput::Elements(game.pool().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(scale), &game, |b, game| {
            b.iter(|| {
                let snapshot = game.save(&SnapshotConfig::default()).expect("save");
                criterion::black_box(snapshot.len());
            });
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_load");
    group
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(6));
    for &scale in &[1usize, 4, 12] {
        let game = build_game(scale);
        let bytes = game
            .save(&SnapshotConfig::default())
            .expect("save")
            .into_bytes();
        group.throughput(Throughput::Elements(game.pool().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(scale), &bytes, |b, bytes| {
            b.iter_batched(
                settings,
                |settings| {
                    let loaded =
                        Game::load(settings, bytes, &SnapshotConfig::default()).expect("load");
                    criterion::black_box(loaded.pool().len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_state_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_hash");
    for &scale in &[1usize, 12] {
        let game = build_game(scale);
        group.throughput(Throughput::Elements(game.pool().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(scale), &game, |b, game| {
            b.iter(|| criterion::black_box(game.state_hash().expect("hash")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_save, bench_load, bench_state_hash);
criterion_main!(benches);
