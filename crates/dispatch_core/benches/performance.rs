//! Performance benchmarks for dispatch_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::dispatch::{rank_candidates, rank_candidates_pairwise};
use dispatch_core::graph::TravelGraph;
use dispatch_core::grid::Coordinate;
use dispatch_core::scenario::{CityConfig, SimulationParams};
use dispatch_core::simulate;
use dispatch_core::test_helpers::{saturated_city, scenario};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_simulation_days(c: &mut Criterion) {
    let cities = vec![("demo", CityConfig::default()), ("saturated", saturated_city())];

    let mut group = c.benchmark_group("simulation_days");
    group.sample_size(10);
    for (name, city) in cities {
        group.bench_with_input(BenchmarkId::from_parameter(name), &city, |b, city| {
            b.iter(|| {
                let params = SimulationParams::default().with_days(3).with_seed(42);
                black_box(simulate(city, params).expect("run"));
            });
        });
    }
    group.finish();
}

fn bench_candidate_ranking(c: &mut Criterion) {
    let built = scenario(&saturated_city(), SimulationParams::default());
    let target = Coordinate::new(1, 4);

    let mut group = c.benchmark_group("candidate_ranking");
    group.bench_function("single_source", |b| {
        b.iter(|| {
            // reweight clears the cache so every iteration searches
            let mut graph = built.graph.clone();
            graph.reweight(1.0, &mut StdRng::seed_from_u64(1)).expect("reweight");
            black_box(rank_candidates(&built.pool, &graph, target).expect("rank"))
        });
    });
    group.bench_function("pairwise", |b| {
        b.iter(|| {
            let mut graph = built.graph.clone();
            graph.reweight(1.0, &mut StdRng::seed_from_u64(1)).expect("reweight");
            black_box(rank_candidates_pairwise(&built.pool, &graph, target).expect("rank"))
        });
    });
    group.finish();
}

fn bench_reweight(c: &mut Criterion) {
    let sizes = vec![("2x1", 2, 1), ("4x4", 4, 4), ("8x8", 8, 8)];

    let mut group = c.benchmark_group("graph_reweight");
    for (name, width, height) in sizes {
        let populations = vec![2500u64; (width * height) as usize];
        let mut graph = TravelGraph::build(width, height, &populations).expect("graph");
        let mut rng = StdRng::seed_from_u64(7);
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| graph.reweight(black_box(2.0), &mut rng).expect("reweight"));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_simulation_days,
    bench_candidate_ranking,
    bench_reweight
);
criterion_main!(benches);
