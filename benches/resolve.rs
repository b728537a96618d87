use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pathex::graph::{AssemblyGraph, DebruijnGraph, Edge};
use pathex::path::{CoverageMap, PathContainer};
use pathex::resolve::OverlapRemover;

/// Chain graph of `n` edges with varied lengths.
fn chain_graph(n: i64) -> DebruijnGraph {
    let mut b = DebruijnGraph::builder(31);
    for id in 1..=n {
        let len = 50 + (id as usize * 7) % 200;
        b.add_edge(id, id + 10_000, len, None);
        b.add_edge(id + 10_000, id, len, None);
    }
    for id in 1..n {
        b.add_link(id, id + 1);
    }
    b.build()
}

/// Overlap-heavy path set: sliding windows over the chain plus exact
/// duplicates of every fourth window.
fn windowed_paths(g: &DebruijnGraph, n: i64, window: usize) -> PathContainer {
    let edges: Vec<Edge> = {
        let mut all = g.edges();
        all.retain(|e| e.int_id() <= 10_000);
        all
    };
    let mut paths = PathContainer::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while start + window <= n as usize {
        let slice = &edges[start..start + window];
        let gaps = vec![0; slice.len()];
        paths.add_pair(slice, &gaps);
        if i % 4 == 0 {
            paths.add_pair(slice, &gaps);
        }
        start += window / 2;
        i += 1;
    }
    paths
}

fn bench_remove_similar(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_similar_paths");
    for &n in &[100i64, 400] {
        let g = chain_graph(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter_batched(
                || {
                    let paths = windowed_paths(&g, n, 8);
                    let coverage = CoverageMap::from_container(&paths);
                    (paths, coverage)
                },
                |(mut paths, mut coverage)| {
                    OverlapRemover::new(&g, &mut paths, &mut coverage, 8000)
                        .remove_similar_paths(10, false, true, true, true);
                    paths.size()
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_remove_overlaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_overlaps");
    for &n in &[100i64, 400] {
        let g = chain_graph(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter_batched(
                || {
                    let paths = windowed_paths(&g, n, 8);
                    let coverage = CoverageMap::from_container(&paths);
                    (paths, coverage)
                },
                |(mut paths, mut coverage)| {
                    OverlapRemover::new(&g, &mut paths, &mut coverage, 8000).remove_overlaps(10);
                    paths.size()
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_remove_similar, bench_remove_overlaps);
criterion_main!(benches);
