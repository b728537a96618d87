// src/weight/paired_lib.rs
use ahash::AHashMap;

use crate::graph::{AssemblyGraph, Edge};
use crate::path::BidirectionalPath;

/// Paired-read evidence for one library.
pub trait PairedInfoLibrary {
    /// Observed paired-read weight connecting `e1` to `e2` at the given
    /// start-to-start distance.
    fn count_paired_info(&self, e1: Edge, e2: Edge, distance: i64) -> f64;

    /// Expected weight at that distance given the insert-size
    /// distribution.
    fn ideal_paired_info(&self, e1: Edge, e2: Edge, distance: i64) -> f64;

    /// Upper bound of the insert-size distribution; candidates farther
    /// than this cannot be supported.
    fn is_max(&self) -> usize;

    /// Per-library support threshold override, if configured.
    fn single_threshold(&self) -> Option<f64>;

    /// Library coverage coefficient (expected fragments per position).
    fn coverage_coeff(&self) -> f64;
}

/// Concrete library backed by a point index of observed pair info and a
/// triangular insert-size window for the ideal estimate.
pub struct InsertSizeLibrary {
    insert_size_mean: usize,
    insert_size_dev: usize,
    coverage_coeff: f64,
    single_threshold: Option<f64>,
    pair_info: AHashMap<(i64, i64), Vec<(i64, f64)>>,
}

impl InsertSizeLibrary {
    pub fn new(insert_size_mean: usize, insert_size_dev: usize) -> Self {
        InsertSizeLibrary {
            insert_size_mean,
            insert_size_dev,
            coverage_coeff: 1.0,
            single_threshold: None,
            pair_info: AHashMap::new(),
        }
    }

    pub fn with_coverage_coeff(mut self, coeff: f64) -> Self {
        self.coverage_coeff = coeff;
        self
    }

    pub fn with_single_threshold(mut self, threshold: f64) -> Self {
        self.single_threshold = Some(threshold);
        self
    }

    /// Record an observed pair-info point between `e1` and `e2`.
    pub fn add_pair_info(&mut self, e1: Edge, e2: Edge, distance: i64, weight: f64) {
        self.pair_info
            .entry((e1.int_id(), e2.int_id()))
            .or_default()
            .push((distance, weight));
    }
}

impl PairedInfoLibrary for InsertSizeLibrary {
    fn count_paired_info(&self, e1: Edge, e2: Edge, distance: i64) -> f64 {
        let tolerance = self.insert_size_dev.max(1) as i64;
        match self.pair_info.get(&(e1.int_id(), e2.int_id())) {
            Some(points) => points
                .iter()
                .filter(|(d, _)| (d - distance).abs() <= tolerance)
                .map(|(_, w)| w)
                .sum(),
            None => 0.0,
        }
    }

    /// Expected spanning-fragment count: for every admissible insert size,
    /// count left-end placements in `e1` whose right end lands in `e2`,
    /// weighted by a triangular kernel centered on the mean.
    fn ideal_paired_info(&self, e1: Edge, e2: Edge, distance: i64) -> f64 {
        if distance < 0 || distance > self.is_max() as i64 + e2.length() as i64 {
            return 0.0;
        }
        let mean = self.insert_size_mean as i64;
        let dev = self.insert_size_dev as i64;
        let half_window = 2 * dev;
        let len1 = e1.length() as i64;
        let len2 = e2.length() as i64;
        let mut total = 0.0;
        for insert in (mean - half_window)..=(mean + half_window) {
            if insert <= 0 {
                continue;
            }
            // Left end at x in [0, len1); right end x + insert must fall
            // in [distance, distance + len2).
            let lo = (distance - insert).max(0);
            let hi = (distance + len2 - insert).min(len1);
            if hi <= lo {
                continue;
            }
            let kernel = 1.0 - (insert - mean).abs() as f64 / (half_window + 1) as f64;
            total += kernel * (hi - lo) as f64;
        }
        total * self.coverage_coeff
    }

    fn is_max(&self) -> usize {
        self.insert_size_mean + 2 * self.insert_size_dev
    }

    fn single_threshold(&self) -> Option<f64> {
        self.single_threshold
    }

    fn coverage_coeff(&self) -> f64 {
        self.coverage_coeff
    }
}

/// A path position with positive expected paired info to a candidate.
#[derive(Debug, Clone, Copy)]
pub struct EdgeWithPairedInfo {
    pub path_pos: usize,
    pub ideal: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeWithDistance {
    pub edge: Edge,
    pub distance: i64,
}

/// Path positions whose edges are expected to link to `candidate`,
/// scanned back-to-front (nearest first).
pub fn find_covered_edges<L: PairedInfoLibrary>(
    lib: &L,
    path: &BidirectionalPath,
    candidate: Edge,
) -> Vec<EdgeWithPairedInfo> {
    let mut covered = Vec::new();
    for i in (0..path.size()).rev() {
        let ideal = lib.ideal_paired_info(path.at(i), candidate, path.length_at(i) as i64);
        if ideal > 0.0 {
            covered.push(EdgeWithPairedInfo { path_pos: i, ideal });
        }
    }
    covered
}

/// Pairs a library with the graph for candidate enumeration.
pub struct ExtensionAnalyzer<'a, G: AssemblyGraph, L: PairedInfoLibrary> {
    graph: &'a G,
    lib: &'a L,
}

impl<'a, G: AssemblyGraph, L: PairedInfoLibrary> ExtensionAnalyzer<'a, G, L> {
    pub fn new(graph: &'a G, lib: &'a L) -> Self {
        ExtensionAnalyzer { graph, lib }
    }

    pub fn lib(&self) -> &L {
        self.lib
    }

    pub fn find_covered_edges(
        &self,
        path: &BidirectionalPath,
        candidate: Edge,
    ) -> Vec<EdgeWithPairedInfo> {
        find_covered_edges(self.lib, path, candidate)
    }

    /// Breadth-first sweep of edges reachable from `start`'s end while the
    /// accumulated distance stays below the insert-size bound.
    pub fn find_forward_edges(&self, start: Edge) -> Vec<EdgeWithDistance> {
        let mut edges = vec![EdgeWithDistance {
            edge: start,
            distance: 0,
        }];
        let mut i = 0;
        while i < edges.len() {
            let current = edges[i];
            let next_distance = current.distance + current.edge.length() as i64;
            if current.distance < self.lib.is_max() as i64 {
                for next in self.graph.outgoing_edges_from_end(current.edge) {
                    edges.push(EdgeWithDistance {
                        edge: next,
                        distance: next_distance,
                    });
                }
            }
            i += 1;
        }
        edges
    }
}
