// src/resolve/resolver.rs
use std::io;
use std::path::Path;

use ahash::AHashSet;
use tracing::{debug, info};

use crate::graph::AssemblyGraph;
use crate::io::ContigWriter;
use crate::path::{CoverageMap, PathContainer, PathId};
use crate::resolve::remover::OverlapRemover;

/// External path extender: grows seed paths into candidate contig paths.
/// Grown paths must be added through the container API so that coverage
/// events fire for them.
pub trait PathExtender {
    fn grow_all(&mut self, seeds: &PathContainer, paths: &mut PathContainer);
}

/// Orchestrates the resolution stage: seed construction, extender handoff,
/// the four-pass overlap removal pipeline, and final backfill/trimming.
pub struct PathExtendResolver<'g, G: AssemblyGraph> {
    graph: &'g G,
}

impl<'g, G: AssemblyGraph> PathExtendResolver<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        PathExtendResolver { graph }
    }

    /// One singleton (path, conjugate) pair per acyclic edge with a
    /// positive id, skipping edges already seeded via their conjugate.
    pub fn make_simple_seeds(&self) -> PathContainer {
        let mut included: AHashSet<i64> = AHashSet::new();
        let mut seeds = PathContainer::new();
        for e in self.graph.edges() {
            if e.int_id() <= 0 || self.graph.in_cycle(e) {
                continue;
            }
            if !included.contains(&e.int_id()) {
                seeds.add_pair(&[e], &[0]);
                included.insert(e.int_id());
                included.insert(e.conjugate().int_id());
            }
        }
        info!("created {} seed pairs", seeds.size());
        seeds
    }

    pub fn extend_seeds(
        &self,
        seeds: &PathContainer,
        extender: &mut dyn PathExtender,
    ) -> PathContainer {
        let mut paths = PathContainer::new();
        extender.grow_all(seeds, &mut paths);
        paths
    }

    /// The canonical four-pass pipeline, with a FASTA snapshot before the
    /// first pass and after each subsequent one.
    pub fn remove_overlaps(
        &self,
        paths: &mut PathContainer,
        coverage: &mut CoverageMap,
        max_overlap: usize,
        max_repeat_length: usize,
        writer: &ContigWriter<'_, G>,
        output_dir: &Path,
    ) -> io::Result<()> {
        writer.write_paths(paths, &output_dir.join("before.fasta"))?;

        debug!("removing subpaths and shared ends");
        OverlapRemover::new(self.graph, paths, coverage, max_repeat_length)
            .remove_similar_paths(max_overlap, false, true, true, false);
        writer.write_paths(paths, &output_dir.join("remove_similar.fasta"))?;

        debug!("extracting shared terminal overlaps");
        OverlapRemover::new(self.graph, paths, coverage, max_repeat_length)
            .remove_overlaps(max_overlap);
        writer.write_paths(paths, &output_dir.join("after_remove_overlaps.fasta"))?;

        debug!("collapsing exact duplicates");
        OverlapRemover::new(self.graph, paths, coverage, max_repeat_length)
            .remove_similar_paths(max_overlap, true, false, false, false);
        writer.write_paths(paths, &output_dir.join("remove_equal.fasta"))?;

        debug!("final cleanup pass, max difference {}", max_overlap);
        OverlapRemover::new(self.graph, paths, coverage, max_repeat_length)
            .remove_similar_paths(max_overlap, false, true, true, true);
        writer.write_paths(paths, &output_dir.join("remove_all.fasta"))?;
        Ok(())
    }

    /// Add a singleton seed pair for every eligible edge the coverage map
    /// does not know about, so no edge is lost from the final contig set.
    pub fn add_uncovered_edges(&self, paths: &mut PathContainer, coverage: &mut CoverageMap) {
        let mut included: AHashSet<i64> = AHashSet::new();
        let mut added = 0usize;
        for e in self.graph.edges() {
            if e.int_id() <= 0 || self.graph.in_cycle(e) {
                continue;
            }
            if !included.contains(&e.int_id()) && !coverage.is_covered(e) {
                let (pid, cid) = paths.add_pair(&[e], &[0]);
                coverage.subscribe(paths.path(pid));
                coverage.subscribe(paths.path(cid));
                included.insert(e.int_id());
                included.insert(e.conjugate().int_id());
                added += 1;
            }
        }
        info!("added {} uncovered edge pairs", added);
    }

    /// Pop trailing edges shorter than `min_edge_len` from every path and
    /// its twin (mate-pair extensions end in short, unreliable edges).
    pub fn remove_mate_pair_ends(
        &self,
        paths: &mut PathContainer,
        coverage: &mut CoverageMap,
        min_edge_len: usize,
    ) {
        debug!("removing mate-pair ends shorter than {}", min_edge_len);
        for i in 0..paths.size() {
            let (pid, cid) = paths.pair_ids(i);
            remove_mate_pair_end(paths, coverage, pid, min_edge_len);
            remove_mate_pair_end(paths, coverage, cid, min_edge_len);
        }
    }
}

fn remove_mate_pair_end(
    paths: &mut PathContainer,
    coverage: &mut CoverageMap,
    pid: PathId,
    min_edge_len: usize,
) {
    loop {
        let p = paths.path(pid);
        if p.size() <= 1 || p.head().length() >= min_edge_len {
            break;
        }
        paths.pop_back(pid, 1, coverage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DebruijnGraph;

    fn toy_graph() -> DebruijnGraph {
        // Edges 1..=3 forward with conjugates 11..=13; edge 3 on a
        // self-loop.
        let mut b = DebruijnGraph::builder(3);
        b.add_edge(1, 11, 10, None)
            .add_edge(11, 1, 10, None)
            .add_edge(2, 12, 20, None)
            .add_edge(12, 2, 20, None)
            .add_edge(3, 13, 30, None)
            .add_edge(13, 3, 30, None)
            .add_link(1, 2)
            .add_link(3, 3);
        b.build()
    }

    #[test]
    fn seeds_skip_cycles_and_conjugate_duplicates() {
        let g = toy_graph();
        let resolver = PathExtendResolver::new(&g);
        let seeds = resolver.make_simple_seeds();
        // Edge 3 is cyclic; 1 and 2 each produce one pair (11, 12 are
        // their conjugates and get skipped).
        assert_eq!(seeds.size(), 2);
        let ids: Vec<i64> = (0..seeds.size()).map(|i| seeds.get(i).at(0).int_id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(seeds.get_conjugate(0).at(0).int_id(), 11);
    }

    #[test]
    fn uncovered_backfill_counts_eligible_edges_once() {
        let g = toy_graph();
        let resolver = PathExtendResolver::new(&g);
        let mut paths = PathContainer::new();
        let mut coverage = CoverageMap::from_container(&paths);
        resolver.add_uncovered_edges(&mut paths, &mut coverage);
        // One pair per eligible (positive-id, acyclic) edge modulo
        // conjugates: edges 1 and 2.
        assert_eq!(paths.size(), 2);
        for i in 0..paths.size() {
            let e = paths.get(i).at(0);
            assert!(coverage.is_covered(e));
            assert!(coverage.is_covered(e.conjugate()));
        }
        // Idempotent: nothing is uncovered any more.
        resolver.add_uncovered_edges(&mut paths, &mut coverage);
        assert_eq!(paths.size(), 2);
    }

    #[test]
    fn mate_pair_end_trimming_stops_at_long_edges() {
        let g = toy_graph();
        let resolver = PathExtendResolver::new(&g);
        let edges = g.edges();
        let by_id = |id: i64| edges.iter().copied().find(|e| e.int_id() == id).unwrap();
        let mut paths = PathContainer::new();
        // (2, 1): trailing edge 1 has length 10 < 15.
        paths.add_pair(&[by_id(2), by_id(1)], &[0, 0]);
        let mut coverage = CoverageMap::from_container(&paths);
        resolver.remove_mate_pair_ends(&mut paths, &mut coverage, 15);
        // Canonical path drops edge 1; the conjugate pass then sees
        // (12) only, which is kept as the last remaining edge.
        assert_eq!(paths.get(0).size(), 1);
        assert_eq!(paths.get(0).at(0).int_id(), 2);
    }
}
