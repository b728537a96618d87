// src/resolve/remover.rs
use std::collections::BTreeMap;

use tracing::debug;

use crate::graph::{AssemblyGraph, Edge};
use crate::path::{CoverageMap, PathContainer, PathId};
use crate::resolve::compare::compare_paths;

/// Multi-pass remover of redundant path overlaps.
///
/// Operates over a container and its live coverage map. Each pass visits
/// edges in (length asc, id asc) order and, per edge, covering paths in
/// path-id ascending order; together with the live-set refetch after every
/// mutation this makes the outcome deterministic for identical inputs.
pub struct OverlapRemover<'a, G: AssemblyGraph> {
    graph: &'a G,
    paths: &'a mut PathContainer,
    coverage: &'a mut CoverageMap,
    max_repeat_length: usize,
}

impl<'a, G: AssemblyGraph> OverlapRemover<'a, G> {
    pub fn new(
        graph: &'a G,
        paths: &'a mut PathContainer,
        coverage: &'a mut CoverageMap,
        max_repeat_length: usize,
    ) -> Self {
        OverlapRemover {
            graph,
            paths,
            coverage,
            max_repeat_length,
        }
    }

    /// Detect and resolve equality, containment and shared-end
    /// relationships between covering paths of every edge.
    ///
    /// `del_only_equal` restricts the pass to exact-duplicate collapse;
    /// `del_subpaths` deletes wholly-contained paths; `del_begins` trims a
    /// shared prefix/suffix off the shorter path; `del_all` trims any
    /// shared terminal segment off one side.
    pub fn remove_similar_paths(
        &mut self,
        max_overlap: usize,
        del_only_equal: bool,
        del_subpaths: bool,
        del_begins: bool,
        del_all: bool,
    ) {
        for edge in self.sorted_edges() {
            let snapshot = self.coverage.covering_paths(edge);
            debug!(
                "analyzing edge {} covered by {} paths",
                edge.int_id(),
                snapshot.len()
            );
            for (i, &pid1) in snapshot.iter().enumerate() {
                if !self.coverage.covers(edge, pid1) {
                    continue;
                }
                for &pid2 in &snapshot[i + 1..] {
                    if !self.coverage.covers(edge, pid2) {
                        continue;
                    }
                    let (equal, p2_is_overlap) = {
                        let p1 = self.paths.path(pid1);
                        let p2 = self.paths.path(pid2);
                        let conj2 = self.paths.path(p2.conjugate_id());
                        // Conjugate-equivalence only counts across pairs:
                        // pid2 may be pid1's own twin when a path traverses
                        // an edge and its reverse complement, and that pair
                        // is not a duplicate of itself.
                        let same_pair = p1.conjugate_id() == pid2;
                        (p1 == p2 || (!same_pair && p1 == conj2), p2.is_overlap())
                    };
                    if equal {
                        if p2_is_overlap {
                            self.paths.set_overlap(pid1, true);
                        }
                        self.paths.clear_path(pid2, self.coverage);
                        continue;
                    }
                    let skip = edge.length() <= max_overlap
                        || self.paths.path(pid1).is_overlap()
                        || self.paths.path(pid2).is_overlap()
                        || del_only_equal;
                    if skip {
                        continue;
                    }
                    self.compare_and_cut(
                        edge,
                        pid1,
                        pid2,
                        max_overlap,
                        del_subpaths,
                        del_begins,
                        del_all,
                    );
                }
            }
        }
    }

    /// Extract shared terminal overlaps (resolved repeats) as their own
    /// paths. Visits every pair member, including pairs appended by the
    /// extraction itself.
    pub fn remove_overlaps(&mut self, _max_overlap: usize) {
        let mut i = 0;
        while i < self.paths.size() {
            let (pid, cid) = self.paths.pair_ids(i);
            self.find_and_remove_path_overlap(pid);
            self.find_and_remove_path_overlap(cid);
            i += 1;
        }
    }

    /// All edges and their conjugates, (length asc, id asc). Short edges
    /// drive early merging.
    fn sorted_edges(&self) -> Vec<Edge> {
        let mut by_id: BTreeMap<i64, Edge> = BTreeMap::new();
        for e in self.graph.edges() {
            by_id.insert(e.int_id(), e);
            let c = e.conjugate();
            by_id.insert(c.int_id(), c);
        }
        let mut edges: Vec<Edge> = by_id.into_values().collect();
        edges.sort_by_key(|e| (e.length(), e.int_id()));
        edges
    }

    #[allow(clippy::too_many_arguments)]
    fn compare_and_cut(
        &mut self,
        edge: Edge,
        pid1: PathId,
        pid2: PathId,
        max_overlap: usize,
        del_subpaths: bool,
        del_begins: bool,
        del_all: bool,
    ) {
        let poses1: Vec<usize> = self.paths.path(pid1).find_all(edge).collect();
        for pos1 in poses1 {
            let poses2: Vec<usize> = self.paths.path(pid2).find_all(edge).collect();
            for pos2 in poses2 {
                self.compare_and_cut_from_pos(
                    pid1,
                    pos1,
                    pid2,
                    pos2,
                    max_overlap,
                    del_subpaths,
                    del_begins,
                    del_all,
                );
            }
        }
    }

    /// Extend the co-occurrence at (pos1, pos2) forward, then backward by
    /// comparing the conjugates, and apply the cut policy to the matched
    /// spans.
    #[allow(clippy::too_many_arguments)]
    fn compare_and_cut_from_pos(
        &mut self,
        pid1: PathId,
        pos1: usize,
        pid2: PathId,
        pos2: usize,
        max_overlap: usize,
        del_subpaths: bool,
        del_begins: bool,
        del_all: bool,
    ) {
        let (first1, last1, size1, first2, last2, size2) = {
            let p1 = self.paths.path(pid1);
            let p2 = self.paths.path(pid2);
            // Earlier cuts may have invalidated these positions.
            if pos1 >= p1.size() || pos2 >= p2.size() {
                return;
            }
            let (last1, last2) = compare_paths(pos1, pos2, p1, p2, max_overlap);
            // The backward match on (p1, p2) from pos is the forward match
            // on their conjugates from the mirrored positions.
            let c1 = self.paths.path(p1.conjugate_id());
            let c2 = self.paths.path(p2.conjugate_id());
            let (r1, r2) = compare_paths(
                c1.size() - pos1 - 1,
                c2.size() - pos2 - 1,
                c1,
                c2,
                max_overlap,
            );
            let first1 = c1.size() - r1 - 1;
            let first2 = c2.size() - r2 - 1;
            (first1, last1, p1.size(), first2, last2, p2.size())
        };
        debug!(
            "matched span [{}..{}] of path {} against [{}..{}] of path {}",
            first1, last1, pid1, first2, last2, pid2
        );
        let cut = self.cut_overlaps(
            pid1,
            first1,
            last1,
            size1,
            pid2,
            first2,
            last2,
            size2,
            del_subpaths,
            del_begins,
            del_all,
        );
        if !cut {
            let p1 = self.paths.path(pid1);
            let common_length = p1.length_at(first1) as i64 - p1.length_at(last1) as i64
                + p1.at(last1).length() as i64;
            if common_length > self.max_repeat_length as i64 {
                debug!("similar paths were not deleted, common length {}", common_length);
            }
        }
    }

    /// The cut-policy table. First matching row wins; returns false when
    /// no row applies (the overlap stays unresolved).
    #[allow(clippy::too_many_arguments)]
    fn cut_overlaps(
        &mut self,
        pid1: PathId,
        first1: usize,
        last1: usize,
        size1: usize,
        pid2: PathId,
        first2: usize,
        last2: usize,
        size2: usize,
        del_subpaths: bool,
        del_begins: bool,
        del_all: bool,
    ) -> bool {
        let (p1_begin, p1_end, len1) = {
            let p = self.paths.path(pid1);
            (p.has_overlaped_begin(), p.has_overlaped_end(), p.length())
        };
        let (p2_begin, p2_end, len2) = {
            let p = self.paths.path(pid2);
            (p.has_overlaped_begin(), p.has_overlaped_end(), p.length())
        };
        if first1 == 0 && last1 == size1 - 1 && del_subpaths && !p1_begin && !p1_end {
            debug!("deleting path {} contained in path {}", pid1, pid2);
            self.paths.clear_path(pid1, self.coverage);
        } else if first2 == 0 && last2 == size2 - 1 && del_subpaths && !p2_begin && !p2_end {
            debug!("deleting path {} contained in path {}", pid2, pid1);
            self.paths.clear_path(pid2, self.coverage);
        } else if first1 == 0 && first2 == 0 && del_begins {
            if len1 < len2 && !p1_begin {
                debug!("trimming shared prefix off path {}", pid1);
                self.paths.pop_front(pid1, last1 + 1, self.coverage);
            } else if !p2_begin {
                debug!("trimming shared prefix off path {}", pid2);
                self.paths.pop_front(pid2, last2 + 1, self.coverage);
            }
        } else if last1 == size1 - 1 && last2 == size2 - 1 && del_begins {
            if len1 < len2 && !p1_end {
                debug!("trimming shared suffix off path {}", pid1);
                self.paths.pop_back(pid1, last1 + 1 - first1, self.coverage);
            } else if !p2_end {
                debug!("trimming shared suffix off path {}", pid2);
                self.paths.pop_back(pid2, last2 + 1 - first2, self.coverage);
            }
        } else if first2 == 0 && del_all && !p2_begin {
            self.paths.pop_front(pid2, last2 + 1, self.coverage);
        } else if last2 == size2 - 1 && del_all && !p2_end {
            self.paths.pop_back(pid2, last2 + 1 - first2, self.coverage);
        } else if first1 == 0 && del_all && !p1_begin {
            self.paths.pop_front(pid1, last1 + 1, self.coverage);
        } else if last1 == size1 - 1 && del_all && !p1_end {
            self.paths.pop_back(pid1, last1 + 1 - first1, self.coverage);
        } else {
            return false;
        }
        true
    }

    /// Find the best shared-end partner for `pid` and resolve the overlap.
    fn find_and_remove_path_overlap(&mut self, pid: PathId) {
        let tail = {
            let p1 = self.paths.path(pid);
            if p1.size() <= 1 {
                return;
            }
            let tail = p1.head();
            if self.coverage.coverage(tail) <= 1
                || (!p1.is_overlap() && p1.has_overlaped_end())
            {
                return;
            }
            tail
        };
        let mut best: Option<(PathId, usize)> = None;
        for pid2 in self.coverage.covering_paths(tail) {
            let p1 = self.paths.path(pid);
            let p2 = self.paths.path(pid2);
            // Identity is content-level: the path itself, or anything equal
            // to it or its conjugate, is not a partner.
            if p2 == p1 || p2 == self.paths.path(p1.conjugate_id()) {
                continue;
            }
            if !p2.is_overlap() && p2.has_overlaped_begin() {
                continue;
            }
            let k = p1.overlap_end_size(p2);
            // Strictly-greater keeps the smallest path id on ties, since
            // candidates arrive id-ascending.
            if k > best.map_or(0, |(_, best_k)| best_k) {
                best = Some((pid2, k));
            }
        }
        if let Some((pid2, k)) = best {
            self.remove_overlap(pid, pid2, k);
        }
    }

    /// Resolve a k-edge shared end between the tail of `pid1` and the head
    /// of `pid2`: either fold it into an existing overlap path, or extract
    /// it as a new one.
    fn remove_overlap(&mut self, pid1: PathId, pid2: PathId, k: usize) {
        debug!(
            "removing {}-edge overlap between paths {} and {}",
            k, pid1, pid2
        );
        let (p1_is_overlap, size1) = {
            let p = self.paths.path(pid1);
            (p.is_overlap(), p.size())
        };
        let (p2_is_overlap, size2) = {
            let p = self.paths.path(pid2);
            (p.is_overlap(), p.size())
        };
        if p1_is_overlap && k == size1 {
            // pid1 is exactly the repeat: strip it off pid2's head.
            self.paths.pop_front(pid2, k, self.coverage);
            self.paths.mark_overlaped_begin(pid2);
        } else if p2_is_overlap && k == size2 {
            self.paths.pop_back(pid1, k, self.coverage);
            self.paths.mark_overlaped_end(pid1);
        } else if k < size1 && k < size2 {
            // Extract the k trailing edges of pid1 as a new overlap pair.
            let (tail_edges, tail_gaps) = {
                let p1 = self.paths.path(pid1);
                let start = p1.size() - k;
                let edges: Vec<Edge> = (start..p1.size()).map(|i| p1.at(i)).collect();
                let mut gaps: Vec<i64> = (start..p1.size()).map(|i| p1.gap_at(i)).collect();
                gaps[0] = 0;
                (edges, gaps)
            };
            let (oid, ocid) = self.paths.add_pair(&tail_edges, &tail_gaps);
            self.coverage.subscribe(self.paths.path(oid));
            self.coverage.subscribe(self.paths.path(ocid));
            self.paths.set_overlap(oid, true);
            self.paths.pop_back(pid1, k, self.coverage);
            self.paths.pop_front(pid2, k, self.coverage);
            self.paths.mark_overlaped_end(pid1);
            self.paths.mark_overlaped_begin(pid2);
            debug!("extracted overlap path {}", oid);
        }
    }
}
