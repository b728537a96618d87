// src/path/container.rs
use crate::graph::Edge;
use crate::path::bidirectional::{BidirectionalPath, PathId};

/// Observer of path mutations. Every public mutation dispatches its
/// add/remove notifications synchronously, before returning, for both the
/// mutated path and its twin (one matched event stream per member of the
/// pair).
pub trait PathListener {
    fn edge_added(&mut self, path: PathId, e: Edge);
    fn edge_removed(&mut self, path: PathId, e: Edge);
}

/// Listener for mutation phases with nothing subscribed.
pub struct NoopListener;

impl PathListener for NoopListener {
    fn edge_added(&mut self, _path: PathId, _e: Edge) {}
    fn edge_removed(&mut self, _path: PathId, _e: Edge) {}
}

/// Owns pairs of mutually-conjugate paths for their full lifetime.
///
/// Twins are cross-referenced by id rather than by pointer (both are slots
/// in the same arena), so there is no ownership cycle and twin access is
/// O(1). All mutations are container-level operations: a push_back on a
/// path is mirrored as a push_front on its twin within the same call.
pub struct PathContainer {
    paths: Vec<BidirectionalPath>,
    pairs: Vec<(PathId, PathId)>,
}

impl Default for PathContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl PathContainer {
    pub fn new() -> Self {
        PathContainer {
            paths: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Number of pairs.
    pub fn size(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Canonical path of pair `i`.
    pub fn get(&self, i: usize) -> &BidirectionalPath {
        &self.paths[self.pairs[i].0.index()]
    }

    /// Conjugate twin of pair `i`.
    pub fn get_conjugate(&self, i: usize) -> &BidirectionalPath {
        &self.paths[self.pairs[i].1.index()]
    }

    pub fn pair_ids(&self, i: usize) -> (PathId, PathId) {
        self.pairs[i]
    }

    pub fn path(&self, id: PathId) -> &BidirectionalPath {
        &self.paths[id.index()]
    }

    pub fn conjugate_of(&self, id: PathId) -> PathId {
        self.paths[id.index()].conj
    }

    /// All paths, both members of every pair, in id order.
    pub fn paths(&self) -> impl Iterator<Item = &BidirectionalPath> {
        self.paths.iter()
    }

    /// Insert a new (path, conjugate) pair. The canonical member carries
    /// `edges` and `gaps` as given (first gap forced to 0); the twin is
    /// derived: conjugated edges in reverse order, gaps reversed. Returns
    /// the fresh ids, canonical first.
    pub fn add_pair(&mut self, edges: &[Edge], gaps: &[i64]) -> (PathId, PathId) {
        assert_eq!(edges.len(), gaps.len(), "one gap entry per edge");
        let id = PathId(self.paths.len() as u32);
        let conj = PathId(self.paths.len() as u32 + 1);

        let mut forward = BidirectionalPath::new(id, conj);
        forward.edges = edges.to_vec();
        forward.gaps = gaps.to_vec();
        if !forward.gaps.is_empty() {
            forward.gaps[0] = 0;
        }

        let mut reverse = BidirectionalPath::new(conj, id);
        reverse.edges = edges.iter().rev().map(|e| e.conjugate()).collect();
        reverse.gaps = gaps.iter().skip(1).rev().copied().collect();
        reverse.gaps.insert(0, 0);
        if reverse.edges.is_empty() {
            reverse.gaps.clear();
        }

        self.paths.push(forward);
        self.paths.push(reverse);
        self.pairs.push((id, conj));
        (id, conj)
    }

    /// Append `e` at the right end of `id` (push_front of conj(e) on the
    /// twin). `gap` is the gap before `e`; ignored for a first edge.
    pub fn push_back(&mut self, id: PathId, e: Edge, gap: i64, listener: &mut dyn PathListener) {
        let cid;
        let eff_gap;
        {
            let p = &mut self.paths[id.index()];
            cid = p.conj;
            eff_gap = if p.edges.is_empty() { 0 } else { gap };
            p.edges.push(e);
            p.gaps.push(eff_gap);
        }
        listener.edge_added(id, e);
        {
            // Twin gap layout after a push_front: [0, gap, old interior gaps].
            let q = &mut self.paths[cid.index()];
            q.edges.insert(0, e.conjugate());
            q.gaps.insert(0, 0);
            if q.gaps.len() > 1 {
                q.gaps[1] = eff_gap;
            }
        }
        listener.edge_added(cid, e.conjugate());
    }

    /// Remove the last `n` edges of `id` (the first `n` of its twin).
    /// Panics if `n` exceeds the path size: that is a caller bug.
    pub fn pop_back(&mut self, id: PathId, n: usize, listener: &mut dyn PathListener) {
        assert!(
            n <= self.paths[id.index()].size(),
            "pop_back({}) beyond path {} size {}",
            n,
            id,
            self.paths[id.index()].size()
        );
        for _ in 0..n {
            let cid;
            let e;
            {
                let p = &mut self.paths[id.index()];
                cid = p.conj;
                e = p.edges.pop().expect("pop_back on empty path");
                p.gaps.pop();
            }
            listener.edge_removed(id, e);
            {
                let q = &mut self.paths[cid.index()];
                q.edges.remove(0);
                q.gaps.remove(0);
                if !q.gaps.is_empty() {
                    q.gaps[0] = 0;
                }
            }
            listener.edge_removed(cid, e.conjugate());
        }
    }

    /// Remove the first `n` edges of `id`, expressed as a pop_back on the
    /// twin.
    pub fn pop_front(&mut self, id: PathId, n: usize, listener: &mut dyn PathListener) {
        let cid = self.conjugate_of(id);
        self.pop_back(cid, n, listener);
    }

    /// Remove all edges of `id` and its twin. The pair stays allocated;
    /// a size-0 path is logically deleted but addressable.
    pub fn clear_path(&mut self, id: PathId, listener: &mut dyn PathListener) {
        let cid = self.conjugate_of(id);
        let removed: Vec<Edge> = self.paths[id.index()].edges.clone();
        {
            let p = &mut self.paths[id.index()];
            p.edges.clear();
            p.gaps.clear();
        }
        for &e in removed.iter().rev() {
            listener.edge_removed(id, e);
        }
        {
            let q = &mut self.paths[cid.index()];
            q.edges.clear();
            q.gaps.clear();
        }
        for &e in removed.iter().rev() {
            listener.edge_removed(cid, e.conjugate());
        }
    }

    /// Flag the pair as an extracted overlap (repeat) path. Set on both
    /// twins: the conjugate of a repeat is the same repeat.
    pub fn set_overlap(&mut self, id: PathId, value: bool) {
        let cid = self.conjugate_of(id);
        self.paths[id.index()].is_overlap = value;
        self.paths[cid.index()].is_overlap = value;
    }

    /// Mark that the beginning of `id` was donated to an overlap path.
    /// A path's beginning is its twin's end, so the twin's end flag is
    /// set in the same call.
    pub fn mark_overlaped_begin(&mut self, id: PathId) {
        let cid = self.conjugate_of(id);
        self.paths[id.index()].has_overlaped_begin = true;
        self.paths[cid.index()].has_overlaped_end = true;
    }

    /// Mark that the end of `id` was donated to an overlap path.
    pub fn mark_overlaped_end(&mut self, id: PathId) {
        let cid = self.conjugate_of(id);
        self.paths[id.index()].has_overlaped_end = true;
        self.paths[cid.index()].has_overlaped_begin = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: i64, len: usize) -> Edge {
        Edge::new(id, -id, len)
    }

    /// Conjugate symmetry: Q.edges == reverse(map(conj, P.edges)) and
    /// Q.gaps == reverse(P.gaps[1..]) prefixed with 0.
    fn assert_conjugate_symmetry(c: &PathContainer, id: PathId) {
        let p = c.path(id);
        let q = c.path(p.conjugate_id());
        let expected: Vec<Edge> = p.edges.iter().rev().map(|e| e.conjugate()).collect();
        assert_eq!(q.edges, expected);
        if !p.edges.is_empty() {
            let mut expected_gaps: Vec<i64> = p.gaps.iter().skip(1).rev().copied().collect();
            expected_gaps.insert(0, 0);
            assert_eq!(q.gaps, expected_gaps);
        } else {
            assert!(q.gaps.is_empty());
        }
    }

    #[test]
    fn push_back_mirrors_as_push_front_on_twin() {
        let mut c = PathContainer::new();
        let (pid, cid) = c.add_pair(&[edge(1, 10)], &[0]);
        c.push_back(pid, edge(2, 20), 3, &mut NoopListener);
        c.push_back(pid, edge(3, 30), -1, &mut NoopListener);

        assert_eq!(c.path(pid).edges, vec![edge(1, 10), edge(2, 20), edge(3, 30)]);
        assert_eq!(c.path(pid).gaps, vec![0, 3, -1]);
        assert_eq!(
            c.path(cid).edges,
            vec![edge(-3, 30), edge(-2, 20), edge(-1, 10)]
        );
        assert_eq!(c.path(cid).gaps, vec![0, -1, 3]);
        assert_conjugate_symmetry(&c, pid);
    }

    #[test]
    fn pop_back_mirrors_as_pop_front_on_twin() {
        let mut c = PathContainer::new();
        let (pid, cid) = c.add_pair(
            &[edge(1, 10), edge(2, 20), edge(3, 30)],
            &[0, 3, -1],
        );
        c.pop_back(pid, 1, &mut NoopListener);
        assert_eq!(c.path(pid).edges, vec![edge(1, 10), edge(2, 20)]);
        assert_eq!(c.path(pid).gaps, vec![0, 3]);
        assert_eq!(c.path(cid).edges, vec![edge(-2, 20), edge(-1, 10)]);
        assert_eq!(c.path(cid).gaps, vec![0, 3]);
        assert_conjugate_symmetry(&c, pid);

        c.pop_back(pid, 2, &mut NoopListener);
        assert!(c.path(pid).is_empty());
        assert!(c.path(cid).is_empty());
    }

    #[test]
    fn pop_front_trims_the_beginning() {
        let mut c = PathContainer::new();
        let (pid, _) = c.add_pair(
            &[edge(1, 10), edge(2, 20), edge(3, 30)],
            &[0, 3, -1],
        );
        c.pop_front(pid, 2, &mut NoopListener);
        assert_eq!(c.path(pid).edges, vec![edge(3, 30)]);
        assert_eq!(c.path(pid).gaps, vec![0]);
        assert_conjugate_symmetry(&c, pid);
    }

    #[test]
    fn symmetry_holds_under_mixed_mutation_sequences() {
        let mut c = PathContainer::new();
        let (pid, _) = c.add_pair(&[edge(5, 7)], &[0]);
        c.push_back(pid, edge(6, 9), 2, &mut NoopListener);
        c.push_back(pid, edge(7, 11), 0, &mut NoopListener);
        c.pop_front(pid, 1, &mut NoopListener);
        c.push_back(pid, edge(8, 13), -4, &mut NoopListener);
        c.pop_back(pid, 1, &mut NoopListener);
        assert_conjugate_symmetry(&c, pid);
        let cid = c.conjugate_of(pid);
        assert_conjugate_symmetry(&c, cid);
    }

    #[test]
    fn flags_are_mirrored_between_twins() {
        let mut c = PathContainer::new();
        let (pid, cid) = c.add_pair(&[edge(1, 10)], &[0]);
        c.mark_overlaped_begin(pid);
        assert!(c.path(pid).has_overlaped_begin());
        assert!(c.path(cid).has_overlaped_end());
        c.set_overlap(pid, true);
        assert!(c.path(pid).is_overlap());
        assert!(c.path(cid).is_overlap());
    }

    #[test]
    #[should_panic(expected = "pop_back")]
    fn over_popping_is_a_caller_bug() {
        let mut c = PathContainer::new();
        let (pid, _) = c.add_pair(&[edge(1, 10)], &[0]);
        c.pop_back(pid, 2, &mut NoopListener);
    }
}
