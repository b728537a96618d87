// src/graph/debruijn.rs
use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::graph::{AssemblyGraph, Edge};

struct EdgeRecord {
    conj: i64,
    len: usize,
    seq: Option<String>,
}

/// Concrete in-memory assembly graph: edge records plus successor links
/// between edge end/start vertices. Built once via [`DebruijnGraphBuilder`];
/// immutable afterwards, so edge identity is stable for the whole run.
pub struct DebruijnGraph {
    k: usize,
    records: BTreeMap<i64, EdgeRecord>,
    succ: AHashMap<i64, Vec<i64>>,
    cyclic: AHashSet<i64>,
}

impl DebruijnGraph {
    pub fn builder(k: usize) -> DebruijnGraphBuilder {
        DebruijnGraphBuilder {
            k,
            records: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    fn handle(&self, id: i64) -> Edge {
        let rec = &self.records[&id];
        Edge::new(id, rec.conj, rec.len)
    }
}

impl AssemblyGraph for DebruijnGraph {
    fn k(&self) -> usize {
        self.k
    }

    fn edges(&self) -> Vec<Edge> {
        self.records.keys().map(|&id| self.handle(id)).collect()
    }

    fn outgoing_edges_from_end(&self, e: Edge) -> Vec<Edge> {
        match self.succ.get(&e.int_id()) {
            Some(ids) => ids.iter().map(|&id| self.handle(id)).collect(),
            None => Vec::new(),
        }
    }

    fn in_cycle(&self, e: Edge) -> bool {
        self.cyclic.contains(&e.int_id())
    }

    fn sequence(&self, e: Edge) -> Option<&str> {
        self.records
            .get(&e.int_id())
            .and_then(|r| r.seq.as_deref())
    }
}

/// Builder for [`DebruijnGraph`]. Edges are registered first, links after;
/// every link is mirrored on the conjugate strand so topology stays
/// consistent under conjugation.
pub struct DebruijnGraphBuilder {
    k: usize,
    records: BTreeMap<i64, EdgeRecord>,
    links: Vec<(i64, i64)>,
}

impl DebruijnGraphBuilder {
    /// Register an edge and its conjugate id. Call once per strand; the
    /// conjugate strand needs its own `add_edge` with the ids swapped
    /// (or the same id for a self-conjugate edge).
    pub fn add_edge(&mut self, id: i64, conj: i64, len: usize, seq: Option<String>) -> &mut Self {
        self.records.insert(id, EdgeRecord { conj, len, seq });
        self
    }

    /// Register a link: `to` leaves the end vertex of `from`. The mirrored
    /// conjugate link (conj(to) -> conj(from)) is added automatically.
    pub fn add_link(&mut self, from: i64, to: i64) -> &mut Self {
        self.links.push((from, to));
        self
    }

    pub fn build(self) -> DebruijnGraph {
        let mut succ: AHashMap<i64, Vec<i64>> = AHashMap::new();
        let mut seen: AHashSet<(i64, i64)> = AHashSet::new();
        let mut push = |succ: &mut AHashMap<i64, Vec<i64>>, from: i64, to: i64| {
            if seen.insert((from, to)) {
                succ.entry(from).or_default().push(to);
            }
        };
        for &(from, to) in &self.links {
            push(&mut succ, from, to);
            // Mirrored link on the conjugate strand.
            if let (Some(f), Some(t)) = (self.records.get(&from), self.records.get(&to)) {
                push(&mut succ, t.conj, f.conj);
            }
        }
        for ids in succ.values_mut() {
            ids.sort_unstable();
        }

        let cyclic = find_cyclic_edges(&self.records, &succ);
        DebruijnGraph {
            k: self.k,
            records: self.records,
            succ,
            cyclic,
        }
    }
}

/// An edge lies on a cycle iff it can reach itself through successor
/// links: its strongly connected component in the edge-adjacency digraph
/// has more than one member, or it links directly to itself.
fn find_cyclic_edges(
    records: &BTreeMap<i64, EdgeRecord>,
    succ: &AHashMap<i64, Vec<i64>>,
) -> AHashSet<i64> {
    let mut dg: DiGraphMap<i64, ()> = DiGraphMap::new();
    for &id in records.keys() {
        dg.add_node(id);
    }
    for (&from, tos) in succ {
        for &to in tos {
            dg.add_edge(from, to, ());
        }
    }
    let mut cyclic = AHashSet::new();
    for component in tarjan_scc(&dg) {
        if component.len() > 1 {
            cyclic.extend(component);
        } else if let Some(&id) = component.first() {
            if succ.get(&id).is_some_and(|s| s.contains(&id)) {
                cyclic.insert(id);
            }
        }
    }
    cyclic
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_graph() -> DebruijnGraph {
        // 1 -> 2 -> 3 on the forward strand, conjugates negative-style ids
        // registered explicitly as 4, 5, 6.
        let mut b = DebruijnGraph::builder(3);
        b.add_edge(1, 4, 10, None)
            .add_edge(4, 1, 10, None)
            .add_edge(2, 5, 20, None)
            .add_edge(5, 2, 20, None)
            .add_edge(3, 6, 30, None)
            .add_edge(6, 3, 30, None)
            .add_link(1, 2)
            .add_link(2, 3);
        b.build()
    }

    #[test]
    fn links_are_mirrored_on_conjugates() {
        let g = linear_graph();
        let e2 = g.edges().into_iter().find(|e| e.int_id() == 2).unwrap();
        let succ: Vec<i64> = g
            .outgoing_edges_from_end(e2)
            .iter()
            .map(|e| e.int_id())
            .collect();
        assert_eq!(succ, vec![3]);
        // conj(2) = 5; the mirror of 1 -> 2 is 5 -> 4.
        let e5 = e2.conjugate();
        let succ: Vec<i64> = g
            .outgoing_edges_from_end(e5)
            .iter()
            .map(|e| e.int_id())
            .collect();
        assert_eq!(succ, vec![4]);
    }

    #[test]
    fn cycle_detection_marks_loop_edges_only() {
        let mut b = DebruijnGraph::builder(3);
        b.add_edge(1, 11, 10, None)
            .add_edge(11, 1, 10, None)
            .add_edge(2, 12, 10, None)
            .add_edge(12, 2, 10, None)
            .add_edge(3, 13, 10, None)
            .add_edge(13, 3, 10, None)
            .add_link(1, 2)
            .add_link(2, 1) // 1 <-> 2 form a cycle
            .add_link(2, 3); // 3 dangles off it
        let g = b.build();
        let by_id = |id: i64| g.edges().into_iter().find(|e| e.int_id() == id).unwrap();
        assert!(g.in_cycle(by_id(1)));
        assert!(g.in_cycle(by_id(2)));
        assert!(!g.in_cycle(by_id(3)));
        // Mirrored links put the conjugates on a cycle too.
        assert!(g.in_cycle(by_id(11)));
        assert!(g.in_cycle(by_id(12)));
    }

    #[test]
    fn linear_graph_has_no_cycles() {
        let g = linear_graph();
        assert!(g.edges().iter().all(|&e| !g.in_cycle(e)));
    }
}
