// src/path/coverage.rs
use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};

use crate::graph::Edge;
use crate::path::bidirectional::{BidirectionalPath, PathId};
use crate::path::container::{PathContainer, PathListener};

/// Live inverted index from edge to the multiset of paths covering it.
///
/// Each subscribed path contributes one entry per occurrence of each edge
/// in its sequence. The index is maintained incrementally: container
/// mutations dispatch add/remove events here before they return, so at
/// quiescence the index always equals the recomputed-from-scratch answer.
///
/// Events for paths that were never subscribed are ignored, matching the
/// explicit-subscription model: freshly extracted overlap paths must be
/// subscribed before their mutations count.
pub struct CoverageMap {
    map: AHashMap<i64, BTreeMap<PathId, usize>>,
    subscribed: AHashSet<PathId>,
}

impl Default for CoverageMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageMap {
    pub fn new() -> Self {
        CoverageMap {
            map: AHashMap::new(),
            subscribed: AHashSet::new(),
        }
    }

    /// Build a map with every path of `container` subscribed.
    pub fn from_container(container: &PathContainer) -> Self {
        let mut cov = CoverageMap::new();
        for path in container.paths() {
            cov.subscribe(path);
        }
        cov
    }

    /// Register the path's current edge occurrences and listen for its
    /// future mutations. Idempotent per path.
    pub fn subscribe(&mut self, path: &BidirectionalPath) {
        if !self.subscribed.insert(path.id()) {
            return;
        }
        for &e in path.edges() {
            self.add(path.id(), e);
        }
    }

    /// Paths currently containing `e`, path-id ascending.
    pub fn covering_paths(&self, e: Edge) -> Vec<PathId> {
        match self.map.get(&e.int_id()) {
            Some(set) => set.keys().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Whether `path` currently covers `e`. Used by the remover to skip
    /// snapshot entries invalidated by earlier mutations.
    pub fn covers(&self, e: Edge, path: PathId) -> bool {
        self.map
            .get(&e.int_id())
            .is_some_and(|set| set.contains_key(&path))
    }

    /// Total occurrence count of `e` across all covering paths.
    pub fn coverage(&self, e: Edge) -> usize {
        self.map
            .get(&e.int_id())
            .map_or(0, |set| set.values().sum())
    }

    pub fn is_covered(&self, e: Edge) -> bool {
        self.coverage(e) > 0
    }

    fn add(&mut self, path: PathId, e: Edge) {
        *self
            .map
            .entry(e.int_id())
            .or_default()
            .entry(path)
            .or_insert(0) += 1;
    }

    fn remove(&mut self, path: PathId, e: Edge) {
        let Some(set) = self.map.get_mut(&e.int_id()) else {
            panic!("removal event for uncovered edge {}", e.int_id());
        };
        match set.get_mut(&path) {
            Some(n) if *n > 1 => *n -= 1,
            Some(_) => {
                set.remove(&path);
                if set.is_empty() {
                    self.map.remove(&e.int_id());
                }
            }
            None => panic!("removal event for path {} not covering edge {}", path, e.int_id()),
        }
    }
}

impl PathListener for CoverageMap {
    fn edge_added(&mut self, path: PathId, e: Edge) {
        if self.subscribed.contains(&path) {
            self.add(path, e);
        }
    }

    fn edge_removed(&mut self, path: PathId, e: Edge) {
        if self.subscribed.contains(&path) {
            self.remove(path, e);
        }
    }
}
