// src/weight/counter.rs
use ahash::AHashMap;

use crate::graph::Edge;
use crate::path::BidirectionalPath;
use crate::weight::paired_lib::{find_covered_edges, PairedInfoLibrary};

/// Observed weight above which a path-vs-path pair-info point is promoted
/// to its full ideal weight.
const PROMOTE_WEIGHT: f64 = 10.0;

/// Scores a candidate extension edge against a path from paired-read
/// evidence. The excluded-edges map lets a caller veto specific path
/// positions (scratch state, mutated between calls) without touching the
/// path itself.
pub trait WeightCounter {
    fn count_weight(&self, path: &BidirectionalPath, e: Edge, gap: i64) -> f64;

    fn count_ideal_info(&self, path: &BidirectionalPath, e: Edge, gap: i64) -> f64;

    fn pair_info_exist(&self, e1: Edge, e2: Edge, distance: i64) -> bool;

    fn threshold(&self) -> f64;

    fn excluded_edges_mut(&mut self) -> &mut AHashMap<usize, f64>;

    fn is_extension_possible(&self, path: &BidirectionalPath, e: Edge) -> bool {
        self.count_weight(path, e, 0) >= self.threshold()
    }
}

/// Raw read-count strategy: sum of observed paired info over the path
/// positions expected to link to the candidate, optionally normalized by
/// the ideal count per position.
pub struct ReadCountWeightCounter<L: PairedInfoLibrary> {
    libs: Vec<L>,
    threshold: f64,
    normalize_weight: bool,
    excluded_edges: AHashMap<usize, f64>,
}

impl<L: PairedInfoLibrary> ReadCountWeightCounter<L> {
    pub fn new(libs: Vec<L>, threshold: f64) -> Self {
        ReadCountWeightCounter {
            libs,
            threshold,
            normalize_weight: true,
            excluded_edges: AHashMap::new(),
        }
    }

    pub fn set_normalize_weight(&mut self, normalize: bool) {
        self.normalize_weight = normalize;
    }

    fn count_single_lib(&self, lib: &L, path: &BidirectionalPath, e: Edge, gap: i64) -> f64 {
        let mut weight = 0.0;
        for covered in find_covered_edges(lib, path, e) {
            if self.excluded_edges.contains_key(&covered.path_pos) {
                continue;
            }
            let mut w = lib.count_paired_info(
                path.at(covered.path_pos),
                e,
                path.length_at(covered.path_pos) as i64 + gap,
            );
            if self.normalize_weight {
                w /= covered.ideal;
            }
            weight += w;
        }
        weight
    }
}

impl<L: PairedInfoLibrary> WeightCounter for ReadCountWeightCounter<L> {
    fn count_weight(&self, path: &BidirectionalPath, e: Edge, gap: i64) -> f64 {
        self.libs
            .iter()
            .map(|lib| self.count_single_lib(lib, path, e, gap))
            .sum()
    }

    fn count_ideal_info(&self, path: &BidirectionalPath, e: Edge, gap: i64) -> f64 {
        let mut total = 0.0;
        for i in (0..path.size()).rev() {
            let dist = gap + path.length_at(i) as i64;
            total += self
                .libs
                .iter()
                .map(|lib| lib.ideal_paired_info(path.at(i), e, dist))
                .sum::<f64>();
        }
        total
    }

    fn pair_info_exist(&self, e1: Edge, e2: Edge, distance: i64) -> bool {
        for lib in &self.libs {
            let mut w = lib.count_paired_info(e1, e2, distance);
            let ideal = lib.ideal_paired_info(e1, e2, distance);
            if ideal == 0.0 {
                continue;
            }
            if self.normalize_weight {
                w /= ideal;
            }
            if w > 0.0 {
                return true;
            }
        }
        false
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn excluded_edges_mut(&mut self) -> &mut AHashMap<usize, f64> {
        &mut self.excluded_edges
    }
}

/// Path-cover strategy: per position, compare normalized observed weight
/// against a support threshold and count the position's ideal weight as
/// supported or not; the score is the supported fraction in [0, 1],
/// averaged across libraries.
pub struct PathCoverWeightCounter<L: PairedInfoLibrary> {
    libs: Vec<L>,
    threshold: f64,
    single_threshold: f64,
    normalize_weight: bool,
    excluded_edges: AHashMap<usize, f64>,
}

impl<L: PairedInfoLibrary> PathCoverWeightCounter<L> {
    pub fn new(libs: Vec<L>, threshold: f64, single_threshold: f64) -> Self {
        PathCoverWeightCounter {
            libs,
            threshold,
            single_threshold,
            normalize_weight: true,
            excluded_edges: AHashMap::new(),
        }
    }

    pub fn set_normalize_weight(&mut self, normalize: bool) {
        self.normalize_weight = normalize;
    }

    fn count_single_lib(&self, lib: &L, path: &BidirectionalPath, e: Edge, gap: i64) -> f64 {
        let mut supported = 0.0;
        let mut ideal_total = 0.0;
        let single_threshold = lib.single_threshold().unwrap_or(self.single_threshold);
        for covered in find_covered_edges(lib, path, e) {
            let mut ideal = covered.ideal;
            if let Some(&substitute) = self.excluded_edges.get(&covered.path_pos) {
                // A zero substitute is a hard veto; a positive one stands
                // in for the ideal weight of the shared prefix.
                if substitute <= 0.0 || ideal <= 0.0 {
                    continue;
                }
                ideal = substitute;
            }
            let mut single = lib.count_paired_info(
                path.at(covered.path_pos),
                e,
                path.length_at(covered.path_pos) as i64 + gap,
            );
            if self.normalize_weight {
                single /= ideal;
            }
            if single >= single_threshold {
                supported += ideal;
            }
            ideal_total += ideal;
        }
        if ideal_total > 0.0 {
            supported / ideal_total
        } else {
            0.0
        }
    }
}

impl<L: PairedInfoLibrary> WeightCounter for PathCoverWeightCounter<L> {
    fn count_weight(&self, path: &BidirectionalPath, e: Edge, gap: i64) -> f64 {
        let total: f64 = self
            .libs
            .iter()
            .map(|lib| self.count_single_lib(lib, path, e, gap))
            .sum();
        total / self.libs.len().max(1) as f64
    }

    /// Counts path positions with any expected support for the candidate.
    fn count_ideal_info(&self, path: &BidirectionalPath, e: Edge, gap: i64) -> f64 {
        let mut total = 0.0;
        for i in (0..path.size()).rev() {
            let dist = gap + path.length_at(i) as i64;
            let has_info = path.at(i).length() > 0
                && self
                    .libs
                    .iter()
                    .map(|lib| lib.ideal_paired_info(path.at(i), e, dist))
                    .sum::<f64>()
                    > 0.0;
            if has_info {
                total += 1.0;
            }
        }
        total
    }

    fn pair_info_exist(&self, e1: Edge, e2: Edge, distance: i64) -> bool {
        for lib in &self.libs {
            let mut w = lib.count_paired_info(e1, e2, distance);
            let ideal = lib.ideal_paired_info(e1, e2, distance);
            if ideal == 0.0 {
                continue;
            }
            if self.normalize_weight {
                w /= ideal;
            }
            let threshold = lib.single_threshold().unwrap_or(self.single_threshold);
            if w > threshold {
                return true;
            }
        }
        false
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn excluded_edges_mut(&mut self) -> &mut AHashMap<usize, f64> {
        &mut self.excluded_edges
    }
}

/// Pair info between two whole paths (or a path and a single edge), with a
/// mutable common-weight map for subtracting evidence shared with a
/// competing extension.
pub struct PathsWeightCounter<'a, L: PairedInfoLibrary> {
    lib: &'a L,
    common_weight: AHashMap<usize, f64>,
}

impl<'a, L: PairedInfoLibrary> PathsWeightCounter<'a, L> {
    pub fn new(lib: &'a L) -> Self {
        PathsWeightCounter {
            lib,
            common_weight: AHashMap::new(),
        }
    }

    pub fn set_common_weight(&mut self, path_pos: usize, weight: f64) {
        self.common_weight.insert(path_pos, weight);
    }

    pub fn clear_common_weight(&mut self) {
        self.common_weight.clear();
    }

    /// Normalized supported fraction of pair info between spans of two
    /// paths, with the common weight subtracted from both sides.
    pub fn count_pair_info_paths(
        &self,
        path1: &BidirectionalPath,
        from1: usize,
        to1: usize,
        path2: &BidirectionalPath,
        from2: usize,
        to2: usize,
    ) -> f64 {
        let (pi, mut ideal_pi) = self.find_pair_info(path1, from1, to1, path2, from2, to2);
        let mut result = 0.0;
        let mut all_common = 0.0;
        for i in from1..to1 {
            if let Some(&w) = self.common_weight.get(&i) {
                all_common += w;
            }
            result += pi.get(&i).copied().unwrap_or(0.0);
        }
        ideal_pi -= all_common;
        result -= all_common;
        if ideal_pi > 0.0 {
            (result / ideal_pi).max(0.0)
        } else {
            0.0
        }
    }

    /// Raw observed pair info between a span of `path1` and a candidate
    /// edge at `gap` past the path end.
    pub fn count_pair_info_edge(
        &self,
        path1: &BidirectionalPath,
        from1: usize,
        to1: usize,
        edge: Edge,
        gap: i64,
    ) -> f64 {
        let mut result = 0.0;
        for i in from1..to1 {
            let dist = gap + path1.length_at(i) as i64;
            result += self.lib.count_paired_info(path1.at(i), edge, dist);
        }
        result
    }

    /// Per-position promoted pair info of `path1` against all of `path2`.
    pub fn find_pair_info_from_path(
        &self,
        path1: &BidirectionalPath,
        path2: &BidirectionalPath,
    ) -> AHashMap<usize, f64> {
        self.find_pair_info(path1, 0, path1.size(), path2, 0, path2.size())
            .0
    }

    fn find_pair_info(
        &self,
        path1: &BidirectionalPath,
        from1: usize,
        to1: usize,
        path2: &BidirectionalPath,
        from2: usize,
        to2: usize,
    ) -> (AHashMap<usize, f64>, f64) {
        let mut pi: AHashMap<usize, f64> = AHashMap::new();
        let mut ideal_pi = 0.0;
        for i1 in from1..to1 {
            for i2 in from2..to2 {
                // Start-to-start distance when path2 follows path1.
                let dist = path1.length_at(i1) as i64 + path2.length() as i64
                    - path2.length_at(i2) as i64;
                let ideal = self.lib.ideal_paired_info(path1.at(i1), path2.at(i2), dist);
                if ideal == 0.0 {
                    pi.entry(i1).or_insert(0.0);
                    continue;
                }
                ideal_pi += ideal;
                let observed = self.lib.count_paired_info(path1.at(i1), path2.at(i2), dist);
                let promoted = if observed > PROMOTE_WEIGHT { ideal } else { 0.0 };
                *pi.entry(i1).or_insert(0.0) += promoted;
            }
        }
        (pi, ideal_pi)
    }
}
