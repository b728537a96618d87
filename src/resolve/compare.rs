// src/resolve/compare.rs
use crate::path::BidirectionalPath;

/// Extend a match that begins with `p1[start1] == p2[start2]` as far
/// forward as possible, tolerating up to `max_overlap` nucleotides of
/// mismatch on either side.
///
/// Walks `p1` forward from `start1 + 1`. At each step it looks for the
/// smallest occurrence of the current edge in `p2` past the last matched
/// position, within a `max_overlap`-nucleotide distance budget in `p2`.
/// A hit advances both cursors and resets the skip counter; a miss adds
/// the skipped edge's length plus its gap to the counter, and once the
/// counter exceeds `max_overlap` the walk stops.
///
/// Returns `(last1, last2)`, the last matched positions; `last1 >= start1`
/// and `last2 >= start2` always hold.
pub fn compare_paths(
    start1: usize,
    start2: usize,
    p1: &BidirectionalPath,
    p2: &BidirectionalPath,
    max_overlap: usize,
) -> (usize, usize) {
    let mut last1 = start1;
    let mut last2 = start2;
    let mut skipped: i64 = 0;
    let mut cur = start1 + 1;
    while cur < p1.size() {
        if skipped > max_overlap as i64 {
            return (last1, last2);
        }
        let current = p1.at(cur);
        let mut found = false;
        for pos2 in p2.find_all(current) {
            if pos2 <= last2 {
                continue;
            }
            // Nucleotide distance in p2 between the end of the last
            // matched edge and the start of this occurrence.
            let dist = p2.length_at(last2) as i64
                - p2.length_at(pos2) as i64
                - p2.at(last2).length() as i64;
            if dist > max_overlap as i64 {
                break;
            }
            last2 = pos2;
            last1 = cur;
            found = true;
            break;
        }
        if found {
            skipped = 0;
        } else {
            skipped += p1.at(cur).length() as i64 + p1.gap_at(cur);
        }
        cur += 1;
    }
    (last1, last2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::path::PathContainer;

    fn edge(id: i64, len: usize) -> Edge {
        Edge::new(id, -id, len)
    }

    #[test]
    fn identical_paths_match_to_the_end() {
        let mut c = PathContainer::new();
        let edges = [edge(1, 5), edge(2, 5), edge(3, 5)];
        let (p1, _) = c.add_pair(&edges, &[0, 0, 0]);
        let (p2, _) = c.add_pair(&edges, &[0, 0, 0]);
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 0), (2, 2));
    }

    #[test]
    fn tolerant_match_bridges_a_missing_edge_within_budget() {
        // p1 = (a,b,c,d,e), p2 = (a,b,d,e), length(c) = 5.
        let mut c = PathContainer::new();
        let (a, b, cc, d, e) = (edge(1, 5), edge(2, 5), edge(3, 5), edge(4, 5), edge(5, 5));
        let (p1, _) = c.add_pair(&[a, b, cc, d, e], &[0, 0, 0, 0, 0]);
        let (p2, _) = c.add_pair(&[a, b, d, e], &[0, 0, 0, 0]);

        // Budget 10 absorbs the 5-nucleotide skip of c.
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 10), (4, 3));
        // Budget 3 does not: the walk stops right after the miss.
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 3), (1, 1));
    }

    #[test]
    fn p2_distance_budget_rejects_far_occurrences() {
        // p2 contains the next edge only after a 50-nucleotide detour.
        let mut c = PathContainer::new();
        let (a, b) = (edge(1, 5), edge(2, 5));
        let detour = edge(9, 50);
        let (p1, _) = c.add_pair(&[a, b], &[0, 0]);
        let (p2, _) = c.add_pair(&[a, detour, b], &[0, 0, 0]);
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 10), (0, 0));
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 100), (1, 2));
    }

    #[test]
    fn ties_break_to_the_smallest_p2_position() {
        // b occurs twice in p2 past the start; the nearer one wins.
        let mut c = PathContainer::new();
        let (a, b) = (edge(1, 5), edge(2, 5));
        let (p1, _) = c.add_pair(&[a, b], &[0, 0]);
        let (p2, _) = c.add_pair(&[a, b, b], &[0, 0, 0]);
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 10), (1, 1));
    }

    #[test]
    fn result_never_precedes_the_start_positions() {
        let mut c = PathContainer::new();
        let (p1, _) = c.add_pair(&[edge(1, 5), edge(8, 5)], &[0, 0]);
        let (p2, _) = c.add_pair(&[edge(1, 5), edge(9, 5)], &[0, 0]);
        // Divergent tails: the match stays at the shared start.
        assert_eq!(compare_paths(0, 0, c.path(p1), c.path(p2), 0), (0, 0));
    }
}
