// src/io/text.rs
//
// Text formats for the CLI: a graph description and a seed-path list.
//
// Graph file, one record per line:
//   K <k>                            overlap length, first record
//   E <id> <conj_id> <length> [seq]  edge (one line per strand)
//   L <from_id> <to_id>              <to> leaves the end vertex of <from>
//
// Path file: one path per line, whitespace-separated edge ids.

use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind, Result};
use std::path::Path;

use ahash::AHashMap;

use crate::graph::{AssemblyGraph, DebruijnGraph, Edge};
use crate::path::PathContainer;

fn bad_line(path: &Path, line_no: usize, msg: &str) -> Error {
    Error::new(
        ErrorKind::InvalidData,
        format!("{}:{}: {}", path.display(), line_no + 1, msg),
    )
}

pub fn load_graph(path: &Path) -> Result<DebruijnGraph> {
    let reader = BufReader::new(File::open(path)?);
    let mut k = None;
    let mut edges: Vec<(i64, i64, usize, Option<String>)> = Vec::new();
    let mut links: Vec<(i64, i64)> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "K" => {
                let value = fields
                    .get(1)
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| bad_line(path, line_no, "K record needs a value"))?;
                k = Some(value);
            }
            "E" => {
                if fields.len() < 4 {
                    return Err(bad_line(path, line_no, "E record needs id, conj, length"));
                }
                let id = fields[1]
                    .parse()
                    .map_err(|_| bad_line(path, line_no, "bad edge id"))?;
                let conj = fields[2]
                    .parse()
                    .map_err(|_| bad_line(path, line_no, "bad conjugate id"))?;
                let len = fields[3]
                    .parse()
                    .map_err(|_| bad_line(path, line_no, "bad edge length"))?;
                let seq = fields.get(4).map(|s| s.to_string());
                edges.push((id, conj, len, seq));
            }
            "L" => {
                if fields.len() < 3 {
                    return Err(bad_line(path, line_no, "L record needs from, to"));
                }
                let from = fields[1]
                    .parse()
                    .map_err(|_| bad_line(path, line_no, "bad link source"))?;
                let to = fields[2]
                    .parse()
                    .map_err(|_| bad_line(path, line_no, "bad link target"))?;
                links.push((from, to));
            }
            other => {
                return Err(bad_line(path, line_no, &format!("unknown record '{}'", other)));
            }
        }
    }

    let k = k.ok_or_else(|| Error::new(ErrorKind::InvalidData, "graph file has no K record"))?;
    let mut builder = DebruijnGraph::builder(k);
    for (id, conj, len, seq) in edges {
        builder.add_edge(id, conj, len, seq);
    }
    for (from, to) in links {
        builder.add_link(from, to);
    }
    Ok(builder.build())
}

/// Load seed paths, one per line, as (path, conjugate) pairs.
pub fn load_seed_paths(path: &Path, graph: &DebruijnGraph) -> Result<PathContainer> {
    let by_id: AHashMap<i64, Edge> = graph.edges().into_iter().map(|e| (e.int_id(), e)).collect();
    let reader = BufReader::new(File::open(path)?);
    let mut paths = PathContainer::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut edges = Vec::new();
        for field in line.split_whitespace() {
            let id: i64 = field
                .parse()
                .map_err(|_| bad_line(path, line_no, "bad edge id"))?;
            let edge = by_id
                .get(&id)
                .copied()
                .ok_or_else(|| bad_line(path, line_no, &format!("unknown edge {}", id)))?;
            edges.push(edge);
        }
        if !edges.is_empty() {
            let gaps = vec![0; edges.len()];
            paths.add_pair(&edges, &gaps);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn round_trips_a_small_graph_and_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let graph_path = dir.path().join("graph.txt");
        let mut f = File::create(&graph_path).unwrap();
        writeln!(f, "# toy graph").unwrap();
        writeln!(f, "K 3").unwrap();
        writeln!(f, "E 1 2 10").unwrap();
        writeln!(f, "E 2 1 10").unwrap();
        writeln!(f, "E 3 4 20").unwrap();
        writeln!(f, "E 4 3 20").unwrap();
        writeln!(f, "L 1 3").unwrap();
        drop(f);

        let g = load_graph(&graph_path).unwrap();
        assert_eq!(g.k(), 3);
        assert_eq!(g.edges().len(), 4);

        let paths_path = dir.path().join("paths.txt");
        let mut f = File::create(&paths_path).unwrap();
        writeln!(f, "1 3").unwrap();
        writeln!(f, "2").unwrap();
        drop(f);

        let paths = load_seed_paths(&paths_path, &g).unwrap();
        assert_eq!(paths.size(), 2);
        assert_eq!(paths.get(0).size(), 2);
        assert_eq!(paths.get(0).at(0).int_id(), 1);
        assert_eq!(paths.get_conjugate(0).at(0).int_id(), 4);
    }

    #[test]
    fn unknown_edge_in_seed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let graph_path = dir.path().join("graph.txt");
        let mut f = File::create(&graph_path).unwrap();
        writeln!(f, "K 3").unwrap();
        writeln!(f, "E 1 1 10").unwrap();
        drop(f);
        let g = load_graph(&graph_path).unwrap();

        let paths_path = dir.path().join("paths.txt");
        let mut f = File::create(&paths_path).unwrap();
        writeln!(f, "1 99").unwrap();
        drop(f);
        assert!(load_seed_paths(&paths_path, &g).is_err());
    }
}
