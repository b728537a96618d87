// src/io/fasta.rs
use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::graph::AssemblyGraph;
use crate::path::{BidirectionalPath, PathContainer};

pub enum FastaWriter {
    Plain(BufWriter<File>),
    Compressed(BufWriter<GzEncoder<File>>),
}

impl FastaWriter {
    /// Open a FASTA file for writing; paths ending in `.gz` are
    /// transparently gzip-compressed.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            let encoder = GzEncoder::new(file, Compression::default());
            Ok(FastaWriter::Compressed(BufWriter::new(encoder)))
        } else {
            Ok(FastaWriter::Plain(BufWriter::new(file)))
        }
    }

    pub fn write_record(&mut self, header: &str, sequence: &str) -> Result<()> {
        match self {
            FastaWriter::Plain(writer) => {
                writeln!(writer, ">{}", header)?;
                writeln!(writer, "{}", sequence)?;
            }
            FastaWriter::Compressed(writer) => {
                writeln!(writer, ">{}", header)?;
                writeln!(writer, "{}", sequence)?;
            }
        };
        Ok(())
    }
}

/// Writes the container's current paths as FASTA, one record per
/// non-empty canonical path. Used for the snapshots between resolver
/// passes; output depends only on container state, so identical inputs
/// produce byte-identical files.
pub struct ContigWriter<'g, G: AssemblyGraph> {
    graph: &'g G,
}

impl<'g, G: AssemblyGraph> ContigWriter<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        ContigWriter { graph }
    }

    pub fn write_paths(&self, paths: &PathContainer, filename: &Path) -> Result<()> {
        let mut writer = FastaWriter::create(filename)?;
        for i in 0..paths.size() {
            let path = paths.get(i);
            if path.is_empty() {
                continue;
            }
            let header = format!(
                "contig_{} length={} edges={}",
                path.id(),
                path.length(),
                path.size()
            );
            writer.write_record(&header, &self.materialize(path))?;
        }
        Ok(())
    }

    /// Nucleotide sequence of a path. Consecutive edges share a k-prefix;
    /// a positive gap becomes an `N` run, a negative gap trims back the
    /// accumulated sequence. Falls back to the comma-joined edge-id
    /// rendering when the graph carries no sequences.
    fn materialize(&self, path: &BidirectionalPath) -> String {
        let k = self.graph.k();
        let mut out = String::new();
        for i in 0..path.size() {
            let edge = path.at(i);
            let Some(seq) = self.graph.sequence(edge) else {
                return path
                    .edges()
                    .iter()
                    .map(|e| e.int_id().to_string())
                    .collect::<Vec<_>>()
                    .join(",");
            };
            if i == 0 {
                out.push_str(seq);
                continue;
            }
            let gap = path.gap_at(i);
            if gap > 0 {
                // Disconnected jump: pad and keep the full edge sequence.
                out.extend(std::iter::repeat('N').take(gap as usize));
                out.push_str(seq);
            } else {
                let trim = (-gap) as usize;
                out.truncate(out.len().saturating_sub(trim));
                out.push_str(&seq[k.min(seq.len())..]);
            }
        }
        out
    }
}
