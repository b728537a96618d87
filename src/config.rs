// src/config.rs
use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;

use serde::Deserialize;

/// Parameters of the resolution core. Every field has a working default;
/// a JSON config file may override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Nucleotide tolerance used by the path comparator.
    pub max_overlap: usize,
    /// Diagnostic threshold for "similar paths not deleted" warnings.
    pub max_repeat_length: usize,
    /// Trailing edges shorter than this are trimmed by mate-pair end
    /// removal.
    pub min_edge_len: usize,
    /// Divide observed paired info by the ideal count when scoring.
    pub normalize_weight: bool,
    /// Extension weight threshold.
    pub threshold: f64,
    /// Per-position support threshold in path-cover scoring.
    pub single_threshold: f64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            max_overlap: 100,
            max_repeat_length: 8000,
            min_edge_len: 100,
            normalize_weight: true,
            threshold: 0.5,
            single_threshold: 0.6,
        }
    }
}

impl ResolveConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn partial_json_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(f, "{{\"max_overlap\": 42, \"normalize_weight\": false}}").unwrap();
        drop(f);
        let config = ResolveConfig::load(&path).unwrap();
        assert_eq!(config.max_overlap, 42);
        assert!(!config.normalize_weight);
        assert_eq!(config.min_edge_len, ResolveConfig::default().min_edge_len);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{\"max_overlp\": 42}").unwrap();
        assert!(ResolveConfig::load(&path).is_err());
    }
}
