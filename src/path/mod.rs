pub mod bidirectional;
pub mod container;
pub mod coverage;

pub use bidirectional::{BidirectionalPath, PathId};
pub use container::{NoopListener, PathContainer, PathListener};
pub use coverage::CoverageMap;
