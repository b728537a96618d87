pub mod counter;
pub mod paired_lib;

pub use counter::{PathCoverWeightCounter, PathsWeightCounter, ReadCountWeightCounter, WeightCounter};
pub use paired_lib::{
    EdgeWithDistance, EdgeWithPairedInfo, ExtensionAnalyzer, InsertSizeLibrary, PairedInfoLibrary,
};
