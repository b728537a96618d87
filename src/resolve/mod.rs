pub mod compare;
pub mod remover;
pub mod resolver;

pub use compare::compare_paths;
pub use remover::OverlapRemover;
pub use resolver::{PathExtendResolver, PathExtender};
