pub mod dependency_graph;
pub mod duplication;
pub mod normalize;

pub use dependency_graph::{DependencyGraph, DependencyMap, MODULE_ENTITY};
pub use duplication::detect_duplicates;
