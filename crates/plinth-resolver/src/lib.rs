//! Dependency resolution engine: a generic dependency graph that orders
//! vertices and detects cycles, the module registry seam, and the resolver
//! that computes the transitive closure of module requirements.

pub mod closure;
pub mod exclusion;
pub mod graph;
pub mod registry;

pub use closure::{resolve_closure, ClosureResolver, ClosureSet};
pub use exclusion::ExclusionSet;
pub use graph::{compute_order, DependencyGraph, Edge};
pub use registry::{InMemoryRegistry, ModuleRegistry};
