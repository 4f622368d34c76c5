//! Domain layer: identifiers, the node arena and hierarchy repair
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod breadth;
pub mod builder;
pub mod depth;
pub mod error;
pub mod id;
pub mod instance;
pub mod render;
pub mod validate;

pub use arena::{HierarchyArena, HierarchyNode};
pub use builder::{create_parent_child_relations, BuildOptions, HierarchyBuilder};
pub use error::{DomainError, DomainResult};
pub use id::{IdScheme, NodeId};
pub use instance::{InputFormat, Instance, InstanceRecord};
pub use render::ToTermTree;
pub use validate::{validate_hierarchy, IssueKind, Severity, ValidationReport};

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string, leaving it untouched on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
