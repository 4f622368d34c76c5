//! Application services

pub mod hierarchy;

pub use hierarchy::{BuiltHierarchy, HierarchyService};
