//! Rebuild complete hierarchies from sparse, path-style node ids.
//!
//! Clustering tools often omit nodes that hold no instances, while the ids of
//! the remaining nodes (`gen.0.1.2`) still imply where those nodes sit. The
//! [`domain::HierarchyBuilder`] links nodes by id, synthesizes the missing
//! ancestors and, optionally, the missing siblings, and refreshes centroids.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
