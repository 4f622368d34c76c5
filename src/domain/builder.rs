//! Hierarchy builder: turns a sparse set of nodes into a complete tree.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, info, instrument};

use crate::domain::arena::{HierarchyArena, HierarchyNode};
use crate::domain::breadth::fix_breadth_gaps;
use crate::domain::depth::fix_depth_gaps;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::IdScheme;

/// Switches for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Also fill missing siblings so children are numbered densely from zero
    pub fix_breadth_gaps: bool,
    /// Centroids include the instances of all descendants
    pub use_subtree: bool,
    /// Most siblings breadth repair may synthesize under one node, unbounded if None
    pub max_breadth_gap: Option<usize>,
}

/// Constructs complete hierarchies from nodes whose ids imply the tree shape.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    scheme: IdScheme,
    options: BuildOptions,
}

impl HierarchyBuilder {
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn scheme(&self) -> &IdScheme {
        &self.scheme
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Build a complete hierarchy in place and return every node in id order.
    ///
    /// Synthesizes a root when the arena has none, links nodes by id, fills
    /// depth gaps (and breadth gaps if enabled), then refreshes all centroids.
    /// On error the arena must be discarded: it may hold a partially linked tree.
    #[instrument(level = "debug", skip(self, arena), fields(nodes = arena.len()))]
    pub fn build_complete_hierarchy(&self, arena: &mut HierarchyArena) -> DomainResult<Vec<Index>> {
        let mut nodes = arena.indices();

        let root = match arena.root() {
            Some(root) => root,
            None => {
                let root_id = self.scheme.root_id().clone();
                debug!("build_complete_hierarchy: root missing, creating {}", root_id);
                let root = arena.insert_root(HierarchyNode::artificial(root_id, None));
                nodes.insert(0, root);
                root
            }
        };
        check_unique_ids(arena, &nodes)?;

        create_parent_child_relations(arena, &nodes)?;

        let depth_fixes = fix_depth_gaps(arena, &self.scheme, root, &nodes)?;
        debug!("build_complete_hierarchy: {} depth gap nodes", depth_fixes.len());
        nodes.extend(depth_fixes);

        if self.options.fix_breadth_gaps {
            let breadth_fixes =
                fix_breadth_gaps(arena, &self.scheme, root, self.options.max_breadth_gap)?;
            debug!("build_complete_hierarchy: {} breadth gap nodes", breadth_fixes.len());
            nodes.extend(breadth_fixes);
        }

        for &idx in &nodes {
            arena.recalculate_centroid(idx, self.options.use_subtree)?;
        }

        let mut keyed = nodes
            .into_iter()
            .map(|idx| Ok((arena.node(idx)?.id.clone(), idx)))
            .collect::<DomainResult<Vec<_>>>()?;
        keyed.sort();

        info!(
            "Built hierarchy with {} nodes ({} artificial)",
            keyed.len(),
            keyed
                .iter()
                .filter(|(_, idx)| arena.get_node(*idx).is_some_and(|n| n.artificial))
                .count()
        );
        Ok(keyed.into_iter().map(|(_, idx)| idx).collect())
    }
}

/// Reset all links of `nodes`, then link every pair whose ids are parent and child.
///
/// Nodes whose parent id is absent stay unattached; depth repair handles them.
pub fn create_parent_child_relations(arena: &mut HierarchyArena, nodes: &[Index]) -> DomainResult<()> {
    arena.reset_relations(nodes)?;

    let ids = nodes
        .iter()
        .map(|&idx| Ok(arena.node(idx)?.id.clone()))
        .collect::<DomainResult<Vec<_>>>()?;

    for (i, parent_id) in ids.iter().enumerate() {
        for (j, child_id) in ids.iter().enumerate() {
            if i != j && parent_id.is_parent_of(child_id) {
                arena.attach(nodes[i], nodes[j])?;
            }
        }
    }
    Ok(())
}

fn check_unique_ids(arena: &HierarchyArena, nodes: &[Index]) -> DomainResult<()> {
    let mut seen: HashMap<&[usize], Index> = HashMap::with_capacity(nodes.len());
    for &idx in nodes {
        let id = &arena.node(idx)?.id;
        if seen.insert(id.segments(), idx).is_some() {
            return Err(DomainError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(arena: &mut HierarchyArena, scheme: &IdScheme, id: &str) -> Index {
        arena.insert_node(HierarchyNode::real(scheme.parse(id).unwrap(), Vec::new()))
    }

    #[test]
    fn test_relations_link_only_direct_children() {
        let scheme = IdScheme::default();
        let mut arena = HierarchyArena::new();
        let root = insert(&mut arena, &scheme, "gen");
        let a = insert(&mut arena, &scheme, "gen.0");
        let deep = insert(&mut arena, &scheme, "gen.0.1.1");
        let nodes = arena.indices();

        create_parent_child_relations(&mut arena, &nodes).unwrap();

        assert_eq!(arena.node(root).unwrap().children, vec![a]);
        assert_eq!(arena.node(a).unwrap().parent, Some(root));
        assert!(arena.node(a).unwrap().children.is_empty());
        assert_eq!(arena.node(deep).unwrap().parent, None);
    }

    #[test]
    fn test_relations_are_reset_before_linking() {
        let scheme = IdScheme::default();
        let mut arena = HierarchyArena::new();
        let root = insert(&mut arena, &scheme, "gen");
        let a = insert(&mut arena, &scheme, "gen.0");
        let nodes = arena.indices();

        create_parent_child_relations(&mut arena, &nodes).unwrap();
        create_parent_child_relations(&mut arena, &nodes).unwrap();

        assert_eq!(arena.node(root).unwrap().children, vec![a]);
    }

    #[test]
    fn test_duplicate_segments_are_rejected() {
        let scheme = IdScheme::default();
        let mut arena = HierarchyArena::new();
        insert(&mut arena, &scheme, "gen.0");
        insert(&mut arena, &scheme, "other.0");

        let err = HierarchyBuilder::default()
            .build_complete_hierarchy(&mut arena)
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateId("other.0".into()));
    }
}
