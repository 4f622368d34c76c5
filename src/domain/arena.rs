use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::NodeId;
use crate::domain::instance::{mean_centroid, Instance};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    /// Path-style identifier, fixed once assigned
    pub id: NodeId,
    /// Index of parent node in the arena, None for the root and for not yet attached nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
    /// Synthesized to close a gap, not present in the input
    pub artificial: bool,
    pub instances: Vec<Instance>,
    pub centroid: Option<Vec<f64>>,
}

impl HierarchyNode {
    /// A node read from input data.
    pub fn real(id: NodeId, instances: Vec<Instance>) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            artificial: false,
            instances,
            centroid: None,
        }
    }

    /// A placeholder node with no instances.
    pub fn artificial(id: NodeId, parent: Option<Index>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            artificial: true,
            instances: Vec::new(),
            centroid: None,
        }
    }
}

impl fmt::Display for HierarchyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Arena-based tree structure holding every node of one hierarchy.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Parent and child links are handles into the arena, so no node owns another.
#[derive(Debug, Clone)]
pub struct HierarchyArena {
    arena: Arena<HierarchyNode>,
    /// Handles in insertion order
    order: Vec<Index>,
    root: Option<Index>,
}

impl Default for HierarchyArena {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            order: Vec::new(),
            root: None,
        }
    }

    /// Store a node without linking it; links are managed by the builder.
    #[instrument(level = "trace", skip(self, node), fields(id = %node.id))]
    pub fn insert_node(&mut self, node: HierarchyNode) -> Index {
        let idx = self.arena.insert(node);
        self.order.push(idx);
        idx
    }

    /// Store a node ahead of all others and make it the root.
    #[instrument(level = "trace", skip(self, node), fields(id = %node.id))]
    pub fn insert_root(&mut self, node: HierarchyNode) -> Index {
        let idx = self.arena.insert(node);
        self.order.insert(0, idx);
        self.root = Some(idx);
        idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&HierarchyNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut HierarchyNode> {
        self.arena.get_mut(idx)
    }

    pub fn node(&self, idx: Index) -> DomainResult<&HierarchyNode> {
        self.arena.get(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    pub fn node_mut(&mut self, idx: Index) -> DomainResult<&mut HierarchyNode> {
        self.arena.get_mut(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All handles in insertion order.
    pub fn indices(&self) -> Vec<Index> {
        self.order.clone()
    }

    pub fn find(&self, id: &NodeId) -> Option<Index> {
        self.order
            .iter()
            .copied()
            .find(|&idx| self.arena[idx].id == *id)
    }

    /// Link `child` under `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: Index, child: Index) -> DomainResult<()> {
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Drop every parent and child link of the given nodes.
    pub fn reset_relations(&mut self, nodes: &[Index]) -> DomainResult<()> {
        for &idx in nodes {
            let node = self.node_mut(idx)?;
            node.parent = None;
            node.children.clear();
        }
        Ok(())
    }

    /// Recompute a node's centroid from its own instances, or from its whole subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn recalculate_centroid(&mut self, idx: Index, use_subtree: bool) -> DomainResult<()> {
        let centroid = if use_subtree {
            mean_centroid(self.subtree(idx).flat_map(|(_, node)| node.instances.iter()))
        } else {
            mean_centroid(&self.node(idx)?.instances)
        };
        self.node_mut(idx)?.centroid = centroid;
        Ok(())
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order walk of the subtree rooted at `idx`, `idx` included.
    pub fn subtree(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(idx))
    }

    /// Number of levels below and including the root, 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of all nodes reachable from the root that have no children.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id.to_string())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a HierarchyArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a HierarchyArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::IdScheme;

    fn node(scheme: &IdScheme, id: &str, values: &[&[f64]]) -> HierarchyNode {
        let instances = values.iter().map(|v| Instance::new(v.to_vec())).collect();
        HierarchyNode::real(scheme.parse(id).unwrap(), instances)
    }

    #[test]
    fn test_attach_links_both_directions() {
        let scheme = IdScheme::default();
        let mut arena = HierarchyArena::new();
        let root = arena.insert_root(node(&scheme, "gen", &[]));
        let child = arena.insert_node(node(&scheme, "gen.0", &[]));

        arena.attach(root, child).unwrap();

        assert_eq!(arena.node(child).unwrap().parent, Some(root));
        assert_eq!(arena.node(root).unwrap().children, vec![child]);
        assert_eq!(arena.depth(), 2);
        assert_eq!(arena.leaf_ids(), vec!["gen.0".to_string()]);
    }

    #[test]
    fn test_subtree_centroid_includes_descendants() {
        let scheme = IdScheme::default();
        let mut arena = HierarchyArena::new();
        let root = arena.insert_root(node(&scheme, "gen", &[&[0.0]]));
        let child = arena.insert_node(node(&scheme, "gen.0", &[&[4.0], &[8.0]]));
        arena.attach(root, child).unwrap();

        arena.recalculate_centroid(root, false).unwrap();
        assert_eq!(arena.node(root).unwrap().centroid, Some(vec![0.0]));

        arena.recalculate_centroid(root, true).unwrap();
        assert_eq!(arena.node(root).unwrap().centroid, Some(vec![4.0]));
    }
}
