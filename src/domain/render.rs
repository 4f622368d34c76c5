use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::arena::{HierarchyArena, HierarchyNode};

pub trait ToTermTree {
    fn to_term_tree(&self) -> Tree<String>;
}

/// Label shown for a node: id, then instance count or an artificial marker.
pub fn node_label(node: &HierarchyNode) -> String {
    if node.artificial {
        format!("{} [artificial]", node.id)
    } else {
        format!("{} ({} instances)", node.id, node.instances.len())
    }
}

/// One tab-separated listing row: id, kind, instance count, centroid.
pub fn node_row(node: &HierarchyNode) -> String {
    let kind = if node.artificial { "artificial" } else { "real" };
    let centroid = node
        .centroid
        .as_ref()
        .map(|c| c.iter().map(|v| format!("{:.4}", v)).join(","))
        .unwrap_or_else(|| "-".to_string());
    format!("{}\t{}\t{}\t{}", node.id, kind, node.instances.len(), centroid)
}

impl ToTermTree for HierarchyArena {
    fn to_term_tree(&self) -> Tree<String> {
        fn build_tree(arena: &HierarchyArena, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(node_label(child));
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.root().and_then(|idx| self.get_node(idx).map(|node| (idx, node))) {
            Some((root_idx, root)) => {
                let mut tree = Tree::new(node_label(root));
                build_tree(self, root_idx, &mut tree);
                tree
            }
            None => Tree::new("Empty hierarchy".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::IdScheme;
    use crate::domain::instance::Instance;

    #[test]
    fn test_rendered_tree_marks_artificial_nodes() {
        let scheme = IdScheme::default();
        let mut arena = HierarchyArena::new();
        let root = arena.insert_root(HierarchyNode::artificial(scheme.root_id().clone(), None));
        let child = arena.insert_node(HierarchyNode::real(
            scheme.parse("gen.0").unwrap(),
            vec![Instance::new(vec![1.0])],
        ));
        arena.attach(root, child).unwrap();

        let rendered = arena.to_term_tree().to_string();

        assert!(rendered.contains("gen [artificial]"));
        assert!(rendered.contains("gen.0 (1 instances)"));
    }

    #[test]
    fn test_row_without_centroid_uses_placeholder() {
        let scheme = IdScheme::default();
        let node = HierarchyNode::artificial(scheme.parse("gen.4").unwrap(), None);
        assert_eq!(node_row(&node), "gen.4\tartificial\t0\t-");
    }
}
