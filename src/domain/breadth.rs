//! Breadth-gap repair: synthesize missing siblings.
//!
//! After depth repair every node hangs below the root, but a node's children may
//! still skip indices (`gen.0.0`, `gen.0.2`). Breadth repair fills those slots so
//! the children of each node are numbered densely from zero.

use std::collections::VecDeque;

use generational_arena::Index;
use tracing::{debug, trace};

use crate::domain::arena::{HierarchyArena, HierarchyNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::IdScheme;

/// Breadth-first walk from `root`, filling child-index gaps at every node.
///
/// Returns the handles of all created artificial nodes. Created nodes are leaves
/// and are not visited themselves. `max_gap` bounds the number of siblings
/// created under any one node.
pub fn fix_breadth_gaps(
    arena: &mut HierarchyArena,
    scheme: &IdScheme,
    root: Index,
    max_gap: Option<usize>,
) -> DomainResult<Vec<Index>> {
    let mut artificial = Vec::new();
    let mut pending = VecDeque::from([root]);

    while let Some(current) = pending.pop_front() {
        // Capture children before this level is modified
        pending.extend(arena.node(current)?.children.iter().copied());
        artificial.extend(fix_breadth_gaps_in_node(arena, scheme, current, max_gap)?);
    }

    debug!("fix_breadth_gaps: created {} artificial nodes", artificial.len());
    Ok(artificial)
}

/// Fill child-index gaps of a single node, leaving its children sorted by id.
///
/// Fails with [`DomainError::BreadthGapTooWide`] before creating anything when
/// more than `max_gap` siblings are missing.
pub fn fix_breadth_gaps_in_node(
    arena: &mut HierarchyArena,
    scheme: &IdScheme,
    node: Index,
    max_gap: Option<usize>,
) -> DomainResult<Vec<Index>> {
    let node_id = arena.node(node)?.id.clone();
    let mut artificial = Vec::new();

    let current = std::mem::take(&mut arena.node_mut(node)?.children);
    let mut keyed = current
        .into_iter()
        .map(|child| Ok((arena.node(child)?.id.clone(), child)))
        .collect::<DomainResult<Vec<_>>>()?;
    keyed.sort();
    let missing = keyed
        .iter()
        .filter_map(|(id, _)| id.last_segment())
        .max()
        .map_or(0, |highest| (highest + 1).saturating_sub(keyed.len()));
    if missing > 0 {
        debug!("fix_breadth_gaps_in_node: {} has {} missing children", node_id, missing);
    }
    if let Some(limit) = max_gap.filter(|&limit| missing > limit) {
        return Err(DomainError::BreadthGapTooWide {
            parent: node_id.to_string(),
            missing,
            limit,
        });
    }
    let mut children: Vec<Index> = keyed.into_iter().map(|(_, child)| child).collect();

    // The list grows while it is walked: after an insertion at `i` the original
    // child moves to `i + 1` and is examined again on the next pass.
    let mut i = 0;
    while i < children.len() {
        let child_id = arena.node(children[i])?.id.clone();
        let slot = child_id.last_segment();

        if slot == Some(i) {
            if !node_id.is_ancestor_of(&child_id) {
                return Err(DomainError::AncestryContradiction {
                    parent: node_id.to_string(),
                    child: child_id.to_string(),
                });
            }
        } else if slot.is_some_and(|s| s > i) {
            let new_id = node_id.child(i, scheme);
            trace!("fix_breadth_gaps_in_node: creating {}", new_id);
            let new_idx = arena.insert_node(HierarchyNode::artificial(new_id, Some(node)));
            children.insert(i, new_idx);
            artificial.push(new_idx);
        } else {
            // Slot already passed or no segment at all: ids and links disagree
            return Err(DomainError::AncestryContradiction {
                parent: node_id.to_string(),
                child: child_id.to_string(),
            });
        }
        i += 1;
    }

    arena.node_mut(node)?.children = children;
    Ok(artificial)
}
