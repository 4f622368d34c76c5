//! Depth-gap repair: synthesize missing ancestors.
//!
//! A gap in depth appears when the input omitted a node (it held no instances)
//! whose existence is still implied by the ids of its descendants.

use generational_arena::Index;
use tracing::{debug, trace};

use crate::domain::arena::{HierarchyArena, HierarchyNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::{IdScheme, NodeId};

/// Attach every parentless node except `root` to its nearest ancestor, creating
/// the missing intermediate nodes on the way.
///
/// Returns the handles of the created artificial nodes. Fails with
/// [`DomainError::NoAncestor`] when a node has no ancestor at all.
pub fn fix_depth_gaps(
    arena: &mut HierarchyArena,
    scheme: &IdScheme,
    root: Index,
    nodes: &[Index],
) -> DomainResult<Vec<Index>> {
    let mut artificial = Vec::new();

    for &idx in nodes {
        if idx == root {
            continue;
        }
        let node = arena.node(idx)?;
        if node.parent.is_some() {
            continue;
        }
        let id = node.id.clone();

        // Real candidates first, then synthesized ones only when strictly deeper
        let mut nearest = find_nearest_ancestor(arena, nodes, &id, None)?;
        let real_depth = match nearest {
            Some(candidate) => Some(arena.node(candidate)?.id.depth()),
            None => None,
        };
        if let Some(candidate) = find_nearest_ancestor(arena, &artificial, &id, real_depth)? {
            nearest = Some(candidate);
        }

        let ancestor = nearest.ok_or_else(|| DomainError::NoAncestor(id.to_string()))?;
        let created = fix_depth_gaps_between(arena, scheme, ancestor, idx)?;
        if !created.is_empty() {
            debug!("fix_depth_gaps: {} needed {} artificial ancestors", id, created.len());
        }
        artificial.extend(created);
    }

    Ok(artificial)
}

/// Create the chain of nodes strictly between `ancestor` and `descendant` and link it.
///
/// When no intermediate level is missing, `descendant` is attached directly.
pub fn fix_depth_gaps_between(
    arena: &mut HierarchyArena,
    scheme: &IdScheme,
    ancestor: Index,
    descendant: Index,
) -> DomainResult<Vec<Index>> {
    let descendant_segments = arena.node(descendant)?.id.segments().to_vec();
    let mut current = ancestor;
    let mut current_id = arena.node(ancestor)?.id.clone();
    let mut created = Vec::new();

    for &segment in descendant_segments
        .iter()
        .take(descendant_segments.len().saturating_sub(1))
        .skip(current_id.depth())
    {
        let new_id = current_id.child(segment, scheme);
        trace!("fix_depth_gaps_between: creating {}", new_id);

        let new_idx = arena.insert_node(HierarchyNode::artificial(new_id.clone(), None));
        arena.attach(current, new_idx)?;
        created.push(new_idx);

        current = new_idx;
        current_id = new_id;
    }

    arena.attach(current, descendant)?;
    Ok(created)
}

/// Deepest node in `pool` that is an ancestor of `id`.
///
/// Only candidates deeper than `min_depth` qualify, so a later search can be
/// restricted to results that improve on an earlier one.
pub fn find_nearest_ancestor(
    arena: &HierarchyArena,
    pool: &[Index],
    id: &NodeId,
    min_depth: Option<usize>,
) -> DomainResult<Option<Index>> {
    let mut best: Option<(Index, usize)> = None;

    for &candidate in pool {
        let candidate_id = &arena.node(candidate)?.id;
        let depth = candidate_id.depth();
        let floor = best.map(|(_, d)| Some(d)).unwrap_or(min_depth);
        if floor.is_some_and(|f| depth <= f) {
            continue;
        }
        if candidate_id.is_ancestor_of(id) {
            best = Some((candidate, depth));
        }
    }

    Ok(best.map(|(idx, _)| idx))
}
