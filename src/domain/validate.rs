//! Structural checks for a built hierarchy.
//!
//! Verifies the invariants a complete hierarchy must satisfy:
//! - exactly one parentless node, the root
//! - every parent id is the child id minus its last segment
//! - ids are unique
//! - children are numbered densely from zero (only when requested)

use std::collections::HashSet;
use std::fmt;

use generational_arena::Index;

use crate::domain::arena::HierarchyArena;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Something unusual but not necessarily wrong.
    Warning,
    /// A broken invariant.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    MissingRoot,
    MultipleRoots,
    ParentMismatch,
    ChildrenGap,
    DuplicateId,
    DanglingHandle,
    /// Arena holds nodes outside the checked collection
    Unchecked,
}

/// A single problem found by [`validate_hierarchy`].
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
    pub node: Option<Index>,
}

impl ValidationIssue {
    fn error(kind: IssueKind, message: impl Into<String>, node: Option<Index>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            node,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub nodes_checked: usize,
}

impl ValidationReport {
    /// No issue of error severity.
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

/// Check `nodes` against the hierarchy invariants.
pub fn validate_hierarchy(
    arena: &HierarchyArena,
    nodes: &[Index],
    require_contiguous: bool,
) -> ValidationReport {
    let mut report = ValidationReport {
        nodes_checked: nodes.len(),
        ..ValidationReport::default()
    };
    let mut seen = HashSet::new();
    let mut parentless = Vec::new();

    for &idx in nodes {
        let Some(node) = arena.get_node(idx) else {
            report.issues.push(ValidationIssue::error(
                IssueKind::DanglingHandle,
                format!("handle {:?} is not in the arena", idx),
                Some(idx),
            ));
            continue;
        };

        if !seen.insert(node.id.segments().to_vec()) {
            report.issues.push(ValidationIssue::error(
                IssueKind::DuplicateId,
                format!("id {} occurs more than once", node.id),
                Some(idx),
            ));
        }

        match node.parent.and_then(|p| arena.get_node(p)) {
            Some(parent) if !parent.id.is_parent_of(&node.id) => {
                report.issues.push(ValidationIssue::error(
                    IssueKind::ParentMismatch,
                    format!("{} is linked below {}", node.id, parent.id),
                    Some(idx),
                ));
            }
            Some(_) => {}
            None => parentless.push(idx),
        }

        if require_contiguous {
            let mut slots: Vec<Option<usize>> = node
                .children
                .iter()
                .map(|&c| arena.get_node(c).and_then(|child| child.id.last_segment()))
                .collect();
            slots.sort();
            let dense = slots
                .iter()
                .enumerate()
                .all(|(i, slot)| *slot == Some(i));
            if !dense {
                report.issues.push(ValidationIssue::error(
                    IssueKind::ChildrenGap,
                    format!("children of {} are not numbered 0..{}", node.id, slots.len()),
                    Some(idx),
                ));
            }
        }
    }

    match parentless.len() {
        1 if arena.root() == Some(parentless[0]) => {}
        0 => report.issues.push(ValidationIssue::error(
            IssueKind::MissingRoot,
            "no parentless node",
            None,
        )),
        1 => report.issues.push(ValidationIssue::error(
            IssueKind::MissingRoot,
            "the only parentless node is not the recorded root",
            parentless.first().copied(),
        )),
        n => report.issues.push(ValidationIssue::error(
            IssueKind::MultipleRoots,
            format!("{} parentless nodes", n),
            None,
        )),
    }

    if nodes.len() != arena.len() {
        report.issues.push(ValidationIssue {
            severity: Severity::Warning,
            kind: IssueKind::Unchecked,
            message: format!("checked {} of {} arena nodes", nodes.len(), arena.len()),
            node: None,
        });
    }

    report
}
