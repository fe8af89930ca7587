// Read-only diagnostics: size validation, whole-tree invariant checks, and a
// text outline for logs.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::error::PanelError;
use super::id::{NodeId, ParentId};
use super::layout::Layout;
use super::node::Node;
use super::PanelTree;

/// Result of `validate_children_sizes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeCheck {
    pub ok: bool,
    /// Absolute deviation of the children's sum from one.
    pub difference: f64,
}

/// One broken structural rule found by `check_invariants`.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum InvariantIssue {
    #[error("root {0} is missing")]
    MissingRoot(ParentId),

    #[error("root {0} has a parent")]
    RootHasParent(ParentId),

    #[error("{child} points at parent {parent}, which is not in the tree")]
    DanglingParent { child: NodeId, parent: ParentId },

    #[error("{child} points at parent {parent}, which does not list it")]
    NotListedByParent { child: NodeId, parent: ParentId },

    #[error("{child} is listed more than once")]
    ListedTwice { child: NodeId },

    #[error("{parent} lists {child}, which is not in the tree")]
    MissingChild { parent: ParentId, child: NodeId },

    #[error("{parent} lists {child}, whose parent is {actual:?}")]
    ChildParentMismatch {
        parent: ParentId,
        child: NodeId,
        actual: Option<ParentId>,
    },

    #[error("children of {parent} sum to {sum}")]
    SizeMismatch { parent: ParentId, sum: f64 },

    #[error("tabs {parent} holds parent node {child}")]
    ParentInTabs { parent: ParentId, child: NodeId },

    #[error("{parent} marks {active} active but does not list it")]
    ActiveNotAChild { parent: ParentId, active: NodeId },
}

/// Every issue found in one pass over the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvariantReport {
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for InvariantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "ok");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {issue}")?;
        }
        Ok(())
    }
}

impl PanelTree {
    /// Check that the children of `parent_id` sum to one within the tree's
    /// tolerance. An empty parent passes.
    pub fn validate_children_sizes(&self, parent_id: ParentId) -> Result<SizeCheck, PanelError> {
        let parent = self.get_parent_or_error(parent_id, None)?;
        if parent.layout.is_empty() {
            return Ok(SizeCheck {
                ok: true,
                difference: 0.0,
            });
        }
        let mut sum = 0.0;
        for child in parent.layout.children() {
            sum += self
                .get_or_error(child, Some(parent_id))?
                .percent_of_parent()
                .get();
        }
        let difference = (sum - 1.0).abs();
        Ok(SizeCheck {
            ok: difference <= self.size_tolerance(),
            difference,
        })
    }

    /// Walk every node and collect each structural problem.
    ///
    /// Detached nodes (no parent, not the root) are legal and not reported.
    pub fn check_invariants(&self) -> InvariantReport {
        let mut issues = Vec::new();
        let root = self.root();
        match self.get_parent(root) {
            None => issues.push(InvariantIssue::MissingRoot(root)),
            Some(node) if node.parent.is_some() => {
                issues.push(InvariantIssue::RootHasParent(root))
            }
            Some(_) => {}
        }

        let mut listed: HashMap<NodeId, ParentId> = HashMap::new();
        let mut reported_twice: HashSet<NodeId> = HashSet::new();

        let mut parents: Vec<_> = self.nodes().filter_map(Node::as_parent).collect();
        parents.sort_by_key(|p| p.id);
        for parent in parents {
            let mut sum = 0.0;
            let children = parent.layout.children();
            for child in &children {
                if listed.insert(*child, parent.id).is_some() && reported_twice.insert(*child) {
                    issues.push(InvariantIssue::ListedTwice { child: *child });
                }
                let Some(node) = self.get(*child) else {
                    issues.push(InvariantIssue::MissingChild {
                        parent: parent.id,
                        child: *child,
                    });
                    continue;
                };
                if node.parent() != Some(parent.id) {
                    issues.push(InvariantIssue::ChildParentMismatch {
                        parent: parent.id,
                        child: *child,
                        actual: node.parent(),
                    });
                }
                if matches!(parent.layout, Layout::Tabs { .. }) && node.is_parent() {
                    issues.push(InvariantIssue::ParentInTabs {
                        parent: parent.id,
                        child: *child,
                    });
                }
                sum += node.percent_of_parent().get();
            }
            if !children.is_empty() && (sum - 1.0).abs() > self.size_tolerance() {
                issues.push(InvariantIssue::SizeMismatch {
                    parent: parent.id,
                    sum,
                });
            }
            if let Some(active) = parent.active {
                if !parent.layout.contains(active) {
                    issues.push(InvariantIssue::ActiveNotAChild {
                        parent: parent.id,
                        active,
                    });
                }
            }
        }

        let mut nodes: Vec<_> = self.nodes().collect();
        nodes.sort_by_key(|n| n.id().uuid());
        for node in nodes {
            let Some(parent_id) = node.parent() else {
                continue;
            };
            match self.get_parent(parent_id) {
                None => issues.push(InvariantIssue::DanglingParent {
                    child: node.id(),
                    parent: parent_id,
                }),
                Some(parent) if !parent.layout.contains(node.id()) => {
                    issues.push(InvariantIssue::NotListedByParent {
                        child: node.id(),
                        parent: parent_id,
                    })
                }
                Some(_) => {}
            }
        }

        InvariantReport { issues }
    }

    /// Indented text rendering of the tree from the root.
    pub fn outline(&self) -> Outline<'_> {
        Outline { tree: self }
    }
}

/// `Display` adaptor returned by `PanelTree::outline`.
pub struct Outline<'a> {
    tree: &'a PanelTree,
}

impl Outline<'_> {
    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        depth: usize,
        seen: &mut HashSet<NodeId>,
    ) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let short = short_id(id);
        if !seen.insert(id) {
            return writeln!(f, "{indent}{short} (cycle)");
        }
        let Some(node) = self.tree.get(id) else {
            return writeln!(f, "{indent}{short} (missing)");
        };
        let percent = node.percent_of_parent();
        match node {
            Node::Parent(parent) => {
                let layout = match parent.layout.direction() {
                    Some(direction) => format!("split {direction:?}").to_lowercase(),
                    None => "tabs".to_string(),
                };
                writeln!(f, "{indent}{short} {percent} [{layout}]")?;
                for child in parent.layout.children() {
                    if parent.active == Some(child) {
                        write!(f, "*")?;
                    }
                    self.write_node(f, child, depth + 1, seen)?;
                }
                Ok(())
            }
            Node::Leaf(leaf) => writeln!(f, "{indent}{short} {percent} {:?}", leaf.title),
        }
    }
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = HashSet::new();
        self.write_node(f, self.tree.root().into(), 0, &mut seen)?;
        let detached = self
            .tree
            .nodes()
            .filter(|n| n.parent().is_none() && n.id() != NodeId::from(self.tree.root()))
            .count();
        if detached > 0 {
            writeln!(f, "({detached} detached)")?;
        }
        Ok(())
    }
}

fn short_id(id: NodeId) -> String {
    let mut s = id.to_string();
    s.truncate(8);
    s
}
