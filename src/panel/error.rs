// Panel tree failures. Every precondition failure is reported before the
// tree is touched.

use super::id::{NodeId, ParentId};

/// Errors returned by panel tree operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    /// Lookup failure. `parent_chain` lists the ancestors that were being
    /// walked when the node turned up missing, nearest first.
    #[error("node '{id}' is not in the tree; parent chain: [{}]", format_chain(.parent_chain))]
    NotInTree {
        id: NodeId,
        parent_chain: Vec<ParentId>,
    },

    #[error("node '{id}' already has a parent")]
    AlreadyHasParent { id: NodeId },

    #[error("node '{id}' has no parent")]
    NoParent { id: NodeId },

    #[error("cannot delete root panel")]
    CannotDeleteRoot,

    #[error(
        "cannot add child '{child}' which is a parent to '{adding_to}' which has a tabs layout"
    )]
    CannotAddParentToTabsLayout { adding_to: ParentId, child: ParentId },

    #[error("the root panel cannot become a child")]
    RootCannotBeChild,

    #[error("adding '{child}' under '{parent}' would make it its own ancestor")]
    WouldCreateCycle { parent: ParentId, child: ParentId },

    #[error("node '{child}' is not a child of '{parent}'")]
    NotAChild { parent: ParentId, child: NodeId },
}

impl PanelError {
    pub fn not_in_tree(id: impl Into<NodeId>) -> Self {
        PanelError::NotInTree {
            id: id.into(),
            parent_chain: Vec::new(),
        }
    }

    /// Record an ancestor on a `NotInTree` error; other variants pass through.
    pub fn with_parent(mut self, parent: ParentId) -> Self {
        if let PanelError::NotInTree { parent_chain, .. } = &mut self {
            parent_chain.push(parent);
        }
        self
    }
}

fn format_chain(chain: &[ParentId]) -> String {
    chain
        .iter()
        .map(|id| format!("'{id}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
