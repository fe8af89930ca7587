// Parent layouts: linear splits and tab stacks.

use serde::{Deserialize, Serialize};

use super::id::{LeafId, NodeId};

/// Axis a split arranges its children along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDirection {
    /// Children side by side, left to right.
    #[default]
    Horizontal,
    /// Children stacked top to bottom.
    Vertical,
}

impl SplitDirection {
    /// The perpendicular direction.
    pub fn cross(self) -> Self {
        match self {
            SplitDirection::Horizontal => SplitDirection::Vertical,
            SplitDirection::Vertical => SplitDirection::Horizontal,
        }
    }
}

/// How a parent arranges its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layout {
    /// Children laid out linearly and sized by `percent_of_parent`.
    /// Either kind of node may appear here.
    Split {
        direction: SplitDirection,
        children: Vec<NodeId>,
    },
    /// A stack with one visible child. Leaves only.
    Tabs { children: Vec<LeafId> },
}

impl Default for Layout {
    fn default() -> Self {
        Layout::split(SplitDirection::default())
    }
}

impl Layout {
    /// An empty split.
    pub fn split(direction: SplitDirection) -> Self {
        Layout::Split {
            direction,
            children: Vec::new(),
        }
    }

    /// An empty tab stack.
    pub fn tabs() -> Self {
        Layout::Tabs {
            children: Vec::new(),
        }
    }

    pub fn is_tabs(&self) -> bool {
        matches!(self, Layout::Tabs { .. })
    }

    /// Split direction, if this is a split.
    pub fn direction(&self) -> Option<SplitDirection> {
        match self {
            Layout::Split { direction, .. } => Some(*direction),
            Layout::Tabs { .. } => None,
        }
    }

    /// Children in layout order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Layout::Split { children, .. } => children.clone(),
            Layout::Tabs { children } => children.iter().copied().map(NodeId::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Layout::Split { children, .. } => children.len(),
            Layout::Tabs { children } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `id` among the children.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        match self {
            Layout::Split { children, .. } => children.iter().position(|c| *c == id),
            Layout::Tabs { children } => children.iter().position(|c| NodeId::from(*c) == id),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    /// Remove every occurrence of `id`. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        let before = self.len();
        match self {
            Layout::Split { children, .. } => children.retain(|c| *c != id),
            Layout::Tabs { children } => children.retain(|c| NodeId::from(*c) != id),
        }
        self.len() != before
    }

    /// Insert `id` at `index`, appending when `None` or past the end.
    ///
    /// Callers check the stored node kind first; a parent id offered to a
    /// tab stack is ignored here.
    pub(crate) fn insert(&mut self, index: Option<usize>, id: NodeId) {
        match self {
            Layout::Split { children, .. } => match index {
                Some(i) => children.insert(i.min(children.len()), id),
                None => children.push(id),
            },
            Layout::Tabs { children } => {
                if let Some(leaf) = id.as_leaf() {
                    match index {
                        Some(i) => children.insert(i.min(children.len()), leaf),
                        None => children.push(leaf),
                    }
                }
            }
        }
    }

    /// Swap `old` for `new` in place, keeping its position.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(index) = self.position(old) else {
            return false;
        };
        match self {
            Layout::Split { children, .. } => children[index] = new,
            Layout::Tabs { children } => match new.as_leaf() {
                Some(leaf) => children[index] = leaf,
                None => return false,
            },
        }
        true
    }
}
