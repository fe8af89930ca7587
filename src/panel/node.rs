// Node variants, creation props, and patches.

use serde::{Deserialize, Serialize};

use super::id::{LeafId, NodeId, ParentId};
use super::layout::Layout;
use super::percent::Percent;

/// Opaque key the rendering layer resolves to something drawable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(pub String);

impl ContentRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Which edges of a node accept a dropped panel (creating a split there).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDropConfig {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Default for EdgeDropConfig {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
            top: true,
            bottom: true,
        }
    }
}

impl EdgeDropConfig {
    /// Drop config used for the workspace root: side edges only.
    pub fn sides_only() -> Self {
        Self {
            top: false,
            bottom: false,
            ..Self::default()
        }
    }

    pub fn accepts(&self, edge: Edge) -> bool {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

/// A node that owns a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentNode {
    pub id: ParentId,
    pub parent: Option<ParentId>,
    pub percent_of_parent: Percent,
    pub layout: Layout,
    /// Selected child; for tab stacks this is the visible tab.
    pub active: Option<NodeId>,
    pub titlebar: Option<ContentRef>,
    pub edge_drop: EdgeDropConfig,
}

impl ParentNode {
    /// Index of the active child within the layout.
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.layout.position(id))
    }
}

/// A content region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pub id: LeafId,
    pub parent: Option<ParentId>,
    pub percent_of_parent: Percent,
    pub title: String,
    pub content: Option<ContentRef>,
    pub edge_drop: EdgeDropConfig,
}

/// Any node in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Parent(ParentNode),
    Leaf(LeafNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Parent(p) => p.id.into(),
            Node::Leaf(l) => l.id.into(),
        }
    }

    pub fn parent(&self) -> Option<ParentId> {
        match self {
            Node::Parent(p) => p.parent,
            Node::Leaf(l) => l.parent,
        }
    }

    pub fn percent_of_parent(&self) -> Percent {
        match self {
            Node::Parent(p) => p.percent_of_parent,
            Node::Leaf(l) => l.percent_of_parent,
        }
    }

    pub fn edge_drop(&self) -> EdgeDropConfig {
        match self {
            Node::Parent(p) => p.edge_drop,
            Node::Leaf(l) => l.edge_drop,
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, Node::Parent(_))
    }

    pub fn as_parent(&self) -> Option<&ParentNode> {
        match self {
            Node::Parent(p) => Some(p),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(l) => Some(l),
            Node::Parent(_) => None,
        }
    }

    pub(crate) fn as_parent_mut(&mut self) -> Option<&mut ParentNode> {
        match self {
            Node::Parent(p) => Some(p),
            Node::Leaf(_) => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ParentId>) {
        match self {
            Node::Parent(p) => p.parent = parent,
            Node::Leaf(l) => l.parent = parent,
        }
    }

    pub(crate) fn set_percent(&mut self, percent: Percent) {
        match self {
            Node::Parent(p) => p.percent_of_parent = percent,
            Node::Leaf(l) => l.percent_of_parent = percent,
        }
    }

    pub(crate) fn apply(&mut self, patch: &NodePatch) {
        if let Some(percent) = patch.percent_of_parent {
            self.set_percent(percent);
        }
        if let Some(edge_drop) = patch.edge_drop {
            match self {
                Node::Parent(p) => p.edge_drop = edge_drop,
                Node::Leaf(l) => l.edge_drop = edge_drop,
            }
        }
    }
}

/// Optional fields for a new parent node.
#[derive(Debug, Clone, Default)]
pub struct ParentProps {
    pub layout: Layout,
    pub percent_of_parent: Option<Percent>,
    pub titlebar: Option<ContentRef>,
    pub edge_drop: Option<EdgeDropConfig>,
}

impl ParentProps {
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub(crate) fn into_node(self, id: ParentId) -> ParentNode {
        ParentNode {
            id,
            parent: None,
            percent_of_parent: self.percent_of_parent.unwrap_or_default(),
            layout: self.layout,
            active: None,
            titlebar: self.titlebar,
            edge_drop: self.edge_drop.unwrap_or_default(),
        }
    }
}

/// Fields for a new leaf node. Only the title is required.
#[derive(Debug, Clone, Default)]
pub struct LeafProps {
    pub title: String,
    pub content: Option<ContentRef>,
    pub percent_of_parent: Option<Percent>,
    pub edge_drop: Option<EdgeDropConfig>,
}

impl LeafProps {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_node(self, id: LeafId) -> LeafNode {
        LeafNode {
            id,
            parent: None,
            percent_of_parent: self.percent_of_parent.unwrap_or_default(),
            title: self.title,
            content: self.content,
            edge_drop: self.edge_drop.unwrap_or_default(),
        }
    }
}

/// Shallow update of fields every node has.
///
/// Changing `percent_of_parent` here does not touch siblings; use
/// `set_percent_of_parent` to rebalance them in the same call.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub percent_of_parent: Option<Percent>,
    pub edge_drop: Option<EdgeDropConfig>,
}

/// Shallow update of a parent node.
#[derive(Debug, Clone, Default)]
pub struct ParentPatch {
    pub common: NodePatch,
    pub titlebar: Option<Option<ContentRef>>,
}

/// Shallow update of a leaf node.
#[derive(Debug, Clone, Default)]
pub struct LeafPatch {
    pub common: NodePatch,
    pub title: Option<String>,
    pub content: Option<Option<ContentRef>>,
}
