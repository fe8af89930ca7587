// Panel layout tree: an arena of parent and leaf nodes keyed by uuid.
//
// Nodes only refer to each other by id. The tree owns every node in a single
// map; a node is "in the workspace" once it is reachable from the root, and
// freshly created nodes sit detached until `add_child` attaches them.

pub mod error;
pub mod id;
pub mod inspect;
pub mod layout;
pub mod node;
mod ops;
pub mod percent;

#[cfg(test)]
mod proptests;

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

pub use error::PanelError;
pub use id::{LeafId, NodeId, ParentId};
pub use inspect::{InvariantIssue, InvariantReport, Outline, SizeCheck};
pub use layout::{Layout, SplitDirection};
pub use node::{
    ContentRef, Edge, EdgeDropConfig, LeafNode, LeafPatch, LeafProps, Node, NodePatch,
    ParentNode, ParentPatch, ParentProps,
};
pub use percent::{Percent, PercentError};

/// Default tolerance for "children sum to one" checks.
pub const DEFAULT_SIZE_TOLERANCE: f64 = 1e-9;

/// The panel tree: a root parent plus every node, attached or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelTree {
    root: ParentId,
    nodes: HashMap<Uuid, Node>,
    #[serde(skip)]
    size_tolerance: f64,
}

impl Default for PanelTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelTree {
    /// Create a tree holding only a root with an empty horizontal split.
    pub fn new() -> Self {
        Self::with_root_layout(Layout::default())
    }

    /// Create a tree whose root uses the given layout.
    ///
    /// Any children already listed in `layout` are dropped; the root starts
    /// empty.
    pub fn with_root_layout(layout: Layout) -> Self {
        let layout = match layout {
            Layout::Split { direction, .. } => Layout::split(direction),
            Layout::Tabs { .. } => Layout::tabs(),
        };
        let id = ParentId::new();
        let root = ParentProps {
            layout,
            edge_drop: Some(EdgeDropConfig::sides_only()),
            ..ParentProps::default()
        }
        .into_node(id);

        let mut nodes = HashMap::new();
        nodes.insert(id.uuid(), Node::Parent(root));
        Self {
            root: id,
            nodes,
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
        }
    }

    /// Override the tolerance used by size validation.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.size_tolerance = tolerance;
        self
    }

    pub fn root(&self) -> ParentId {
        self.root
    }

    pub fn size_tolerance(&self) -> f64 {
        self.size_tolerance
    }

    /// Number of nodes, attached or detached, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    // ── Lookup ────────────────────────────────────────────────────────

    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.nodes.contains_key(&id.into().uuid())
    }

    /// Look a node up by id.
    pub fn get(&self, id: impl Into<NodeId>) -> Option<&Node> {
        self.nodes.get(&id.into().uuid())
    }

    /// Look a node up, failing with `NotInTree`.
    ///
    /// `context` names the parent whose children were being walked; it is
    /// recorded on the error's parent chain.
    pub fn get_or_error(
        &self,
        id: impl Into<NodeId>,
        context: Option<ParentId>,
    ) -> Result<&Node, PanelError> {
        let id = id.into();
        self.get(id).ok_or_else(|| {
            let err = PanelError::not_in_tree(id);
            match context {
                Some(parent) => err.with_parent(parent),
                None => err,
            }
        })
    }

    /// Look a parent node up. A leaf stored under the same uuid counts as
    /// missing.
    pub fn get_parent(&self, id: ParentId) -> Option<&ParentNode> {
        self.get(id).and_then(Node::as_parent)
    }

    pub fn get_parent_or_error(
        &self,
        id: ParentId,
        context: Option<ParentId>,
    ) -> Result<&ParentNode, PanelError> {
        self.get_or_error(id, context)?.as_parent().ok_or_else(|| {
            let err = PanelError::not_in_tree(id);
            match context {
                Some(parent) => err.with_parent(parent),
                None => err,
            }
        })
    }

    /// Look a leaf node up. A parent stored under the same uuid counts as
    /// missing.
    pub fn get_leaf(&self, id: LeafId) -> Option<&LeafNode> {
        self.get(id).and_then(Node::as_leaf)
    }

    pub fn get_leaf_or_error(&self, id: LeafId) -> Result<&LeafNode, PanelError> {
        self.get_leaf(id).ok_or_else(|| PanelError::not_in_tree(id))
    }

    /// Direct children of a parent, in layout order.
    pub fn children(&self, id: ParentId) -> Result<Vec<NodeId>, PanelError> {
        Ok(self.get_parent_or_error(id, None)?.layout.children())
    }

    // ── Creation ──────────────────────────────────────────────────────

    /// Create a detached parent node.
    pub fn create_parent(&mut self, props: ParentProps) -> ParentId {
        let id = ParentId::new();
        self.nodes.insert(id.uuid(), Node::Parent(props.into_node(id)));
        log::debug!("created parent {id}");
        id
    }

    /// Create a detached leaf node.
    pub fn create_leaf(&mut self, props: LeafProps) -> LeafId {
        let id = LeafId::new();
        let node = props.into_node(id);
        log::debug!("created leaf {id} ({:?})", node.title);
        self.nodes.insert(id.uuid(), Node::Leaf(node));
        id
    }

    // ── Internal access ───────────────────────────────────────────────

    pub(crate) fn node_mut(&mut self, id: impl Into<NodeId>) -> Option<&mut Node> {
        self.nodes.get_mut(&id.into().uuid())
    }

    pub(crate) fn parent_mut(&mut self, id: ParentId) -> Option<&mut ParentNode> {
        self.node_mut(id).and_then(Node::as_parent_mut)
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id.uuid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Construction ──────────────────────────────────────────────────

    #[test]
    fn new_tree_holds_only_root() {
        let tree = PanelTree::new();
        assert_eq!(tree.len(), 1);
        let root = tree.get_parent(tree.root()).unwrap();
        assert_eq!(root.parent, None);
        assert!(root.layout.is_empty());
        assert_eq!(root.layout.direction(), Some(SplitDirection::Horizontal));
    }

    #[test]
    fn root_accepts_side_drops_only() {
        let tree = PanelTree::new();
        let root = tree.get_parent(tree.root()).unwrap();
        assert_eq!(root.edge_drop, EdgeDropConfig::sides_only());
    }

    #[test]
    fn root_layout_children_are_discarded() {
        let layout = Layout::Split {
            direction: SplitDirection::Vertical,
            children: vec![LeafId::new().into()],
        };
        let tree = PanelTree::with_root_layout(layout);
        let root = tree.get_parent(tree.root()).unwrap();
        assert_eq!(root.layout, Layout::split(SplitDirection::Vertical));
    }

    #[test]
    fn default_tolerance() {
        assert_eq!(PanelTree::new().size_tolerance(), DEFAULT_SIZE_TOLERANCE);
        assert_eq!(PanelTree::new().with_tolerance(0.01).size_tolerance(), 0.01);
    }

    // ── Lookup ────────────────────────────────────────────────────────

    #[test]
    fn get_missing_returns_none() {
        let tree = PanelTree::new();
        assert!(tree.get(LeafId::new()).is_none());
    }

    #[test]
    fn get_or_error_records_context() {
        let tree = PanelTree::new();
        let missing = LeafId::new();
        let err = tree.get_or_error(missing, Some(tree.root())).unwrap_err();
        assert_eq!(
            err,
            PanelError::NotInTree {
                id: missing.into(),
                parent_chain: vec![tree.root()],
            }
        );
    }

    #[test]
    fn get_or_error_without_context_has_empty_chain() {
        let tree = PanelTree::new();
        let missing = ParentId::new();
        let err = tree.get_or_error(missing, None).unwrap_err();
        assert_eq!(err, PanelError::not_in_tree(missing));
    }

    #[test]
    fn kind_specific_lookup_rejects_wrong_kind() {
        let mut tree = PanelTree::new();
        let leaf = tree.create_leaf(LeafProps::titled("a"));
        let as_parent = NodeId::from(leaf);
        // Same uuid, asked for as a parent.
        let parent_view = tree.get(as_parent).and_then(Node::as_parent);
        assert!(parent_view.is_none());
        assert!(tree.get_leaf(leaf).is_some());
    }

    // ── Creation ──────────────────────────────────────────────────────

    #[test]
    fn created_nodes_are_detached_with_full_share() {
        let mut tree = PanelTree::new();
        let leaf = tree.create_leaf(LeafProps::titled("Editor"));
        let parent = tree.create_parent(ParentProps::with_layout(Layout::tabs()));
        assert_eq!(tree.len(), 3);

        let leaf = tree.get_leaf(leaf).unwrap();
        assert_eq!(leaf.parent, None);
        assert_eq!(leaf.percent_of_parent, Percent::ONE);
        assert_eq!(leaf.title, "Editor");

        let parent = tree.get_parent(parent).unwrap();
        assert_eq!(parent.parent, None);
        assert!(parent.layout.is_tabs());

        let root = tree.get_parent(tree.root()).unwrap();
        assert!(root.layout.is_empty());
    }

    #[test]
    fn created_props_override_defaults() {
        let mut tree = PanelTree::new();
        let leaf = tree.create_leaf(LeafProps {
            title: "b".into(),
            content: Some(ContentRef::new("terminal")),
            percent_of_parent: Some(Percent::new(0.5).unwrap()),
            edge_drop: None,
        });
        let leaf = tree.get_leaf(leaf).unwrap();
        assert_eq!(leaf.percent_of_parent.get(), 0.5);
        assert_eq!(leaf.content.as_ref().map(ContentRef::as_str), Some("terminal"));
    }

    #[test]
    fn children_lists_layout_order() {
        let mut tree = PanelTree::new();
        let root = tree.root();
        let a = tree.create_leaf(LeafProps::titled("a"));
        let b = tree.create_leaf(LeafProps::titled("b"));
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        assert_eq!(tree.children(root).unwrap(), vec![a.into(), b.into()]);
    }
}
