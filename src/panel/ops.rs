// Mutation operations on the panel tree.
//
// Every operation resolves everything it is going to touch before writing
// anything, so a failed call leaves the tree exactly as it was.

use std::collections::HashSet;

use super::error::PanelError;
use super::id::{LeafId, NodeId, ParentId};
use super::layout::Layout;
use super::node::{LeafPatch, LeafProps, Node, NodePatch, ParentPatch, ParentProps};
use super::percent::Percent;
use super::PanelTree;

impl PanelTree {
    // ── Insertion ─────────────────────────────────────────────────────

    /// Attach a detached node as the last child of `parent_id`.
    ///
    /// The new child's current `percent_of_parent` acts as a weight hint:
    /// it is granted `hint / (n + 1)` of the parent and the existing
    /// children are scaled into the rest, keeping their ratios.
    pub fn add_child(
        &mut self,
        parent_id: ParentId,
        child_id: impl Into<NodeId>,
    ) -> Result<(), PanelError> {
        let child_id = child_id.into();
        let parent = self.get_parent_or_error(parent_id, None)?;
        let child = self.get_or_error(child_id, None)?;

        if parent.layout.is_tabs() {
            if let Node::Parent(p) = child {
                log::warn!("refusing to add parent {} to tabs {parent_id}", p.id);
                return Err(PanelError::CannotAddParentToTabsLayout {
                    adding_to: parent_id,
                    child: p.id,
                });
            }
        }
        if child.parent().is_some() {
            return Err(PanelError::AlreadyHasParent { id: child_id });
        }
        // The node's own id carries its real kind, whatever tag the caller used.
        let child_id = child.id();
        if child_id == NodeId::from(self.root()) {
            return Err(PanelError::RootCannotBeChild);
        }
        if let Some(child_parent) = child_id.as_parent() {
            if self.is_ancestor_or_self(child_parent, parent_id) {
                return Err(PanelError::WouldCreateCycle {
                    parent: parent_id,
                    child: child_parent,
                });
            }
        }

        let siblings = self.child_shares(parent_id)?;
        let hint = child.percent_of_parent().get();
        let n = siblings.len();
        let sum: f64 = siblings.iter().map(|(_, p)| p).sum();
        let p_new = (hint / (n as f64 + 1.0)).clamp(0.0, 1.0);

        let (child_share, sibling_shares): (f64, Vec<(NodeId, f64)>) = if sum <= 0.0 {
            if n == 0 {
                (1.0, Vec::new())
            } else {
                log::error!(
                    "children of {parent_id} sum to {sum}; resetting them to equal shares"
                );
                let each = (1.0 - p_new) / n as f64;
                (p_new, siblings.iter().map(|(id, _)| (*id, each)).collect())
            }
        } else {
            let scale = (1.0 - p_new) / sum;
            (
                p_new,
                siblings.iter().map(|(id, p)| (*id, p * scale)).collect(),
            )
        };

        for (id, share) in sibling_shares {
            if let Some(node) = self.node_mut(id) {
                node.set_percent(Percent::clamped(share));
            }
        }
        if let Some(node) = self.node_mut(child_id) {
            node.set_percent(Percent::clamped(child_share));
            node.set_parent(Some(parent_id));
        }
        if let Some(parent) = self.parent_mut(parent_id) {
            parent.layout.insert(None, child_id);
        }

        log::debug!("added {child_id} to {parent_id} ({} children)", n + 1);
        Ok(())
    }

    /// Create a parent node and attach it to `add_to`. On failure the new
    /// node is discarded.
    pub fn create_parent_in(
        &mut self,
        props: ParentProps,
        add_to: ParentId,
    ) -> Result<ParentId, PanelError> {
        let id = self.create_parent(props);
        if let Err(err) = self.add_child(add_to, id) {
            self.remove_node(id.into());
            return Err(err);
        }
        Ok(id)
    }

    /// Create a leaf node and attach it to `add_to`. On failure the new node
    /// is discarded.
    pub fn create_leaf_in(
        &mut self,
        props: LeafProps,
        add_to: ParentId,
    ) -> Result<LeafId, PanelError> {
        let id = self.create_leaf(props);
        if let Err(err) = self.add_child(add_to, id) {
            self.remove_node(id.into());
            return Err(err);
        }
        Ok(id)
    }

    // ── Removal ───────────────────────────────────────────────────────

    /// Delete a node and its whole subtree.
    ///
    /// With `remove_from_parent`, the node is first unlinked from its parent
    /// and the remaining siblings are rescaled to fill the gap.
    pub fn destroy(
        &mut self,
        id: impl Into<NodeId>,
        remove_from_parent: bool,
    ) -> Result<(), PanelError> {
        let id = id.into();
        if id == NodeId::from(self.root()) {
            log::warn!("refusing to delete the root panel");
            return Err(PanelError::CannotDeleteRoot);
        }

        let node = self.get_or_error(id, None)?;
        let detach_from = if remove_from_parent { node.parent() } else { None };
        if let Some(parent_id) = detach_from {
            self.child_shares(parent_id)?;
        }

        // Whole subtree must resolve before anything is written.
        let mut doomed = Vec::new();
        let mut seen = HashSet::new();
        if let Err(err) = self.collect_subtree(id, &mut doomed, &mut seen) {
            log::error!("refusing to delete {id}: subtree is inconsistent: {err}");
            return Err(err);
        }

        if let Some(parent_id) = detach_from {
            if let Some(parent) = self.parent_mut(parent_id) {
                parent.layout.remove(id);
                if parent.active == Some(id) {
                    parent.active = None;
                }
            }
            if let Some(node) = self.node_mut(id) {
                node.set_parent(None);
            }
            self.rebalance(parent_id, &[]);
        }

        for doomed_id in &doomed {
            self.remove_node(*doomed_id);
        }
        log::debug!("destroyed {id} ({} nodes)", doomed.len());
        Ok(())
    }

    /// Gather `id` and every descendant, failing on the first listed child
    /// that is missing. The error's parent chain runs from the missing
    /// child's parent up to `id`.
    fn collect_subtree(
        &self,
        id: NodeId,
        out: &mut Vec<NodeId>,
        seen: &mut HashSet<NodeId>,
    ) -> Result<(), PanelError> {
        if !seen.insert(id) {
            return Ok(());
        }
        out.push(id);
        let Some(parent) = self.get(id).and_then(Node::as_parent) else {
            return Ok(());
        };
        for child in parent.layout.children() {
            if !self.contains(child) {
                return Err(PanelError::not_in_tree(child).with_parent(parent.id));
            }
            self.collect_subtree(child, out, seen)
                .map_err(|err| err.with_parent(parent.id))?;
        }
        Ok(())
    }

    // ── Redistribution ────────────────────────────────────────────────

    /// Rescale the children of `parent_id` so they sum to one.
    ///
    /// Children named in `exclude` keep their share; the others are scaled
    /// into whatever remains (or split it evenly if they are all zero).
    pub fn redistribute_children(
        &mut self,
        parent_id: ParentId,
        exclude: &[NodeId],
    ) -> Result<(), PanelError> {
        self.child_shares(parent_id)?;
        self.rebalance(parent_id, exclude);
        Ok(())
    }

    /// Give every child of `parent_id` an equal share.
    pub fn uniform_children(&mut self, parent_id: ParentId) -> Result<(), PanelError> {
        let children = self.child_shares(parent_id)?;
        if children.is_empty() {
            return Ok(());
        }
        let each = Percent::clamped(1.0 / children.len() as f64);
        for (id, _) in children {
            if let Some(node) = self.node_mut(id) {
                node.set_percent(each);
            }
        }
        Ok(())
    }

    /// Resolve the parent and every child it lists, returning each child's
    /// current share in layout order.
    fn child_shares(&self, parent_id: ParentId) -> Result<Vec<(NodeId, f64)>, PanelError> {
        let parent = self.get_parent_or_error(parent_id, None)?;
        parent
            .layout
            .children()
            .into_iter()
            .map(|child| {
                let node = self.get_or_error(child, Some(parent_id))?;
                Ok((child, node.percent_of_parent().get()))
            })
            .collect()
    }

    /// Redistribution proper. Children that do not resolve are skipped;
    /// public callers validate with `child_shares` first.
    fn rebalance(&mut self, parent_id: ParentId, exclude: &[NodeId]) {
        let Some(parent) = self.get_parent(parent_id) else {
            return;
        };
        let mut fixed_sum = 0.0;
        let mut adjustable = Vec::new();
        for child in parent.layout.children() {
            let Some(node) = self.get(child) else {
                continue;
            };
            let share = node.percent_of_parent().get();
            if exclude.contains(&child) {
                fixed_sum += share;
            } else {
                adjustable.push((child, share));
            }
        }
        if adjustable.is_empty() {
            return;
        }

        let remaining = 1.0 - fixed_sum;
        let adjustable_sum: f64 = adjustable.iter().map(|(_, p)| p).sum();
        let new_shares: Vec<(NodeId, f64)> = if adjustable_sum <= 0.0 {
            let each = remaining / adjustable.len() as f64;
            adjustable.iter().map(|(id, _)| (*id, each)).collect()
        } else {
            let scale = remaining / adjustable_sum;
            adjustable.iter().map(|(id, p)| (*id, p * scale)).collect()
        };

        for (id, share) in new_shares {
            if let Some(node) = self.node_mut(id) {
                node.set_percent(Percent::clamped(share));
            }
        }
    }

    // ── Moving ────────────────────────────────────────────────────────

    /// Move a leaf from its current parent to `new_parent_id`, at `index`
    /// (clamped to the end) or appended. The leaf becomes the new parent's
    /// active child.
    ///
    /// Both parents are rebalanced afterwards; the leaf's previous share
    /// acts as its weight in the new parent. If the old parent is left with
    /// a single child it is collapsed (see `collapse_unary`).
    pub fn re_parent(
        &mut self,
        leaf_id: LeafId,
        new_parent_id: ParentId,
        index: Option<usize>,
    ) -> Result<(), PanelError> {
        let leaf = self.get_leaf_or_error(leaf_id)?;
        let Some(old_parent_id) = leaf.parent else {
            log::error!("leaf {leaf_id} is not attached to any parent; tree is inconsistent");
            return Err(PanelError::NoParent { id: leaf_id.into() });
        };
        self.child_shares(old_parent_id)?;
        let new_parent = self.get_parent_or_error(new_parent_id, None)?;

        let mut len = new_parent.layout.len();
        if old_parent_id == new_parent_id {
            len = len.saturating_sub(1);
        }
        let index = index.map(|i| i.min(len));
        self.child_shares(new_parent_id)?;

        let moving = NodeId::from(leaf_id);
        if let Some(old_parent) = self.parent_mut(old_parent_id) {
            old_parent.layout.remove(moving);
            if old_parent.active == Some(moving) {
                old_parent.active = None;
            }
        }
        if let Some(new_parent) = self.parent_mut(new_parent_id) {
            new_parent.layout.insert(index, moving);
            new_parent.active = Some(moving);
        }
        if let Some(node) = self.node_mut(moving) {
            node.set_parent(Some(new_parent_id));
        }

        self.rebalance(old_parent_id, &[]);
        self.rebalance(new_parent_id, &[]);
        log::debug!("moved leaf {leaf_id} from {old_parent_id} to {new_parent_id}");

        if old_parent_id != new_parent_id {
            self.collapse(old_parent_id);
        }
        Ok(())
    }

    /// Tidy a parent left with exactly one child.
    ///
    /// An empty parent child is deleted. A leaf child takes the parent's
    /// slot and share in the grandparent, and the emptied parent is
    /// deleted. The root, and parents with any other shape, are left alone.
    /// Returns whether anything changed.
    pub fn collapse_unary(&mut self, parent_id: ParentId) -> Result<bool, PanelError> {
        self.child_shares(parent_id)?;
        Ok(self.collapse(parent_id))
    }

    fn collapse(&mut self, parent_id: ParentId) -> bool {
        let Some(parent) = self.get_parent(parent_id) else {
            return false;
        };
        let &[only] = parent.layout.children().as_slice() else {
            return false;
        };
        let grandparent = parent.parent;
        let share = parent.percent_of_parent;

        let empty_parent = match self.get(only) {
            Some(Node::Parent(child)) if child.layout.is_empty() => true,
            Some(Node::Leaf(_)) => false,
            _ => return false,
        };

        if empty_parent {
            if let Some(parent) = self.parent_mut(parent_id) {
                parent.layout.remove(only);
                if parent.active == Some(only) {
                    parent.active = None;
                }
            }
            self.remove_node(only);
            log::debug!("removed empty parent {only} from {parent_id}");
            return true;
        }

        let Some(grandparent_id) = grandparent else {
            return false;
        };
        let slot = NodeId::from(parent_id);
        let Some(grandparent) = self.parent_mut(grandparent_id) else {
            log::error!("parent {parent_id} points at missing parent {grandparent_id}");
            return false;
        };
        if !grandparent.layout.replace(slot, only) {
            return false;
        }
        if grandparent.active == Some(slot) {
            grandparent.active = Some(only);
        }
        if let Some(node) = self.node_mut(only) {
            node.set_parent(Some(grandparent_id));
            node.set_percent(share);
        }
        self.remove_node(slot);
        log::debug!("collapsed {parent_id}; {only} moved up to {grandparent_id}");
        true
    }

    /// Put `replacement` in the slot `to_replace` occupies.
    ///
    /// `replacement` is first unlinked from its own parent (which is then
    /// rebalanced) and inherits `to_replace`'s share. `to_replace` ends up
    /// detached with a full share.
    pub fn replace_with(
        &mut self,
        to_replace: impl Into<NodeId>,
        replacement: impl Into<NodeId>,
    ) -> Result<(), PanelError> {
        let to_replace = self.get_or_error(to_replace, None)?;
        let old_id = to_replace.id();
        let Some(slot_parent_id) = to_replace.parent() else {
            return Err(PanelError::NoParent { id: old_id });
        };
        let replacement = self.get_or_error(replacement, None)?;
        let new_id = replacement.id();
        let replacement_parent = replacement.parent();
        if old_id == new_id {
            return Ok(());
        }

        let slot_parent = self.get_parent_or_error(slot_parent_id, None)?;
        if let (true, Some(p)) = (slot_parent.layout.is_tabs(), new_id.as_parent()) {
            return Err(PanelError::CannotAddParentToTabsLayout {
                adding_to: slot_parent_id,
                child: p,
            });
        }
        if new_id == NodeId::from(self.root()) {
            return Err(PanelError::RootCannotBeChild);
        }
        if let Some(p) = new_id.as_parent() {
            if self.is_ancestor_or_self(p, slot_parent_id) {
                return Err(PanelError::WouldCreateCycle {
                    parent: slot_parent_id,
                    child: p,
                });
            }
        }
        if let Some(r) = replacement_parent {
            self.child_shares(r)?;
        }

        if let Some(r) = replacement_parent {
            if let Some(parent) = self.parent_mut(r) {
                parent.layout.remove(new_id);
                if parent.active == Some(new_id) {
                    parent.active = None;
                }
            }
            if let Some(node) = self.node_mut(new_id) {
                node.set_parent(None);
            }
            self.rebalance(r, &[]);
        }

        let share = self
            .get(old_id)
            .map(Node::percent_of_parent)
            .unwrap_or_default();
        if let Some(parent) = self.parent_mut(slot_parent_id) {
            parent.layout.replace(old_id, new_id);
            if parent.active == Some(old_id) {
                parent.active = Some(new_id);
            }
        }
        if let Some(node) = self.node_mut(old_id) {
            node.set_parent(None);
            node.set_percent(Percent::ONE);
        }
        if let Some(node) = self.node_mut(new_id) {
            node.set_parent(Some(slot_parent_id));
            node.set_percent(share);
        }
        log::debug!("replaced {old_id} with {new_id} under {slot_parent_id}");
        Ok(())
    }

    /// Wrap an attached node in a new parent with the given layout kind.
    ///
    /// The new parent takes over the node's slot and share; the node becomes
    /// its only child. Returns the new parent's id.
    pub fn promote_to_parent(
        &mut self,
        id: impl Into<NodeId>,
        layout: Layout,
    ) -> Result<ParentId, PanelError> {
        let node = self.get_or_error(id, None)?;
        let id = node.id();
        let Some(slot_parent_id) = node.parent() else {
            return Err(PanelError::NoParent { id });
        };
        let slot_parent = self.get_parent_or_error(slot_parent_id, None)?;

        let layout = match layout {
            Layout::Split { direction, .. } => Layout::split(direction),
            Layout::Tabs { .. } => Layout::tabs(),
        };
        let new_parent_id = ParentId::new();
        if slot_parent.layout.is_tabs() {
            return Err(PanelError::CannotAddParentToTabsLayout {
                adding_to: slot_parent_id,
                child: new_parent_id,
            });
        }
        if let (true, Some(p)) = (layout.is_tabs(), id.as_parent()) {
            return Err(PanelError::CannotAddParentToTabsLayout {
                adding_to: new_parent_id,
                child: p,
            });
        }
        self.child_shares(slot_parent_id)?;

        let node = ParentProps::with_layout(layout).into_node(new_parent_id);
        self.nodes.insert(new_parent_id.uuid(), Node::Parent(node));

        if let Err(err) = self.replace_with(id, new_parent_id) {
            self.remove_node(new_parent_id.into());
            return Err(err);
        }
        self.add_child(new_parent_id, id)?;
        log::debug!("promoted {id} into new parent {new_parent_id}");
        Ok(new_parent_id)
    }

    // ── Updates ───────────────────────────────────────────────────────

    /// Shallow-merge shared fields onto a node.
    ///
    /// Siblings are not rebalanced; follow a share change with
    /// `redistribute_children(parent, &[id])`, or use
    /// `set_percent_of_parent` which does both.
    pub fn update(&mut self, id: impl Into<NodeId>, patch: NodePatch) -> Result<(), PanelError> {
        let id = id.into();
        self.get_or_error(id, None)?;
        if let Some(node) = self.node_mut(id) {
            node.apply(&patch);
        }
        Ok(())
    }

    pub fn update_parent(&mut self, id: ParentId, patch: ParentPatch) -> Result<(), PanelError> {
        self.get_parent_or_error(id, None)?;
        if let Some(Node::Parent(parent)) = self.node_mut(id) {
            if let Some(titlebar) = patch.titlebar {
                parent.titlebar = titlebar;
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.apply(&patch.common);
        }
        Ok(())
    }

    pub fn update_leaf(&mut self, id: LeafId, patch: LeafPatch) -> Result<(), PanelError> {
        self.get_leaf_or_error(id)?;
        if let Some(Node::Leaf(leaf)) = self.node_mut(id) {
            if let Some(title) = patch.title {
                leaf.title = title;
            }
            if let Some(content) = patch.content {
                leaf.content = content;
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.apply(&patch.common);
        }
        Ok(())
    }

    /// Set a node's share and rescale its siblings around it.
    ///
    /// A node without siblings is always left with the full share.
    pub fn set_percent_of_parent(
        &mut self,
        id: impl Into<NodeId>,
        percent: Percent,
    ) -> Result<(), PanelError> {
        let id = id.into();
        let parent_id = self.get_or_error(id, None)?.parent();
        let siblings = match parent_id {
            Some(p) => self.child_shares(p)?.len().saturating_sub(1),
            None => 0,
        };

        if let Some(node) = self.node_mut(id) {
            node.set_percent(percent);
        }
        if let Some(p) = parent_id {
            if siblings == 0 {
                self.rebalance(p, &[]);
            } else {
                self.rebalance(p, &[id]);
            }
        }
        Ok(())
    }

    /// Select the active child of a parent (the visible tab for tab
    /// stacks), or clear the selection.
    pub fn set_active(
        &mut self,
        parent_id: ParentId,
        child: Option<NodeId>,
    ) -> Result<(), PanelError> {
        let parent = self.get_parent_or_error(parent_id, None)?;
        if let Some(child) = child {
            if !parent.layout.contains(child) {
                return Err(PanelError::NotAChild {
                    parent: parent_id,
                    child,
                });
            }
        }
        if let Some(parent) = self.parent_mut(parent_id) {
            parent.active = child;
        }
        Ok(())
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: ParentId, node: ParentId) -> bool {
        let mut cursor = Some(node);
        // Bounded walk so a corrupted parent cycle cannot spin forever.
        for _ in 0..=self.len() {
            match cursor {
                Some(current) if current == ancestor => return true,
                Some(current) => cursor = self.get_parent(current).and_then(|p| p.parent),
                None => return false,
            }
        }
        false
    }
}
