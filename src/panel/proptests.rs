// Random operation sequences against the tree. After every successful call
// the structural invariants hold; after every failed call nothing changed.

use proptest::prelude::*;

use super::*;

#[derive(Debug, Clone)]
enum Op {
    CreateLeaf { percent: f64 },
    CreateParent { tabs: bool, vertical: bool },
    AddChild { parent: usize, child: usize },
    Destroy { node: usize },
    Redistribute { parent: usize, exclude: Option<usize> },
    Uniform { parent: usize },
    ReParent { leaf: usize, parent: usize, index: Option<usize> },
    SetPercent { node: usize, percent: f64 },
    SetActive { parent: usize, child: Option<usize> },
    ReplaceWith { old: usize, new: usize },
    Promote { node: usize, tabs: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let pick = 0usize..16;
    prop_oneof![
        2 => (any::<bool>(), any::<bool>(), any::<bool>(), 0.0f64..=1.0).prop_map(
            |(leaf, tabs, vertical, percent)| {
                if leaf {
                    Op::CreateLeaf { percent }
                } else {
                    Op::CreateParent { tabs, vertical }
                }
            }
        ),
        3 => (pick.clone(), pick.clone())
            .prop_map(|(parent, child)| Op::AddChild { parent, child }),
        1 => pick.clone().prop_map(|node| Op::Destroy { node }),
        1 => (pick.clone(), proptest::option::of(pick.clone()))
            .prop_map(|(parent, exclude)| Op::Redistribute { parent, exclude }),
        1 => pick.clone().prop_map(|parent| Op::Uniform { parent }),
        1 => (pick.clone(), pick.clone(), proptest::option::of(0usize..6))
            .prop_map(|(leaf, parent, index)| Op::ReParent { leaf, parent, index }),
        1 => (pick.clone(), 0.0f64..=1.0)
            .prop_map(|(node, percent)| Op::SetPercent { node, percent }),
        1 => (pick.clone(), proptest::option::of(pick.clone()))
            .prop_map(|(parent, child)| Op::SetActive { parent, child }),
        1 => (pick.clone(), pick.clone()).prop_map(|(old, new)| Op::ReplaceWith { old, new }),
        1 => (pick, any::<bool>()).prop_map(|(node, tabs)| Op::Promote { node, tabs }),
    ]
}

/// Known node ids in a stable order, followed by two ids that never exist.
fn pool(tree: &PanelTree, ghosts: (ParentId, LeafId)) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = tree.nodes().map(Node::id).collect();
    ids.sort_by_key(|id| id.uuid());
    ids.push(ghosts.0.into());
    ids.push(ghosts.1.into());
    ids
}

fn pick(ids: &[NodeId], i: usize) -> NodeId {
    ids[i % ids.len()]
}

/// Parent ids are only meaningful as parents; a leaf picked here becomes a
/// parent id with the same uuid, which the tree must reject.
fn as_parent_id(tree: &PanelTree, id: NodeId, ghost: ParentId) -> ParentId {
    match tree.get(id) {
        Some(Node::Parent(p)) => p.id,
        _ => id.as_parent().unwrap_or(ghost),
    }
}

fn as_leaf_id(tree: &PanelTree, id: NodeId, ghost: LeafId) -> LeafId {
    match tree.get(id) {
        Some(Node::Leaf(l)) => l.id,
        _ => id.as_leaf().unwrap_or(ghost),
    }
}

fn apply(tree: &mut PanelTree, op: &Op, ghosts: (ParentId, LeafId)) -> Result<(), PanelError> {
    let ids = pool(tree, ghosts);
    let parent_at = |tree: &PanelTree, i: usize| as_parent_id(tree, pick(&ids, i), ghosts.0);
    match *op {
        Op::CreateLeaf { percent } => {
            tree.create_leaf(LeafProps {
                percent_of_parent: Some(Percent::clamped(percent)),
                ..LeafProps::titled("leaf")
            });
            Ok(())
        }
        Op::CreateParent { tabs, vertical } => {
            let layout = match (tabs, vertical) {
                (true, _) => Layout::tabs(),
                (false, true) => Layout::split(SplitDirection::Vertical),
                (false, false) => Layout::split(SplitDirection::Horizontal),
            };
            tree.create_parent(ParentProps::with_layout(layout));
            Ok(())
        }
        Op::AddChild { parent, child } => {
            let parent = parent_at(&*tree, parent);
            tree.add_child(parent, pick(&ids, child))
        }
        Op::Destroy { node } => tree.destroy(pick(&ids, node), true),
        Op::Redistribute { parent, exclude } => {
            let parent = parent_at(&*tree, parent);
            let exclude: Vec<NodeId> = exclude.map(|i| pick(&ids, i)).into_iter().collect();
            tree.redistribute_children(parent, &exclude)
        }
        Op::Uniform { parent } => {
            let parent = parent_at(&*tree, parent);
            tree.uniform_children(parent)
        }
        Op::ReParent {
            leaf,
            parent,
            index,
        } => {
            let leaf = as_leaf_id(tree, pick(&ids, leaf), ghosts.1);
            let parent = parent_at(&*tree, parent);
            tree.re_parent(leaf, parent, index)
        }
        Op::SetPercent { node, percent } => {
            tree.set_percent_of_parent(pick(&ids, node), Percent::clamped(percent))
        }
        Op::SetActive { parent, child } => {
            let parent = parent_at(&*tree, parent);
            tree.set_active(parent, child.map(|i| pick(&ids, i)))
        }
        Op::ReplaceWith { old, new } => tree.replace_with(pick(&ids, old), pick(&ids, new)),
        Op::Promote { node, tabs } => {
            let layout = if tabs {
                Layout::tabs()
            } else {
                Layout::split(SplitDirection::Horizontal)
            };
            tree.promote_to_parent(pick(&ids, node), layout).map(|_| ())
        }
    }
}

proptest! {
    #[test]
    fn operations_keep_tree_consistent(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut tree = PanelTree::new();
        let ghosts = (ParentId::new(), LeafId::new());
        for op in &ops {
            let before = tree.clone();
            match apply(&mut tree, op, ghosts) {
                Ok(()) => {
                    let report = tree.check_invariants();
                    prop_assert!(report.is_ok(), "after {:?}:\n{}", op, report);
                }
                Err(err) => {
                    prop_assert_eq!(
                        &tree,
                        &before,
                        "{:?} failed with {} but changed the tree",
                        op,
                        err
                    );
                }
            }
        }
    }

    #[test]
    fn failed_destroy_serializes_identically(extra in 0usize..5) {
        let mut tree = PanelTree::new();
        let root = tree.root();
        let holder = tree.create_parent_in(ParentProps::default(), root).unwrap();
        for i in 0..extra {
            tree.create_leaf_in(LeafProps::titled(format!("{i}")), holder).unwrap();
        }
        let fake = LeafId::new();
        tree.parent_mut(holder).unwrap().layout.insert(None, fake.into());

        let before = serde_json::to_value(&tree).unwrap();
        let err = tree.destroy(holder, true).unwrap_err();
        prop_assert_eq!(err, PanelError::NotInTree { id: fake.into(), parent_chain: vec![holder] });
        prop_assert_eq!(serde_json::to_value(&tree).unwrap(), before);
    }

    #[test]
    fn add_child_sums_to_one(hints in prop::collection::vec(0.0f64..=1.0, 1..12)) {
        let mut tree = PanelTree::new();
        let root = tree.root();
        for hint in hints {
            let leaf = tree.create_leaf(LeafProps {
                percent_of_parent: Some(Percent::clamped(hint)),
                ..LeafProps::titled("x")
            });
            tree.add_child(root, leaf).unwrap();
            prop_assert!(tree.validate_children_sizes(root).unwrap().ok);
        }
    }
}
