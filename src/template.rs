// Declarative layout templates: a nested description of splits, tab stacks,
// and leaves that is turned into a fresh `PanelTree`.

use serde::{Deserialize, Serialize};

use crate::panel::{
    ContentRef, Layout, LeafProps, NodeId, NodePatch, PanelError, PanelTree, ParentId,
    ParentProps, Percent, PercentError, SplitDirection,
};

/// One node of a layout template.
///
/// `percent` pins a node's share of its parent; siblings without one share
/// whatever is left equally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelTemplate {
    Split {
        #[serde(default)]
        direction: SplitDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        percent: Option<f64>,
        #[serde(default)]
        children: Vec<PanelTemplate>,
    },
    Tabs {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        percent: Option<f64>,
        /// Index of the visible tab. Defaults to the first one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<usize>,
        #[serde(default)]
        children: Vec<PanelTemplate>,
    },
    Leaf {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        percent: Option<f64>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("invalid percent: {0}")]
    Percent(#[from] PercentError),
    #[error("pinned percents under one parent add up to {sum}, more than 1")]
    PercentOverflow { sum: f64 },
    #[error("active tab {index} is out of range for {len} tabs")]
    ActiveOutOfRange { index: usize, len: usize },
}

impl PanelTemplate {
    pub fn leaf(title: impl Into<String>) -> Self {
        PanelTemplate::Leaf {
            title: title.into(),
            content: None,
            percent: None,
        }
    }

    fn percent(&self) -> Option<f64> {
        match self {
            PanelTemplate::Split { percent, .. }
            | PanelTemplate::Tabs { percent, .. }
            | PanelTemplate::Leaf { percent, .. } => *percent,
        }
    }

    /// Create this node (and its subtree) and attach it under `parent`.
    fn attach(&self, tree: &mut PanelTree, parent: ParentId) -> Result<NodeId, TemplateError> {
        match self {
            PanelTemplate::Leaf { title, content, .. } => {
                let props = LeafProps {
                    title: title.clone(),
                    content: content.as_deref().map(ContentRef::new),
                    ..LeafProps::default()
                };
                Ok(tree.create_leaf_in(props, parent)?.into())
            }
            PanelTemplate::Split {
                direction,
                children,
                ..
            } => {
                let props = ParentProps::with_layout(Layout::split(*direction));
                let id = tree.create_parent_in(props, parent)?;
                attach_children(tree, id, children)?;
                Ok(id.into())
            }
            PanelTemplate::Tabs {
                active, children, ..
            } => {
                let id = tree.create_parent_in(ParentProps::with_layout(Layout::tabs()), parent)?;
                let tabs = attach_children(tree, id, children)?;
                let selected = match active {
                    Some(index) => Some(*tabs.get(*index).ok_or(
                        TemplateError::ActiveOutOfRange {
                            index: *index,
                            len: tabs.len(),
                        },
                    )?),
                    None => tabs.first().copied(),
                };
                tree.set_active(id, selected)?;
                Ok(id.into())
            }
        }
    }
}

/// Attach `templates` under `parent` in order, then apply pinned percents.
fn attach_children(
    tree: &mut PanelTree,
    parent: ParentId,
    templates: &[PanelTemplate],
) -> Result<Vec<NodeId>, TemplateError> {
    let mut ids = Vec::with_capacity(templates.len());
    let mut pinned = Vec::new();
    let mut pinned_sum = 0.0;
    for template in templates {
        let id = template.attach(tree, parent)?;
        if let Some(raw) = template.percent() {
            let percent = Percent::new(raw)?;
            pinned_sum += percent.get();
            pinned.push((id, percent));
        }
        ids.push(id);
    }
    if pinned.is_empty() {
        return Ok(ids);
    }
    if pinned_sum > 1.0 + tree.size_tolerance() {
        return Err(TemplateError::PercentOverflow { sum: pinned_sum });
    }

    for (id, percent) in &pinned {
        tree.update(
            *id,
            NodePatch {
                percent_of_parent: Some(*percent),
                ..NodePatch::default()
            },
        )?;
    }
    // With every child pinned the pins are treated as weights.
    let fixed: Vec<NodeId> = if pinned.len() == ids.len() {
        Vec::new()
    } else {
        pinned.iter().map(|(id, _)| *id).collect()
    };
    tree.redistribute_children(parent, &fixed)?;
    Ok(ids)
}

/// Build a fresh tree whose root is a split in `direction`, holding
/// `children`.
pub fn build_tree(
    direction: SplitDirection,
    children: &[PanelTemplate],
    size_tolerance: f64,
) -> Result<PanelTree, TemplateError> {
    let mut tree =
        PanelTree::with_root_layout(Layout::split(direction)).with_tolerance(size_tolerance);
    let root = tree.root();
    attach_children(&mut tree, root, children)?;
    log::debug!("built layout with {} nodes", tree.len());
    Ok(tree)
}
