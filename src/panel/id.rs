// Typed panel identifiers.
//
// Identifiers are plain `Copy` values wrapping a uuid. Equality and hashing
// only ever look at the uuid, never at the wrapper.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a parent node (a node that owns a layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(Uuid);

/// Identifier of a leaf node (a single content region).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafId(Uuid);

impl ParentId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(self) -> Uuid {
        self.0
    }
}

impl LeafId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ParentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for LeafId {
    fn default() -> Self {
        Self::new()
    }
}

/// Either kind of identifier. Split layouts hold these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeId {
    Parent(ParentId),
    Leaf(LeafId),
}

impl NodeId {
    /// The embedded unique value.
    pub fn uuid(self) -> Uuid {
        match self {
            NodeId::Parent(id) => id.0,
            NodeId::Leaf(id) => id.0,
        }
    }

    pub fn as_parent(self) -> Option<ParentId> {
        match self {
            NodeId::Parent(id) => Some(id),
            NodeId::Leaf(_) => None,
        }
    }

    pub fn as_leaf(self) -> Option<LeafId> {
        match self {
            NodeId::Leaf(id) => Some(id),
            NodeId::Parent(_) => None,
        }
    }

    pub fn is_parent(self) -> bool {
        matches!(self, NodeId::Parent(_))
    }
}

// Two ids are the same node iff their uuids match; the kind tag is never
// part of identity.
impl PartialEq for NodeId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid() == other.uuid()
    }
}

impl Eq for NodeId {}

impl Hash for NodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid().hash(state);
    }
}

impl From<ParentId> for NodeId {
    fn from(id: ParentId) -> Self {
        NodeId::Parent(id)
    }
}

impl From<LeafId> for NodeId {
    fn from(id: LeafId) -> Self {
        NodeId::Leaf(id)
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid())
    }
}
