use std::fmt;

use serde::Serialize;
use specta::Type;

/// Stable handle to a node in the tree arena.
///
/// Ids are assigned from a monotonic counter at creation and are never
/// reused, even after the node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Type)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One ply (half-move) in some branch of the game.
///
/// Structural links are arena ids: `children` own the subtree, `parent` is
/// a non-owning back-reference used only for upward traversal.
#[derive(Debug, Clone, Serialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub(crate) id: NodeId,
    /// Notation of the move that produced this node; `None` only for the root.
    pub(crate) san: Option<String>,
    /// Resulting position after the move (opaque encoding).
    pub(crate) position: String,
    pub(crate) comment: Option<String>,
    /// Opaque tags attached by external analysis; stored, never interpreted.
    pub(crate) annotations: Vec<String>,
    pub(crate) parent: Option<NodeId>,
    /// Index 0 is the main-line continuation; the rest are variations in
    /// recency order.
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn san(&self) -> Option<&str> {
        self.san.as_deref()
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
