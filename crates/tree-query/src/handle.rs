//! Public handle to one overlay node.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::forest::NodeId;
use crate::selection::Selection;
use crate::session::SessionInner;

/// A lightweight handle to an overlay node.
///
/// Handles are what selector predicates receive and what
/// [`Selection::nodes`](crate::Selection::nodes) yields. A handle stays valid
/// for the lifetime of its session, even after the node is detached by a
/// mutation. Equality is node identity within one session, not structural
/// equality of raw values.
#[derive(Clone)]
pub struct NodeHandle {
    pub(crate) inner: Rc<SessionInner>,
    pub(crate) id: NodeId,
}

impl NodeHandle {
    pub(crate) fn new(inner: Rc<SessionInner>, id: NodeId) -> Self {
        Self { inner, id }
    }

    /// The node type reported by the adapter's `get_type`.
    pub fn node_type(&self) -> String {
        self.inner.node_type(self.id)
    }

    /// The node's own leaf text via the adapter's `to_string`.
    ///
    /// Composite nodes yield an empty string; use
    /// [`Selection::value`](crate::Selection::value) for subtree text.
    pub fn text(&self) -> String {
        self.inner.node_text(self.id)
    }

    /// Recursive JSON reconstruction of this node.
    pub fn to_json(&self) -> Value {
        self.inner.to_json(self.id)
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.inner
            .parent_of(self.id)
            .map(|parent| NodeHandle::new(self.inner.clone(), parent))
    }

    /// Direct children, in sibling order; empty for leaves.
    pub fn children(&self) -> Vec<NodeHandle> {
        self.inner
            .children_ids(self.id)
            .into_iter()
            .map(|child| NodeHandle::new(self.inner.clone(), child))
            .collect()
    }

    /// Whether the adapter reported children for this node; a branch with an
    /// empty child list still answers true.
    pub fn has_children(&self) -> bool {
        self.inner.has_children(self.id)
    }

    /// Position among siblings, `None` for a detached or root node.
    pub fn index(&self) -> Option<usize> {
        let (_, siblings) = self.inner.siblings_of(self.id)?;
        siblings.iter().position(|&sibling| sibling == self.id)
    }

    /// A singleton selection over this node, re-entering the query engine.
    ///
    /// Supported from inside selector predicates, as long as the re-entrant
    /// selection only reads the overlay.
    pub fn select(&self) -> Selection {
        Selection::new(self.inner.clone(), vec![self.id])
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) && self.id == other.id
    }
}

impl Eq for NodeHandle {}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.id)
            .field("type", &self.node_type())
            .finish()
    }
}
