//! Query session construction and scoping.
//!
//! A session owns the adapter [`Config`] and the overlay arena. It is built
//! once per root tree and shared (via `Rc`) by every [`Selection`] and
//! [`NodeHandle`] derived from it. The arena sits behind a `RefCell`:
//! the engine is single-threaded and synchronous, and a selector predicate
//! that mutates the overlay while a traversal is iterating trips a
//! deterministic borrow panic instead of corrupting the graph.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::config::Config;
use crate::error::TreeQueryError;
use crate::forest::{Forest, NodeId, OverlayNode};
use crate::handle::NodeHandle;
use crate::selection::{NodeInput, Selection};

/// Session state shared by selections and handles.
pub(crate) struct SessionInner {
    pub(crate) config: Config,
    pub(crate) forest: RefCell<Forest>,
}

impl SessionInner {
    /// Recursively wrap a raw node, materializing the overlay eagerly.
    ///
    /// O(subtree node count); each raw value introduced into the session is
    /// wrapped exactly once.
    pub(crate) fn wrap(&self, raw: Value, parent: Option<NodeId>) -> NodeId {
        let has_children = (self.config.has_children)(&raw);
        let child_raws = has_children.then(|| (self.config.get_children)(&raw));
        let id = self.forest.borrow_mut().push(OverlayNode {
            raw,
            parent,
            children: has_children.then(Vec::new),
        });
        if let Some(child_raws) = child_raws {
            let ids: Vec<NodeId> = child_raws
                .into_iter()
                .map(|child| self.wrap(child, Some(id)))
                .collect();
            self.forest.borrow_mut().node_mut(id).children = Some(ids);
        }
        id
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.forest.borrow().node(id).parent
    }

    /// Whether the adapter materialized a child list for this node.
    ///
    /// A branch with zero children is still a branch.
    pub(crate) fn has_children(&self, id: NodeId) -> bool {
        self.forest.borrow().node(id).children.is_some()
    }

    /// Snapshot of a node's child ids; empty for leaves.
    pub(crate) fn children_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.forest.borrow().node(id).children.clone().unwrap_or_default()
    }

    /// Snapshot of the sibling list containing `id`, with its parent.
    pub(crate) fn siblings_of(&self, id: NodeId) -> Option<(NodeId, Vec<NodeId>)> {
        let forest = self.forest.borrow();
        let parent = forest.node(id).parent?;
        let siblings = forest.node(parent).children.clone()?;
        Some((parent, siblings))
    }

    pub(crate) fn node_type(&self, id: NodeId) -> String {
        let forest = self.forest.borrow();
        (self.config.get_type)(&forest.node(id).raw)
    }

    pub(crate) fn node_text(&self, id: NodeId) -> String {
        let forest = self.forest.borrow();
        (self.config.to_string)(&forest.node(id).raw)
    }

    /// Recursive JSON reconstruction through the adapter's `to_json`.
    ///
    /// Branch nodes pass their rebuilt child list; leaves pass `None`, which
    /// tells the adapter to keep the original value.
    pub(crate) fn to_json(&self, id: NodeId) -> Value {
        let (raw, child_ids) = {
            let forest = self.forest.borrow();
            let node = forest.node(id);
            (node.raw.clone(), node.children.clone())
        };
        let children =
            child_ids.map(|ids| ids.into_iter().map(|child| self.to_json(child)).collect());
        (self.config.to_json)(&raw, children)
    }

    /// Post-order reduction over the subtree rooted at `id`: children are
    /// reduced left to right before the node itself is folded in.
    pub(crate) fn fold_post_order<A, F>(&self, id: NodeId, acc: A, f: &mut F) -> A
    where
        F: FnMut(A, NodeId) -> A,
    {
        let mut acc = acc;
        for child in self.children_ids(id) {
            acc = self.fold_post_order(child, acc, f);
        }
        f(acc, id)
    }
}

/// A query session over one raw tree.
///
/// Created once per root; [`select`](QuerySession::select) yields the
/// whole-tree selection and [`scope`](QuerySession::scope) narrows to specific
/// nodes. Cloning the session is cheap and shares the overlay.
#[derive(Clone)]
pub struct QuerySession {
    inner: Rc<SessionInner>,
    root: NodeId,
}

impl QuerySession {
    /// Create a session with the default `{type, value}` adapter.
    pub fn new(root: Value) -> Result<Self, TreeQueryError> {
        Self::with_config(root, Config::default())
    }

    /// Create a session with adapter overrides.
    pub fn with_config(root: Value, config: Config) -> Result<Self, TreeQueryError> {
        if !root.is_object() {
            return Err(TreeQueryError::InvalidInput);
        }
        let inner = Rc::new(SessionInner {
            config,
            forest: RefCell::new(Forest::new()),
        });
        let root_id = inner.wrap(root, None);
        Ok(Self {
            inner,
            root: root_id,
        })
    }

    /// The whole-tree root selection.
    pub fn select(&self) -> Selection {
        Selection::new(self.inner.clone(), vec![self.root])
    }

    /// A selection scoped to the given target.
    ///
    /// Existing handles are taken as-is (wrapping an already wrapped node is a
    /// no-op); raw values are wrapped as fresh parentless subtrees. Fails with
    /// [`TreeQueryError::InvalidArgument`] for a handle from another session
    /// or a raw value that is not a JSON object.
    pub fn scope<T: Into<ScopeTarget>>(&self, target: T) -> Result<Selection, TreeQueryError> {
        let ids = match target.into() {
            ScopeTarget::Node(handle) => vec![self.adopt(handle)?],
            ScopeTarget::Nodes(handles) => handles
                .into_iter()
                .map(|handle| self.adopt(handle))
                .collect::<Result<_, _>>()?,
            ScopeTarget::Raw(raw) => vec![self.wrap_raw(raw)?],
            ScopeTarget::RawSeq(raws) => raws
                .into_iter()
                .map(|raw| self.wrap_raw(raw))
                .collect::<Result<_, _>>()?,
            ScopeTarget::Mixed(inputs) => inputs
                .into_iter()
                .map(|input| match input {
                    NodeInput::Node(handle) => self.adopt(handle),
                    NodeInput::Raw(raw) => self.wrap_raw(raw),
                })
                .collect::<Result<_, _>>()?,
        };
        Ok(Selection::new(self.inner.clone(), ids))
    }

    /// Render the whole tree as an indented debug string.
    pub fn to_tree_string(&self) -> String {
        crate::print::render_subtree(&self.inner, self.root, "")
    }

    fn adopt(&self, handle: NodeHandle) -> Result<NodeId, TreeQueryError> {
        if !Rc::ptr_eq(&handle.inner, &self.inner) {
            return Err(TreeQueryError::InvalidArgument(
                "node handle belongs to a different query session".to_string(),
            ));
        }
        Ok(handle.id)
    }

    fn wrap_raw(&self, raw: Value) -> Result<NodeId, TreeQueryError> {
        if !raw.is_object() {
            return Err(TreeQueryError::InvalidArgument(
                "raw node must be a JSON object".to_string(),
            ));
        }
        Ok(self.inner.wrap(raw, None))
    }
}

/// Target of a scoped query call: a handle, a raw node, or a sequence of
/// either.
pub enum ScopeTarget {
    Node(NodeHandle),
    Nodes(Vec<NodeHandle>),
    Raw(Value),
    RawSeq(Vec<Value>),
    /// Heterogeneous sequence of raw values and handles.
    Mixed(Vec<NodeInput>),
}

impl From<NodeHandle> for ScopeTarget {
    fn from(handle: NodeHandle) -> Self {
        ScopeTarget::Node(handle)
    }
}

impl From<&NodeHandle> for ScopeTarget {
    fn from(handle: &NodeHandle) -> Self {
        ScopeTarget::Node(handle.clone())
    }
}

impl From<Vec<NodeHandle>> for ScopeTarget {
    fn from(handles: Vec<NodeHandle>) -> Self {
        ScopeTarget::Nodes(handles)
    }
}

impl From<Value> for ScopeTarget {
    fn from(raw: Value) -> Self {
        ScopeTarget::Raw(raw)
    }
}

impl From<Vec<Value>> for ScopeTarget {
    fn from(raws: Vec<Value>) -> Self {
        ScopeTarget::RawSeq(raws)
    }
}

impl From<Vec<NodeInput>> for ScopeTarget {
    fn from(inputs: Vec<NodeInput>) -> Self {
        ScopeTarget::Mixed(inputs)
    }
}
