//! The selection engine.
//!
//! A [`Selection`] is an ordered set of overlay nodes plus a back-pointer to
//! the selection that produced it. Traversals are pure reads over the overlay
//! and return a new `Selection`; mutations splice the overlay's child lists in
//! place and return a derived `Selection` for further chaining. "No match" is
//! never an error: empty selections and `None` flow through every operation.

use std::collections::HashSet;
use std::rc::Rc;

use serde_json::Value;

use crate::forest::NodeId;
use crate::handle::NodeHandle;
use crate::selector::Selector;
use crate::session::SessionInner;

/// Content accepted by the mutation operations: a raw value (wrapped fresh at
/// every insertion position) or an existing handle (adopted when detached).
pub enum NodeInput {
    Raw(Value),
    Node(NodeHandle),
}

impl From<Value> for NodeInput {
    fn from(raw: Value) -> Self {
        NodeInput::Raw(raw)
    }
}

impl From<NodeHandle> for NodeInput {
    fn from(handle: NodeHandle) -> Self {
        NodeInput::Node(handle)
    }
}

impl From<&NodeHandle> for NodeInput {
    fn from(handle: &NodeHandle) -> Self {
        NodeInput::Node(handle.clone())
    }
}

/// An ordered set of overlay nodes with call-chain history.
#[derive(Clone)]
pub struct Selection {
    inner: Rc<SessionInner>,
    nodes: Vec<NodeId>,
    origin: Option<Rc<Selection>>,
}

impl Selection {
    pub(crate) fn new(inner: Rc<SessionInner>, nodes: Vec<NodeId>) -> Self {
        Self {
            inner,
            nodes,
            origin: None,
        }
    }

    /// A new selection produced by this one; the receiver becomes its origin.
    fn derive(&self, nodes: Vec<NodeId>) -> Selection {
        Selection {
            inner: self.inner.clone(),
            nodes,
            origin: Some(Rc::new(self.clone())),
        }
    }

    /// The selection this one was derived from, if any.
    pub fn origin(&self) -> Option<&Selection> {
        self.origin.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Member nodes, in selection order.
    pub fn nodes(&self) -> Vec<NodeHandle> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes
            .iter()
            .map(|&id| NodeHandle::new(self.inner.clone(), id))
    }

    // ---- traversal -------------------------------------------------------

    /// Direct children of every selected node, filtered.
    ///
    /// Order: selection order, then sibling order within each node.
    pub fn children<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        for &id in &self.nodes {
            for child in self.inner.children_ids(id) {
                if selector.matches(&self.inner, child) {
                    out.push(child);
                }
            }
        }
        self.derive(out)
    }

    /// All descendants of every selected node (the node itself excluded),
    /// collected depth-first in post-order and deduplicated by identity.
    ///
    /// Post-order means a deeply nested match is yielded before a matching
    /// ancestor; for non-nested matches this equals document order.
    pub fn find<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for &id in &self.nodes {
            for child in self.inner.children_ids(id) {
                self.inner.fold_post_order(child, (), &mut |_, node| {
                    if selector.matches(&self.inner, node) && seen.insert(node) {
                        out.push(node);
                    }
                });
            }
        }
        self.derive(out)
    }

    /// Members satisfying the selector, order preserved.
    pub fn filter<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let out = self
            .nodes
            .iter()
            .copied()
            .filter(|&id| selector.matches(&self.inner, id))
            .collect();
        self.derive(out)
    }

    /// The single member at `index`; out of range yields an empty selection.
    pub fn eq(&self, index: usize) -> Selection {
        self.derive(self.nodes.get(index).copied().into_iter().collect())
    }

    pub fn first(&self) -> Selection {
        self.eq(0)
    }

    pub fn last(&self) -> Selection {
        self.eq(self.nodes.len().saturating_sub(1))
    }

    /// Position of the first member among its siblings; `None` for an empty
    /// selection or a parentless node.
    pub fn index(&self) -> Option<usize> {
        self.index_among(())
    }

    /// Position of the first member among its siblings that match the
    /// selector; `None` when the member itself does not match.
    pub fn index_among<S: Into<Selector>>(&self, selector: S) -> Option<usize> {
        let selector = selector.into();
        let &id = self.nodes.first()?;
        let (_, siblings) = self.inner.siblings_of(id)?;
        siblings
            .into_iter()
            .filter(|&sibling| selector.matches(&self.inner, sibling))
            .position(|sibling| sibling == id)
    }

    /// Position of `node` within this selection itself.
    pub fn index_of(&self, node: &NodeHandle) -> Option<usize> {
        if !Rc::ptr_eq(&self.inner, &node.inner) {
            return None;
        }
        self.nodes.iter().position(|&id| id == node.id)
    }

    /// Immediate parent of each member, filtered. Direct map, no dedup.
    pub fn parent<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        for &id in &self.nodes {
            if let Some(parent) = self.inner.parent_of(id) {
                if selector.matches(&self.inner, parent) {
                    out.push(parent);
                }
            }
        }
        self.derive(out)
    }

    /// Every ancestor of each member up to the root, innermost first,
    /// filtered and deduplicated by first occurrence.
    pub fn parents<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for &id in &self.nodes {
            let mut current = self.inner.parent_of(id);
            while let Some(ancestor) = current {
                if selector.matches(&self.inner, ancestor) && seen.insert(ancestor) {
                    out.push(ancestor);
                }
                current = self.inner.parent_of(ancestor);
            }
        }
        self.derive(out)
    }

    /// Ancestors of each member up to (and excluding) the first one matching
    /// the selector. The selector is a stop condition, not a final filter.
    pub fn parents_until<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for &id in &self.nodes {
            let mut current = self.inner.parent_of(id);
            while let Some(ancestor) = current {
                if selector.matches(&self.inner, ancestor) {
                    break;
                }
                if seen.insert(ancestor) {
                    out.push(ancestor);
                }
                current = self.inner.parent_of(ancestor);
            }
        }
        self.derive(out)
    }

    /// For each member, the nearest of itself and its ancestors matching the
    /// selector; members with no match contribute nothing. Deduplicated.
    pub fn closest<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for &id in &self.nodes {
            let mut current = Some(id);
            while let Some(node) = current {
                if selector.matches(&self.inner, node) {
                    if seen.insert(node) {
                        out.push(node);
                    }
                    break;
                }
                current = self.inner.parent_of(node);
            }
        }
        self.derive(out)
    }

    /// Immediate following sibling of each member, filtered.
    ///
    /// A non-matching immediate sibling contributes nothing even when a later
    /// sibling would match.
    pub fn next<S: Into<Selector>>(&self, selector: S) -> Selection {
        self.adjacent_sibling(selector.into(), 1)
    }

    /// Immediate preceding sibling of each member, filtered.
    pub fn prev<S: Into<Selector>>(&self, selector: S) -> Selection {
        self.adjacent_sibling(selector.into(), -1)
    }

    fn adjacent_sibling(&self, selector: Selector, direction: isize) -> Selection {
        let mut out = Vec::new();
        for &id in &self.nodes {
            let Some((_, siblings)) = self.inner.siblings_of(id) else {
                continue;
            };
            let Some(position) = siblings.iter().position(|&sibling| sibling == id) else {
                continue;
            };
            let Some(adjacent) = position
                .checked_add_signed(direction)
                .and_then(|i| siblings.get(i).copied())
            else {
                continue;
            };
            if selector.matches(&self.inner, adjacent) {
                out.push(adjacent);
            }
        }
        self.derive(out)
    }

    /// All following siblings of each member, in forward order, filtered.
    pub fn next_all<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        for &id in &self.nodes {
            let Some((_, siblings)) = self.inner.siblings_of(id) else {
                continue;
            };
            let Some(position) = siblings.iter().position(|&sibling| sibling == id) else {
                continue;
            };
            for &sibling in &siblings[position + 1..] {
                if selector.matches(&self.inner, sibling) {
                    out.push(sibling);
                }
            }
        }
        self.derive(out)
    }

    /// All preceding siblings of each member, nearest first, filtered.
    pub fn prev_all<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let mut out = Vec::new();
        for &id in &self.nodes {
            let Some((_, siblings)) = self.inner.siblings_of(id) else {
                continue;
            };
            let Some(position) = siblings.iter().position(|&sibling| sibling == id) else {
                continue;
            };
            for &sibling in siblings[..position].iter().rev() {
                if selector.matches(&self.inner, sibling) {
                    out.push(sibling);
                }
            }
        }
        self.derive(out)
    }

    /// Members with at least one descendant matching the selector.
    pub fn has<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let out = self
            .nodes
            .iter()
            .copied()
            .filter(|&id| self.descendant_matches(id, &selector))
            .collect();
        self.derive(out)
    }

    /// Members whose immediate parent matches the selector.
    pub fn has_parent<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let out = self
            .nodes
            .iter()
            .copied()
            .filter(|&id| {
                self.inner
                    .parent_of(id)
                    .map_or(false, |parent| selector.matches(&self.inner, parent))
            })
            .collect();
        self.derive(out)
    }

    /// Members with at least one ancestor matching the selector.
    pub fn has_parents<S: Into<Selector>>(&self, selector: S) -> Selection {
        let selector = selector.into();
        let out = self
            .nodes
            .iter()
            .copied()
            .filter(|&id| {
                let mut current = self.inner.parent_of(id);
                while let Some(ancestor) = current {
                    if selector.matches(&self.inner, ancestor) {
                        return true;
                    }
                    current = self.inner.parent_of(ancestor);
                }
                false
            })
            .collect();
        self.derive(out)
    }

    fn descendant_matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.inner.children_ids(id).into_iter().any(|child| {
            selector.matches(&self.inner, child) || self.descendant_matches(child, selector)
        })
    }

    /// Concatenated leaf text of every member's subtree, in document order
    /// (post-order walk, each node's own text included).
    pub fn value(&self) -> String {
        let mut out = String::new();
        for &id in &self.nodes {
            self.inner.fold_post_order(id, (), &mut |_, node| {
                out.push_str(&self.inner.node_text(node));
            });
        }
        out
    }

    /// Map over member nodes (not their subtrees).
    pub fn map<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&NodeHandle) -> T,
    {
        self.iter().map(|handle| f(&handle)).collect()
    }

    /// Fold over member nodes, in selection order.
    pub fn reduce<A, F>(&self, acc: A, mut f: F) -> A
    where
        F: FnMut(A, &NodeHandle) -> A,
    {
        self.iter().fold(acc, |acc, handle| f(acc, &handle))
    }

    /// Merge two selections' node sequences. Both must come from the same
    /// session.
    pub fn concat(&self, other: &Selection) -> Selection {
        debug_assert!(
            Rc::ptr_eq(&self.inner, &other.inner),
            "concat across query sessions"
        );
        let mut out = self.nodes.clone();
        out.extend_from_slice(&other.nodes);
        self.derive(out)
    }

    /// JSON reconstruction of every member.
    pub fn get(&self) -> Vec<Value> {
        self.nodes.iter().map(|&id| self.inner.to_json(id)).collect()
    }

    /// JSON reconstruction of the member at `index`.
    pub fn get_at(&self, index: usize) -> Option<Value> {
        self.nodes.get(index).map(|&id| self.inner.to_json(id))
    }

    /// Render every member's subtree as an indented debug string.
    pub fn to_tree_string(&self) -> String {
        self.nodes
            .iter()
            .map(|&id| crate::print::render_subtree(&self.inner, id, ""))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ---- mutation --------------------------------------------------------

    /// Insert `input` immediately after each member that has a parent;
    /// parentless members are silently skipped.
    ///
    /// Raw input is wrapped fresh at every position, so inserting the same
    /// raw value in several places produces independent overlay nodes.
    pub fn after<I: Into<NodeInput>>(&self, input: I) -> Selection {
        self.insert_adjacent(&input.into(), 1)
    }

    /// Insert `input` immediately before each member that has a parent.
    pub fn before<I: Into<NodeInput>>(&self, input: I) -> Selection {
        self.insert_adjacent(&input.into(), 0)
    }

    fn insert_adjacent(&self, input: &NodeInput, offset: usize) -> Selection {
        let mut adopted = false;
        for &id in &self.nodes {
            let Some((parent, siblings)) = self.inner.siblings_of(id) else {
                continue;
            };
            let Some(position) = siblings.iter().position(|&sibling| sibling == id) else {
                continue;
            };
            let new_id = self.materialize(input, &mut adopted);
            self.inner
                .forest
                .borrow_mut()
                .insert_child(parent, position + offset, new_id);
        }
        self.derive(self.nodes.clone())
    }

    /// Detach each member that has a parent from the overlay.
    pub fn remove(&self) -> Selection {
        for &id in &self.nodes {
            self.inner.forest.borrow_mut().detach(id);
        }
        self.derive(self.nodes.clone())
    }

    /// Replace each member that has a parent with `f`'s result, at the same
    /// sibling position. Returns the selection of replacement nodes.
    ///
    /// `f` receives the overlay node and may return raw content or a handle;
    /// returning the received handle keeps the node in place.
    pub fn replace<I, F>(&self, mut f: F) -> Selection
    where
        I: Into<NodeInput>,
        F: FnMut(&NodeHandle) -> I,
    {
        let mut out = Vec::new();
        for &id in &self.nodes {
            if self.inner.parent_of(id).is_none() {
                continue;
            }
            let input = f(&NodeHandle::new(self.inner.clone(), id)).into();
            let Some((parent, position)) = self.inner.forest.borrow_mut().detach(id) else {
                continue;
            };
            let mut adopted = false;
            let new_id = self.materialize(&input, &mut adopted);
            self.inner
                .forest
                .borrow_mut()
                .insert_child(parent, position, new_id);
            out.push(new_id);
        }
        self.derive(out)
    }

    /// Turn mutation input into an attachable overlay node.
    ///
    /// A detached handle from this session is adopted as-is once per call
    /// (wrap idempotence); anything else is re-materialized from its JSON so
    /// no node ever gains two parents.
    fn materialize(&self, input: &NodeInput, adopted: &mut bool) -> NodeId {
        match input {
            NodeInput::Raw(raw) => self.inner.wrap(raw.clone(), None),
            NodeInput::Node(handle) => {
                let same_session = Rc::ptr_eq(&handle.inner, &self.inner);
                if same_session && !*adopted && self.inner.parent_of(handle.id).is_none() {
                    *adopted = true;
                    handle.id
                } else {
                    self.inner.wrap(handle.to_json(), None)
                }
            }
        }
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("nodes", &self.nodes)
            .finish()
    }
}
