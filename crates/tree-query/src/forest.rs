//! Arena-backed node overlay.
//!
//! The overlay superimposes parent/child links on an otherwise parent-unaware
//! raw tree. All "pointers" are `u32` indices into a [`Vec`]-backed arena; a
//! record holds the raw value, an optional parent index, and an optional
//! ordered child index list. Records are never moved or freed — removal and
//! replacement detach a record by splicing it out of its parent's child list,
//! so every handle stays valid for the lifetime of the session.

use serde_json::Value;

/// Arena index of an overlay node.
pub(crate) type NodeId = u32;

/// One position in the overlay graph.
///
/// Invariant: a node with `parent = Some(p)` appears exactly once in `p`'s
/// `children`, at the index reflecting sibling order, until detached.
/// `children` is `None` iff the adapter reported no children for `raw`.
#[derive(Debug, Clone)]
pub(crate) struct OverlayNode {
    pub raw: Value,
    pub parent: Option<NodeId>,
    pub children: Option<Vec<NodeId>>,
}

/// The overlay arena.
#[derive(Debug, Default)]
pub(crate) struct Forest {
    nodes: Vec<OverlayNode>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: OverlayNode) -> NodeId {
        self.nodes.push(node);
        (self.nodes.len() - 1) as NodeId
    }

    pub fn node(&self, id: NodeId) -> &OverlayNode {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut OverlayNode {
        &mut self.nodes[id as usize]
    }

    /// Splice `id` out of its parent's child list and clear its parent link.
    ///
    /// Returns the parent and the sibling index the node occupied, or `None`
    /// if the node was already detached.
    pub fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.node(id).parent?;
        let children = self.node_mut(parent).children.as_mut()?;
        let index = children.iter().position(|&child| child == id)?;
        children.remove(index);
        self.node_mut(id).parent = None;
        Some((parent, index))
    }

    /// Splice `child` into `parent`'s child list at `index`, establishing the
    /// back-reference. No-op when the parent has no child list.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(children) = self.node_mut(parent).children.as_mut() {
            let index = index.min(children.len());
            children.insert(index, child);
            self.node_mut(child).parent = Some(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(raw: Value, parent: Option<NodeId>, branch: bool) -> OverlayNode {
        OverlayNode {
            raw,
            parent,
            children: if branch { Some(Vec::new()) } else { None },
        }
    }

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut forest = Forest::new();
        let a = forest.push(record(json!({}), None, true));
        let b = forest.push(record(json!({}), Some(a), false));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
    }

    #[test]
    fn test_insert_and_detach_keep_links_consistent() {
        let mut forest = Forest::new();
        let root = forest.push(record(json!({}), None, true));
        let a = forest.push(record(json!({}), None, false));
        let b = forest.push(record(json!({}), None, false));
        forest.insert_child(root, 0, a);
        forest.insert_child(root, 1, b);
        assert_eq!(forest.node(root).children.as_deref(), Some(&[a, b][..]));
        assert_eq!(forest.node(a).parent, Some(root));

        let (parent, index) = forest.detach(a).unwrap();
        assert_eq!((parent, index), (root, 0));
        assert_eq!(forest.node(root).children.as_deref(), Some(&[b][..]));
        assert_eq!(forest.node(a).parent, None);
        assert!(forest.detach(a).is_none());
    }

    #[test]
    fn test_insert_child_clamps_index() {
        let mut forest = Forest::new();
        let root = forest.push(record(json!({}), None, true));
        let a = forest.push(record(json!({}), None, false));
        forest.insert_child(root, 99, a);
        assert_eq!(forest.node(root).children.as_deref(), Some(&[a][..]));
    }

    #[test]
    fn test_insert_child_into_leaf_is_noop() {
        let mut forest = Forest::new();
        let leaf = forest.push(record(json!({}), None, false));
        let a = forest.push(record(json!({}), None, false));
        forest.insert_child(leaf, 0, a);
        assert!(forest.node(leaf).children.is_none());
        assert_eq!(forest.node(a).parent, None);
    }
}
