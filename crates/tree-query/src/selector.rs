//! Selector resolution.
//!
//! Every traversal and filter method takes an `impl Into<Selector>`, so the
//! caller picks the cheapest matching mechanism: nothing (`()`), an exact type
//! string, a compiled [`Regex`] over the type, or an arbitrary predicate over
//! the overlay node. The selector is normalized once per call and evaluated
//! uniformly against every candidate node.

use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::forest::NodeId;
use crate::handle::NodeHandle;
use crate::session::SessionInner;

/// A node filter.
#[derive(Clone)]
pub enum Selector {
    /// Matches every node.
    Any,
    /// Exact match on the adapter-reported node type: `"rule"`
    Type(String),
    /// Regex match on the node type: `Regex::new("^rule(set)?$")`
    Pattern(Regex),
    /// Arbitrary predicate over the overlay node.
    Predicate(Rc<dyn Fn(&NodeHandle) -> bool>),
}

impl Selector {
    /// Build a predicate selector.
    ///
    /// The predicate receives the overlay [`NodeHandle`], not the raw value,
    /// and may re-enter the query engine as long as it only reads.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&NodeHandle) -> bool + 'static,
    {
        Selector::Predicate(Rc::new(f))
    }

    pub(crate) fn matches(&self, inner: &Rc<SessionInner>, id: NodeId) -> bool {
        match self {
            Selector::Any => true,
            Selector::Type(expected) => inner.node_type(id) == *expected,
            Selector::Pattern(pattern) => pattern.is_match(&inner.node_type(id)),
            Selector::Predicate(predicate) => predicate(&NodeHandle::new(inner.clone(), id)),
        }
    }
}

impl From<()> for Selector {
    fn from(_: ()) -> Self {
        Selector::Any
    }
}

impl From<&str> for Selector {
    fn from(node_type: &str) -> Self {
        Selector::Type(node_type.to_string())
    }
}

impl From<String> for Selector {
    fn from(node_type: String) -> Self {
        Selector::Type(node_type)
    }
}

impl From<Regex> for Selector {
    fn from(pattern: Regex) -> Self {
        Selector::Pattern(pattern)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Any => write!(f, "Any"),
            Selector::Type(node_type) => f.debug_tuple("Type").field(node_type).finish(),
            Selector::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Selector::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}
