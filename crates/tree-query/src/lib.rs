//! Format-agnostic tree query and mutation engine.
//!
//! Given an arbitrary tree-shaped structure (most commonly an AST) expressed
//! as [`serde_json::Value`], plus an adapter describing how to read and
//! rebuild nodes of that format, this crate exposes a chainable,
//! selector-driven API for locating, filtering, traversing, and mutating node
//! sets — a DOM-query library over arbitrary structured trees.
//!
//! The engine overlays parent/child links onto the otherwise parent-unaware
//! raw tree, keeps them consistent under insertion, removal, and replacement,
//! and reads results back out through the adapter's JSON reconstruction.
//!
//! # Example
//!
//! ```
//! use tree_query::QuerySession;
//! use serde_json::json;
//!
//! let tree = json!({
//!     "type": "stylesheet",
//!     "value": [
//!         {"type": "rule", "value": [{"type": "class", "value": "r"}]},
//!         {"type": "space", "value": " "},
//!         {"type": "rule", "value": [{"type": "class", "value": "g"}]}
//!     ]
//! });
//!
//! let session = QuerySession::new(tree).unwrap();
//!
//! // Traversal: chainable and selector-driven.
//! let classes = session.select().find("class");
//! assert_eq!(classes.len(), 2);
//! assert_eq!(classes.value(), "rg");
//!
//! // Mutation: splices the overlay in place.
//! session
//!     .select()
//!     .find("rule")
//!     .eq(1)
//!     .after(json!({"type": "rule", "value": [{"type": "class", "value": "b"}]}));
//! assert_eq!(session.select().find("class").value(), "rgb");
//! ```

mod config;
pub use config::{
    default_get_children, default_get_type, default_has_children, default_to_json,
    default_to_string, Config, GetChildrenFn, GetTypeFn, HasChildrenFn, ToJsonFn, ToStringFn,
};

mod error;
pub use error::TreeQueryError;

mod forest;

mod handle;
pub use handle::NodeHandle;

mod print;

mod selection;
pub use selection::{NodeInput, Selection};

mod selector;
pub use selector::Selector;

mod session;
pub use session::{QuerySession, ScopeTarget};
