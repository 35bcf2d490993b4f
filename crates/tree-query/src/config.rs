//! Adapter contract between the engine and a concrete tree format.
//!
//! The engine never inspects raw nodes directly. Every read goes through the
//! five functions collected in [`Config`], so any tree shape can be queried by
//! overriding the relevant accessors. The defaults assume the common
//! `{ "type": ..., "value": ... }` node shape where `value` is either a child
//! array (branch) or a string (leaf).

use serde_json::Value;

/// Reports whether a raw node has children.
pub type HasChildrenFn = Box<dyn Fn(&Value) -> bool>;

/// Returns the ordered child list of a raw node.
pub type GetChildrenFn = Box<dyn Fn(&Value) -> Vec<Value>>;

/// Returns the node type used for selector matching.
pub type GetTypeFn = Box<dyn Fn(&Value) -> String>;

/// Rebuilds a raw node from its (possibly mutated) children.
///
/// `None` children means "use the original value".
pub type ToJsonFn = Box<dyn Fn(&Value, Option<Vec<Value>>) -> Value>;

/// Extracts leaf text; empty string for non-leaf or non-string nodes.
pub type ToStringFn = Box<dyn Fn(&Value) -> String>;

/// Per-session adapter configuration.
///
/// Constructed once at session creation and threaded through the overlay and
/// selection engine; there is no global adapter state. Override a subset with
/// struct-update syntax:
///
/// ```
/// use tree_query::Config;
///
/// let config = Config {
///     get_type: Box::new(|node| {
///         node.get("kind").and_then(|v| v.as_str()).unwrap_or_default().to_string()
///     }),
///     ..Config::default()
/// };
/// ```
pub struct Config {
    pub has_children: HasChildrenFn,
    pub get_children: GetChildrenFn,
    pub get_type: GetTypeFn,
    pub to_json: ToJsonFn,
    pub to_string: ToStringFn,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            has_children: Box::new(default_has_children),
            get_children: Box::new(default_get_children),
            get_type: Box::new(default_get_type),
            to_json: Box::new(default_to_json),
            to_string: Box::new(default_to_string),
        }
    }
}

/// Default `has_children`: true iff `value` is an array.
pub fn default_has_children(node: &Value) -> bool {
    node.get("value").map_or(false, Value::is_array)
}

/// Default `get_children`: the `value` array, empty when absent.
pub fn default_get_children(node: &Value) -> Vec<Value> {
    node.get("value")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Default `get_type`: the `type` field as a string, empty when absent.
pub fn default_get_type(node: &Value) -> String {
    node.get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Default `to_json`: shallow merge with `value` replaced by the rebuilt
/// children when supplied.
pub fn default_to_json(node: &Value, children: Option<Vec<Value>>) -> Value {
    let mut out = node.clone();
    if let Some(children) = children {
        if let Value::Object(map) = &mut out {
            map.insert("value".to_string(), Value::Array(children));
        }
    }
    out
}

/// Default `to_string`: `value` when it is a string, empty otherwise.
pub fn default_to_string(node: &Value) -> String {
    node.get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
