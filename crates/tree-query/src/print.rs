//! Debug rendering of overlay subtrees.

use crate::forest::NodeId;
use crate::session::SessionInner;

/// Render the subtree rooted at `id` as an indented branch-drawing string.
///
/// One line per node: the adapter-reported type, followed by the leaf text in
/// quotes when present.
pub(crate) fn render_subtree(inner: &SessionInner, id: NodeId, tab: &str) -> String {
    let node_type = inner.node_type(id);
    let text = inner.node_text(id);
    let mut out = if text.is_empty() {
        node_type
    } else {
        format!("{node_type} {text:?}")
    };

    let children = inner.children_ids(id);
    let last = children.len().saturating_sub(1);
    for (i, &child) in children.iter().enumerate() {
        let is_last = i == last;
        let branch = if is_last { "└─" } else { "├─" };
        let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
        let rendered = render_subtree(inner, child, &child_tab);
        out.push('\n');
        out.push_str(tab);
        out.push_str(branch);
        out.push(' ');
        out.push_str(&rendered);
    }

    out
}
