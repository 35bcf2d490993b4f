use regex::Regex;
use serde_json::{json, Value};
use tree_query::{QuerySession, Selector};

fn branch(node_type: &str, children: Vec<Value>) -> Value {
    json!({"type": node_type, "value": children})
}

fn leaf(node_type: &str, text: &str) -> Value {
    json!({"type": node_type, "value": text})
}

fn rule(class: &str) -> Value {
    branch("rule", vec![branch("selector", vec![leaf("class", class)])])
}

/// Three sibling rules `.r .g .b` separated by whitespace.
fn rgb_stylesheet() -> Value {
    branch(
        "stylesheet",
        vec![
            rule("r"),
            leaf("space", " "),
            rule("g"),
            leaf("space", " "),
            rule("b"),
        ],
    )
}

fn session(tree: Value) -> QuerySession {
    QuerySession::new(tree).unwrap()
}

#[test]
fn children_matrix() {
    let session = session(rgb_stylesheet());
    let all = session.select().children(());
    assert_eq!(all.len(), 5);
    let rules = session.select().children("rule");
    assert_eq!(rules.len(), 3);
    // Leaves contribute no children.
    assert_eq!(rules.children(()).children(()).children(()).len(), 0);
}

#[test]
fn find_declaration_numbers_matrix() {
    // `$border: 1px 2px 3px;` shaped declaration tree.
    let tree = branch(
        "stylesheet",
        vec![branch(
            "declaration",
            vec![
                branch("property", vec![leaf("variable", "$border")]),
                leaf("punctuation", ":"),
                branch(
                    "value",
                    vec![
                        leaf("number", "1"),
                        leaf("space", " "),
                        leaf("number", "2"),
                        leaf("space", " "),
                        leaf("number", "3"),
                    ],
                ),
            ],
        )],
    );
    let numbers = session(tree).select().find("number").get();
    assert_eq!(
        numbers,
        vec![leaf("number", "1"), leaf("number", "2"), leaf("number", "3")]
    );
}

#[test]
fn find_postorder_yields_nested_before_ancestor_matrix() {
    let tree = branch(
        "stylesheet",
        vec![branch("rule", vec![branch("rule", vec![leaf("class", "x")])])],
    );
    let session = session(tree);
    let rules = session.select().find("rule");
    assert_eq!(rules.len(), 2);
    // The inner rule's whole subtree reduces before the outer rule itself.
    assert_eq!(rules.nodes()[0].children()[0].node_type(), "class");
    assert_eq!(rules.nodes()[1].children()[0].node_type(), "rule");
}

#[test]
fn find_excludes_start_and_dedupes_matrix() {
    let session = session(rgb_stylesheet());
    let root = session.select();
    // The stylesheet node itself never appears in its own find results.
    assert_eq!(root.find("stylesheet").len(), 0);
    // Duplicate starting nodes collapse to one global result set.
    let handle = root.nodes().remove(0);
    let doubled = session.scope(vec![handle.clone(), handle]).unwrap();
    assert_eq!(doubled.find("class").len(), 3);
}

#[test]
fn filter_and_eq_matrix() {
    let session = session(rgb_stylesheet());
    let children = session.select().children(());
    assert_eq!(children.filter("space").len(), 2);
    assert_eq!(children.filter(Regex::new("^(rule|space)$").unwrap()).len(), 5);

    let second_rule = session.select().find("rule").eq(1);
    assert_eq!(second_rule.len(), 1);
    assert_eq!(second_rule.find("class").value(), "g");

    // Out of range degrades to an empty selection, never an error.
    assert_eq!(session.select().find("rule").eq(99).len(), 0);
}

#[test]
fn first_and_last_matrix() {
    let session = session(rgb_stylesheet());
    let rules = session.select().find("rule");
    assert_eq!(rules.first().find("class").value(), "r");
    assert_eq!(rules.last().find("class").value(), "b");
    assert_eq!(rules.eq(99).first().len(), 0);
}

#[test]
fn index_matrix() {
    let session = session(rgb_stylesheet());
    let rules = session.select().find("rule");
    // Sibling position of the first member, whitespace siblings included.
    assert_eq!(rules.index(), Some(0));
    assert_eq!(rules.eq(1).index(), Some(2));
    // Position among selector-matching siblings only.
    assert_eq!(rules.eq(1).index_among("rule"), Some(1));
    assert_eq!(rules.eq(2).index_among("rule"), Some(2));
    // A member that does not match the sibling filter has no position.
    assert_eq!(rules.eq(1).index_among("space"), None);
    // The root has no siblings context.
    assert_eq!(session.select().index(), None);
    assert_eq!(session.select().find("nope").index(), None);
}

#[test]
fn index_of_matrix() {
    let session = session(rgb_stylesheet());
    let rules = session.select().find("rule");
    let second = rules.nodes().remove(1);
    assert_eq!(rules.index_of(&second), Some(1));
    let space = session.select().find("space").nodes().remove(0);
    assert_eq!(rules.index_of(&space), None);

    let other = QuerySession::new(rgb_stylesheet()).unwrap();
    let foreign = other.select().find("rule").nodes().remove(1);
    assert_eq!(rules.index_of(&foreign), None);
}

#[test]
fn parent_is_direct_map_matrix() {
    let session = session(rgb_stylesheet());
    let classes = session.select().find("class");
    let parents = classes.parent(());
    assert_eq!(parents.len(), 3);
    assert!(parents.nodes().iter().all(|n| n.node_type() == "selector"));
    assert_eq!(classes.parent("rule").len(), 0);
    assert_eq!(session.select().parent(()).len(), 0);
}

#[test]
fn parents_matrix() {
    let session = session(rgb_stylesheet());
    let classes = session.select().find("class");
    // Innermost to outermost for the first member, then deduplicated across
    // the rest: selector, rule, stylesheet, selector, rule, ...
    let ancestors = classes.parents(());
    let types: Vec<String> = ancestors.nodes().iter().map(|n| n.node_type()).collect();
    assert_eq!(
        types,
        vec!["selector", "rule", "stylesheet", "selector", "rule", "selector", "rule"]
    );
    assert_eq!(classes.parents("stylesheet").len(), 1);
}

#[test]
fn parents_until_matrix() {
    let session = session(rgb_stylesheet());
    let first_class = session.select().find("class").first();
    // Stops before the matching ancestor; the match itself is excluded.
    let until = first_class.parents_until("stylesheet");
    let types: Vec<String> = until.nodes().iter().map(|n| n.node_type()).collect();
    assert_eq!(types, vec!["selector", "rule"]);
    // The stop selector is not a final filter: no match walks to the root.
    assert_eq!(first_class.parents_until("nope").len(), 3);
}

#[test]
fn closest_matrix() {
    let session = session(rgb_stylesheet());
    let classes = session.select().find("class");
    // The starting node itself qualifies.
    assert_eq!(classes.first().closest("class").nodes()[0].node_type(), "class");
    assert_eq!(classes.first().closest("rule").nodes()[0].node_type(), "rule");
    // Shared ancestors collapse to one.
    assert_eq!(classes.closest("stylesheet").len(), 1);
    assert_eq!(classes.closest("nope").len(), 0);
}

#[test]
fn next_and_prev_matrix() {
    let session = session(rgb_stylesheet());
    let rules = session.select().find("rule");
    assert_eq!(rules.eq(0).next(()).nodes()[0].node_type(), "space");
    // The immediate sibling is whitespace, not a rule: filtered next is
    // empty even though a later sibling would match.
    assert_eq!(rules.eq(1).next("rule").len(), 0);
    assert_eq!(rules.eq(1).prev("rule").len(), 0);
    assert_eq!(rules.eq(1).prev(()).nodes()[0].node_type(), "space");
    // First/last members have no preceding/following sibling.
    assert_eq!(rules.eq(0).prev(()).len(), 0);
    assert_eq!(rules.eq(2).next(()).len(), 0);
    assert_eq!(session.select().next(()).len(), 0);
}

#[test]
fn next_all_and_prev_all_matrix() {
    let session = session(rgb_stylesheet());
    let middle = session.select().find("rule").eq(1);
    let following: Vec<String> = middle.next_all(()).nodes().iter().map(|n| n.node_type()).collect();
    assert_eq!(following, vec!["space", "rule"]);
    assert_eq!(middle.next_all("rule").len(), 1);
    // Preceding siblings come nearest-first.
    let preceding: Vec<String> = middle.prev_all(()).nodes().iter().map(|n| n.node_type()).collect();
    assert_eq!(preceding, vec!["space", "rule"]);
    assert_eq!(middle.prev_all("rule").find("class").value(), "r");
}

#[test]
fn has_matrix() {
    let session = session(rgb_stylesheet());
    let children = session.select().children(());
    assert_eq!(children.has("class").len(), 3);
    assert_eq!(children.has("nope").len(), 0);
    // The member itself does not count as its own descendant.
    assert_eq!(session.select().find("class").has("class").len(), 0);
}

#[test]
fn has_parent_and_has_parents_matrix() {
    let session = session(rgb_stylesheet());
    let classes = session.select().find("class");
    assert_eq!(classes.has_parent("selector").len(), 3);
    assert_eq!(classes.has_parent("stylesheet").len(), 0);
    assert_eq!(classes.has_parents("stylesheet").len(), 3);
    assert_eq!(session.select().has_parents(()).len(), 0);
}

#[test]
fn value_document_order_matrix() {
    // Nested `.r { .g { .b {} } }` plus siblings `.c .m .y .k`.
    fn nested(class: &str, inner: Vec<Value>) -> Value {
        branch(
            "rule",
            vec![
                branch("selector", vec![leaf("class", class)]),
                branch("block", inner),
            ],
        )
    }
    let tree = branch(
        "stylesheet",
        vec![
            nested("r", vec![nested("g", vec![nested("b", vec![])])]),
            rule("c"),
            rule("m"),
            rule("y"),
            rule("k"),
        ],
    );
    let session = session(tree);
    assert_eq!(session.select().find("class").value(), "rgbcmyk");
    assert_eq!(session.select().value(), "rgbcmyk");
}

#[test]
fn map_reduce_concat_matrix() {
    let session = session(rgb_stylesheet());
    let rules = session.select().find("rule");
    let types = rules.map(|node| node.node_type());
    assert_eq!(types, vec!["rule", "rule", "rule"]);
    let count = rules.reduce(0usize, |acc, _| acc + 1);
    assert_eq!(count, 3);

    let spaces = session.select().find("space");
    let merged = rules.concat(&spaces);
    assert_eq!(merged.len(), 5);
    assert_eq!(merged.filter("rule").len(), 3);
}

#[test]
fn get_matrix() {
    let session = session(rgb_stylesheet());
    let classes = session.select().find("class");
    assert_eq!(
        classes.get(),
        vec![leaf("class", "r"), leaf("class", "g"), leaf("class", "b")]
    );
    assert_eq!(classes.get_at(1), Some(leaf("class", "g")));
    assert_eq!(classes.get_at(99), None);
}

#[test]
fn predicate_selector_matrix() {
    let session = session(rgb_stylesheet());
    let rules_with_g = session.select().find(Selector::predicate(|node| {
        node.node_type() == "rule" && node.select().value() == "g"
    }));
    assert_eq!(rules_with_g.len(), 1);
    assert_eq!(rules_with_g.index(), Some(2));
}
