use crate::config::Verbosity;
use crate::diagnostic::Diagnostics;
use crate::json::ModelValue;
use crate::model::Model;
use crate::tree::{Element, NodeId, Tree};


pub(crate) fn is_head(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, "if") || tree.is_tag(id, "unless")
}

pub(crate) fn is_link(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, "elseif") || tree.is_tag(id, "elseunless") || tree.is_tag(id, "else")
}


/// Decide a single `if`, `unless`, `elseif`, `elseunless` or `else`.
///
/// `<if name>` and `<if name="name">` test the truthiness of `name`,
/// `<if name="value">` compares its text with `value`. The unless forms
/// negate the result.
pub(crate) fn evaluate(element: &Element, model: &Model, diagnostics: &mut Diagnostics) -> bool {
    if element.is("else") {
        return true;
    }
    let negate = element.is("unless") || element.is("elseunless");
    let attr = match element.first_attr() {
        Some(attr) => attr,
        None => {
            diagnostics.report(
                Verbosity::Concise,
                format_args!("conditional element found with no condition, treated as false")
            );
            return false;
        }
    };
    let name = attr.name().to_lowercase();
    let expected = attr.value();
    let value = model.get(&name);
    if value.is_none() {
        diagnostics.report(
            Verbosity::Concise,
            format_args!("condition references a nonexistent model value: {}", name)
        );
    }
    let passed = if expected.is_empty() || expected.to_lowercase() == name {
        value.map_or(false, |it| !it.is_falsy())
    } else {
        value.map_or(false, |it| it.to_text() == expected)
    };
    passed != negate
}


/// Replace the chain starting at `head` by the children of its first
/// satisfied branch, or by nothing.
pub(crate) fn resolve_chain(
    tree: &mut Tree, head: NodeId, model: &Model, diagnostics: &mut Diagnostics
) {
    let run = chain(tree, head);
    let winner = run.iter()
        .copied()
        .find(|&id| match tree.element(id) {
            Some(element) => evaluate(element, model, diagnostics),
            None => false
        });
    let fragment = match winner {
        Some(id) => tree.children_fragment(id),
        None => Tree::new()
    };
    tree.replace_run(&run, &fragment);
}

// the head, its trailing links and the blank text between them
fn chain(tree: &Tree, head: NodeId) -> Vec<NodeId> {
    let mut run = vec![head];
    let mut blanks = Vec::new();
    let mut next = tree.next_sibling(head);
    while let Some(id) = next {
        if tree.is_blank_text(id) {
            blanks.push(id);
        } else if is_link(tree, id) {
            run.append(&mut blanks);
            run.push(id);
            if tree.is_tag(id, "else") {
                break;
            }
        } else {
            break;
        }
        next = tree.next_sibling(id);
    }
    run
}

/// Drop `elseif`, `elseunless` and `else` elements no chain consumed.
pub(crate) fn remove_dangling(tree: &mut Tree) {
    while let Some(id) = tree.find(is_link) {
        tree.detach(id);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(text: &str, data: serde_json::Value) -> String {
        let mut tree = Tree::parse(text);
        let model = Model::from_value(&data);
        let mut diagnostics = Diagnostics::new(Verbosity::None);
        while let Some(head) = tree.find(is_head) {
            resolve_chain(&mut tree, head, &model, &mut diagnostics);
        }
        remove_dangling(&mut tree);
        tree.to_markup()
    }

    fn check(condition: &str, data: serde_json::Value) -> bool {
        let tree = Tree::parse(condition);
        let element = tree.element(tree.children(tree.root())[0]).unwrap();
        let mut diagnostics = Diagnostics::new(Verbosity::None);
        evaluate(element, &Model::from_value(&data), &mut diagnostics)
    }

    #[test]
    fn truthiness() {
        assert!(check("<if x>", json!({ "x": true })));
        assert!(check("<if X=\"x\">", json!({ "x": "yes" })));
        assert!(!check("<if x>", json!({ "x": 0 })));
        assert!(!check("<if x>", json!({ "x": "" })));
        assert!(!check("<if x>", json!({})));
        assert!(check("<unless x>", json!({ "x": false })));
        assert!(check("<elseunless x>", json!({})));
        assert!(check("<else>", json!({})));
    }

    #[test]
    fn equality() {
        assert!(check("<if user.role=\"admin\">", json!({ "user": { "role": "admin" } })));
        assert!(!check("<if user.role=\"admin\">", json!({ "user": { "role": "guest" } })));
        assert!(check("<elseif count=\"3\">", json!({ "count": 3 })));
        assert!(check("<unless user.role=\"admin\">", json!({ "user": { "role": "guest" } })));
        assert!(check("<unless missing=\"admin\">", json!({})));
        assert!(!check("<if missing=\"admin\">", json!({})));
    }

    #[test]
    fn missing_condition_is_false() {
        assert!(!check("<if>", json!({ "x": true })));
        assert!(!check("<unless>", json!({})));
    }

    #[test]
    fn nonexistent_value_is_reported() {
        let tree = Tree::parse("<if a.b.c>");
        let element = tree.element(tree.children(tree.root())[0]).unwrap();
        let mut diagnostics = Diagnostics::new(Verbosity::Concise);
        assert!(!evaluate(element, &Model::new(), &mut diagnostics));
        assert_eq!(diagnostics.into_entries().len(), 1);
    }

    #[test]
    fn first_satisfied_branch_wins() {
        let text = "<if a>A</if><elseif b>B</elseif><elseunless c>C</elseunless><else>D</else>!";
        assert_eq!(resolve(text, json!({ "a": 1, "b": 1 })), "A!");
        assert_eq!(resolve(text, json!({ "b": 1 })), "B!");
        assert_eq!(resolve(text, json!({ "c": 1 })), "D!");
        assert_eq!(resolve(text, json!({ "c": 0 })), "C!");
    }

    #[test]
    fn no_branch_resolves_to_nothing() {
        assert_eq!(resolve("x<if a>A</if><elseif b>B</elseif>y", json!({})), "xy");
    }

    #[test]
    fn chain_stops_at_other_content() {
        assert_eq!(
            resolve("<if a>A</if><p>p</p><else>B</else>", json!({ "a": true })),
            "A<p>p</p>"
        );
        assert_eq!(
            resolve("<if a>A</if><else>B</else><else>C</else>", json!({})),
            "B"
        );
    }

    #[test]
    fn blank_text_between_links() {
        assert_eq!(resolve("<if a>A</if> <else>B</else> .", json!({})), "B .");
    }

    #[test]
    fn winner_children_are_lifted() {
        assert_eq!(
            resolve("<div><unless a><b>1</b><if c>2</if></unless></div>", json!({ "c": "y" })),
            "<div><b>1</b>2</div>"
        );
    }

    #[test]
    fn consecutive_heads_are_separate_chains() {
        assert_eq!(resolve("<if a>A</if><if b>B</if><else>C</else>", json!({ "a": 1 })), "AC");
    }
}
