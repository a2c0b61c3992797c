//! [§ 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#interface-parentnode)
//!
//! `querySelector()` and `querySelectorAll()` over a [`DomTree`].

use koala_dom::{DomTree, NodeId};

use crate::selector::{Selector, parse_selector_list};

/// [§ 4.2.6 querySelector()](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
///
/// "The querySelector(selectors) method steps are to return the first result
/// of running scope-match a selectors string selectors against this, if the
/// result is not an empty list; otherwise null."
///
/// Only descendants of `scope` are candidates. An unparsable selector list
/// matches nothing.
#[must_use]
pub fn query_selector(tree: &DomTree, scope: NodeId, selectors: &str) -> Option<NodeId> {
    let list = parse_selector_list(selectors);
    if list.is_empty() {
        return None;
    }
    tree.descendant_elements(scope)
        .find(|&id| matches_any(&list, tree, id))
}

/// [§ 4.2.6 querySelectorAll()](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
///
/// "The querySelectorAll(selectors) method steps are to return the static
/// result of running scope-match a selectors string selectors against this."
///
/// Results are in tree order and each element appears once, even when it
/// matches several selectors in the list.
#[must_use]
pub fn query_selector_all(tree: &DomTree, scope: NodeId, selectors: &str) -> Vec<NodeId> {
    let list = parse_selector_list(selectors);
    if list.is_empty() {
        return Vec::new();
    }
    let found: Vec<NodeId> = tree
        .descendant_elements(scope)
        .filter(|&id| matches_any(&list, tree, id))
        .collect();
    tracing::trace!(selectors, count = found.len(), "query_selector_all");
    found
}

fn matches_any(list: &[Selector], tree: &DomTree, id: NodeId) -> bool {
    list.iter().any(|selector| selector.matches(tree, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_dom::ElementData;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element(ElementData::new("div").with_attr("id", "main"));
        let p = tree.create_element(ElementData::new("p").with_attr("class", "intro"));
        let span = tree.create_element(ElementData::new("span"));
        tree.append_child(NodeId::ROOT, div);
        tree.append_child(div, p);
        tree.append_child(p, span);
        (tree, div, p, span)
    }

    #[test]
    fn test_first_match_in_tree_order() {
        let (tree, div, p, _) = sample();
        assert_eq!(query_selector(&tree, NodeId::ROOT, "span, p"), Some(p));
        assert_eq!(query_selector(&tree, NodeId::ROOT, "#main"), Some(div));
    }

    #[test]
    fn test_scope_is_not_a_candidate() {
        let (tree, div, _, span) = sample();
        assert_eq!(query_selector(&tree, div, "div"), None);
        assert_eq!(query_selector_all(&tree, div, "div span"), vec![span]);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let (tree, ..) = sample();
        assert_eq!(query_selector(&tree, NodeId::ROOT, ""), None);
        assert!(query_selector_all(&tree, NodeId::ROOT, ">>").is_empty());
    }
}
