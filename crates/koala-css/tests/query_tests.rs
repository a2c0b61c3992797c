//! Integration tests for `query_selector` and `query_selector_all`.

use koala_css::query::{query_selector, query_selector_all};
use koala_dom::{DomTree, NodeId};

const PAGE: &str = r#"
<div id="app">
  <ul class="menu">
    <li class="item active"><a href="/a">A</a></li>
    <li class="item"><a href="/b">B</a></li>
    <li class="item"><span>C</span></li>
  </ul>
  <p class="note">text</p>
</div>
<p id="footer">end</p>
"#;

fn page() -> DomTree {
    koala_html::parse(PAGE)
}

fn ids_or_tags(tree: &DomTree, found: &[NodeId]) -> Vec<String> {
    found
        .iter()
        .map(|&id| {
            let element = tree.as_element(id).unwrap();
            element
                .id()
                .map_or_else(|| element.tag_name.clone(), |i| format!("#{i}"))
        })
        .collect()
}

#[test]
fn test_query_selector_returns_first_in_document_order() {
    let tree = page();
    let first_li = tree.get_elements_by_tag_name(tree.root(), "li")[0];
    assert_eq!(query_selector(&tree, tree.root(), ".item"), Some(first_li));
    assert_eq!(query_selector(&tree, tree.root(), "p, #app"), tree.get_element_by_id("app"));
    assert_eq!(query_selector(&tree, tree.root(), "table"), None);
}

#[test]
fn test_query_selector_all_keeps_document_order() {
    let tree = page();
    let found = query_selector_all(&tree, tree.root(), "#footer, .menu, p.note");
    assert_eq!(ids_or_tags(&tree, &found), vec!["ul", "p", "#footer"]);
}

#[test]
fn test_each_match_appears_once() {
    let tree = page();
    let found = query_selector_all(&tree, tree.root(), "li, .item, li.active");
    assert_eq!(found.len(), 3);
}

#[test]
fn test_scope_limits_the_search() {
    let tree = page();
    let ul = query_selector(&tree, tree.root(), "ul").unwrap();
    assert_eq!(query_selector_all(&tree, ul, "a").len(), 2);
    assert!(query_selector(&tree, ul, "p").is_none());
    assert!(query_selector(&tree, ul, "ul").is_none());
}

#[test]
fn test_combinators_are_checked_against_the_whole_document() {
    // `#app` lies outside the scope but still satisfies the descendant step.
    let tree = page();
    let ul = query_selector(&tree, tree.root(), "ul").unwrap();
    assert_eq!(query_selector_all(&tree, ul, "#app li > a").len(), 2);
    assert_eq!(query_selector_all(&tree, tree.root(), "li.active + li a").len(), 1);
}

#[test]
fn test_invalid_selectors_find_nothing() {
    let tree = page();
    assert!(query_selector_all(&tree, tree.root(), "").is_empty());
    assert!(query_selector_all(&tree, tree.root(), "li >").is_empty());
    assert!(query_selector(&tree, tree.root(), "[unterminated").is_none());
}
