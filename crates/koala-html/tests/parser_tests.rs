//! Integration tests for the HTML parser.

use koala_dom::{DomTree, NodeId, NodeType};
use quickcheck_macros::quickcheck;

fn parse(html: &str) -> DomTree {
    koala_html::parse(html)
}

/// First element named `tag` below `scope`, in document order.
fn first(tree: &DomTree, scope: NodeId, tag: &str) -> Option<NodeId> {
    tree.get_elements_by_tag_name(scope, tag).first().copied()
}

/// Concatenated text below `id`, untrimmed.
fn raw_text(tree: &DomTree, id: NodeId) -> String {
    tree.descendants(id).filter_map(|d| tree.as_text(d)).collect()
}

fn tag_names(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.as_element(c).map(|e| e.tag_name.clone()))
        .collect()
}

#[test]
fn test_document_structure() {
    let tree = parse("<!DOCTYPE html><html><head></head><body></body></html>");

    let root = tree.get(NodeId::ROOT).unwrap();
    assert!(matches!(root.node_type, NodeType::Document));

    let html_id = first(&tree, NodeId::ROOT, "html").unwrap();
    assert_eq!(tree.parent(html_id), Some(NodeId::ROOT));
    assert_eq!(tag_names(&tree, html_id), vec!["head", "body"]);
}

#[test]
fn test_no_implied_structure() {
    let tree = parse("<p>loose</p>");
    assert_eq!(tag_names(&tree, NodeId::ROOT), vec!["p"]);
}

#[test]
fn test_nested_inline_text() {
    let tree = parse(r#"<div id="a"><p>Hello <b>World</b></p></div>"#);

    let div = tree.get_element_by_id("a").unwrap();
    assert_eq!(tree.tag_name(div), Some("div"));

    let children = tree.children(div);
    assert_eq!(children.len(), 1);
    let p = children[0];
    assert_eq!(tree.tag_name(p), Some("p"));

    let p_children = tree.children(p);
    assert_eq!(p_children.len(), 2);
    assert_eq!(tree.as_text(p_children[0]), Some("Hello "));
    assert_eq!(tree.tag_name(p_children[1]), Some("b"));
    assert_eq!(tree.text_content(p_children[1]), "World");
}

#[test]
fn test_comment_discarded() {
    let tree = parse("<body><!-- test comment --><p>x</p></body>");
    let body_id = first(&tree, NodeId::ROOT, "body").unwrap();
    assert_eq!(tree.children(body_id).len(), 1);
}

#[test]
fn test_element_attributes() {
    let tree = parse(r#"<div id="main" class='container wide' hidden data-x=3></div>"#);
    let div_id = first(&tree, NodeId::ROOT, "div").unwrap();
    let data = tree.as_element(div_id).unwrap();

    assert_eq!(data.id(), Some("main"));
    assert_eq!(data.get_attribute("class"), Some("container wide"));
    // Bare and unquoted attributes are dropped
    assert_eq!(data.attrs.len(), 2);
}

#[test]
fn test_attribute_names_lowercased_and_values_decoded() {
    let tree = parse(r#"<a HREF="/x?a=1&amp;b=2">link</a>"#);
    let a = first(&tree, NodeId::ROOT, "a").unwrap();
    assert_eq!(
        tree.as_element(a).unwrap().get_attribute("href"),
        Some("/x?a=1&b=2")
    );
}

#[test]
fn test_tag_names_lowercased() {
    let tree = parse("<DIV><SPAN>x</SPAN></DIV>");
    let div = first(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tag_names(&tree, div), vec!["span"]);
}

#[test]
fn test_void_elements() {
    let tree = parse(r#"<body><input type="text"><br><p>after</p></body>"#);
    let body_id = first(&tree, NodeId::ROOT, "body").unwrap();

    // Void elements don't nest
    assert_eq!(tag_names(&tree, body_id), vec!["input", "br", "p"]);
}

#[test]
fn test_self_closing_non_void() {
    let tree = parse("<div><span/><em>x</em></div>");
    let div = first(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tag_names(&tree, div), vec!["span", "em"]);
}

#[test]
fn test_paragraph_auto_close() {
    let tree = parse("<div><p>one<p>two</div>");
    let div = first(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tag_names(&tree, div), vec!["p", "p"]);
}

#[test]
fn test_list_item_auto_close() {
    let tree = parse("<ul><li>a<li>b<li>c</ul><p>after</p>");
    let ul = first(&tree, NodeId::ROOT, "ul").unwrap();
    assert_eq!(tag_names(&tree, ul), vec!["li", "li", "li"]);
    assert_eq!(tag_names(&tree, NodeId::ROOT), vec!["ul", "p"]);
}

#[test]
fn test_unmatched_close_tag_ignored() {
    let tree = parse("<div></span><p>x</p></div>");
    let div = first(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tag_names(&tree, div), vec!["p"]);
}

#[test]
fn test_close_tag_closes_intervening_elements() {
    let tree = parse("<div><span><b>x</div><p>y</p>");
    assert_eq!(tag_names(&tree, NodeId::ROOT), vec!["div", "p"]);
}

#[test]
fn test_whitespace_only_text_dropped() {
    let tree = parse("<div>\n    <p>x</p>\n</div>");
    let div = first(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tree.children(div).len(), 1);
}

#[test]
fn test_whitespace_runs_collapsed() {
    let tree = parse("<p>  hello \n\t world  </p>");
    let p = first(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(raw_text(&tree, p), " hello world ");
    assert_eq!(tree.text_content(p), "hello world");
}

#[test]
fn test_entities_decoded_in_text() {
    let tree = parse("<p>Fish &amp; Chips &lt;3 &#x263A;</p>");
    let p = first(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text_content(p), "Fish & Chips <3 \u{263A}");
}

#[test]
fn test_style_content_is_raw() {
    let tree = parse("<style>p > a { color: red } /* &amp; */</style><p>x</p>");
    let style = first(&tree, NodeId::ROOT, "style").unwrap();
    assert_eq!(raw_text(&tree, style), "p > a { color: red } /* &amp; */");
    assert_eq!(tag_names(&tree, NodeId::ROOT), vec!["style", "p"]);
}

#[test]
fn test_script_closing_tag_case_insensitive() {
    let tree = parse("<script>var s = '<b>';</ScRiPt><b>bold</b>");
    let script = first(&tree, NodeId::ROOT, "script").unwrap();
    assert_eq!(raw_text(&tree, script), "var s = '<b>';");
    assert_eq!(tag_names(&tree, NodeId::ROOT), vec!["script", "b"]);
}

#[test]
fn test_empty_script_has_no_text_child() {
    let tree = parse("<script>   </script>");
    let script = first(&tree, NodeId::ROOT, "script").unwrap();
    assert!(tree.children(script).is_empty());
}

#[test]
fn test_skipped_subtrees() {
    let tree = parse(
        "<div><svg><svg><rect/></svg></svg><noscript><p>js off</p></noscript>\
         <TEMPLATE><b>t</b></TEMPLATE><span>kept</span></div>",
    );
    let div = first(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tag_names(&tree, div), vec!["span"]);
}

#[test]
fn test_unterminated_input() {
    let tree = parse("<div><p>text<span class=\"a");
    assert!(first(&tree, NodeId::ROOT, "div").is_some());
}

#[test]
fn test_simple_html_file() {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <!-- This is a comment -->
    <title>Test</title>
</head>
<body class="main" id="content">
    <div data-value='single quoted'>Hello</div>
    <p>World</p>
</body>
</html>"#;
    let tree = parse(html);

    let body = tree.get_element_by_id("content").unwrap();
    assert_eq!(tree.tag_name(body), Some("body"));
    assert_eq!(tag_names(&tree, body), vec!["div", "p"]);

    let div = first(&tree, body, "div").unwrap();
    assert_eq!(
        tree.as_element(div).unwrap().get_attribute("data-value"),
        Some("single quoted")
    );
    assert_eq!(tree.text_content(body), "Hello World");
}

/// Every attached node is listed exactly once by its parent.
fn tree_is_consistent(tree: &DomTree) -> bool {
    tree.descendants(NodeId::ROOT).all(|id| {
        tree.parent(id).is_some_and(|parent| {
            tree.children(parent).iter().filter(|&&c| c == id).count() == 1
        })
    })
}

#[quickcheck]
fn prop_parse_never_panics_and_tree_is_consistent(input: String) -> bool {
    tree_is_consistent(&parse(&input))
}

#[quickcheck]
fn prop_tag_soup_tree_is_consistent(parts: Vec<u8>) -> bool {
    const PIECES: &[&str] = &[
        "<div>", "</div>", "<p>", "</p>", "<li>", "<br>", "<span/>", "</b>", "text ",
        "<!--", "-->", "<script>", "</script>", "<svg>", "</svg>", "<a href=\"x\">", "&amp;",
        "<", ">",
    ];
    let html: String = parts
        .iter()
        .map(|&b| PIECES[usize::from(b) % PIECES.len()])
        .collect();
    tree_is_consistent(&parse(&html))
}
