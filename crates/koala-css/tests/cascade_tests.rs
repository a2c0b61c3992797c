//! Integration tests for CSS cascade and style computation.

use koala_css::cascade::{apply_styles_to_tree, compute_style, extract_stylesheets, stylesheet_links};
use koala_css::parser::parse_stylesheet;
use koala_css::style::{DisplayValue, TextAlign};
use koala_css::values::{Color, Length};
use koala_dom::{DomTree, NodeId};
use quickcheck_macros::quickcheck;

fn parse(html: &str) -> DomTree {
    koala_html::parse(html)
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.get_elements_by_tag_name(tree.root(), tag)[0]
}

#[test]
fn test_id_beats_class_beats_type() {
    let tree = parse(r#"<div id="id" class="cls"></div>"#);
    let sheet = parse_stylesheet("div{color:red} .cls{color:blue} #id{color:green}");
    let style = compute_style(&tree, first(&tree, "div"), &[sheet]);
    assert_eq!(style.color, Color::rgb(0, 128, 0));
}

#[test]
fn test_specificity_wins_over_source_order() {
    let tree = parse(r#"<div id="id" class="cls"></div>"#);
    let sheet = parse_stylesheet("#id{color:green} .cls{color:blue} div{color:red}");
    let style = compute_style(&tree, first(&tree, "div"), &[sheet]);
    assert_eq!(style.color, Color::rgb(0, 128, 0));
}

#[test]
fn test_later_rule_wins_at_equal_specificity() {
    let tree = parse("<p></p>");
    let sheets = [
        parse_stylesheet("p { color: red }"),
        parse_stylesheet("p { color: blue }"),
    ];
    let style = compute_style(&tree, first(&tree, "p"), &sheets);
    assert_eq!(style.color, Color::rgb(0, 0, 255));
}

#[test]
fn test_important_beats_specificity() {
    let tree = parse(r#"<div id="id"></div>"#);
    let sheet = parse_stylesheet("div { color: red !important } #id { color: green }");
    let style = compute_style(&tree, first(&tree, "div"), &[sheet]);
    assert_eq!(style.color, Color::rgb(255, 0, 0));
}

#[test]
fn test_inline_style_beats_id_but_not_important() {
    let tree = parse(r#"<div id="x" style="color: blue; width: 10px"></div>"#);
    let div = first(&tree, "div");

    let style = compute_style(&tree, div, &[parse_stylesheet("#x { color: red; width: 50px }")]);
    assert_eq!(style.color, Color::rgb(0, 0, 255));
    assert_eq!(style.width, Length::px(10.0));

    let style = compute_style(&tree, div, &[parse_stylesheet("#x { width: 50px !important }")]);
    assert_eq!(style.width, Length::px(50.0));
}

#[test]
fn test_rule_uses_its_most_specific_matching_selector() {
    // `#a, p` matches through `#a`, which outranks `.c`.
    let tree = parse(r#"<p id="a" class="c"></p>"#);
    let sheet = parse_stylesheet(".c { color: blue } #a, p { color: red }");
    let style = compute_style(&tree, first(&tree, "p"), &[sheet]);
    assert_eq!(style.color, Color::rgb(255, 0, 0));
}

#[test]
fn test_tag_defaults_apply() {
    let tree = parse("<h1>t</h1><span>s</span><a href='#'>l</a><script>x</script>");
    let styles = apply_styles_to_tree(&tree, &[]);
    let h1 = &styles[&first(&tree, "h1")];
    assert_eq!(h1.display, DisplayValue::Block);
    assert_eq!(h1.font_size, 32.0);
    assert_eq!(h1.font_weight, 700);
    assert_eq!(h1.margin.top, Length::px(21.0));
    assert_eq!(styles[&first(&tree, "span")].display, DisplayValue::Inline);
    assert!(styles[&first(&tree, "script")].is_display_none());
}

#[test]
fn test_inherited_properties_flow_down() {
    let tree = parse("<div><section><p>deep</p></section></div>");
    let sheet = parse_stylesheet("div { color: red; font-size: 20px; text-align: center; width: 100px }");
    let styles = apply_styles_to_tree(&tree, &[sheet]);

    let p = &styles[&first(&tree, "p")];
    assert_eq!(p.color, Color::rgb(255, 0, 0));
    assert_eq!(p.font_size, 20.0);
    assert_eq!(p.text_align, TextAlign::Center);
    // Width is not inherited.
    assert!(p.width.is_auto());
}

#[test]
fn test_explicit_value_blocks_inheritance() {
    let tree = parse(r#"<div><p class="x">a</p></div>"#);
    let sheet = parse_stylesheet("div { color: red } .x { color: blue }");
    let styles = apply_styles_to_tree(&tree, &[sheet]);
    assert_eq!(styles[&first(&tree, "p")].color, Color::rgb(0, 0, 255));
}

#[test]
fn test_value_equal_to_tag_default_still_inherits() {
    // `color: black` on the child equals its default, so the parent's
    // color is taken.
    let tree = parse(r#"<div><p class="x">a</p></div>"#);
    let sheet = parse_stylesheet("div { color: red } .x { color: black }");
    let styles = apply_styles_to_tree(&tree, &[sheet]);
    assert_eq!(styles[&first(&tree, "p")].color, Color::rgb(255, 0, 0));
}

#[test]
fn test_invalid_values_leave_property_unset() {
    let tree = parse("<p></p>");
    let sheet = parse_stylesheet("p { color: notacolor; width: 12furlongs; display: sideways; zorp: 1 }");
    let style = compute_style(&tree, first(&tree, "p"), &[sheet]);
    assert_eq!(style.color, Color::BLACK);
    assert!(style.width.is_auto());
    assert_eq!(style.display, DisplayValue::Block);
}

#[test]
fn test_extract_stylesheets_and_links() {
    let tree = parse(
        r#"<head><link rel="stylesheet" href="a.css"><link rel="icon" href="f.ico">
        <style>p { color: red }</style><style></style></head><body><style>div { color: blue }</style></body>"#,
    );
    let sheets = extract_stylesheets(&tree);
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[1].rules[0].declarations[0].value, "blue");
    assert_eq!(stylesheet_links(&tree), vec!["a.css".to_string()]);
}

#[test]
fn test_non_elements_get_default_style() {
    let tree = parse("<p>text</p>");
    let text = tree.children(first(&tree, "p"))[0];
    let style = compute_style(&tree, text, &[parse_stylesheet("p { color: red }")]);
    assert_eq!(style.color, Color::BLACK);
}

/// Computing the same document twice yields identical styles.
#[quickcheck]
fn prop_style_computation_is_idempotent(picks: Vec<u8>) -> bool {
    const RULES: &[&str] = &[
        "div { color: red }",
        ".a { margin: 4px 2px }",
        "#b { font-size: 2em }",
        "p span { display: block }",
        "* { padding: 1px }",
        ".a { color: blue !important }",
        "span { flex: 1 }",
    ];
    let css: String = picks
        .iter()
        .map(|&b| RULES[usize::from(b) % RULES.len()])
        .collect();
    let tree = parse(r#"<div class="a"><p id="b">x <span class="a">y</span></p></div>"#);
    let sheets = [parse_stylesheet(&css)];
    apply_styles_to_tree(&tree, &sheets) == apply_styles_to_tree(&tree, &sheets)
}
