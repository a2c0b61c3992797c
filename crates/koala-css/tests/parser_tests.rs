//! Integration tests for the CSS parser and shorthand expansion.

use koala_css::parser::{Declaration, parse_inline_style, parse_stylesheet};
use koala_css::style::ComputedStyle;
use koala_css::values::Length;

fn names_and_values(declarations: &[Declaration]) -> Vec<(&str, &str)> {
    declarations
        .iter()
        .map(|d| (d.name.as_str(), d.value.as_str()))
        .collect()
}

#[test]
fn test_margin_two_values_expand_to_four_sides() {
    let sheet = parse_stylesheet("div { margin: 10px 5px; }");
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(
        names_and_values(&sheet.rules[0].declarations),
        vec![
            ("margin-top", "10px"),
            ("margin-right", "5px"),
            ("margin-bottom", "10px"),
            ("margin-left", "5px"),
        ]
    );

    let mut style = ComputedStyle::default();
    for decl in &sheet.rules[0].declarations {
        style.apply_declaration(decl);
    }
    assert_eq!(style.margin.top, Length::px(10.0));
    assert_eq!(style.margin.right, Length::px(5.0));
    assert_eq!(style.margin.bottom, Length::px(10.0));
    assert_eq!(style.margin.left, Length::px(5.0));
}

#[test]
fn test_three_value_padding() {
    let decls = parse_inline_style("padding: 1px 2px 3px");
    assert_eq!(
        names_and_values(&decls),
        vec![
            ("padding-top", "1px"),
            ("padding-right", "2px"),
            ("padding-bottom", "3px"),
            ("padding-left", "2px"),
        ]
    );
}

#[test]
fn test_selector_list_and_multiple_rules() {
    let sheet = parse_stylesheet("h1, h2 { color: red } p { color: blue; font-size: 12px }");
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(sheet.rules[0].selectors.len(), 2);
    assert_eq!(sheet.rules[1].declarations.len(), 2);
    assert_eq!(sheet.declaration_count(), 3);
}

#[test]
fn test_important_flag() {
    let decls = parse_inline_style("color: red !important; width: 5px ! IMPORTANT; height: 1px");
    assert_eq!(decls.len(), 3);
    assert!(decls[0].important);
    assert_eq!(decls[0].value, "red");
    assert!(decls[1].important);
    assert_eq!(decls[1].value, "5px");
    assert!(!decls[2].important);
}

#[test]
fn test_comments_are_ignored() {
    let sheet = parse_stylesheet("/* header */ p { /* inner */ color: red; } /* trailing");
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(names_and_values(&sheet.rules[0].declarations), vec![("color", "red")]);
}

#[test]
fn test_at_rules_are_skipped() {
    let css = r#"
        @import url("a.css");
        @media (max-width: 600px) { p { color: red; } }
        p { color: blue; }
        @font-face { font-family: x; }
    "#;
    let sheet = parse_stylesheet(css);
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(names_and_values(&sheet.rules[0].declarations), vec![("color", "blue")]);
}

#[test]
fn test_malformed_input_is_tolerated() {
    // Missing value, missing colon and an unclosed final block.
    let sheet = parse_stylesheet("p { color: ; width 10px; height: 5px } div { color: red");
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(names_and_values(&sheet.rules[0].declarations), vec![("height", "5px")]);
    assert_eq!(names_and_values(&sheet.rules[1].declarations), vec![("color", "red")]);

    assert!(parse_stylesheet("").rules.is_empty());
    assert!(parse_stylesheet("}}}{{{").rules.is_empty());
}

#[test]
fn test_flex_shorthand_forms() {
    let expand = |value: &str| {
        let decls = parse_inline_style(&format!("flex: {value}"));
        decls.into_iter().map(|d| d.value).collect::<Vec<_>>()
    };
    assert_eq!(expand("1"), vec!["1", "1", "0"]);
    assert_eq!(expand("none"), vec!["0", "0", "auto"]);
    assert_eq!(expand("auto"), vec!["1", "1", "auto"]);
    assert_eq!(expand("2 3"), vec!["2", "3", "0"]);
    assert_eq!(expand("1 100px"), vec!["1", "1", "100px"]);
    assert_eq!(expand("0 0 50%"), vec!["0", "0", "50%"]);
}

#[test]
fn test_border_shorthand() {
    let decls = parse_inline_style("border: 2px solid red");
    let top: Vec<_> = decls
        .iter()
        .filter(|d| d.name.starts_with("border-top"))
        .map(|d| (d.name.as_str(), d.value.as_str()))
        .collect();
    assert_eq!(
        top,
        vec![
            ("border-top-width", "2px"),
            ("border-top-style", "solid"),
            ("border-top-color", "red"),
        ]
    );
    assert_eq!(decls.len(), 12);
}

#[test]
fn test_background_shorthand_keeps_color_and_image() {
    let decls = parse_inline_style("background: #fff url(bg.png) no-repeat");
    assert_eq!(
        names_and_values(&decls),
        vec![("background-color", "#fff"), ("background-image", "url(bg.png)")]
    );
}
