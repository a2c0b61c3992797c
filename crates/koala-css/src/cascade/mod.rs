//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Styles are kept outside the DOM in a [`StyleMap`] keyed by [`NodeId`];
//! the map is rebuilt from scratch on every pass.

use std::collections::HashMap;

use koala_dom::{DomTree, NodeId};

use crate::parser::{Declaration, Stylesheet, parse_inline_style, parse_stylesheet};
use crate::selector::Specificity;
use crate::style::ComputedStyle;
use crate::ua_stylesheet::default_style_for_tag;

/// Computed style for every element of one document.
pub type StyleMap = HashMap<NodeId, ComputedStyle>;

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// One declaration that applies to the element, with what it needs to be
/// ranked.
#[derive(Debug)]
struct CascadeEntry<'a> {
    important: bool,
    specificity: Specificity,
    order: usize,
    declaration: &'a Declaration,
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
/// "The cascade takes an unordered list of declared values for a given property
/// on a given element, sorts them by their declaration's precedence..."
///
/// Compute the style of one element, without inheritance. Non-elements get
/// the default style.
#[must_use]
pub fn compute_style(tree: &DomTree, id: NodeId, stylesheets: &[Stylesheet]) -> ComputedStyle {
    let Some(element) = tree.as_element(id) else {
        return ComputedStyle::default();
    };

    // STEP 1: Start from the tag's UA defaults.
    let mut style = default_style_for_tag(&element.tag_name);

    // STEP 2: Collect every applicable declaration. A rule contributes once,
    // ranked by its most specific matching selector.
    let mut entries = Vec::new();
    let mut order = 0usize;
    for sheet in stylesheets {
        for rule in &sheet.rules {
            let Some(specificity) = rule
                .selectors
                .iter()
                .filter(|sel| sel.matches(tree, id))
                .map(|sel| sel.specificity())
                .max()
            else {
                continue;
            };
            for declaration in &rule.declarations {
                entries.push(CascadeEntry {
                    important: declaration.important,
                    specificity,
                    order,
                    declaration,
                });
                order += 1;
            }
        }
    }

    // STEP 3: The style attribute sits above every selector.
    let inline = element
        .get_attribute("style")
        .map(parse_inline_style)
        .unwrap_or_default();
    for declaration in &inline {
        entries.push(CascadeEntry {
            important: declaration.important,
            specificity: Specificity::INLINE,
            order,
            declaration,
        });
        order += 1;
    }

    // STEP 4: [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    // Importance, then specificity, then source order; the winner is applied last.
    entries.sort_by_key(|e| (e.important, e.specificity, e.order));

    for entry in &entries {
        style.apply_declaration(entry.declaration);
    }

    tracing::trace!(node = id.0, declarations = entries.len(), "computed style");
    style
}

/// Properties copied from parent to child by the inheritance pass.
pub const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "text-align",
    "visibility",
];

/// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
///
/// Copy each inherited property from `parent` unless the cascade moved the
/// child away from its tag default. A rule that sets a value equal to the
/// tag default is indistinguishable from no rule at all here.
fn inherit_from_parent(child: &mut ComputedStyle, parent: &ComputedStyle, tag_default: &ComputedStyle) {
    macro_rules! inherit {
        ($($field:ident),+) => {
            $(
                if child.$field == tag_default.$field {
                    child.$field = parent.$field.clone();
                }
            )+
        };
    }
    inherit!(
        color,
        font_family,
        font_size,
        font_weight,
        line_height,
        text_align,
        visibility
    );
}

/// Compute styles for every element in the tree, then run the inheritance
/// pass top-down so values flow through several generations.
#[must_use]
pub fn apply_styles_to_tree(tree: &DomTree, stylesheets: &[Stylesheet]) -> StyleMap {
    let mut styles = StyleMap::new();

    for id in tree.descendant_elements(tree.root()) {
        let mut style = compute_style(tree, id, stylesheets);

        let parent_style = tree.parent(id).and_then(|p| styles.get(&p));
        if let (Some(parent_style), Some(element)) = (parent_style, tree.as_element(id)) {
            let tag_default = default_style_for_tag(&element.tag_name);
            inherit_from_parent(&mut style, parent_style, &tag_default);
        }

        let _ = styles.insert(id, style);
    }

    tracing::debug!(elements = styles.len(), "applied styles to tree");
    styles
}

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// "Declarations from style sheets independently linked by the originating
/// document are treated as if they were concatenated in linking order."
///
/// Where one of a document's stylesheets comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetSource {
    /// The text of a `<style>` element.
    ///
    /// [§ 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
    Inline(String),
    /// The `href` of a `<link rel="stylesheet">`, for the caller to fetch.
    ///
    /// [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
    External(String),
}

/// Every `<style>` and `<link rel="stylesheet">` in document order.
#[must_use]
pub fn stylesheet_sources(tree: &DomTree) -> Vec<StylesheetSource> {
    tree.descendant_elements(tree.root())
        .filter_map(|id| {
            let element = tree.as_element(id)?;
            match element.tag_name.as_str() {
                "style" => Some(StylesheetSource::Inline(
                    tree.children(id)
                        .iter()
                        .filter_map(|&c| tree.as_text(c))
                        .collect(),
                )),
                // STEP 1: "If the rel attribute's value contains the token
                // stylesheet, then the link is a stylesheet link."
                // STEP 2: "The href attribute gives the address (a valid
                // non-empty URL potentially surrounded by spaces)."
                "link" if is_stylesheet_link(element.get_attribute("rel")) => element
                    .get_attribute("href")
                    .map(str::trim)
                    .filter(|href| !href.is_empty())
                    .map(|href| StylesheetSource::External(href.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// [§ 2.4.7 Space-separated tokens](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#space-separated-tokens)
fn is_stylesheet_link(rel: Option<&str>) -> bool {
    rel.is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Parse the text of every `<style>` element, in document order. Sheets
/// with no usable rules are dropped.
#[must_use]
pub fn extract_stylesheets(tree: &DomTree) -> Vec<Stylesheet> {
    stylesheet_sources(tree)
        .into_iter()
        .filter_map(|source| match source {
            StylesheetSource::Inline(css) => Some(parse_stylesheet(&css)),
            StylesheetSource::External(_) => None,
        })
        .filter(|sheet| !sheet.rules.is_empty())
        .collect()
}

/// `href`s of `<link rel="stylesheet">` elements, in document order.
#[must_use]
pub fn stylesheet_links(tree: &DomTree) -> Vec<String> {
    stylesheet_sources(tree)
        .into_iter()
        .filter_map(|source| match source {
            StylesheetSource::External(href) => Some(href),
            StylesheetSource::Inline(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Color;
    use koala_dom::ElementData;

    #[test]
    fn test_inherit_only_replaces_tag_defaults() {
        let tag_default = ComputedStyle::default();
        let parent = ComputedStyle {
            color: Color::rgb(255, 0, 0),
            font_size: 20.0,
            ..ComputedStyle::default()
        };
        let mut child = ComputedStyle {
            font_size: 12.0,
            ..ComputedStyle::default()
        };
        inherit_from_parent(&mut child, &parent, &tag_default);
        assert_eq!(child.color, Color::rgb(255, 0, 0));
        assert_eq!(child.font_size, 12.0);
    }

    #[test]
    fn test_stylesheet_sources_in_document_order() {
        let mut tree = DomTree::new();
        let style = tree.create_element(ElementData::new("style"));
        let css = tree.create_text("p { color: red }");
        let link = tree.create_element(
            ElementData::new("link")
                .with_attr("rel", "Alternate StyleSheet")
                .with_attr("href", " theme.css "),
        );
        let icon = tree.create_element(ElementData::new("link").with_attr("rel", "icon").with_attr("href", "f.ico"));
        tree.append_child(tree.root(), link);
        tree.append_child(tree.root(), style);
        tree.append_child(style, css);
        tree.append_child(tree.root(), icon);

        assert_eq!(
            stylesheet_sources(&tree),
            vec![
                StylesheetSource::External("theme.css".to_string()),
                StylesheetSource::Inline("p { color: red }".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_element_gets_default_style() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        tree.append_child(tree.root(), text);
        assert_eq!(compute_style(&tree, text, &[]), ComputedStyle::default());

        let div = tree.create_element(ElementData::new("div"));
        tree.append_child(tree.root(), div);
        assert!(compute_style(&tree, div, &[]).display.is_block_level());
    }
}
