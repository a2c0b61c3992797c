//! Text extraction and HTML serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use std::fmt::Write;

use crate::{DomTree, NodeId, NodeType};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr"
///
/// `param` is obsolete but still treated as void by the tree builder.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are serialized verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Whether `tag` is a void element (never has children).
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// Replaces `& < > " '` with their character references.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

impl DomTree {
    /// Text of every text descendant of `id`, each trimmed, joined by single
    /// spaces. Empty pieces are skipped.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.trim().to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// [§ 3.5 innerHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml)
    ///
    /// Serialization of `id`'s children.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag_name(id).is_some_and(|t| RAW_TEXT_ELEMENTS.contains(&t));
        for &child in self.children(id) {
            self.serialize_node(child, raw, &mut out);
        }
        out
    }

    /// [§ 3.5 outerHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-outerhtml)
    ///
    /// Serialization of `id` itself and its subtree.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, false, &mut out);
        out
    }

    fn serialize_node(&self, id: NodeId, raw_parent: bool, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {
                for &child in &node.children {
                    self.serialize_node(child, false, out);
                }
            }
            NodeType::Text(text) if raw_parent => out.push_str(text),
            NodeType::Text(text) => out.push_str(&escape_text(text)),
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                for (name, value) in &data.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape_text(value));
                }
                if is_void_element(&data.tag_name) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                out.push_str(&self.inner_html(id));
                let _ = write!(out, "</{}>", data.tag_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_void_elements_case_insensitive() {
        assert!(is_void_element("BR"));
        assert!(!is_void_element("div"));
    }
}
