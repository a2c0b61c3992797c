use std::fmt;

use koala_dom::{DomTree, ElementData, NodeId, NodeType, is_void_element};

use crate::tokenizer::{Attribute, Token};

/// Elements that implicitly close an open element of the same name.
///
/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// "A start tag whose tag name is "li" ... If node is an li element, then ...
/// Pop elements from the stack of open elements until an li element has been
/// popped from the stack."
const SELF_CLOSING_SIBLINGS: &[&str] = &["p", "li"];

/// A recovered structural problem noticed while building the tree.
///
/// These never abort parsing; they exist for debugging output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Human-readable description.
    pub message: String,
    /// Index of the token that triggered the issue.
    pub token_index: usize,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token {}: {}", self.token_index, self.message)
    }
}

/// Tolerant tree builder.
///
/// Keeps a single insertion point instead of the full WHATWG stack of open
/// elements. Start tags append under the insertion point and descend into
/// the new element unless it is void or self-closing. End tags climb back to
/// the nearest open element of the same name; unmatched end tags are
/// ignored. Elements are appended directly to the document node: no
/// `<html>`, `<head>` or `<body>` is implied.
pub struct HTMLParser {
    /// DOM tree under construction. `NodeId::ROOT` is the Document node.
    tree: DomTree,

    /// Where the next node is appended.
    current: NodeId,

    /// Input tokens from the tokenizer.
    tokens: Vec<Token>,

    /// Recovered problems.
    issues: Vec<ParseIssue>,
}

impl HTMLParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tree: DomTree::new(),
            current: NodeId::ROOT,
            tokens,
            issues: Vec::new(),
        }
    }

    /// Run the parser and return the DOM tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the `DomTree` and any recovered issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.into_iter().enumerate() {
            self.process_token(index, token);
        }
        tracing::debug!(
            nodes = self.tree.len(),
            issues = self.issues.len(),
            "built DOM tree"
        );
        (self.tree, self.issues)
    }

    fn process_token(&mut self, index: usize, token: Token) {
        match token {
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.insert_element(&name, self_closing, attributes),
            Token::EndTag { name } => self.close_element(index, &name),
            Token::Text { data } => {
                if !data.trim().is_empty() {
                    let text = self.tree.alloc(NodeType::Text(data));
                    self.tree.append_child(self.current, text);
                }
            }
        }
    }

    fn current_tag(&self) -> Option<&str> {
        self.tree.tag_name(self.current)
    }

    fn insert_element(&mut self, name: &str, self_closing: bool, attributes: Vec<Attribute>) {
        // STEP 1: An open <p> or <li> is closed by another of the same name.
        if SELF_CLOSING_SIBLINGS.contains(&name) && self.current_tag() == Some(name) {
            self.current = self.tree.parent(self.current).unwrap_or(NodeId::ROOT);
        }

        // STEP 2: Create and append the element.
        let mut data = ElementData::new(name);
        for attr in attributes {
            let _ = data.attrs.entry(attr.name).or_insert(attr.value);
        }
        let element = self.tree.alloc(NodeType::Element(data));
        self.tree.append_child(self.current, element);

        // STEP 3: Descend unless the element can have no children.
        if !self_closing && !is_void_element(name) {
            self.current = element;
        }
    }

    fn close_element(&mut self, index: usize, name: &str) {
        // Walk from the insertion point up to the nearest open element with
        // this name; the insertion point becomes that element's parent.
        let mut candidate = Some(self.current);
        while let Some(id) = candidate {
            if self.tree.tag_name(id) == Some(name) {
                self.current = self.tree.parent(id).unwrap_or(NodeId::ROOT);
                return;
            }
            candidate = self.tree.parent(id);
        }

        tracing::trace!(tag = name, "ignoring unmatched end tag");
        self.issues.push(ParseIssue {
            message: format!("unmatched end tag </{name}>"),
            token_index: index,
        });
    }
}

/// Write an indented dump of the subtree rooted at `id` to stdout.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    print!("{}", dump_tree(tree, id, indent));
}

/// Indented dump of the subtree rooted at `id`, one node per line.
#[must_use]
pub fn dump_tree(tree: &DomTree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    write_tree(tree, id, indent, &mut out);
    out
}

fn write_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => {
            out.push_str(&prefix);
            out.push_str("Document\n");
        }
        NodeType::Element(data) => {
            out.push_str(&prefix);
            out.push('<');
            out.push_str(&data.tag_name);
            for (k, v) in &data.attrs {
                out.push_str(&format!(" {k}=\"{v}\""));
            }
            out.push_str(">\n");
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            out.push_str(&format!("{prefix}\"{display}\"\n"));
        }
    }
    for &child_id in tree.children(id) {
        write_tree(tree, child_id, indent + 1, out);
    }
}
