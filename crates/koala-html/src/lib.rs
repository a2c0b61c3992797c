//! HTML tokenizer and tree builder for the Koala rendering engine.
//!
//! # Scope
//!
//! This crate implements a tolerant parser that turns arbitrary text into a
//! [`DomTree`] and never fails:
//! - **HTML Tokenizer** (after [WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Start/end tags with quoted attributes
//!   - Comments and DOCTYPEs dropped
//!   - Raw text for `script`/`style`, skipped subtrees for `svg`/`noscript`/`template`
//!   - Common named and numeric character references
//!
//! - **Tree Builder** (after [WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Void and self-closing elements
//!   - Implicit closing of `p` and `li`
//!   - Unmatched end tags ignored
//!
//! # Not Implemented
//!
//! - Insertion modes and implied `html`/`head`/`body`
//! - Unquoted and boolean attributes
//! - Adoption agency algorithm, foster parenting

/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{HTMLParser, ParseIssue, print_tree};
pub use parser::tree_builder::dump_tree;
pub use tokenizer::{Attribute, HTMLTokenizer, Token, decode_character_references};

use koala_dom::DomTree;

/// Tokenize and tree-build `html` in one call.
#[must_use]
pub fn parse(html: &str) -> DomTree {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run()
}
