//! HTML tokenizer module.
//!
//! Implements a tolerant subset of
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization).

/// Character reference decoding per § 13.5.
pub mod character_reference;
/// Token types produced by the tokenizer.
pub mod token;
/// Tokenizer implementation.
#[allow(clippy::module_inception)]
pub mod tokenizer;

pub use character_reference::decode_character_references;
pub use token::{Attribute, Token};
pub use tokenizer::{HTMLTokenizer, RawTextElement, SkippedElement};
