//! Token types passed from the tokenizer to the tree builder.

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Attribute value with character references decoded.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer emits tokens of these types to the tree construction stage.
/// Comments and DOCTYPEs are consumed by the tokenizer and never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Set when the raw tag text ends in `/`.
        self_closing: bool,
        /// Quoted attributes in source order; the first of duplicates wins.
        attributes: Vec<Attribute>,
    },

    /// End tag token.
    EndTag {
        /// Lowercased tag name.
        name: String,
    },

    /// A run of character data between tags.
    ///
    /// Outside `script`/`style` the data is entity-decoded with whitespace
    /// runs collapsed to one space; inside them it is verbatim.
    Text {
        /// "data"
        data: String,
    },
}

impl Token {
    /// Returns the tag name if this is a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            Self::Text { .. } => None,
        }
    }
}
