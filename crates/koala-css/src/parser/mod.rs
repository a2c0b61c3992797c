//! CSS parser module.
//!
//! Stylesheet text is scanned rule by rule: comments are stripped, each
//! prelude runs up to the next `{`, and the block ends at the matching `}`.
//! Shorthand properties are expanded into longhands as declarations are
//! read, so everything downstream only ever sees longhand names.

/// Shorthand property expansion.
pub mod shorthand;

pub use shorthand::expand_shorthand;

use koala_common::warning::warn_once;

use crate::selector::{Selector, parse_selector_list};

/// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-a-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name, lowercased.
    pub name: String,
    /// The raw value text with `!important` removed.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

impl Declaration {
    /// Build a declaration; the name is lowercased and the value trimmed.
    #[must_use]
    pub fn new(name: &str, value: &str, important: bool) -> Self {
        Self {
            name: name.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
            important,
        }
    }
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-a-qualified-rule)
///
/// A CSS style rule (selectors + declarations). Never empty on either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The list of selectors for this rule.
    pub selectors: Vec<Selector>,
    /// The declarations in this rule block, longhands only.
    pub declarations: Vec<Declaration>,
}

/// [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// A parsed CSS stylesheet; rule order is source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    /// The list of rules in the stylesheet.
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Total declarations over all rules.
    #[must_use]
    pub fn declaration_count(&self) -> usize {
        self.rules.iter().map(|r| r.declarations.len()).sum()
    }
}

/// CSS parser over comment-free stylesheet text.
pub struct CSSParser {
    input: String,
    position: usize,
}

impl CSSParser {
    /// Create a parser; comments are removed up front.
    #[must_use]
    pub fn new(css: &str) -> Self {
        Self {
            input: remove_comments(css),
            position: 0,
        }
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        let mut stylesheet = Stylesheet::default();

        while let Some(rest) = self.remaining() {
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                break;
            }
            let rule_start = self.position + (rest.len() - trimmed.len());
            let is_at_rule = trimmed.starts_with('@');

            // STEP 1: The prelude runs up to the next '{'.
            let open = trimmed.find('{');
            let prelude = open.map(|open| trimmed[..open].trim().to_string());
            self.position = rule_start;

            if is_at_rule {
                self.skip_at_rule();
                continue;
            }
            let (Some(open), Some(prelude)) = (open, prelude) else {
                break;
            };

            // STEP 2: The block ends at the matching '}' (or end of input).
            let block_start = rule_start + open + 1;
            let block_end = find_matching_brace(&self.input, block_start);
            let block = self.input[block_start..block_end].to_string();
            self.position = (block_end + 1).min(self.input.len());

            // STEP 3: Drop rules that end up with nothing on either side.
            let selectors = parse_selector_list(&prelude);
            let declarations = parse_declaration_block(&block);
            if selectors.is_empty() || declarations.is_empty() {
                tracing::trace!(%prelude, "dropping empty or unsupported rule");
                continue;
            }
            stylesheet.rules.push(Rule {
                selectors,
                declarations,
            });
        }

        tracing::debug!(rules = stylesheet.rules.len(), "parsed stylesheet");
        stylesheet
    }

    fn remaining(&self) -> Option<&str> {
        self.input.get(self.position..).filter(|s| !s.is_empty())
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-an-at-rule)
    ///
    /// At-rules are not evaluated. A statement at-rule ends at `;`, a block
    /// at-rule at its matching `}`.
    fn skip_at_rule(&mut self) {
        let Some(rest) = self.remaining() else {
            return;
        };
        let name: String = rest[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        warn_once("css", &format!("ignoring unsupported @{name} rule"));

        let semicolon = rest.find(';');
        let brace = rest.find('{');
        self.position = match (semicolon, brace) {
            (Some(semi), Some(open)) if semi < open => self.position + semi + 1,
            (_, Some(open)) => {
                (find_matching_brace(&self.input, self.position + open + 1) + 1)
                    .min(self.input.len())
            }
            (Some(semi), None) => self.position + semi + 1,
            (None, None) => self.input.len(),
        };
    }
}

/// Parse a complete stylesheet.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    CSSParser::new(css).parse_stylesheet()
}

/// [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
///
/// Parse the contents of a `style` attribute.
#[must_use]
pub fn parse_inline_style(style: &str) -> Vec<Declaration> {
    parse_declaration_block(&remove_comments(style))
}

/// Split on `;`, then on the first `:`. Entries without a name or value are
/// skipped; shorthands are expanded.
fn parse_declaration_block(block: &str) -> Vec<Declaration> {
    block
        .split(';')
        .filter_map(|entry| {
            let (name, value) = entry.split_once(':')?;
            let (value, important) = strip_important(value.trim());
            let name = name.trim();
            (!name.is_empty() && !value.is_empty())
                .then(|| expand_shorthand(&Declaration::new(name, value, important)))
        })
        .flatten()
        .collect()
}

/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// Case-insensitive `!important`, with optional space after the `!`.
fn strip_important(value: &str) -> (&str, bool) {
    let Some(bang) = value.rfind('!') else {
        return (value, false);
    };
    if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
        (value[..bang].trim_end(), true)
    } else {
        (value, false)
    }
}

/// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comments)
///
/// An unterminated comment swallows the rest of the input.
fn remove_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Index of the `}` closing a block whose body starts at `start`, or the
/// input length when the block is never closed.
fn find_matching_brace(css: &str, start: usize) -> usize {
    let mut depth = 1u32;
    for (i, b) in css.bytes().enumerate().skip(start) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    css.len()
}
