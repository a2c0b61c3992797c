use strum_macros::{Display, EnumString};

use super::character_reference::decode_character_references;
use super::token::{Attribute, Token};

/// Elements whose whole subtree is dropped during tokenization.
///
/// Their content is never rendered by this engine, so nested open/close tags
/// of the same name are depth-counted and everything up to the matching
/// close tag is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SkippedElement {
    /// `<svg>`
    Svg,
    /// `<noscript>`
    Noscript,
    /// `<template>`
    Template,
}

/// [§ 13.1.2.1 Restrictions on the contents of raw text elements](https://html.spec.whatwg.org/multipage/syntax.html#cdata-rcdata-restrictions)
///
/// "The text in raw text elements must not contain any occurrences of the
/// string "</" followed by characters that case-insensitively match the tag
/// name of the element"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RawTextElement {
    /// `<script>`
    Script,
    /// `<style>`
    Style,
}

/// Tolerant HTML tokenizer.
///
/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// A simplified scanner rather than the full WHATWG state machine: `<`
/// followed by a letter, `/` or `!` opens markup, everything else is text.
/// Tokenization never fails; unterminated constructs run to end of input.
pub struct HTMLTokenizer {
    input: String,
    pos: usize,
    tokens: Vec<Token>,
}

impl HTMLTokenizer {
    /// Create a new tokenizer for the given input.
    #[must_use]
    pub const fn new(input: String) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Consume the tokenizer and return the token stream.
    /// Call this after `run()` to get the tokens for the parser.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Tokenize the whole input.
    pub fn run(&mut self) {
        while self.pos < self.input.len() {
            if self.at_markup() {
                self.consume_markup();
            } else {
                self.consume_text();
            }
        }
        tracing::trace!(tokens = self.tokens.len(), "tokenized HTML");
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// `<` only opens markup when followed by a letter, `/` or `!`.
    fn at_markup(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<')
            && chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn consume_text(&mut self) {
        let rest = self.rest();
        // Skip the leading byte so a literal '<' that is not markup is kept.
        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(i, c)| c == '<' && Self::opens_markup(&rest[i..]))
            .map_or(rest.len(), |(i, _)| i);

        let data = collapse_whitespace(&decode_character_references(&rest[..end]));
        self.pos += end;
        self.emit_text(data);
    }

    fn opens_markup(s: &str) -> bool {
        s.chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
    }

    fn emit_text(&mut self, data: String) {
        if data.is_empty() {
            return;
        }
        // Adjacent runs (e.g. around a skipped comment) merge into one token.
        if let Some(Token::Text { data: last }) = self.tokens.last_mut() {
            if last.ends_with(' ') && data.starts_with(' ') {
                last.push_str(&data[1..]);
            } else {
                last.push_str(&data);
            }
            return;
        }
        self.tokens.push(Token::Text { data });
    }

    fn consume_markup(&mut self) {
        let rest = self.rest();

        // [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
        if rest.starts_with("<!--") {
            self.pos += rest[4..].find("-->").map_or(rest.len(), |end| end + 4 + 3);
            return;
        }

        // [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
        // and every other `<!...>` declaration.
        if rest.starts_with("<!") {
            self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);
            return;
        }

        let tag_len = find_tag_end(rest);
        let inner = rest[1..tag_len].trim_end_matches('>').to_string();
        self.pos += tag_len;

        // [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
        if let Some(end_tag) = inner.strip_prefix('/') {
            let name = tag_name_of(end_tag);
            if !name.is_empty() {
                self.tokens.push(Token::EndTag { name });
            }
            return;
        }

        let name = tag_name_of(&inner);
        let self_closing = inner.trim_end().ends_with('/');
        let attributes = parse_attributes(&inner[name.len()..]);

        if !self_closing && name.parse::<SkippedElement>().is_ok() {
            self.skip_element(&name);
            return;
        }

        self.tokens.push(Token::StartTag {
            name: name.clone(),
            self_closing,
            attributes,
        });

        if !self_closing && name.parse::<RawTextElement>().is_ok() {
            self.consume_raw_text(&name);
        }
    }

    /// Consume verbatim text up to the first case-insensitive `</name`.
    fn consume_raw_text(&mut self, name: &str) {
        let rest = self.rest();
        let close = find_ignore_ascii_case(rest, &format!("</{name}"));
        let content_end = close.unwrap_or(rest.len());
        let content = rest[..content_end].to_string();

        self.pos += content_end;
        if close.is_some() {
            self.pos += find_tag_end(self.rest());
        }

        if !content.trim().is_empty() {
            self.tokens.push(Token::Text { data: content });
        }
        self.tokens.push(Token::EndTag {
            name: name.to_string(),
        });
    }

    /// Drop everything up to the close tag balancing an already-consumed
    /// `<name ...>`, counting nested opens of the same name.
    fn skip_element(&mut self, name: &str) {
        let open = format!("<{name}");
        let close = format!("</{name}");
        let mut depth = 1usize;

        while depth > 0 && self.pos < self.input.len() {
            let rest = self.rest();
            let next_open = find_tag_ignore_ascii_case(rest, &open);
            let next_close = find_tag_ignore_ascii_case(rest, &close);

            match (next_open, next_close) {
                (Some(o), Some(c)) if o < c => {
                    let tag_len = find_tag_end(&rest[o..]);
                    if !rest[o..o + tag_len].trim_end_matches('>').ends_with('/') {
                        depth += 1;
                    }
                    self.pos += o + tag_len;
                }
                (_, Some(c)) => {
                    depth -= 1;
                    self.pos += c + find_tag_end(&rest[c..]);
                }
                (_, None) => self.pos = self.input.len(),
            }
        }
    }
}

/// Byte length of the tag starting at `s[0] == '<'`, through its `>`.
///
/// Quoted attribute values may contain `>`. Runs to the end of input when
/// the tag is unterminated.
fn find_tag_end(s: &str) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return i + 1,
            (None, _) => {}
        }
    }
    s.len()
}

/// Leading tag name of raw tag text, lowercased.
fn tag_name_of(raw: &str) -> String {
    raw.trim_start()
        .chars()
        .take_while(|c| !c.is_ascii_whitespace() && *c != '/' && *c != '>')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// ASCII case-insensitive substring search.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

/// Like [`find_ignore_ascii_case`] but only accepts a match followed by a
/// character that cannot continue a tag name, so `<svg` does not match `<svgx`.
fn find_tag_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = find_ignore_ascii_case(&haystack[offset..], needle) {
        let at = offset + found;
        let after = haystack[at + needle.len()..].chars().next();
        if after.is_none_or(|c| c.is_ascii_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        offset = at + needle.len();
    }
    None
}

/// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
///
/// Extracts `name="value"` and `name='value'` pairs. Unquoted values and
/// bare boolean attributes are dropped. Names are lowercased and values
/// entity-decoded; the first occurrence of a duplicate name wins.
fn parse_attributes(raw: &str) -> Vec<Attribute> {
    let mut attributes: Vec<Attribute> = Vec::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        // STEP 1: Skip to the start of a name.
        while i < chars.len() && (chars[i].is_ascii_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let name_start = i;
        while i < chars.len()
            && !matches!(chars[i], '=' | '>' | '/' | '"' | '\'')
            && !chars[i].is_ascii_whitespace()
        {
            i += 1;
        }
        let name: String = chars[name_start..i].iter().collect::<String>().to_ascii_lowercase();

        // STEP 2: Optional whitespace, then '='.
        let mut j = i;
        while j < chars.len() && chars[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= chars.len() || chars[j] != '=' {
            // Bare attribute; dropped.
            if i == name_start {
                i += 1;
            }
            continue;
        }
        j += 1;
        while j < chars.len() && chars[j].is_ascii_whitespace() {
            j += 1;
        }

        // STEP 3: A quoted value.
        let Some(&quote) = chars.get(j).filter(|&&c| c == '"' || c == '\'') else {
            // Unquoted value; skip it.
            while j < chars.len() && !chars[j].is_ascii_whitespace() {
                j += 1;
            }
            i = j;
            continue;
        };
        let value_start = j + 1;
        let value_end = chars[value_start..]
            .iter()
            .position(|&c| c == quote)
            .map_or(chars.len(), |p| value_start + p);
        i = (value_end + 1).min(chars.len());

        if name.is_empty() || attributes.iter().any(|a| a.name == name) {
            continue;
        }
        let value: String = chars[value_start..value_end].iter().collect();
        attributes.push(Attribute::new(name, decode_character_references(&value)));
    }
    attributes
}

/// Collapse each run of ASCII whitespace to a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
