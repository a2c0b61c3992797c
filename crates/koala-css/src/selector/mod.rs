//! CSS Selector parsing and matching
//!
//! This module implements selector parsing and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
//!
//! A selector is a chain of compound selectors joined by combinators. It is
//! stored subject-first so matching can start at the element itself and
//! fail fast before walking any ancestors.

use std::iter::Peekable;
use std::str::Chars;

use koala_dom::{DomTree, ElementData, NodeId};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// Stored lowercased; matched case-insensitively.
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// Structural pseudo-class; needs the tree to match.
    PseudoClass(PseudoClass),

    /// Interactive pseudo-classes (`:hover`, `:focus`), pseudo-elements and
    /// functional pseudo-classes we do not evaluate. Keeps the rule parseable
    /// but never matches.
    NeverMatch,
}

/// Structural pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// All sibling counting considers element siblings only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:root`, the document element.
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:nth-child(odd | even | N | An+B)`
    NthChild(NthIndex),
    /// `:empty`, no element children and no non-whitespace text.
    Empty,
    /// `:link`, `a`/`area` with an `href`.
    Link,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
}

/// [§ 14.1 An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Matches 1-based index `i` when `i = a*n + b` for some `n >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthIndex {
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl NthIndex {
    /// `odd` = `2n+1`.
    pub const ODD: Self = Self { a: 2, b: 1 };
    /// `even` = `2n`.
    pub const EVEN: Self = Self { a: 2, b: 0 };

    /// Parse `odd`, `even`, `N`, `An+B`, `-n+3` and friends.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let s: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match s.as_str() {
            "odd" => return Some(Self::ODD),
            "even" => return Some(Self::EVEN),
            _ => {}
        }
        let Some((a_part, b_part)) = s.split_once('n') else {
            return s.parse().ok().map(|b| Self { a: 0, b });
        };
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse().ok()?,
        };
        let b = if b_part.is_empty() {
            0
        } else {
            b_part.strip_prefix('+').unwrap_or(b_part).parse().ok()?
        };
        Some(Self { a, b })
    }

    /// Whether 1-based `index` is selected.
    #[must_use]
    pub fn matches(&self, index: usize) -> bool {
        // Widened so `index - b` cannot overflow for extreme `b`.
        let Ok(index) = i64::try_from(index) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`
    Exists(String),
    /// `[attr=value]`
    Equals(String, String),
    /// `[attr~=value]`, whitespace-separated word.
    Includes(String, String),
    /// `[attr|=value]`, exact or `value-` prefix.
    DashMatch(String, String),
    /// `[attr^=value]`
    PrefixMatch(String, String),
    /// `[attr$=value]`
    SuffixMatch(String, String),
    /// `[attr*=value]`
    SubstringMatch(String, String),
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        let attr = |name: &str| element.get_attribute(name);
        match self {
            Self::Exists(name) => attr(name).is_some(),
            Self::Equals(name, val) => attr(name) == Some(val.as_str()),
            Self::Includes(name, val) => {
                attr(name).is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val))
            }
            Self::DashMatch(name, val) => attr(name).is_some_and(|v| {
                v == val || v.strip_prefix(val.as_str()).is_some_and(|rest| rest.starts_with('-'))
            }),
            Self::PrefixMatch(name, val) => attr(name).is_some_and(|v| v.starts_with(val.as_str())),
            Self::SuffixMatch(name, val) => attr(name).is_some_and(|v| v.ends_with(val.as_str())),
            Self::SubstringMatch(name, val) => attr(name).is_some_and(|v| v.contains(val.as_str())),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Every one of these must hold.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// All simple selectors hold for the element at `id`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(element) = tree.as_element(id) else {
            return false;
        };
        self.simple_selectors.iter().all(|simple| match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Id(want) => element.id() == Some(want.as_str()),
            SimpleSelector::Attribute(attr) => attr.matches(element),
            SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, id, element),
            SimpleSelector::NeverMatch => false,
        })
    }

    fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for simple in &self.simple_selectors {
            match simple {
                // [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules)
                // "count the number of ID selectors in the selector (= A)"
                SimpleSelector::Id(_) => spec.id += 1,
                // "count the number of class selectors, attributes selectors,
                // and pseudo-classes in the selector (= B)"
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::PseudoClass(_) => spec.class += 1,
                // "count the number of type selectors and pseudo-elements
                // in the selector (= C)"
                SimpleSelector::Type(_) => spec.type_ += 1,
                // "ignore the universal selector"
                SimpleSelector::Universal | SimpleSelector::NeverMatch => {}
            }
        }
        spec
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: some ancestor matches `A`.
    Descendant,
    /// `A > B`: the parent matches `A`.
    Child,
    /// `A + B`: the previous element sibling matches `A`.
    NextSibling,
    /// `A ~ B`: some earlier element sibling matches `A`.
    SubsequentSibling,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// Extended with a leading inline tier so a `style` attribute outranks every
/// selector. Compared lexicographically in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// 1 for declarations from a `style` attribute.
    pub inline: u32,
    /// ID selectors.
    pub id: u32,
    /// Class, attribute and pseudo-class selectors.
    pub class: u32,
    /// Type selectors.
    pub type_: u32,
}

impl Specificity {
    /// The tier used for inline `style` attributes.
    pub const INLINE: Self = Self::new(1, 0, 0, 0);

    /// Build from the four components.
    #[must_use]
    pub const fn new(inline: u32, id: u32, class: u32, type_: u32) -> Self {
        Self {
            inline,
            id,
            class,
            type_,
        }
    }
}

impl std::ops::Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.inline + rhs.inline,
            self.id + rhs.id,
            self.class + rhs.class,
            self.type_ + rhs.type_,
        )
    }
}

impl std::fmt::Display for Specificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{},{})", self.inline, self.id, self.class, self.type_)
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// `nav > ul li.active` is stored as
///
/// ```text
/// subject: [li.active]
/// combinators: [(Descendant, ul), (Child, nav)]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The rightmost compound: the element being styled.
    pub subject: CompoundSelector,
    /// (combinator, compound) pairs walking left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
    specificity: Specificity,
}

impl Selector {
    /// A selector with no combinators.
    #[must_use]
    pub fn compound(subject: CompoundSelector) -> Self {
        Self::complex(subject, Vec::new())
    }

    /// Build from a subject and its subject-first combinator chain.
    #[must_use]
    pub fn complex(
        subject: CompoundSelector,
        combinators: Vec<(Combinator, CompoundSelector)>,
    ) -> Self {
        let specificity = combinators
            .iter()
            .fold(subject.specificity(), |acc, (_, c)| acc + c.specificity());
        Self {
            subject,
            combinators,
            specificity,
        }
    }

    /// Sum of every simple selector in the chain.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// No combinators.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        self.combinators.is_empty()
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// The subject is checked first; only then is the combinator chain walked.
    /// Descendant and subsequent-sibling steps try every candidate, so a
    /// nearer ancestor that fails the rest of the chain does not hide a
    /// farther one that succeeds.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.subject.matches(tree, id) && chain_matches(&self.combinators, tree, id)
    }
}

/// Match the remaining `(combinator, compound)` steps leftwards from `id`.
fn chain_matches(chain: &[(Combinator, CompoundSelector)], tree: &DomTree, id: NodeId) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let step = |candidate: NodeId| compound.matches(tree, candidate) && chain_matches(rest, tree, candidate);
    match combinator {
        Combinator::Descendant => tree.ancestors(id).any(step),
        Combinator::Child => tree.parent(id).is_some_and(step),
        Combinator::NextSibling => tree
            .preceding_siblings(id)
            .find(|&s| tree.as_element(s).is_some())
            .is_some_and(step),
        Combinator::SubsequentSibling => tree.preceding_siblings(id).any(step),
    }
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn pseudo_class_matches(pc: PseudoClass, tree: &DomTree, id: NodeId, element: &ElementData) -> bool {
    match pc {
        PseudoClass::Root => tree.document_element() == Some(id),
        PseudoClass::FirstChild => tree.element_index(id) == Some(1),
        PseudoClass::LastChild => tree
            .parent(id)
            .is_some_and(|p| tree.last_element_child(p) == Some(id)),
        PseudoClass::OnlyChild => tree
            .parent(id)
            .is_some_and(|p| tree.child_element_count(p) == 1),
        PseudoClass::NthChild(nth) => tree.element_index(id).is_some_and(|i| nth.matches(i)),
        PseudoClass::Empty => tree.children(id).iter().all(|&c| {
            tree.as_element(c).is_none() && tree.as_text(c).is_none_or(|t| t.trim().is_empty())
        }),
        PseudoClass::Link => {
            matches!(element.tag_name.as_str(), "a" | "area")
                && element.get_attribute("href").is_some()
        }
        PseudoClass::Disabled => element.get_attribute("disabled").is_some(),
        PseudoClass::Enabled => element.get_attribute("disabled").is_none(),
    }
}

/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit()
}

/// Character scanner over one selector.
struct SelectorScanner<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> SelectorScanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {
            skipped = true;
        }
        skipped
    }

    fn take_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.chars.next_if(|&c| is_ident_char(c)) {
            ident.push(c);
        }
        ident
    }

    /// Consume a combinator (and surrounding whitespace) if one follows.
    fn take_combinator(&mut self) -> Option<Combinator> {
        let had_space = self.skip_whitespace();
        let explicit = match self.chars.peek() {
            Some('>') => Some(Combinator::Child),
            Some('+') => Some(Combinator::NextSibling),
            Some('~') => Some(Combinator::SubsequentSibling),
            _ => None,
        };
        if let Some(combinator) = explicit {
            let _ = self.chars.next();
            let _ = self.skip_whitespace();
            return Some(combinator);
        }
        (had_space && self.chars.peek().is_some()).then_some(Combinator::Descendant)
    }

    /// Parse one compound; `None` on syntax this engine does not accept.
    fn compound(&mut self) -> Option<CompoundSelector> {
        let mut compound = CompoundSelector::default();
        loop {
            let simple = match self.chars.peek().copied() {
                Some('*') => {
                    let _ = self.chars.next();
                    SimpleSelector::Universal
                }
                Some('.') => {
                    let _ = self.chars.next();
                    SimpleSelector::Class(self.non_empty_ident()?)
                }
                Some('#') => {
                    let _ = self.chars.next();
                    SimpleSelector::Id(self.non_empty_ident()?)
                }
                Some('[') => {
                    let _ = self.chars.next();
                    SimpleSelector::Attribute(self.attribute()?)
                }
                Some(':') => {
                    let _ = self.chars.next();
                    self.pseudo()?
                }
                Some(c) if is_ident_start_char(c) && compound.simple_selectors.is_empty() => {
                    SimpleSelector::Type(self.take_ident().to_ascii_lowercase())
                }
                Some(c) if c.is_whitespace() || matches!(c, '>' | '+' | '~') => break,
                None => break,
                Some(_) => return None,
            };
            compound.simple_selectors.push(simple);
        }
        (!compound.simple_selectors.is_empty()).then_some(compound)
    }

    fn non_empty_ident(&mut self) -> Option<String> {
        let ident = self.take_ident();
        (!ident.is_empty()).then_some(ident)
    }

    /// After `[`: `name]`, `name=value]` or `name op= value]`.
    fn attribute(&mut self) -> Option<AttributeSelector> {
        let _ = self.skip_whitespace();
        let name = self.non_empty_ident()?.to_ascii_lowercase();
        let _ = self.skip_whitespace();
        let op = match self.chars.next()? {
            ']' => return Some(AttributeSelector::Exists(name)),
            '=' => '=',
            op @ ('~' | '|' | '^' | '$' | '*') => {
                if self.chars.next()? != '=' {
                    return None;
                }
                op
            }
            _ => return None,
        };
        let _ = self.skip_whitespace();
        let value = self.attribute_value()?;
        let _ = self.skip_whitespace();
        if self.chars.next()? != ']' {
            return None;
        }
        Some(match op {
            '~' => AttributeSelector::Includes(name, value),
            '|' => AttributeSelector::DashMatch(name, value),
            '^' => AttributeSelector::PrefixMatch(name, value),
            '$' => AttributeSelector::SuffixMatch(name, value),
            '*' => AttributeSelector::SubstringMatch(name, value),
            _ => AttributeSelector::Equals(name, value),
        })
    }

    /// Quoted string or bare identifier.
    fn attribute_value(&mut self) -> Option<String> {
        let Some(quote) = self.chars.next_if(|&c| c == '"' || c == '\'') else {
            let mut value = String::new();
            while let Some(c) = self.chars.next_if(|&c| is_ident_char(c) || c == '.') {
                value.push(c);
            }
            return (!value.is_empty()).then_some(value);
        };
        let mut value = String::new();
        for c in self.chars.by_ref() {
            if c == quote {
                return Some(value);
            }
            value.push(c);
        }
        None
    }

    /// After `:`. Pseudo-elements and unknown pseudo-classes never match.
    fn pseudo(&mut self) -> Option<SimpleSelector> {
        let is_element = self.chars.next_if_eq(&':').is_some();
        let name = self.non_empty_ident()?.to_ascii_lowercase();
        let argument = if self.chars.next_if_eq(&'(').is_some() {
            Some(self.parenthesized()?)
        } else {
            None
        };
        if is_element {
            return Some(SimpleSelector::NeverMatch);
        }
        let pc = match (name.as_str(), argument.as_deref()) {
            ("root", None) => PseudoClass::Root,
            ("first-child", None) => PseudoClass::FirstChild,
            ("last-child", None) => PseudoClass::LastChild,
            ("only-child", None) => PseudoClass::OnlyChild,
            ("empty", None) => PseudoClass::Empty,
            ("link", None) => PseudoClass::Link,
            ("disabled", None) => PseudoClass::Disabled,
            ("enabled", None) => PseudoClass::Enabled,
            ("nth-child", Some(arg)) => PseudoClass::NthChild(NthIndex::parse(arg)?),
            _ => return Some(SimpleSelector::NeverMatch),
        };
        Some(SimpleSelector::PseudoClass(pc))
    }

    /// Contents up to the balancing `)`.
    fn parenthesized(&mut self) -> Option<String> {
        let mut depth = 1u32;
        let mut inner = String::new();
        for c in self.chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(inner);
                    }
                }
                _ => {}
            }
            inner.push(c);
        }
        None
    }
}

/// Parse a single complex selector such as `ul > li.item:first-child a`.
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// Returns `None` for empty or malformed text; callers drop such selectors
/// from their rule.
#[must_use]
pub fn parse_selector(raw: &str) -> Option<Selector> {
    let mut scanner = SelectorScanner::new(raw.trim());
    let mut compounds = vec![scanner.compound()?];
    let mut combinators = Vec::new();

    while scanner.chars.peek().is_some() {
        let combinator = scanner.take_combinator()?;
        combinators.push(combinator);
        compounds.push(scanner.compound()?);
    }

    let subject = compounds.pop()?;
    let chain = combinators
        .into_iter()
        .zip(compounds)
        .rev()
        .collect();
    Some(Selector::complex(subject, chain))
}

/// Parse a comma-separated selector list, dropping invalid entries.
#[must_use]
pub fn parse_selector_list(raw: &str) -> Vec<Selector> {
    raw.split(',').filter_map(parse_selector).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_index_forms() {
        assert_eq!(NthIndex::parse("odd"), Some(NthIndex::ODD));
        assert_eq!(NthIndex::parse(" 3 "), Some(NthIndex { a: 0, b: 3 }));
        assert_eq!(NthIndex::parse("2n+1"), Some(NthIndex { a: 2, b: 1 }));
        assert_eq!(NthIndex::parse("-n+3"), Some(NthIndex { a: -1, b: 3 }));
        assert_eq!(NthIndex::parse("x"), None);
    }

    #[test]
    fn test_nth_index_matching() {
        let first_three = NthIndex { a: -1, b: 3 };
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
        assert!(NthIndex::EVEN.matches(4));
        assert!(!NthIndex::EVEN.matches(3));
    }

    #[test]
    fn test_nth_index_extreme_offsets() {
        let from_min = NthIndex { a: 1, b: i32::MIN };
        assert!(from_min.matches(1));
        assert!(from_min.matches(1_000_000));
        let up_to_max = NthIndex { a: -1, b: i32::MAX };
        assert!(up_to_max.matches(1));
        let steep = NthIndex { a: i32::MIN, b: i32::MIN };
        assert!(!steep.matches(1));
        assert!(!NthIndex { a: 0, b: i32::MIN }.matches(1));
    }

    #[test]
    fn test_chain_is_stored_subject_first() {
        let sel = parse_selector("nav > ul li").unwrap();
        assert_eq!(
            sel.subject.simple_selectors,
            vec![SimpleSelector::Type("li".into())]
        );
        assert_eq!(sel.combinators[0].0, Combinator::Descendant);
        assert_eq!(sel.combinators[1].0, Combinator::Child);
        assert_eq!(sel.specificity(), Specificity::new(0, 0, 0, 3));
    }

    #[test]
    fn test_malformed_selectors_are_rejected() {
        assert!(parse_selector("").is_none());
        assert!(parse_selector("> p").is_none());
        assert!(parse_selector("div >").is_none());
        assert!(parse_selector("div..x").is_none());
        assert!(parse_selector("[=x]").is_none());
    }
}
