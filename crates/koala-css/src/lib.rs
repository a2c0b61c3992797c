//! CSS values, parsing, selector matching, cascade and layout for the Koala engine.
//!
//! # Pipeline
//!
//! ```text
//!  <style> text ──parse_stylesheet──▶ Stylesheet
//!                                        │
//!  DomTree ──────────apply_styles_to_tree┘──▶ StyleMap (NodeId → ComputedStyle)
//!                                                 │
//!                           build_layout_tree ────┘──▶ LayoutBox tree
//! ```
//!
//! # Scope
//!
//! - **Values** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - Lengths in px, em, rem, %, vw, vh, vmin, vmax, pt, cm, mm, in, ch, ex
//!   - Colors: named, hex, `rgb()`/`rgba()`, `hsl()`/`hsla()`
//!
//! - **Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Style rules, `!important`, shorthand expansion
//!   - At-rules are skipped whole
//!
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID, universal, attribute and structural pseudo-classes
//!   - All four combinators
//!   - Specificity with an inline tier
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Importance, specificity and source order
//!   - Inheritance of text properties
//!
//! - **Layout**
//!   - Box model ([CSS 2.1 § 8](https://www.w3.org/TR/CSS2/box.html))
//!   - Flexbox ([CSS Flexbox Level 1](https://www.w3.org/TR/css-flexbox-1/))
//!   - Block and inline flow with word wrapping
//!
//! # Not Yet Implemented
//!
//! - Floats, tables, grid and absolute positioning
//! - Media queries
//! - Painting

/// CSS cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Box model, flexbox and layout tree construction.
pub mod layout;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// `querySelector()` per [DOM § 4.2.6](https://dom.spec.whatwg.org/#interface-parentnode).
pub mod query;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Computed style representation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;
/// User-agent stylesheet per [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;
/// Lengths and colors per [CSS Values Level 4](https://www.w3.org/TR/css-values-4/).
pub mod values;

// Re-exports for convenience
pub use cascade::{
    StyleMap, StylesheetSource, apply_styles_to_tree, compute_style, extract_stylesheets,
    stylesheet_links, stylesheet_sources,
};
pub use layout::{
    BoxDimensions, BoxKind, EdgeSizes, FlexContainer, FlexItem, LayoutBox, LayoutConfig, Rect,
    build_layout_tree, dump_layout_tree, print_layout_tree,
};
pub use parser::{Declaration, Rule, Stylesheet, parse_inline_style, parse_stylesheet};
pub use query::{query_selector, query_selector_all};
pub use selector::{Selector, Specificity, parse_selector, parse_selector_list};
pub use style::{ComputedStyle, DisplayValue};
pub use values::{
    Color, ColorParseError, Length, LengthParseError, LengthUnit, ResolveContext, parse_color,
    parse_length,
};
