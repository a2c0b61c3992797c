//! CSS Layout Engine
//!
//! Turns a styled DOM into a tree of positioned boxes.
//!
//! # Relevant Specifications
//!
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS Flexible Box Layout Module Level 1](https://www.w3.org/TR/css-flexbox-1/)
//! - [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box dimensions, rectangles, edge sizes and margin collapsing
//! - [`flex`] - The flexbox algorithm over detached items
//! - [`inline`] - Font metrics and line breaking
//! - [`layout_box`] - The layout tree and its queries

pub mod box_model;
pub mod flex;
pub mod inline;
pub mod layout_box;

use serde::{Deserialize, Serialize};

pub use box_model::{
    BoxDimensions, EdgeSizes, Rect, collapse_margins, compute_box_dimensions,
    compute_box_dimensions_with,
};
pub use flex::{FlexContainer, FlexItem, FlexLine};
pub use inline::{ApproximateFontMetrics, FontMetrics, TextLine};
pub use layout_box::{
    BoxKind, LayoutBox, LayoutFlags, build_layout_tree, build_layout_tree_with, dump_layout_tree,
    print_layout_tree,
};

/// Inputs to layout that do not come from the document.
///
/// Missing fields take their defaults when deserialized, so a partial JSON
/// file overrides only what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// [§ 9.1.1 The viewport](https://www.w3.org/TR/CSS2/visuren.html#viewport)
    pub viewport_width: f32,
    /// Height of the viewport, the containing block height of the root.
    pub viewport_height: f32,
    /// Font size of the root element, for `rem`.
    pub root_font_size: f32,
    /// Average glyph advance as a fraction of the font size.
    pub char_width_ratio: f32,
    /// x-height as a fraction of the font size.
    pub x_height_ratio: f32,
    /// `line-height: normal` as a multiple of the font size.
    pub line_height_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 768.0,
            root_font_size: 16.0,
            char_width_ratio: 0.55,
            x_height_ratio: 0.5,
            line_height_ratio: 1.4,
        }
    }
}
