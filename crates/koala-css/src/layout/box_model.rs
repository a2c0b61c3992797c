//! CSS Box Model types.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

use serde::Serialize;

use crate::style::{BoxSizing, ComputedStyle, Sides};
use crate::values::{Length, ResolveContext};

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// `x`/`y` locate the top-left corner of the margin box. Derived data:
/// rebuilt from the [`ComputedStyle`] on every layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// Horizontal position of the margin box.
    pub x: f32,
    /// Vertical position of the margin box.
    pub y: f32,
    /// Width of the content area.
    pub content_width: f32,
    /// Height of the content area; `None` until content has been laid out
    /// when `height` is `auto`.
    pub content_height: Option<f32>,
    /// Padding edge (content + padding)
    pub padding: EdgeSizes,
    /// Border edge (content + padding + border)
    pub border: EdgeSizes,
    /// Margin edge (content + padding + border + margin)
    pub margin: EdgeSizes,
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Whether the point lies inside the rectangle (right/bottom edges excluded).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// Sum of the left and right edges.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Sum of the top and bottom edges.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    fn resolve(sides: &Sides<Length>, ctx: &ResolveContext) -> Self {
        Self {
            top: sides.top.resolve(ctx),
            right: sides.right.resolve(ctx),
            bottom: sides.bottom.resolve(ctx),
            left: sides.left.resolve(ctx),
        }
    }
}

impl BoxDimensions {
    // [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
    //
    // ┌─────────────────────────────────────────┐  <- (x, y)
    // │              margin-top                 │
    // │   ┌─────────────────────────────────┐   │
    // │   │          border-top             │   │
    // │   │   ┌─────────────────────────┐   │   │
    // │   │   │      padding-top        │   │   │
    // │   │   │   ┌─────────────────┐   │   │   │
    // │ m │ b │ p │     CONTENT     │ p │ b │ m │
    // │   │   │   └─────────────────┘   │   │   │
    // │   │   │      padding-bottom     │   │   │
    // │   │   └─────────────────────────┘   │   │
    // │   │          border-bottom          │   │
    // │   └─────────────────────────────────┘   │
    // │              margin-bottom              │
    // └─────────────────────────────────────────┘
    //
    // Every rectangle is derived by walking inward from the margin-box origin.

    /// Content height, 0 while still unknown.
    #[must_use]
    pub fn content_height_or_zero(&self) -> f32 {
        self.content_height.unwrap_or(0.0)
    }

    /// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
    /// "The content box contains the actual content of the element."
    ///
    /// ```text
    /// x = x + margin.left + border.left + padding.left
    /// y = y + margin.top + border.top + padding.top
    /// ```
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        Rect {
            x: self.x + self.margin.left + self.border.left + self.padding.left,
            y: self.y + self.margin.top + self.border.top + self.padding.top,
            width: self.content_width,
            height: self.content_height_or_zero(),
        }
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    ///
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        Rect {
            x: self.x + self.margin.left + self.border.left,
            y: self.y + self.margin.top + self.border.top,
            width: self.content_width + self.padding.horizontal(),
            height: self.content_height_or_zero() + self.padding.vertical(),
        }
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self) -> Rect {
        Rect {
            x: self.x + self.margin.left,
            y: self.y + self.margin.top,
            width: self.content_width + self.padding.horizontal() + self.border.horizontal(),
            height: self.content_height_or_zero()
                + self.padding.vertical()
                + self.border.vertical(),
        }
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    ///
    /// ```text
    /// width = content_width + padding + border + margin   (left and right)
    /// height = content_height + padding + border + margin (top and bottom)
    /// ```
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        let border_box = self.border_box();
        Rect {
            x: self.x,
            y: self.y,
            width: border_box.width + self.margin.horizontal(),
            height: border_box.height + self.margin.vertical(),
        }
    }

    /// Record the content height once content has been laid out.
    pub const fn set_content_height(&mut self, height: f32) {
        self.content_height = Some(height);
    }

    /// Move the margin box origin.
    pub const fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

/// Resolve every edge and the content size of a box against its containing
/// block, using the default viewport for viewport-relative units.
#[must_use]
pub fn compute_box_dimensions(
    style: &ComputedStyle,
    containing_width: f32,
    containing_height: f32,
) -> BoxDimensions {
    compute_box_dimensions_with(style, &style.resolve_context(containing_width, containing_height))
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// Like [`compute_box_dimensions`] with an explicit resolve context, whose
/// `parent_width`/`parent_height` are the containing block.
#[must_use]
pub fn compute_box_dimensions_with(style: &ComputedStyle, ctx: &ResolveContext) -> BoxDimensions {
    let containing_width = ctx.parent_width;

    // STEP 1: Resolve the edges. `auto` margins resolve to 0 for now.
    let mut dims = BoxDimensions {
        margin: EdgeSizes::resolve(&style.margin, ctx),
        padding: EdgeSizes::resolve(&style.padding, ctx),
        border: EdgeSizes::resolve(&style.border_width, ctx),
        ..BoxDimensions::default()
    };
    let frame_width = dims.padding.horizontal() + dims.border.horizontal();
    let frame_height = dims.padding.vertical() + dims.border.vertical();
    let border_box = style.box_sizing == BoxSizing::BorderBox;

    // STEP 2: Content width.
    // "If 'width' is set to 'auto', any other 'auto' values become '0' and
    // 'width' follows from the resulting equality."
    let mut width = if style.width.is_auto() {
        containing_width - dims.margin.horizontal() - frame_width
    } else if border_box {
        (style.width.resolve(ctx) - frame_width).max(0.0)
    } else {
        style.width.resolve(ctx)
    };

    // STEP 3: [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    // min-width first, then max-width, so max wins a conflict.
    if !style.min_width.is_none() && !style.min_width.is_auto() {
        width = width.max(style.min_width.resolve(ctx));
    }
    if !style.max_width.is_none() && !style.max_width.is_auto() {
        width = width.min(style.max_width.resolve(ctx));
    }
    dims.content_width = width.max(0.0);

    // STEP 4: "If both 'margin-left' and 'margin-right' are 'auto', their
    // used values are equal. This horizontally centers the element."
    if !style.width.is_auto() {
        let used = dims.content_width + frame_width;
        let remaining = (containing_width - used - dims.margin.horizontal()).max(0.0);
        match (style.margin.left.is_auto(), style.margin.right.is_auto()) {
            (true, true) => {
                dims.margin.left = remaining / 2.0;
                dims.margin.right = remaining / 2.0;
            }
            (true, false) => dims.margin.left = remaining,
            _ => {}
        }
    }

    // STEP 5: Content height. `auto` stays unknown until children are laid out.
    if !style.height.is_auto() {
        let mut height = style.height.resolve_height(ctx);
        if border_box {
            height = (height - frame_height).max(0.0);
        }
        if !style.min_height.is_none() && !style.min_height.is_auto() {
            height = height.max(style.min_height.resolve_height(ctx));
        }
        if !style.max_height.is_none() && !style.max_height.is_auto() {
            height = height.min(style.max_height.resolve_height(ctx));
        }
        dims.content_height = Some(height.max(0.0));
    }

    dims
}

/// Clamp an auto content height, known only after layout, by `min-height`
/// and `max-height`.
#[must_use]
pub fn clamp_auto_height(style: &ComputedStyle, ctx: &ResolveContext, height: f32) -> f32 {
    let mut height = height;
    if !style.min_height.is_none() && !style.min_height.is_auto() {
        height = height.max(style.min_height.resolve_height(ctx));
    }
    if !style.max_height.is_none() && !style.max_height.is_auto() {
        height = height.min(style.max_height.resolve_height(ctx));
    }
    height.max(0.0)
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins."
#[must_use]
pub fn collapse_margins(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Length;

    fn style_with(f: impl FnOnce(&mut ComputedStyle)) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        f(&mut style);
        style
    }

    #[test]
    fn test_auto_width_fills_containing_block() {
        let style = style_with(|s| {
            s.margin = Sides::all(Length::px(10.0));
            s.padding = Sides::all(Length::px(5.0));
            s.border_width = Sides::all(Length::px(1.0));
        });
        let dims = compute_box_dimensions(&style, 500.0, 400.0);
        assert_eq!(dims.content_width, 500.0 - 20.0 - 10.0 - 2.0);
        assert_eq!(dims.content_height, None);
        assert_eq!(dims.margin_box().width, 500.0);
    }

    #[test]
    fn test_border_box_subtracts_frame() {
        let style = style_with(|s| {
            s.width = Length::px(100.0);
            s.height = Length::px(50.0);
            s.padding = Sides::all(Length::px(10.0));
            s.border_width = Sides::all(Length::px(2.0));
            s.box_sizing = BoxSizing::BorderBox;
        });
        let dims = compute_box_dimensions(&style, 500.0, 400.0);
        assert_eq!(dims.content_width, 76.0);
        assert_eq!(dims.content_height, Some(26.0));
        assert_eq!(dims.border_box().width, 100.0);
    }

    #[test]
    fn test_max_width_applies_after_min_width() {
        let style = style_with(|s| {
            s.width = Length::px(50.0);
            s.min_width = Length::px(200.0);
            s.max_width = Length::px(120.0);
        });
        let dims = compute_box_dimensions(&style, 500.0, 400.0);
        assert_eq!(dims.content_width, 120.0);
    }

    #[test]
    fn test_percent_height_uses_containing_height() {
        let style = style_with(|s| s.height = Length::percent(50.0));
        let dims = compute_box_dimensions(&style, 500.0, 300.0);
        assert_eq!(dims.content_height, Some(150.0));
    }

    #[test]
    fn test_auto_margins_center() {
        let style = style_with(|s| {
            s.width = Length::px(200.0);
            s.margin.left = Length::AUTO;
            s.margin.right = Length::AUTO;
        });
        let dims = compute_box_dimensions(&style, 600.0, 400.0);
        assert_eq!(dims.margin.left, 200.0);
        assert_eq!(dims.margin.right, 200.0);
    }

    #[test]
    fn test_rects_nest() {
        let mut dims = BoxDimensions {
            content_width: 100.0,
            padding: EdgeSizes { top: 1.0, right: 1.0, bottom: 1.0, left: 1.0 },
            border: EdgeSizes { top: 2.0, right: 2.0, bottom: 2.0, left: 2.0 },
            margin: EdgeSizes { top: 3.0, right: 3.0, bottom: 3.0, left: 3.0 },
            ..BoxDimensions::default()
        };
        dims.set_position(10.0, 20.0);
        dims.set_content_height(40.0);
        let content = dims.content_rect();
        assert_eq!((content.x, content.y), (16.0, 26.0));
        assert_eq!(dims.margin_box().height, 52.0);
        assert!(dims.border_box().contains(14.0, 24.0));
        assert!(!dims.border_box().contains(12.0, 24.0));
    }

    #[test]
    fn test_collapse_margins() {
        assert_eq!(collapse_margins(10.0, 20.0), 20.0);
        assert_eq!(collapse_margins(-10.0, -20.0), -20.0);
        assert_eq!(collapse_margins(20.0, -5.0), 15.0);
    }
}
