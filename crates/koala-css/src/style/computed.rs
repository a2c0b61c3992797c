//! CSS Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."
//!
//! Every property has a concrete value from the moment a style is created;
//! the initial values below stand in for anything the cascade never sets.
//! Lengths stay unresolved (`em`, `%`, ...) until layout, except font
//! sizes, which are resolved to pixels immediately.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use koala_common::warning::warn_once;

use super::keywords::{
    AlignContent, AlignItems, AlignSelf, BorderCollapse, BorderStyle, BoxSizing, Cursor,
    DisplayValue, FlexDirection, FlexWrap, FontStyle, JustifyContent, ListStylePosition,
    ListStyleType, Overflow, Position, TextAlign, TextDecoration, TextTransform, Visibility,
    WhiteSpace,
};
use crate::parser::Declaration;
use crate::values::{
    Color, DEFAULT_FONT_SIZE_PX, Length, LengthUnit, ResolveContext, parse_color, parse_length,
};

/// `line-height: normal` as a multiplier of the font size.
pub const NORMAL_LINE_HEIGHT: f32 = 1.2;

/// Per-side values in top, right, bottom, left order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sides<T> {
    /// Top edge.
    pub top: T,
    /// Right edge.
    pub right: T,
    /// Bottom edge.
    pub bottom: T,
    /// Left edge.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on every side.
    pub const fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    fn side_mut(&mut self, side: &str) -> Option<&mut T> {
        match side {
            "top" => Some(&mut self.top),
            "right" => Some(&mut self.right),
            "bottom" => Some(&mut self.bottom),
            "left" => Some(&mut self.left),
            _ => None,
        }
    }
}

/// Corner radii.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Corners {
    /// Top-left.
    pub top_left: Length,
    /// Top-right.
    pub top_right: Length,
    /// Bottom-right.
    pub bottom_right: Length,
    /// Bottom-left.
    pub bottom_left: Length,
}

/// Computed styles for an element.
///
/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Created by the cascade and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: DisplayValue,
    /// [§ 2 'position'](https://www.w3.org/TR/css-position-3/#position-property)
    pub position: Position,
    /// `top`, `right`, `bottom`, `left` insets.
    pub inset: Sides<Length>,

    /// [§ 3.2 'width'](https://www.w3.org/TR/css-sizing-3/#preferred-size-properties)
    pub width: Length,
    /// [§ 3.2 'height'](https://www.w3.org/TR/css-sizing-3/#preferred-size-properties)
    pub height: Length,
    /// [§ 3.3 'min-width'](https://www.w3.org/TR/css-sizing-3/#min-size-properties)
    pub min_width: Length,
    /// [§ 3.3 'min-height'](https://www.w3.org/TR/css-sizing-3/#min-size-properties)
    pub min_height: Length,
    /// [§ 3.4 'max-width'](https://www.w3.org/TR/css-sizing-3/#max-size-properties)
    pub max_width: Length,
    /// [§ 3.4 'max-height'](https://www.w3.org/TR/css-sizing-3/#max-size-properties)
    pub max_height: Length,

    /// [§ 3.1 margins](https://www.w3.org/TR/css-box-4/#margin-physical); may be `auto`.
    pub margin: Sides<Length>,
    /// [§ 3.2 paddings](https://www.w3.org/TR/css-box-4/#padding-physical)
    pub padding: Sides<Length>,
    /// [§ 4.3 border widths](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    pub border_width: Sides<Length>,
    /// [§ 4.1 border colors](https://www.w3.org/TR/css-backgrounds-3/#border-color)
    pub border_color: Sides<Color>,
    /// [§ 4.2 border styles](https://www.w3.org/TR/css-backgrounds-3/#border-style)
    pub border_style: Sides<BorderStyle>,
    /// [§ 5.1 border-radius](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
    pub border_radius: Corners,
    /// [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
    pub box_sizing: BoxSizing,

    /// [§ 5.1 flex-direction](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
    pub flex_direction: FlexDirection,
    /// [§ 5.2 flex-wrap](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
    pub flex_wrap: FlexWrap,
    /// [§ 8.2 justify-content](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
    pub justify_content: JustifyContent,
    /// [§ 8.3 align-items](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
    pub align_items: AlignItems,
    /// [§ 8.4 align-content](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
    pub align_content: AlignContent,
    /// [§ 8.3 align-self](https://www.w3.org/TR/css-flexbox-1/#propdef-align-self)
    pub align_self: AlignSelf,
    /// [§ 7.3.1 flex-grow](https://www.w3.org/TR/css-flexbox-1/#flex-grow-property)
    pub flex_grow: f32,
    /// [§ 7.3.2 flex-shrink](https://www.w3.org/TR/css-flexbox-1/#flex-shrink-property)
    pub flex_shrink: f32,
    /// [§ 7.3.3 flex-basis](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
    pub flex_basis: Length,
    /// [§ 5.4.1 order](https://www.w3.org/TR/css-flexbox-1/#order-property)
    pub order: i32,
    /// [§ 8.1 row-gap](https://www.w3.org/TR/css-align-3/#column-row-gap)
    pub row_gap: Length,
    /// [§ 8.1 column-gap](https://www.w3.org/TR/css-align-3/#column-row-gap)
    pub column_gap: Length,

    /// [§ 3 overflow-x](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow_x: Overflow,
    /// [§ 3 overflow-y](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow_y: Overflow,
    /// [§ 9.9.1 z-index](https://www.w3.org/TR/CSS2/visuren.html#z-index); `None` is `auto`.
    pub z_index: Option<i32>,

    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    pub color: Color,
    /// [§ 3.1 'font-family'](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
    pub font_family: String,
    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop), in px.
    pub font_size: f32,
    /// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    pub font_weight: u16,
    /// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
    pub font_style: FontStyle,
    /// [§ 4.2 'line-height'](https://www.w3.org/TR/css-inline-3/#line-height-property),
    /// as a multiplier of `font_size`.
    pub line_height: f32,
    /// [§ 7.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
    pub text_align: TextAlign,
    /// [§ 2 text-decoration](https://www.w3.org/TR/css-text-decor-3/#line-decoration)
    pub text_decoration: TextDecoration,
    /// [§ 2.1 text-transform](https://www.w3.org/TR/css-text-3/#text-transform-property)
    pub text_transform: TextTransform,
    /// [§ 8.2 letter-spacing](https://www.w3.org/TR/css-text-3/#letter-spacing-property)
    pub letter_spacing: Length,
    /// [§ 8.1 word-spacing](https://www.w3.org/TR/css-text-3/#word-spacing-property)
    pub word_spacing: Length,
    /// [§ 3 white-space](https://www.w3.org/TR/css-text-3/#white-space-property)
    pub white_space: WhiteSpace,

    /// [§ 3.2 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    pub background_color: Color,
    /// [§ 3.3 'background-image'](https://www.w3.org/TR/css-backgrounds-3/#background-image),
    /// the raw `url(..)` or gradient text.
    pub background_image: Option<String>,
    /// [§ 3.2 opacity](https://www.w3.org/TR/css-color-4/#transparency)
    pub opacity: f32,
    /// [§ 6.2 visibility](https://www.w3.org/TR/css-display-3/#visibility)
    pub visibility: Visibility,
    /// [§ 8.1 cursor](https://www.w3.org/TR/css-ui-4/#cursor)
    pub cursor: Cursor,
    /// [§ 3 list-style-type](https://www.w3.org/TR/css-lists-3/#text-markers)
    pub list_style_type: ListStyleType,
    /// [§ 3 list-style-position](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
    pub list_style_position: ListStylePosition,
    /// [§ 17.6 border-collapse](https://www.w3.org/TR/CSS2/tables.html#borders)
    pub border_collapse: BorderCollapse,
    /// [§ 17.6.1 border-spacing](https://www.w3.org/TR/CSS2/tables.html#separated-borders)
    pub border_spacing: Length,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: DisplayValue::Inline,
            position: Position::Static,
            inset: Sides::all(Length::AUTO),
            width: Length::AUTO,
            height: Length::AUTO,
            min_width: Length::ZERO,
            min_height: Length::ZERO,
            max_width: Length::NONE,
            max_height: Length::NONE,
            margin: Sides::all(Length::ZERO),
            padding: Sides::all(Length::ZERO),
            border_width: Sides::all(Length::ZERO),
            border_color: Sides::all(Color::BLACK),
            border_style: Sides::all(BorderStyle::None),
            border_radius: Corners::default(),
            box_sizing: BoxSizing::ContentBox,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Nowrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_content: AlignContent::Stretch,
            align_self: AlignSelf::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::AUTO,
            order: 0,
            row_gap: Length::ZERO,
            column_gap: Length::ZERO,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            z_index: None,
            color: Color::BLACK,
            font_family: "sans-serif".to_string(),
            font_size: DEFAULT_FONT_SIZE_PX,
            font_weight: 400,
            font_style: FontStyle::Normal,
            line_height: NORMAL_LINE_HEIGHT,
            text_align: TextAlign::Left,
            text_decoration: TextDecoration::None,
            text_transform: TextTransform::None,
            letter_spacing: Length::ZERO,
            word_spacing: Length::ZERO,
            white_space: WhiteSpace::Normal,
            background_color: Color::TRANSPARENT,
            background_image: None,
            opacity: 1.0,
            visibility: Visibility::Visible,
            cursor: Cursor::Auto,
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            border_collapse: BorderCollapse::Separate,
            border_spacing: Length::ZERO,
        }
    }
}

/// Report a rejected value once per distinct message.
fn rejected(name: &str, value: &str, reason: &dyn std::fmt::Display) {
    warn_once("css", &format!("ignoring '{name}: {value}': {reason}"));
}

/// Parse a keyword property, warning on failure.
fn keyword<T: FromStr>(name: &str, value: &str) -> Option<T> {
    let parsed = T::from_str(value.trim()).ok();
    if parsed.is_none() {
        rejected(name, value, &"unknown keyword");
    }
    parsed
}

/// Parse a length, warning on failure.
fn length(name: &str, value: &str) -> Option<Length> {
    parse_length(value)
        .inspect_err(|e| rejected(name, value, e))
        .ok()
}

/// Parse a color, warning on failure.
fn color(name: &str, value: &str) -> Option<Color> {
    parse_color(value).inspect_err(|e| rejected(name, value, e)).ok()
}

/// Parse a finite number, warning on failure.
fn number(name: &str, value: &str) -> Option<f32> {
    let parsed = value.trim().parse::<f32>().ok().filter(|n| n.is_finite());
    if parsed.is_none() {
        rejected(name, value, &"not a number");
    }
    parsed
}

/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolute-size keywords map to fixed pixel sizes; relative lengths resolve
/// against the default 16px font.
fn font_size_px(value: &str) -> Option<f32> {
    let px = match value {
        "xx-small" => 9.0,
        "x-small" => 10.0,
        "small" | "smaller" => 13.0,
        "medium" => 16.0,
        "large" => 18.0,
        "larger" => 19.0,
        "x-large" => 24.0,
        "xx-large" => 32.0,
        "xxx-large" => 48.0,
        other => {
            let len = parse_length(other).ok()?;
            if len.is_auto() || len.is_none() {
                return None;
            }
            let ctx = ResolveContext {
                parent_width: DEFAULT_FONT_SIZE_PX,
                ..ResolveContext::default()
            };
            len.resolve(&ctx)
        }
    };
    (px >= 0.0).then_some(px)
}

/// [§ 3.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
fn font_weight(value: &str) -> Option<u16> {
    match value {
        "normal" => Some(400),
        "bold" => Some(700),
        "lighter" => Some(300),
        "bolder" => Some(600),
        n => n.parse::<u16>().ok().filter(|w| (1..=1000).contains(w)),
    }
}

/// [§ 4.2 line-height](https://www.w3.org/TR/css-inline-3/#line-height-property)
///
/// Lengths are converted into a multiplier of the current font size.
fn line_height(value: &str, font_size: f32) -> Option<f32> {
    if value == "normal" {
        return Some(NORMAL_LINE_HEIGHT);
    }
    if let Ok(n) = value.parse::<f32>() {
        return n.is_finite().then_some(n);
    }
    let len = parse_length(value).ok()?;
    match len.unit {
        LengthUnit::Percent => Some(len.value / 100.0),
        LengthUnit::Em => Some(len.value),
        LengthUnit::Auto | LengthUnit::None => None,
        _ if font_size > 0.0 => Some(len.resolve(&ResolveContext::default()) / font_size),
        _ => None,
    }
}

impl ComputedStyle {
    /// Apply one longhand declaration. Unknown properties and unparsable
    /// values leave the style untouched and are reported once through
    /// `warn_once`.
    pub fn apply_declaration(&mut self, decl: &Declaration) {
        let name = decl.name.as_str();
        let raw = decl.value.trim();
        let lower = raw.to_ascii_lowercase();
        let value = lower.as_str();

        match name {
            "display" => set(&mut self.display, keyword(name, value)),
            "position" => set(&mut self.position, keyword(name, value)),
            "top" => set(&mut self.inset.top, length(name, value)),
            "right" => set(&mut self.inset.right, length(name, value)),
            "bottom" => set(&mut self.inset.bottom, length(name, value)),
            "left" => set(&mut self.inset.left, length(name, value)),
            "width" => set(&mut self.width, length(name, value)),
            "height" => set(&mut self.height, length(name, value)),
            "min-width" => set(&mut self.min_width, length(name, value)),
            "min-height" => set(&mut self.min_height, length(name, value)),
            "max-width" => set(&mut self.max_width, length(name, value)),
            "max-height" => set(&mut self.max_height, length(name, value)),
            "box-sizing" => set(&mut self.box_sizing, keyword(name, value)),

            // [§ 3 Box edges](https://www.w3.org/TR/css-box-4/#box-model)
            _ if self.apply_edge(name, value) => {}

            "flex-direction" => set(&mut self.flex_direction, keyword(name, value)),
            "flex-wrap" => set(&mut self.flex_wrap, keyword(name, value)),
            "justify-content" => set(&mut self.justify_content, keyword(name, value)),
            "align-items" => set(&mut self.align_items, keyword(name, value)),
            "align-content" => set(&mut self.align_content, keyword(name, value)),
            "align-self" => set(&mut self.align_self, keyword(name, value)),
            "flex-grow" => set(&mut self.flex_grow, number(name, value).filter(|n| *n >= 0.0)),
            "flex-shrink" => set(&mut self.flex_shrink, number(name, value).filter(|n| *n >= 0.0)),
            "flex-basis" => set(&mut self.flex_basis, length(name, value)),
            "order" => set(&mut self.order, value.parse().ok()),
            "row-gap" => set(&mut self.row_gap, length(name, value)),
            "column-gap" => set(&mut self.column_gap, length(name, value)),

            "overflow-x" => set(&mut self.overflow_x, keyword(name, value)),
            "overflow-y" => set(&mut self.overflow_y, keyword(name, value)),
            "z-index" => match value {
                "auto" => self.z_index = None,
                n => set(&mut self.z_index, n.parse().ok().map(Some)),
            },

            "color" => set(&mut self.color, color(name, value)),
            "font-family" => self.font_family = raw.to_string(),
            "font-size" => set(&mut self.font_size, font_size_px(value)),
            "font-weight" => set(&mut self.font_weight, font_weight(value)),
            "font-style" => set(&mut self.font_style, keyword(name, value)),
            "line-height" => set(&mut self.line_height, line_height(value, self.font_size)),
            "text-align" => set(&mut self.text_align, keyword(name, value)),
            "text-decoration" | "text-decoration-line" => {
                let first = value.split_whitespace().next().unwrap_or(value);
                set(&mut self.text_decoration, keyword(name, first));
            }
            "text-transform" => set(&mut self.text_transform, keyword(name, value)),
            "letter-spacing" | "word-spacing" => {
                let len = if value == "normal" {
                    Some(Length::ZERO)
                } else {
                    length(name, value)
                };
                if name == "letter-spacing" {
                    set(&mut self.letter_spacing, len);
                } else {
                    set(&mut self.word_spacing, len);
                }
            }
            "white-space" => set(&mut self.white_space, keyword(name, value)),

            "background-color" => set(&mut self.background_color, color(name, value)),
            "background-image" => {
                self.background_image = (value != "none").then(|| raw.to_string());
            }
            "opacity" => set(
                &mut self.opacity,
                number(name, value).map(|o| o.clamp(0.0, 1.0)),
            ),
            "visibility" => set(&mut self.visibility, keyword(name, value)),
            "cursor" => set(&mut self.cursor, keyword(name, value)),
            "list-style-type" => set(&mut self.list_style_type, keyword(name, value)),
            "list-style-position" => set(&mut self.list_style_position, keyword(name, value)),
            "border-collapse" => set(&mut self.border_collapse, keyword(name, value)),
            "border-spacing" => set(&mut self.border_spacing, length(name, value)),

            _ => warn_once("css", &format!("unsupported property '{name}'")),
        }
    }

    /// `margin-*`, `padding-*`, `border-*-{width,color,style,radius}`.
    /// Returns whether `name` was one of them.
    fn apply_edge(&mut self, name: &str, value: &str) -> bool {
        if let Some(slot) = name.strip_prefix("margin-").and_then(|s| self.margin.side_mut(s)) {
            set(slot, length(name, value));
            return true;
        }
        if let Some(slot) = name.strip_prefix("padding-").and_then(|s| self.padding.side_mut(s)) {
            let len = length(name, value).filter(|l| !l.is_auto() && l.value >= 0.0);
            set(slot, len);
            return true;
        }
        let Some(rest) = name.strip_prefix("border-") else {
            return false;
        };
        if let Some(corner) = rest.strip_suffix("-radius") {
            let slot = match corner {
                "top-left" => &mut self.border_radius.top_left,
                "top-right" => &mut self.border_radius.top_right,
                "bottom-right" => &mut self.border_radius.bottom_right,
                "bottom-left" => &mut self.border_radius.bottom_left,
                _ => return false,
            };
            set(slot, length(name, value));
            return true;
        }
        let Some((side, part)) = rest.split_once('-') else {
            return false;
        };
        match part {
            "width" => {
                let width = match value {
                    "thin" => Some(Length::px(1.0)),
                    "medium" => Some(Length::px(3.0)),
                    "thick" => Some(Length::px(5.0)),
                    _ => length(name, value),
                };
                self.border_width.side_mut(side).map(|slot| set(slot, width)).is_some()
            }
            "color" => {
                let c = color(name, value);
                self.border_color.side_mut(side).map(|slot| set(slot, c)).is_some()
            }
            "style" => {
                let s = keyword(name, value);
                self.border_style.side_mut(side).map(|slot| set(slot, s)).is_some()
            }
            _ => false,
        }
    }

    /// Whether this element generates no box at all.
    #[must_use]
    pub fn is_display_none(&self) -> bool {
        self.display == DisplayValue::None
    }

    /// Context for resolving this element's own lengths.
    #[must_use]
    pub fn resolve_context(&self, parent_width: f32, parent_height: f32) -> ResolveContext {
        ResolveContext {
            font_size: self.font_size,
            parent_width,
            parent_height,
            ..ResolveContext::default()
        }
    }
}

/// Assign when parsing succeeded.
fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}
