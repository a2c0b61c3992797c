//! Keyword-valued properties.
//!
//! Each enum parses case-insensitively from its CSS spelling through
//! `strum::EnumString` and prints back the same spelling.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Declare a keyword enum with CSS (kebab-case) spellings.
macro_rules! css_keyword {
    (
        $(#[$meta:meta])*
        $name:ident { #[default] $default:ident, $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[allow(missing_docs)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
        )]
        #[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            #[default]
            $default,
            $($variant),+
        }
    };
}

css_keyword! {
    /// [§ 2 display](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Table display types lay out as blocks.
    DisplayValue { #[default] Inline, Block, InlineBlock, Flex, InlineFlex, ListItem, Table, TableRow, TableCell, None }
}

impl DisplayValue {
    /// `flex` or `inline-flex`.
    #[must_use]
    pub const fn is_flex(self) -> bool {
        matches!(self, Self::Flex | Self::InlineFlex)
    }

    /// Generates a box on its own line.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Block | Self::Flex | Self::ListItem | Self::Table | Self::TableRow | Self::TableCell
        )
    }
}

css_keyword! {
    /// [§ 2 position](https://www.w3.org/TR/css-position-3/#position-property)
    Position { #[default] Static, Relative, Absolute, Fixed, Sticky }
}

css_keyword! {
    /// [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
    BoxSizing { #[default] ContentBox, BorderBox }
}

css_keyword! {
    /// [§ 6.1 Line styles](https://www.w3.org/TR/css-backgrounds-3/#border-style)
    BorderStyle { #[default] None, Hidden, Dotted, Dashed, Solid, Double, Groove, Ridge, Inset, Outset }
}

css_keyword! {
    /// [§ 5.1 flex-direction](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
    FlexDirection { #[default] Row, RowReverse, Column, ColumnReverse }
}

impl FlexDirection {
    /// `row` and `row-reverse` run horizontally.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// The `-reverse` variants.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

css_keyword! {
    /// [§ 5.2 flex-wrap](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
    FlexWrap { #[default] Nowrap, Wrap, WrapReverse }
}

css_keyword! {
    /// [§ 8.2 justify-content](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
    JustifyContent { #[default] FlexStart, FlexEnd, Center, SpaceBetween, SpaceAround, SpaceEvenly }
}

css_keyword! {
    /// [§ 8.3 align-items](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
    ///
    /// `baseline` is accepted and placed like `flex-start`.
    AlignItems { #[default] Stretch, FlexStart, FlexEnd, Center, Baseline }
}

css_keyword! {
    /// [§ 8.3 align-self](https://www.w3.org/TR/css-flexbox-1/#propdef-align-self)
    ///
    /// `auto` defers to the container's `align-items`.
    AlignSelf { #[default] Auto, Stretch, FlexStart, FlexEnd, Center, Baseline }
}

impl AlignSelf {
    /// Resolve `auto` against the container.
    #[must_use]
    pub const fn resolve(self, container: AlignItems) -> AlignItems {
        match self {
            Self::Auto => container,
            Self::Stretch => AlignItems::Stretch,
            Self::FlexStart => AlignItems::FlexStart,
            Self::FlexEnd => AlignItems::FlexEnd,
            Self::Center => AlignItems::Center,
            Self::Baseline => AlignItems::Baseline,
        }
    }
}

css_keyword! {
    /// [§ 8.4 align-content](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
    AlignContent { #[default] Stretch, FlexStart, FlexEnd, Center, SpaceBetween, SpaceAround, SpaceEvenly }
}

css_keyword! {
    /// [§ 3 overflow](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    Overflow { #[default] Visible, Hidden, Scroll, Auto, Clip }
}

css_keyword! {
    /// [§ 3.3 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
    FontStyle { #[default] Normal, Italic, Oblique }
}

css_keyword! {
    /// [§ 7.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
    TextAlign { #[default] Left, Right, Center, Justify }
}

css_keyword! {
    /// [§ 2.1 text-decoration-line](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
    TextDecoration { #[default] None, Underline, Overline, LineThrough }
}

css_keyword! {
    /// [§ 2.1 text-transform](https://www.w3.org/TR/css-text-3/#text-transform-property)
    TextTransform { #[default] None, Uppercase, Lowercase, Capitalize }
}

impl TextTransform {
    /// Apply the transform to a run of text.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    chars.next().map_or_else(String::new, |first| {
                        first.to_uppercase().chain(chars).collect()
                    })
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

css_keyword! {
    /// [§ 3 white-space](https://www.w3.org/TR/css-text-3/#white-space-property)
    WhiteSpace { #[default] Normal, Nowrap, Pre, PreWrap, PreLine }
}

impl WhiteSpace {
    /// Lines may break at spaces.
    #[must_use]
    pub const fn wraps(self) -> bool {
        !matches!(self, Self::Nowrap | Self::Pre)
    }
}

css_keyword! {
    /// [§ 6.2 visibility](https://www.w3.org/TR/css-display-3/#visibility)
    Visibility { #[default] Visible, Hidden, Collapse }
}

css_keyword! {
    /// [§ 8.1 cursor](https://www.w3.org/TR/css-ui-4/#cursor)
    Cursor { #[default] Auto, Default, Pointer, Text, Move, Wait, Crosshair, NotAllowed, Grab, Help }
}

css_keyword! {
    /// [§ 3 list-style-type](https://www.w3.org/TR/css-lists-3/#text-markers)
    ListStyleType { #[default] Disc, Circle, Square, Decimal, LowerAlpha, UpperAlpha, LowerRoman, UpperRoman, None }
}

css_keyword! {
    /// [§ 3 list-style-position](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
    ListStylePosition { #[default] Outside, Inside }
}

css_keyword! {
    /// [§ 17.6 border-collapse](https://www.w3.org/TR/CSS2/tables.html#borders)
    BorderCollapse { #[default] Separate, Collapse }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_parse_case_insensitively() {
        assert_eq!("INLINE-FLEX".parse::<DisplayValue>(), Ok(DisplayValue::InlineFlex));
        assert_eq!("space-between".parse::<JustifyContent>(), Ok(JustifyContent::SpaceBetween));
        assert!("sideways".parse::<FlexDirection>().is_err());
    }

    #[test]
    fn test_keywords_print_css_spelling() {
        assert_eq!(DisplayValue::InlineBlock.to_string(), "inline-block");
        assert_eq!(TextDecoration::LineThrough.to_string(), "line-through");
        assert_eq!(DisplayValue::default(), DisplayValue::Inline);
    }

    #[test]
    fn test_capitalize_keeps_spacing() {
        assert_eq!(TextTransform::Capitalize.apply("hello big world"), "Hello Big World");
    }
}
