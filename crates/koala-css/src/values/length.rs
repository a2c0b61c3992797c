//! CSS Length values and parsing
//!
//! [CSS Values and Units Level 4 § 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter};
use thiserror::Error;

/// User agent default font size.
///
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "Initial: medium" - medium is 16px per common browser convention.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
///
/// "1in = 2.54cm = 96px"
const PX_PER_IN: f32 = 96.0;

/// Unit tag of a [`Length`].
///
/// `Auto` and `None` are keywords rather than units; they are carried here so
/// a length can say "not specified" while staying a plain value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LengthUnit {
    /// "1px = 1/96th of 1in"
    Px,
    /// "Equal to the computed value of the font-size property of the element
    /// on which it is used."
    Em,
    /// "Equal to the computed value of font-size on the root element."
    Rem,
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    #[strum(serialize = "%")]
    #[serde(rename = "%")]
    Percent,
    /// "1% of the width of the small viewport size"
    Vw,
    /// "1% of the height of the small viewport size"
    Vh,
    /// "1% of the small viewport size's smaller dimension"
    Vmin,
    /// "1% of the small viewport size's larger dimension"
    Vmax,
    /// "Equal to the used advance measure of the '0' glyph"
    Ch,
    /// "Equal to the used x-height of the first available font"
    Ex,
    /// "1pt = 1/72nd of 1in"
    Pt,
    /// "1cm = 96px/2.54"
    Cm,
    /// "1mm = 1/10th of 1cm"
    Mm,
    /// "1in = 2.54cm = 96px"
    In,
    /// The `auto` keyword.
    Auto,
    /// The `none` keyword.
    None,
}

/// Unit suffixes in match order: a suffix that ends another suffix
/// (`em` in `rem`, `in` in `vmin`) must come after it.
const UNIT_SUFFIXES: &[(&str, LengthUnit)] = &[
    ("vmin", LengthUnit::Vmin),
    ("vmax", LengthUnit::Vmax),
    ("rem", LengthUnit::Rem),
    ("px", LengthUnit::Px),
    ("em", LengthUnit::Em),
    ("vw", LengthUnit::Vw),
    ("vh", LengthUnit::Vh),
    ("ch", LengthUnit::Ch),
    ("ex", LengthUnit::Ex),
    ("pt", LengthUnit::Pt),
    ("cm", LengthUnit::Cm),
    ("mm", LengthUnit::Mm),
    ("in", LengthUnit::In),
    ("%", LengthUnit::Percent),
];

/// [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// "Lengths refer to distance measurements and are denoted by <length> in the
/// property definitions."
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    /// Numeric part; meaningless for `auto`/`none`.
    pub value: f32,
    /// Unit tag.
    pub unit: LengthUnit,
}

impl Length {
    /// `0px`.
    pub const ZERO: Self = Self::px(0.0);

    /// The `auto` keyword.
    pub const AUTO: Self = Self {
        value: 0.0,
        unit: LengthUnit::Auto,
    };

    /// The `none` keyword (used by `max-width`/`max-height`).
    pub const NONE: Self = Self {
        value: 0.0,
        unit: LengthUnit::None,
    };

    /// Construct a length.
    #[must_use]
    pub const fn new(value: f32, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    /// Construct a pixel length.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::new(value, LengthUnit::Px)
    }

    /// Construct a percentage.
    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self::new(value, LengthUnit::Percent)
    }

    /// Whether this is the `auto` keyword.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.unit == LengthUnit::Auto
    }

    /// Whether this is the `none` keyword.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.unit == LengthUnit::None
    }

    /// Whether this is a numeric zero (any unit). `auto`/`none` are not zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        !self.is_auto() && !self.is_none() && self.value == 0.0
    }

    /// Resolve to pixels; percentages are relative to `ctx.parent_width`.
    ///
    /// `auto` and `none` resolve to 0; check [`Length::is_auto`] first where
    /// the difference matters.
    #[must_use]
    pub fn resolve(&self, ctx: &ResolveContext) -> f32 {
        self.resolve_against(ctx, ctx.parent_width)
    }

    /// Resolve to pixels with percentages relative to `ctx.parent_height`,
    /// for height-relative properties.
    #[must_use]
    pub fn resolve_height(&self, ctx: &ResolveContext) -> f32 {
        self.resolve_against(ctx, ctx.parent_height)
    }

    fn resolve_against(&self, ctx: &ResolveContext, percent_base: f32) -> f32 {
        let v = self.value;
        match self.unit {
            LengthUnit::Px => v,
            // [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
            LengthUnit::Em => v * ctx.font_size,
            LengthUnit::Rem => v * ctx.root_font_size,
            LengthUnit::Ch => v * ctx.char_width,
            LengthUnit::Ex => v * ctx.x_height,
            // [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
            LengthUnit::Percent => v / 100.0 * percent_base,
            // [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
            LengthUnit::Vw => v / 100.0 * ctx.viewport_width,
            LengthUnit::Vh => v / 100.0 * ctx.viewport_height,
            LengthUnit::Vmin => v / 100.0 * ctx.viewport_width.min(ctx.viewport_height),
            LengthUnit::Vmax => v / 100.0 * ctx.viewport_width.max(ctx.viewport_height),
            // [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
            LengthUnit::Pt => v * PX_PER_IN / 72.0,
            LengthUnit::Cm => v * PX_PER_IN / 2.54,
            LengthUnit::Mm => v * PX_PER_IN / 25.4,
            LengthUnit::In => v * PX_PER_IN,
            LengthUnit::Auto | LengthUnit::None => 0.0,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.unit {
            LengthUnit::Auto => f.write_str("auto"),
            LengthUnit::None => f.write_str("none"),
            unit => write!(f, "{}{}", self.value, unit.as_ref()),
        }
    }
}

/// Everything a relative length needs to become pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolveContext {
    /// Font size of the element, for `em`.
    pub font_size: f32,
    /// Font size of the root element, for `rem`.
    pub root_font_size: f32,
    /// Containing block width, for `%`.
    pub parent_width: f32,
    /// Containing block height, for height-relative `%`.
    pub parent_height: f32,
    /// Viewport width, for `vw`/`vmin`/`vmax`.
    pub viewport_width: f32,
    /// Viewport height, for `vh`/`vmin`/`vmax`.
    pub viewport_height: f32,
    /// Average glyph advance, for `ch`.
    pub char_width: f32,
    /// x-height, for `ex`.
    pub x_height: f32,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE_PX,
            root_font_size: DEFAULT_FONT_SIZE_PX,
            parent_width: 1024.0,
            parent_height: 768.0,
            viewport_width: 1024.0,
            viewport_height: 768.0,
            char_width: 8.0,
            x_height: 8.0,
        }
    }
}

/// Why a length string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthParseError {
    /// The numeric part is not a number.
    #[error("invalid number in length '{0}'")]
    InvalidNumber(String),
    /// The suffix is not a known unit.
    #[error("unknown unit in length '{0}'")]
    UnknownUnit(String),
}

/// [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Parse `"12px"`, `"1.5em"`, `"50%"`, `"auto"`, `"none"`, or a bare number
/// (treated as pixels). The empty string and `"0"` are zero.
///
/// # Errors
///
/// Returns [`LengthParseError`] when the number or unit is not recognized.
pub fn parse_length(input: &str) -> Result<Length, LengthParseError> {
    let s = input.trim().to_ascii_lowercase();
    match s.as_str() {
        "" | "0" => return Ok(Length::ZERO),
        "auto" => return Ok(Length::AUTO),
        "none" => return Ok(Length::NONE),
        _ => {}
    }

    if let Some((number, unit)) = UNIT_SUFFIXES
        .iter()
        .find_map(|&(suffix, unit)| s.strip_suffix(suffix).map(|n| (n, unit)))
    {
        let value = parse_number(number).ok_or_else(|| LengthParseError::InvalidNumber(s.clone()))?;
        return Ok(Length::new(value, unit));
    }

    match parse_number(&s) {
        Some(value) => Ok(Length::px(value)),
        None if s.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+')) => {
            Err(LengthParseError::UnknownUnit(s))
        }
        None => Err(LengthParseError::InvalidNumber(s)),
    }
}

/// A finite CSS number (no `inf`/`nan` spellings).
pub(crate) fn parse_number(s: &str) -> Option<f32> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e')) {
        return None;
    }
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}
