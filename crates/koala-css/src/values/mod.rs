//! CSS value types and resolution per [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/).
//!
//! # Value Processing Stages
//!
//! ```text
//!  CSS text ("2em", "#f00")
//!        │  parse_length() / parse_color()
//!        ▼
//!  Length { value, unit } / Color { r, g, b, a }   stored in ComputedStyle
//!        │  Length::resolve(&ResolveContext)       during layout
//!        ▼
//!  f32 pixels
//! ```
//!
//! [§ 4.4 Used Values](https://www.w3.org/TR/css-cascade-4/#used-value)
//!
//! "The used value is the result of taking the computed value and completing
//! any remaining calculations to make it the absolute theoretical value
//! used in the formatting of the document."
//!
//! Relative units (em, rem, %, viewport units) stay unresolved in the
//! computed style and are turned into pixels only once layout supplies a
//! [`ResolveContext`].

/// Colors: named, hex, `rgb()`/`rgba()`, `hsl()`/`hsla()`.
pub mod color;
/// Lengths with units and their resolution context.
pub mod length;

pub use color::{Color, ColorParseError, parse_color};
pub use length::{
    DEFAULT_FONT_SIZE_PX, Length, LengthParseError, LengthUnit, ResolveContext, parse_length,
};
