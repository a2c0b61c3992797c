//! CSS Computed Style representation and value parsing
//!
//! - [`computed`]: the [`ComputedStyle`] record and declaration application.
//! - [`keywords`]: typed keyword properties (`display`, `flex-direction`, ...).

pub mod computed;
pub mod keywords;

pub use computed::{ComputedStyle, Corners, NORMAL_LINE_HEIGHT, Sides};
pub use keywords::{
    AlignContent, AlignItems, AlignSelf, BorderCollapse, BorderStyle, BoxSizing, Cursor,
    DisplayValue, FlexDirection, FlexWrap, FontStyle, JustifyContent, ListStylePosition,
    ListStyleType, Overflow, Position, TextAlign, TextDecoration, TextTransform, Visibility,
    WhiteSpace,
};
