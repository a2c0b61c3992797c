//! Shorthand property expansion.
//!
//! [CSS Cascading Level 4 § 1.2 Shorthand Properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
//!
//! "Some properties are shorthand properties, meaning that they allow authors
//! to specify the values of several properties with a single property."
//!
//! Longhands inherit the shorthand's `!important` flag. Components a
//! shorthand value does not mention are left to the cascade; they are not
//! reset to initial values.

use super::Declaration;
use crate::values::{parse_color, parse_length};

/// [§ 6.1 Line styles](https://www.w3.org/TR/css-backgrounds-3/#border-style)
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const FLEX_DIRECTIONS: &[&str] = &["row", "row-reverse", "column", "column-reverse"];
const FLEX_WRAPS: &[&str] = &["nowrap", "wrap", "wrap-reverse"];
const LIST_POSITIONS: &[&str] = &["inside", "outside"];

/// Expand a declaration into longhands. Non-shorthands come back unchanged;
/// a shorthand whose value cannot be split comes back empty.
#[must_use]
pub fn expand_shorthand(decl: &Declaration) -> Vec<Declaration> {
    let value = decl.value.as_str();
    let mut out = Expansion {
        important: decl.important,
        declarations: Vec::new(),
    };

    match decl.name.as_str() {
        "margin" => out.box_sides(value, "margin-{}"),
        "padding" => out.box_sides(value, "padding-{}"),
        "border-width" => out.box_sides(value, "border-{}-width"),
        "border-color" => out.box_sides(value, "border-{}-color"),
        "border-style" => out.box_sides(value, "border-{}-style"),
        "border-radius" => out.border_radius(value),
        "border" => {
            for side in SIDES {
                out.border_side(value, side);
            }
        }
        "border-top" => out.border_side(value, "top"),
        "border-right" => out.border_side(value, "right"),
        "border-bottom" => out.border_side(value, "bottom"),
        "border-left" => out.border_side(value, "left"),
        "flex" => out.flex(value),
        "flex-flow" => out.flex_flow(value),
        "gap" => out.gap(value),
        "background" => out.background(value),
        "list-style" => out.list_style(value),
        "overflow" => out.overflow(value),
        _ => return vec![decl.clone()],
    }

    out.declarations
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

struct Expansion {
    important: bool,
    declarations: Vec<Declaration>,
}

impl Expansion {
    fn push(&mut self, name: &str, value: &str) {
        self.declarations
            .push(Declaration::new(name, value, self.important));
    }

    /// [§ 1.2](https://www.w3.org/TR/css-cascade-4/#shorthand)
    ///
    /// 1 value: all sides. 2: vertical, horizontal. 3: top, horizontal,
    /// bottom. 4: top, right, bottom, left.
    fn box_sides(&mut self, value: &str, pattern: &str) {
        let Some([top, right, bottom, left]) = four_sides(&split_components(value)) else {
            return;
        };
        for (side, v) in SIDES.iter().zip([top, right, bottom, left]) {
            self.push(&pattern.replace("{}", side), v);
        }
    }

    /// [§ 5.1 border-radius](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
    ///
    /// Corners go top-left, top-right, bottom-right, bottom-left. The
    /// vertical radii after a `/` are ignored.
    fn border_radius(&mut self, value: &str) {
        let horizontal = value.split('/').next().unwrap_or(value);
        let Some(corners) = four_sides(&split_components(horizontal)) else {
            return;
        };
        let names = ["top-left", "top-right", "bottom-right", "bottom-left"];
        for (corner, v) in names.iter().zip(corners) {
            self.push(&format!("border-{corner}-radius"), v);
        }
    }

    /// [§ 4.4 border shorthands](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
    ///
    /// Components are told apart by shape: a line-style keyword, a color,
    /// or a width.
    fn border_side(&mut self, value: &str, side: &str) {
        for part in split_components(value) {
            let lower = part.to_ascii_lowercase();
            if BORDER_STYLES.contains(&lower.as_str()) {
                self.push(&format!("border-{side}-style"), &lower);
            } else if parse_color(&lower).is_ok() {
                self.push(&format!("border-{side}-color"), &lower);
            } else if matches!(lower.as_str(), "thin" | "medium" | "thick")
                || parse_length(&lower).is_ok()
            {
                self.push(&format!("border-{side}-width"), &lower);
            }
        }
    }

    /// [§ 7.2 The flex Shorthand](https://www.w3.org/TR/css-flexbox-1/#flex-property)
    ///
    /// `none` = `0 0 auto`, `auto` = `1 1 auto`, `initial` = `0 1 auto`.
    /// "When omitted from the flex shorthand, its specified value is 0"
    /// for the basis once a grow factor is present.
    fn flex(&mut self, value: &str) {
        let parts = split_components(value);
        let (grow, shrink, basis) = match parts.as_slice() {
            [one] => match one.to_ascii_lowercase().as_str() {
                "none" => ("0", "0", "auto"),
                "auto" => ("1", "1", "auto"),
                "initial" => ("0", "1", "auto"),
                _ if is_number(one) => (*one, "1", "0"),
                _ => ("1", "1", *one),
            },
            [grow, second] if is_number(second) => (*grow, *second, "0"),
            [grow, basis] => (*grow, "1", *basis),
            [grow, shrink, basis] => (*grow, *shrink, *basis),
            _ => return,
        };
        self.push("flex-grow", grow);
        self.push("flex-shrink", shrink);
        self.push("flex-basis", basis);
    }

    /// [§ 5.3 flex-flow](https://www.w3.org/TR/css-flexbox-1/#flex-flow-property)
    fn flex_flow(&mut self, value: &str) {
        for part in split_components(value) {
            let lower = part.to_ascii_lowercase();
            if FLEX_DIRECTIONS.contains(&lower.as_str()) {
                self.push("flex-direction", &lower);
            } else if FLEX_WRAPS.contains(&lower.as_str()) {
                self.push("flex-wrap", &lower);
            }
        }
    }

    /// [§ 8.4 gap](https://www.w3.org/TR/css-align-3/#gap-shorthand)
    ///
    /// One value sets both; two are row then column.
    fn gap(&mut self, value: &str) {
        match split_components(value).as_slice() {
            [both] => {
                self.push("row-gap", both);
                self.push("column-gap", both);
            }
            [row, column] => {
                self.push("row-gap", row);
                self.push("column-gap", column);
            }
            _ => {}
        }
    }

    /// [§ 3.10 background](https://www.w3.org/TR/css-backgrounds-3/#background)
    ///
    /// Only the color and image layers are kept.
    fn background(&mut self, value: &str) {
        for part in split_components(value) {
            let lower = part.to_ascii_lowercase();
            if lower == "none" || lower.starts_with("url(") || lower.contains("gradient(") {
                self.push("background-image", part);
            } else if parse_color(&lower).is_ok() {
                self.push("background-color", &lower);
            }
        }
    }

    /// [§ 3 list-style](https://www.w3.org/TR/css-lists-3/#list-style-property)
    fn list_style(&mut self, value: &str) {
        for part in split_components(value) {
            let lower = part.to_ascii_lowercase();
            if LIST_POSITIONS.contains(&lower.as_str()) {
                self.push("list-style-position", &lower);
            } else if !lower.starts_with("url(") {
                self.push("list-style-type", &lower);
            }
        }
    }

    /// [§ 3 overflow](https://www.w3.org/TR/css-overflow-3/#propdef-overflow)
    ///
    /// One value sets both axes; two are x then y.
    fn overflow(&mut self, value: &str) {
        match split_components(value).as_slice() {
            [both] => {
                self.push("overflow-x", both);
                self.push("overflow-y", both);
            }
            [x, y] => {
                self.push("overflow-x", x);
                self.push("overflow-y", y);
            }
            _ => {}
        }
    }
}

/// Apply the 1/2/3/4-value box rule. More than four values is invalid.
fn four_sides<'a>(parts: &[&'a str]) -> Option<[&'a str; 4]> {
    match *parts {
        [all] => Some([all, all, all, all]),
        [vertical, horizontal] => Some([vertical, horizontal, vertical, horizontal]),
        [top, horizontal, bottom] => Some([top, horizontal, bottom, horizontal]),
        [top, right, bottom, left] => Some([top, right, bottom, left]),
        _ => None,
    }
}

/// Split a value on top-level whitespace, keeping `rgb(1, 2, 3)` and
/// `url(a b)` whole.
fn split_components(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut start = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

fn is_number(s: &str) -> bool {
    s.parse::<f32>().is_ok_and(f32::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_components_keeps_functions_whole() {
        assert_eq!(
            split_components("1px solid rgb(1, 2, 3)"),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
        assert!(split_components("   ").is_empty());
    }

    #[test]
    fn test_four_sides_rejects_five_values() {
        assert!(four_sides(&["1", "2", "3", "4", "5"]).is_none());
        assert_eq!(four_sides(&["1", "2", "3"]), Some(["1", "2", "3", "2"]));
    }
}
