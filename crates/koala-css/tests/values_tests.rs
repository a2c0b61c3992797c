//! Integration tests for length and color values.

use koala_css::values::{
    Color, ColorParseError, Length, LengthParseError, LengthUnit, ResolveContext, parse_color,
    parse_length,
};
use quickcheck_macros::quickcheck;
use strum::IntoEnumIterator;

fn ctx_with_parent_width(parent_width: f32) -> ResolveContext {
    ResolveContext {
        parent_width,
        ..ResolveContext::default()
    }
}

#[test]
fn test_percent_resolves_against_parent_width() {
    let half = parse_length("50%").unwrap();
    assert_eq!(half.unit, LengthUnit::Percent);
    assert_eq!(half.resolve(&ctx_with_parent_width(200.0)), 100.0);
}

#[test]
fn test_percent_height_uses_parent_height() {
    let ctx = ResolveContext {
        parent_height: 300.0,
        ..ResolveContext::default()
    };
    assert_eq!(parse_length("10%").unwrap().resolve_height(&ctx), 30.0);
}

#[test]
fn test_relative_units() {
    let ctx = ResolveContext {
        font_size: 20.0,
        root_font_size: 10.0,
        viewport_width: 800.0,
        viewport_height: 600.0,
        ..ResolveContext::default()
    };
    assert_eq!(parse_length("2em").unwrap().resolve(&ctx), 40.0);
    assert_eq!(parse_length("2rem").unwrap().resolve(&ctx), 20.0);
    assert_eq!(parse_length("10vw").unwrap().resolve(&ctx), 80.0);
    assert_eq!(parse_length("10vh").unwrap().resolve(&ctx), 60.0);
    assert_eq!(parse_length("10vmin").unwrap().resolve(&ctx), 60.0);
    assert_eq!(parse_length("10vmax").unwrap().resolve(&ctx), 80.0);
}

#[test]
fn test_absolute_units() {
    let ctx = ResolveContext::default();
    assert_eq!(parse_length("1in").unwrap().resolve(&ctx), 96.0);
    assert_eq!(parse_length("72pt").unwrap().resolve(&ctx), 96.0);
    assert!((parse_length("2.54cm").unwrap().resolve(&ctx) - 96.0).abs() < 1e-3);
}

#[test]
fn test_keywords_and_bare_numbers() {
    assert!(parse_length("auto").unwrap().is_auto());
    assert!(parse_length("none").unwrap().is_none());
    assert!(parse_length("0").unwrap().is_zero());
    assert!(parse_length("").unwrap().is_zero());
    assert_eq!(parse_length("12").unwrap(), Length::px(12.0));
    assert_eq!(parse_length("-4px").unwrap(), Length::px(-4.0));
    assert_eq!(Length::AUTO.resolve(&ResolveContext::default()), 0.0);
}

#[test]
fn test_length_errors() {
    assert!(matches!(parse_length("12furlongs"), Err(LengthParseError::UnknownUnit(_))));
    assert!(matches!(parse_length("px"), Err(LengthParseError::InvalidNumber(_))));
}

#[test]
fn test_rgba_alpha_rounds_to_nearest_byte() {
    assert_eq!(parse_color("rgba(255,0,0,0.5)").unwrap(), Color::rgba(255, 0, 0, 128));
    assert_eq!(parse_color("rgba(0, 0, 0, 0)").unwrap(), Color::TRANSPARENT);
    assert_eq!(parse_color("rgb(10 20 30 / 1)").unwrap(), Color::rgb(10, 20, 30));
}

#[test]
fn test_color_forms() {
    assert_eq!(parse_color("red").unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(parse_color("RED").unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(parse_color("#0f0").unwrap(), Color::rgb(0, 255, 0));
    assert_eq!(parse_color("#0000ff").unwrap(), Color::rgb(0, 0, 255));
    assert_eq!(parse_color("#00000080").unwrap(), Color::rgba(0, 0, 0, 128));
    assert_eq!(parse_color("hsl(120, 100%, 50%)").unwrap(), Color::rgb(0, 255, 0));
    assert_eq!(parse_color("transparent").unwrap(), Color::TRANSPARENT);
}

#[test]
fn test_color_errors() {
    assert_eq!(parse_color("  "), Err(ColorParseError::Empty));
    assert!(matches!(parse_color("notacolor"), Err(ColorParseError::UnknownName(_))));
    assert!(matches!(parse_color("currentcolor"), Err(ColorParseError::UnknownName(_))));
    assert!(matches!(parse_color("#12"), Err(ColorParseError::InvalidHex(_))));
    assert!(matches!(parse_color("rgb(1, x, 3)"), Err(ColorParseError::InvalidNumber(_))));
}

#[test]
fn test_color_display_and_hex() {
    let color = Color::rgba(1, 2, 3, 4);
    assert_eq!(color.to_string(), "rgba(1, 2, 3, 4)");
    assert_eq!(Color::rgb(255, 0, 128).to_hex_string(), "#ff0080");
    assert!(Color::WHITE.is_opaque());
    assert!(Color::BLACK.with_alpha(0).is_transparent());
}

#[test]
fn test_every_unit_suffix_parses() {
    let suffixes = [
        "px", "em", "rem", "%", "vw", "vh", "vmin", "vmax", "pt", "cm", "mm", "in", "ch", "ex",
    ];
    for suffix in suffixes {
        let length = parse_length(&format!("3{suffix}")).unwrap();
        assert_eq!(length.unit.as_ref(), suffix);
        assert_eq!(length.value, 3.0);
    }
    assert!(parse_length("3pc").is_err());
}

/// Percentages are linear in the parent width.
#[quickcheck]
fn prop_percent_resolution_is_linear(percent: u16, width: u16) -> bool {
    let percent = f32::from(percent % 1000);
    let width = f32::from(width);
    let length = Length::percent(percent);
    let single = length.resolve(&ctx_with_parent_width(width));
    let double = length.resolve(&ctx_with_parent_width(width * 2.0));
    (double - 2.0 * single).abs() <= 1e-3 * double.abs().max(1.0)
}

/// Doubling the value doubles the resolved pixels, whatever the unit.
#[quickcheck]
fn prop_resolution_is_linear_in_value(value: i16, font_size: u8, width: u16) -> bool {
    let v = f32::from(value) / 4.0;
    let ctx = ResolveContext {
        font_size: f32::from(font_size) + 1.0,
        parent_width: f32::from(width),
        ..ResolveContext::default()
    };
    LengthUnit::iter()
        .filter(|unit| !matches!(unit, LengthUnit::Auto | LengthUnit::None))
        .all(|unit| {
            let single = Length::new(v, unit).resolve(&ctx);
            let double = Length::new(2.0 * v, unit).resolve(&ctx);
            (double - 2.0 * single).abs() <= 1e-4 * double.abs().max(1.0)
        })
}
