//! Inline formatting: font metrics, line cursor and word wrapping.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."

use serde::Serialize;

use crate::style::{ComputedStyle, NORMAL_LINE_HEIGHT, WhiteSpace};

use super::LayoutConfig;
use super::box_model::Rect;

/// Text measurement used by layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
pub trait FontMetrics {
    /// Measure the total advance width of a text string at the given font size.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Height of one line of text for `line-height: normal`.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    fn line_height(&self, font_size: f32) -> f32;
}

/// Approximate font metrics using fixed ratios of the font size.
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Without font data every character advances by the same amount.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateFontMetrics {
    /// Advance of one character as a fraction of the font size.
    pub char_width_ratio: f32,
    /// Line height as a multiple of the font size.
    pub line_height_ratio: f32,
}

impl ApproximateFontMetrics {
    /// Metrics matching a layout configuration.
    #[must_use]
    pub const fn from_config(config: &LayoutConfig) -> Self {
        Self {
            char_width_ratio: config.char_width_ratio,
            line_height_ratio: config.line_height_ratio,
        }
    }
}

impl Default for ApproximateFontMetrics {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.char_width_ratio
    }

    fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height_ratio
    }
}

/// Used line height for a style: an explicit `line-height` multiplies the
/// font size, `normal` defers to the metrics.
pub fn used_line_height(style: &ComputedStyle, metrics: &dyn FontMetrics) -> f32 {
    if (style.line_height - NORMAL_LINE_HEIGHT).abs() < f32::EPSILON {
        metrics.line_height(style.font_size)
    } else {
        style.font_size * style.line_height
    }
}

/// One line's worth of a text run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    /// The characters on this line.
    pub text: String,
    /// Where the line sits.
    pub rect: Rect,
}

/// The pen position while filling line boxes inside one containing block.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InlineCursor {
    /// Left content edge.
    pub left: f32,
    /// Right content edge.
    pub right: f32,
    pub x: f32,
    pub y: f32,
    /// Height of the tallest thing placed on the current line.
    pub line_height: f32,
}

impl InlineCursor {
    pub(crate) const fn new(left: f32, right: f32, y: f32) -> Self {
        Self {
            left,
            right,
            x: left,
            y,
            line_height: 0.0,
        }
    }

    pub(crate) fn at_line_start(&self) -> bool {
        self.x <= self.left
    }

    /// Whether `width` more pixels fit on the current line.
    pub(crate) fn fits(&self, width: f32) -> bool {
        self.x + width <= self.right
    }

    pub(crate) fn new_line(&mut self) {
        self.y += self.line_height;
        self.x = self.left;
        self.line_height = 0.0;
    }

    /// Close the current line if anything is on it.
    pub(crate) fn finish_line(&mut self) {
        if !self.at_line_start() || self.line_height > 0.0 {
            self.new_line();
        }
    }

    /// Place an atomic inline of the given outer size, wrapping first if it
    /// does not fit. Returns its top-left corner.
    pub(crate) fn place(&mut self, width: f32, height: f32) -> (f32, f32) {
        if !self.at_line_start() && !self.fits(width) {
            self.new_line();
        }
        let origin = (self.x, self.y);
        self.x += width;
        self.line_height = self.line_height.max(height);
        origin
    }
}

/// [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
///
/// Flow a text run into the cursor, breaking at spaces when `white-space`
/// allows it. Returns one [`TextLine`] per line box the run touches.
pub(crate) fn wrap_text(
    text: &str,
    style: &ComputedStyle,
    metrics: &dyn FontMetrics,
    cursor: &mut InlineCursor,
) -> Vec<TextLine> {
    let font_size = style.font_size;
    let line_height = used_line_height(style, metrics);
    let text = style.text_transform.apply(text);

    match style.white_space {
        WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::PreLine => {
            // Preserved newlines always break. Parsed text has already had
            // its whitespace runs collapsed by the tokenizer, so newlines only
            // reach here from text built directly, and `pre` text from markup
            // just never wraps.
            let mut lines = Vec::new();
            for (i, segment) in text.split('\n').enumerate() {
                if i > 0 {
                    cursor.line_height = cursor.line_height.max(line_height);
                    cursor.new_line();
                }
                if style.white_space == WhiteSpace::Pre {
                    push_segment(&mut lines, segment, font_size, line_height, metrics, cursor);
                } else {
                    lines.extend(wrap_words(segment, font_size, line_height, metrics, cursor));
                }
            }
            lines.retain(|line| !line.text.is_empty());
            lines
        }
        WhiteSpace::Nowrap => {
            let collapsed = collapse(&text);
            let mut lines = Vec::new();
            push_segment(&mut lines, &collapsed, font_size, line_height, metrics, cursor);
            lines
        }
        WhiteSpace::Normal => wrap_words(&text, font_size, line_height, metrics, cursor),
    }
}

fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

/// Place unbreakable text on the current line.
fn push_segment(
    lines: &mut Vec<TextLine>,
    segment: &str,
    font_size: f32,
    line_height: f32,
    metrics: &dyn FontMetrics,
    cursor: &mut InlineCursor,
) {
    let width = metrics.text_width(segment, font_size);
    lines.push(TextLine {
        text: segment.to_string(),
        rect: Rect {
            x: cursor.x,
            y: cursor.y,
            width,
            height: line_height,
        },
    });
    cursor.x += width;
    cursor.line_height = cursor.line_height.max(line_height);
}

/// Greedy word wrap. Boundary whitespace becomes a single space unless the
/// run starts at the beginning of a line.
fn wrap_words(
    text: &str,
    font_size: f32,
    line_height: f32,
    metrics: &dyn FontMetrics,
    cursor: &mut InlineCursor,
) -> Vec<TextLine> {
    let leading_space = text.starts_with(char::is_whitespace);
    let trailing_space = text.ends_with(char::is_whitespace);
    let space = metrics.text_width(" ", font_size);

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Option<TextLine> = None;

    for (i, word) in text.split_whitespace().enumerate() {
        let wants_space = (i > 0 || leading_space) && !cursor.at_line_start();
        let word_width = metrics.text_width(word, font_size);
        let mut width = word_width + if wants_space { space } else { 0.0 };

        let mut with_space = wants_space;
        if !cursor.at_line_start() && !cursor.fits(width) {
            cursor.line_height = cursor.line_height.max(line_height);
            cursor.new_line();
            lines.extend(current.take());
            width = word_width;
            with_space = false;
        }

        let line = current.get_or_insert_with(|| TextLine {
            text: String::new(),
            rect: Rect {
                x: cursor.x,
                y: cursor.y,
                width: 0.0,
                height: line_height,
            },
        });
        if with_space {
            line.text.push(' ');
        }
        line.text.push_str(word);
        line.rect.width += width;
        cursor.x += width;
        cursor.line_height = cursor.line_height.max(line_height);
    }

    if trailing_space && !cursor.at_line_start() {
        cursor.x += space;
        if let Some(line) = current.as_mut() {
            line.text.push(' ');
            line.rect.width += space;
        }
    }
    lines.extend(current);
    lines
}
