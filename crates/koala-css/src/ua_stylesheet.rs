//! User-Agent Stylesheet
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! The UA sheet only holds type-selector rules. It is not part of the author
//! cascade: it produces the per-tag starting style that author declarations
//! are applied on top of, which is also the baseline the inheritance pass
//! compares against.

use std::sync::OnceLock;

use crate::parser::{Stylesheet, parse_stylesheet};
use crate::selector::SimpleSelector;
use crate::style::ComputedStyle;

/// [WHATWG HTML § 15.3 Rendering — Suggested default style sheet](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
const UA_CSS: &str = r"
/* [§ 15.3.1 Hidden elements] */
head, script, style, meta, link, title, template, noscript, base, param {
    display: none;
}

/* [§ 15.3.3 Flow content] */
html, body, div, section, article, header, footer, nav, main, aside,
ul, ol, form, blockquote, pre, p, h1, h2, h3, h4, h5, h6,
figure, figcaption, fieldset, address, details, summary, dl, dd, dt, hr {
    display: block;
}

/* [§ 15.3.2 The page] */
body { margin: 8px; }

li { display: list-item; }
table { display: table; }
tr { display: table-row; }
td, th { display: table-cell; }

/* [§ 15.3.6 Sections and headings] */
h1 { font-size: 32px; font-weight: bold; margin: 21px 0; }
h2 { font-size: 24px; font-weight: bold; margin: 19px 0; }
h3 { font-size: 18px; font-weight: bold; margin: 18px 0; }
h4, h5, h6 { font-size: 16px; font-weight: bold; margin: 16px 0; }

/* [§ 15.3.3 Flow content] */
p { margin: 16px 0; }
blockquote, figure { margin: 16px 40px; }
pre { white-space: pre; font-family: monospace; }
hr { border-top: 1px solid gray; margin: 8px 0; }

/* [§ 15.3.7 Lists] */
ul, ol { padding-left: 40px; margin: 16px 0; }
ol { list-style-type: decimal; }

/* [§ 15.3.4 Phrasing content] */
a { color: rgb(0, 0, 238); text-decoration: underline; cursor: pointer; }
b, strong, th { font-weight: bold; }
i, em, cite { font-style: italic; }
u, ins { text-decoration: underline; }
s, del { text-decoration: line-through; }
code, kbd, samp { font-family: monospace; }
small { font-size: 13px; }

/* [§ 15.5 Replaced elements, form controls] */
img, input, select, textarea { display: inline-block; }
button {
    display: inline-block;
    padding: 8px 16px;
    background-color: rgb(240, 240, 240);
    border-radius: 4px;
    cursor: pointer;
}
";

/// The parsed UA stylesheet, built on first use.
#[must_use]
pub fn ua_stylesheet() -> &'static Stylesheet {
    static SHEET: OnceLock<Stylesheet> = OnceLock::new();
    SHEET.get_or_init(|| parse_stylesheet(UA_CSS))
}

/// Initial style for an element with this tag: the property defaults with
/// every UA rule naming the tag applied in source order.
#[must_use]
pub fn default_style_for_tag(tag: &str) -> ComputedStyle {
    let mut style = ComputedStyle::default();
    let names_tag = |simple: &SimpleSelector| {
        matches!(simple, SimpleSelector::Type(name) if name.eq_ignore_ascii_case(tag))
    };
    for rule in &ua_stylesheet().rules {
        let applies = rule
            .selectors
            .iter()
            .any(|sel| sel.is_simple() && sel.subject.simple_selectors.iter().any(names_tag));
        if applies {
            for decl in &rule.declarations {
                style.apply_declaration(decl);
            }
        }
    }
    style
}
