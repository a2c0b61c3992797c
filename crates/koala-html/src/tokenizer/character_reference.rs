//! Character reference decoding.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
//!
//! Only the references that show up in ordinary documents are recognized.
//! A reference must be terminated by `;`; anything unrecognized is kept
//! literally.

/// Named references recognized by [`decode_character_references`].
const NAMED_CHARACTER_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("copy", '\u{00A9}'),
    ("reg", '\u{00AE}'),
    ("trade", '\u{2122}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("hellip", '\u{2026}'),
    ("laquo", '\u{00AB}'),
    ("raquo", '\u{00BB}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
    ("bull", '\u{2022}'),
    ("middot", '\u{00B7}'),
    ("times", '\u{00D7}'),
    ("divide", '\u{00F7}'),
    ("deg", '\u{00B0}'),
    ("plusmn", '\u{00B1}'),
    ("para", '\u{00B6}'),
    ("sect", '\u{00A7}'),
    ("cent", '\u{00A2}'),
    ("pound", '\u{00A3}'),
    ("yen", '\u{00A5}'),
    ("euro", '\u{20AC}'),
    ("larr", '\u{2190}'),
    ("rarr", '\u{2192}'),
    ("uarr", '\u{2191}'),
    ("darr", '\u{2193}'),
];

/// Longest name in the table, bounding the lookahead after `&`.
const MAX_REFERENCE_LEN: usize = 8;

/// [§ 13.2.5.73 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
///
/// "If the number is 0x00, then this is a null-character-reference parse
/// error. Set the character reference code to 0xFFFD."
fn numeric_reference(body: &str) -> Option<char> {
    let code = if let Some(hex) = body.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.parse::<u32>().ok()?
    };
    if code == 0 {
        return Some('\u{FFFD}');
    }
    Some(char::from_u32(code).unwrap_or('\u{FFFD}'))
}

fn lookup(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        return numeric_reference(numeric);
    }
    NAMED_CHARACTER_REFERENCES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|&(_, c)| c)
}

/// Replace every recognized `&name;`, `&#NNN;` and `&#xHH;` in `input`.
#[must_use]
pub fn decode_character_references(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= MAX_REFERENCE_LEN)
            .and_then(|semi| lookup(&after[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
