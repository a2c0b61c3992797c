//! Integration tests for the HTML tokenizer.

use koala_html::{Attribute, HTMLTokenizer, Token};

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input.to_string());
    tokenizer.run();
    tokenizer.into_tokens()
}

fn start(name: &str, attributes: Vec<Attribute>) -> Token {
    Token::StartTag {
        name: name.to_string(),
        self_closing: false,
        attributes,
    }
}

fn end(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

#[test]
fn test_simple_element() {
    assert_eq!(
        tokenize("<p>hi</p>"),
        vec![start("p", vec![]), text("hi"), end("p")]
    );
}

#[test]
fn test_attributes_in_order() {
    assert_eq!(
        tokenize(r#"<a href="/x" title='t'>"#),
        vec![start(
            "a",
            vec![
                Attribute::new("href".to_string(), "/x".to_string()),
                Attribute::new("title".to_string(), "t".to_string()),
            ]
        )]
    );
}

#[test]
fn test_quoted_gt_inside_attribute() {
    let tokens = tokenize(r#"<a title="1 > 0">x</a>"#);
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1], text("x"));
}

#[test]
fn test_end_tag_with_whitespace() {
    assert_eq!(tokenize("</div >"), vec![end("div")]);
}

#[test]
fn test_comment_between_text_merges() {
    assert_eq!(tokenize("a <!-- x --> b"), vec![text("a b")]);
}

#[test]
fn test_unterminated_comment_swallows_rest() {
    assert_eq!(tokenize("<p><!-- never closed <b>"), vec![start("p", vec![])]);
}

#[test]
fn test_style_raw_text() {
    assert_eq!(
        tokenize("<style>a{}</style>"),
        vec![start("style", vec![]), text("a{}"), end("style")]
    );
}

#[test]
fn test_unclosed_raw_text_runs_to_eof() {
    assert_eq!(
        tokenize("<script>x < y"),
        vec![start("script", vec![]), text("x < y"), end("script")]
    );
}

#[test]
fn test_self_closing_svg_not_skipped_as_subtree() {
    let tokens = tokenize("<svg/><p>x</p>");
    assert_eq!(tokens[0].tag_name(), Some("svg"));
    assert_eq!(tokens[1], start("p", vec![]));
}
