#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_lex_condition() {
    assert_eq!(
        kinds("region.value == 'cn-beijing'"),
        vec![
            TokenKind::Ident("region".into()),
            TokenKind::Dot,
            TokenKind::Ident("value".into()),
            TokenKind::EqEq,
            TokenKind::Str("cn-beijing".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_set_instruction() {
    assert_eq!(
        kinds("set app.name.required = true"),
        vec![
            TokenKind::Ident("set".into()),
            TokenKind::Ident("app".into()),
            TokenKind::Dot,
            TokenKind::Ident("name".into()),
            TokenKind::Dot,
            TokenKind::Ident("required".into()),
            TokenKind::Eq,
            TokenKind::True,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_numbers() {
    assert_eq!(
        kinds("1 2.5 1.0e3"),
        vec![
            TokenKind::Int(1),
            TokenKind::Float(2.5),
            TokenKind::Float(1000.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_keywords_need_word_boundary() {
    assert_eq!(
        kinds("nullable inner android"),
        vec![
            TokenKind::Ident("nullable".into()),
            TokenKind::Ident("inner".into()),
            TokenKind::Ident("android".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_string_escapes() {
    assert_eq!(
        kinds(r#""a\"b\n" 'it\'s'"#),
        vec![
            TokenKind::Str("a\"b\n".into()),
            TokenKind::Str("it's".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_fstring_keeps_raw_body() {
    let tokens = lex(r#"f"{app.name}-{region}""#).unwrap();
    assert_eq!(
        tokens[0].kind,
        TokenKind::FString("{app.name}-{region}".into())
    );
    assert_eq!(tokens[0].span, Span::new(0, 22));
}

#[test]
fn test_lex_lone_f_is_identifier() {
    assert_eq!(
        kinds("f.region"),
        vec![
            TokenKind::Ident("f".into()),
            TokenKind::Dot,
            TokenKind::Ident("region".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_arrow_and_braces() {
    assert_eq!(
        kinds("-> { a.value: data }"),
        vec![
            TokenKind::Arrow,
            TokenKind::LBrace,
            TokenKind::Ident("a".into()),
            TokenKind::Dot,
            TokenKind::Ident("value".into()),
            TokenKind::Colon,
            TokenKind::Ident("data".into()),
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_error_reports_span() {
    let err = lex("a.value # 1").unwrap_err();
    assert_eq!(err.text, "#");
    assert_eq!(err.span, Span::new(8, 9));
}

#[test]
fn test_lex_unterminated_string_is_error() {
    assert!(lex("'open").is_err());
}

#[test]
fn test_unescape_unknown_kept() {
    assert_eq!(unescape(r"a\qb"), r"a\qb");
    assert_eq!(unescape(r"tab\there"), "tab\there");
}

#[test]
fn test_lex_numeric_path_segments() {
    assert_eq!(
        kinds("items.0.1 + 0.5"),
        vec![
            TokenKind::Ident("items".into()),
            TokenKind::Dot,
            TokenKind::Int(0),
            TokenKind::Dot,
            TokenKind::Int(1),
            TokenKind::Plus,
            TokenKind::Float(0.5),
            TokenKind::Eof,
        ]
    );
}
