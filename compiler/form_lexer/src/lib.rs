//! Lexer for form rule expressions and instructions, built on `logos`.
//!
//! Rule strings are short single-line snippets (`region.value == 'cn-beijing'`,
//! `set app.name.required = true`), so the lexer has no trivia handling:
//! whitespace, including newlines, is skipped.
//!
//! Instruction words (`set`, `clear`, `call_method`, `if`, `then`, ...) are
//! ordinary identifiers here. The parser recognizes them by position, which
//! keeps them usable as field key segments.

use form_ir::Span;
use logos::Logos;

/// Raw token from logos, before literal payloads are cooked.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    // === Keywords ===
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("in")]
    In,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // === Literals ===
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,

    #[regex(r#"f"([^"\\]|\\.)*""#)]
    #[regex(r"f'([^'\\]|\\.)*'")]
    FString,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Token kinds seen by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords
    Null,
    True,
    False,
    And,
    Or,
    Not,
    In,

    // Literals and names
    Ident(String),
    Int(i64),
    Float(f64),
    /// String literal with escapes already processed.
    Str(String),
    /// Interpolated string body, raw (escapes and `{}` not yet processed).
    FString(String),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Arrow,

    // Operators
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,

    Eof,
}

impl TokenKind {
    /// Short description for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Int(n) => format!("number `{n}`"),
            TokenKind::Float(f) => format!("number `{f}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::FString(_) => "interpolated string".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::In => "in",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "->",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::FString(_)
            | TokenKind::Eof => "",
        }
    }
}

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Input the lexer could not turn into a token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unexpected input `{text}` at {span}")]
pub struct LexError {
    pub text: String,
    pub span: Span,
}

/// Lex a rule string into tokens. The last token is always `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let span = Span::from_range(raw.span());
        let slice = raw.slice();
        let Ok(token) = result else {
            return Err(LexError {
                text: slice.to_string(),
                span,
            });
        };
        // `items.0.1` is a path, not `items` `.` `0.1`.
        let after_dot = matches!(
            tokens.last(),
            Some(Token {
                kind: TokenKind::Dot,
                ..
            })
        );
        if after_dot && token_is_float(&token) {
            if let Some(split) = split_index_pair(slice, span) {
                tokens.extend(split);
                continue;
            }
        }
        tokens.push(Token::new(cook(token, slice), span));
    }

    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
    Ok(tokens)
}

fn token_is_float(token: &RawToken) -> bool {
    matches!(token, RawToken::Float(_))
}

/// Split `0.1` into `Int(0) Dot Int(1)` for path index segments.
fn split_index_pair(slice: &str, span: Span) -> Option<[Token; 3]> {
    let (left, right) = slice.split_once('.')?;
    let first = left.parse::<i64>().ok()?;
    let second = right.parse::<i64>().ok()?;
    let dot = span.start + u32::try_from(left.len()).ok()?;
    Some([
        Token::new(TokenKind::Int(first), Span::new(span.start, dot)),
        Token::new(TokenKind::Dot, Span::new(dot, dot + 1)),
        Token::new(TokenKind::Int(second), Span::new(dot + 1, span.end)),
    ])
}

/// Convert a raw token into a `TokenKind`, processing literal payloads.
fn cook(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Null => TokenKind::Null,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::In => TokenKind::In,

        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        // Quotes are one byte each; the regex guarantees both are present.
        RawToken::Str => TokenKind::Str(unescape(&slice[1..slice.len() - 1])),
        RawToken::FString => TokenKind::FString(slice[2..slice.len() - 1].to_string()),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
    }
}

/// Process string escape sequences.
///
/// Unknown escapes are kept verbatim (backslash included).
pub fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('0') => result.push('\0'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests;
