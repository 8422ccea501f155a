//! Token cursor for navigating the token stream.

use std::mem;

use form_ir::Span;
use form_lexer::{Token, TokenKind};

use crate::ParseError;

/// Position in a token slice.
///
/// The slice always ends with `Eof` (guaranteed by `form_lexer::lex`), and
/// `advance` never steps past it, so `current` is always in bounds.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof),
            "token stream must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.tokens.len().saturating_sub(1))]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Kind of the token `n` positions ahead (`Eof` past the end).
    pub fn peek_kind(&self, n: usize) -> &'a TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Discriminant match: `check(&TokenKind::Ident(String::new()))` matches any identifier.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(self.current_kind()) == mem::discriminant(kind)
    }

    /// Whether the current token is the contextual keyword `word`.
    pub fn check_word(&self, word: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(name) if name == word)
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume a token of `kind`, or fail with "expected {what}".
    pub fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(ParseError::unexpected(
                what,
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Consume the contextual keyword `word`.
    pub fn expect_word(&mut self, word: &str) -> Result<Span, ParseError> {
        if self.check_word(word) {
            Ok(self.advance().span)
        } else {
            Err(ParseError::unexpected(
                &format!("`{word}`"),
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Consume an identifier and return its text.
    pub fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            other => Err(ParseError::unexpected(what, other, self.current_span())),
        }
    }
}
