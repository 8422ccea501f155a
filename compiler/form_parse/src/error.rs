//! Parse error type.

use form_ir::Span;
use form_lexer::{LexError, TokenKind};

/// A syntax error in a rule condition or action string.
///
/// The span is a byte range into the string that failed to parse.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    /// "expected X, found Y"
    pub fn unexpected(expected: &str, found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            format!("expected {expected}, found {}", found.describe()),
            span,
        )
    }

    #[must_use]
    pub(crate) fn shifted(mut self, offset: u32) -> Self {
        self.span = self.span.shifted(offset);
        self
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(format!("unexpected input `{}`", err.text), err.span)
    }
}
