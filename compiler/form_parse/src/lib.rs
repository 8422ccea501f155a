//! Recursive descent parser for form rule strings.
//!
//! Two entry points, one per kind of rule string:
//!
//! - [`parse_expression`]: a condition or value expression
//!   (`region.value == 'cn-beijing' and not app.name.disabled`)
//! - [`parse_instruction`]: one action
//!   (`set app.name.required = true`, `call_method lookup(region) -> code`)
//!
//! Expressions are allocated into a caller-owned `ExprArena` so that every
//! string compiled from one schema shares a single arena.

mod cursor;
mod error;
mod grammar;
mod stack;

pub use cursor::Cursor;
pub use error::ParseError;
pub use stack::ensure_sufficient_stack;

use form_ir::{ExprArena, ExprId, Instruction, Span};
use form_lexer::{Token, TokenKind};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: &'a mut ExprArena,
}

impl<'a> Parser<'a> {
    /// Create a parser over `tokens`, allocating into `arena`.
    pub fn new(tokens: &'a [Token], arena: &'a mut ExprArena) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena,
        }
    }

    // Cursor delegation.

    #[inline]
    fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn check_word(&self, word: &str) -> bool {
        self.cursor.check_word(word)
    }

    #[inline]
    fn advance(&mut self) -> &'a Token {
        self.cursor.advance()
    }

    /// Fail unless every token has been consumed.
    fn expect_end(&self) -> Result<(), ParseError> {
        if self.cursor.is_at_end() {
            Ok(())
        } else {
            Err(ParseError::unexpected(
                "end of input",
                self.current_kind(),
                self.current_span(),
            ))
        }
    }
}

/// Parse a complete expression string.
pub fn parse_expression(source: &str, arena: &mut ExprArena) -> Result<ExprId, ParseError> {
    let tokens = form_lexer::lex(source)?;
    let mut parser = Parser::new(&tokens, arena);
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse a complete action string.
pub fn parse_instruction(
    source: &str,
    arena: &mut ExprArena,
) -> Result<Instruction, ParseError> {
    tracing::trace!(source, "parsing instruction");
    let tokens = form_lexer::lex(source)?;
    let mut parser = Parser::new(&tokens, arena);
    let instruction = parser.parse_instruction()?;
    parser.expect_end()?;
    Ok(instruction)
}

#[cfg(test)]
mod tests;
