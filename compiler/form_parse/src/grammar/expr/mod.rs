//! Expression parsing.
//!
//! Precedence, lowest to highest:
//!
//! | Level          | Operators                                    |
//! |----------------|----------------------------------------------|
//! | or             | `or`, `||`                                   |
//! | and            | `and`, `&&`                                  |
//! | not            | `not` (prefix)                               |
//! | comparison     | `==` `!=` `<` `<=` `>` `>=` `in` `not in`    |
//! | additive       | `+` `-`                                      |
//! | multiplicative | `*` `/` `%`                                  |
//! | unary          | `-` `!` (prefix)                             |
//! | primary        | literals, paths, calls, lists, `( )`         |
//!
//! - `mod.rs`: entry point (`parse_expr`) and the binary precedence chain
//! - `primary.rs`: literals, paths, calls, list literals, interpolation

mod primary;

use form_ir::{BinaryOp, Expr, ExprId, ExprKind, UnaryOp};
use form_lexer::TokenKind;

use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_or())
    }

    fn alloc_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self
            .arena
            .get_expr(left)
            .span
            .merge(self.arena.get_expr(right).span);
        self.arena
            .alloc_expr(Expr::new(ExprKind::Binary { op, left, right }, span))
    }

    /// Parse `or` / `||`.
    fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::Or) || self.check(&TokenKind::PipePipe) {
            self.advance();
            let right = self.parse_and()?;
            left = self.alloc_binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    /// Parse `and` / `&&`.
    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&TokenKind::And) || self.check(&TokenKind::AmpAmp) {
            self.advance();
            let right = self.parse_not()?;
            left = self.alloc_binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    /// Parse keyword `not`, which binds looser than comparisons:
    /// `not a == b` is `not (a == b)`.
    fn parse_not(&mut self) -> Result<ExprId, ParseError> {
        if self.check(&TokenKind::Not) {
            let start = self.advance().span;
            let operand = ensure_sufficient_stack(|| self.parse_not())?;
            let span = start.merge(self.arena.get_expr(operand).span);
            return Ok(self.arena.alloc_expr(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand,
                },
                span,
            )));
        }
        self.parse_comparison()
    }

    /// Parse comparisons and membership tests (left-associative).
    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;

        while let Some((op, width)) = self.match_comparison_op() {
            for _ in 0..width {
                self.advance();
            }
            let right = self.parse_additive()?;
            left = self.alloc_binary(op, left, right);
        }

        Ok(left)
    }

    /// Comparison operator at the cursor and how many tokens it spans.
    fn match_comparison_op(&self) -> Option<(BinaryOp, usize)> {
        let op = match self.current_kind() {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::In => BinaryOp::In,
            TokenKind::Not if matches!(self.cursor.peek_kind(1), TokenKind::In) => {
                return Some((BinaryOp::NotIn, 2));
            }
            _ => return None,
        };
        Some((op, 1))
    }

    /// Parse `+` and `-`.
    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.alloc_binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse `*`, `/` and `%`.
    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.alloc_binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse prefix `-` and `!`.
    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(self.arena.get_expr(operand).span);
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::Unary { op, operand }, span)))
    }
}
