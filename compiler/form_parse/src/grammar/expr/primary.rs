//! Primary expressions: literals, paths, calls, lists, interpolation.

use form_ir::{CallArg, Expr, ExprId, ExprKind, InterpPart, Path, Span};
use form_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(super) fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Null => ExprKind::Null,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::Float(f) => ExprKind::Float(*f),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::FString(body) => {
                self.advance();
                return self.parse_interpolated(body, span);
            }
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen, "`)`")?;
                return Ok(inner);
            }
            TokenKind::Ident(_) => return self.parse_path_or_call(),
            other => return Err(ParseError::unexpected("expression", other, span)),
        };
        self.advance();
        Ok(self.arena.alloc_expr(Expr::new(kind, span)))
    }

    /// `[a, b, c]`, trailing comma allowed.
    fn parse_list(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBracket, "`[`")?;
        let mut items = Vec::new();

        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let end = self.cursor.expect(&TokenKind::RBracket, "`,` or `]`")?;
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::List(items), start.merge(end))))
    }

    /// An identifier followed by `(` is a call; anything else is a path.
    fn parse_path_or_call(&mut self) -> Result<ExprId, ParseError> {
        if matches!(self.cursor.peek_kind(1), TokenKind::LParen) {
            let (name, start) = self.cursor.expect_ident("method name")?;
            let args = self.parse_call_args()?;
            let span = start.merge(self.previous_span());
            return Ok(self
                .arena
                .alloc_expr(Expr::new(ExprKind::Call { name, args }, span)));
        }

        let (path, span) = self.parse_path()?;
        Ok(self.arena.alloc_expr(Expr::new(ExprKind::Path(path), span)))
    }

    /// Parse `ident(.segment)*`.
    ///
    /// Segments after the first may be identifiers, list indices, or words
    /// the lexer treats as keywords (`a.in`, `flags.true`).
    pub(crate) fn parse_path(&mut self) -> Result<(Path, Span), ParseError> {
        let (first, start) = self.cursor.expect_ident("field or variable name")?;
        let mut path = Path::new();
        path.push(first);
        self.parse_path_tail(&mut path)?;
        Ok((path, start.merge(self.previous_span())))
    }

    /// Parse `(.segment)*` onto an existing path.
    pub(crate) fn parse_path_tail(&mut self, path: &mut Path) -> Result<(), ParseError> {
        while self.check(&TokenKind::Dot) {
            self.advance();
            let segment = match self.current_kind() {
                TokenKind::Ident(name) => name.clone(),
                TokenKind::Int(n) => n.to_string(),
                TokenKind::Null => "null".to_string(),
                TokenKind::True => "true".to_string(),
                TokenKind::False => "false".to_string(),
                TokenKind::And => "and".to_string(),
                TokenKind::Or => "or".to_string(),
                TokenKind::Not => "not".to_string(),
                TokenKind::In => "in".to_string(),
                other => {
                    return Err(ParseError::unexpected(
                        "name after `.`",
                        other,
                        self.current_span(),
                    ))
                }
            };
            self.advance();
            path.push(segment);
        }
        Ok(())
    }

    /// `( [arg (, arg)*] )` where `arg` is `expr` or `name = expr`.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<CallArg>, ParseError> {
        self.cursor.expect(&TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let name = match (self.current_kind(), self.cursor.peek_kind(1)) {
                (TokenKind::Ident(name), TokenKind::Eq) => {
                    let name = name.clone();
                    self.advance();
                    self.advance();
                    Some(name)
                }
                _ => None,
            };
            let value = self.parse_expr()?;
            args.push(CallArg { name, value });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        self.cursor.expect(&TokenKind::RParen, "`,` or `)`")?;
        Ok(args)
    }

    /// Split an `f"..."` body into text and embedded expressions.
    ///
    /// `span` covers the whole literal including the `f` and quotes. Each
    /// `{expr}` is lexed and parsed on its own, with spans shifted so they
    /// point into the enclosing rule string.
    fn parse_interpolated(&mut self, body: &str, span: Span) -> Result<ExprId, ParseError> {
        let base = span.start + 2;
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = body.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    text.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let open = offset_span(base, i, 1);
                    let end = find_closing_brace(body, i + 1).ok_or_else(|| {
                        ParseError::new("unclosed `{` in interpolated string", open)
                    })?;
                    if !text.is_empty() {
                        parts.push(InterpPart::Text(form_lexer::unescape(&text)));
                        text.clear();
                    }
                    let offset = base.saturating_add(u32::try_from(i + 1).unwrap_or(u32::MAX));
                    let expr = self.parse_embedded(&body[i + 1..end], offset)?;
                    parts.push(InterpPart::Expr(expr));
                    while chars.next_if(|&(j, _)| j <= end).is_some() {}
                }
                '}' => {
                    return Err(ParseError::new(
                        "single `}` in interpolated string (use `}}`)",
                        offset_span(base, i, 1),
                    ));
                }
                _ => text.push(c),
            }
        }

        if !text.is_empty() {
            parts.push(InterpPart::Text(form_lexer::unescape(&text)));
        }

        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::Interpolated(parts), span)))
    }

    /// Parse one `{...}` body. `offset` is where it starts in the rule string.
    fn parse_embedded(&mut self, source: &str, offset: u32) -> Result<ExprId, ParseError> {
        let mut tokens =
            form_lexer::lex(source).map_err(|err| ParseError::from(err).shifted(offset))?;
        for token in &mut tokens {
            token.span = token.span.shifted(offset);
        }

        let mut inner = Parser::new(&tokens, &mut *self.arena);
        let expr = inner.parse_expr()?;
        inner.expect_end()?;
        Ok(expr)
    }
}

/// Index of the `}` closing an interpolation that starts at `from`,
/// skipping braces inside quoted strings.
fn find_closing_brace(body: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in body[from..].char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '}' => return Some(from + i),
            None => {}
        }
    }
    None
}

fn offset_span(base: u32, index: usize, len: u32) -> Span {
    let start = base.saturating_add(u32::try_from(index).unwrap_or(u32::MAX));
    Span::new(start, start.saturating_add(len))
}
