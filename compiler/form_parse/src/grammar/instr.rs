//! Action (instruction) parsing.
//!
//! ```text
//! instruction := "set" target "=" expr
//!              | "clear" target
//!              | "call_method" call ("." segment)* [ "->" binding ]
//!              | "call_method_to_temp" ident "=" call
//!              | ["conditional_action"] conditional
//! conditional := "if" expr "then" instruction
//!                ("elif" expr "then" instruction)*
//!                ["else" instruction]
//! binding     := path | "{" path ":" path ("," path ":" path)* [","] "}"
//! ```
//!
//! Instruction words are contextual identifiers, never reserved.

use form_ir::{
    CallSpec, ConditionalAction, ConditionalBranch, Instruction, Path, ResultBinding, Target,
};
use form_lexer::TokenKind;

use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse one instruction.
    pub(crate) fn parse_instruction(&mut self) -> Result<Instruction, ParseError> {
        ensure_sufficient_stack(|| self.parse_instruction_inner())
    }

    fn parse_instruction_inner(&mut self) -> Result<Instruction, ParseError> {
        let span = self.current_span();
        let TokenKind::Ident(word) = self.current_kind() else {
            return Err(ParseError::unexpected(
                "instruction",
                self.current_kind(),
                span,
            ));
        };

        match word.as_str() {
            "set" => {
                self.advance();
                let target = self.parse_target()?;
                self.cursor.expect(&TokenKind::Eq, "`=`")?;
                let value = self.parse_expr()?;
                Ok(Instruction::Set { target, value })
            }
            "clear" => {
                self.advance();
                let target = self.parse_target()?;
                Ok(Instruction::Clear { target })
            }
            "call_method" => {
                self.advance();
                self.parse_call_method()
            }
            "call_method_to_temp" => {
                self.advance();
                let (temp, _) = self.cursor.expect_ident("temp variable name")?;
                self.cursor.expect(&TokenKind::Eq, "`=`")?;
                let call = self.parse_call_spec()?;
                Ok(Instruction::CallMethodToTemp { temp, call })
            }
            "conditional_action" => {
                self.advance();
                self.parse_conditional()
            }
            "if" => self.parse_conditional(),
            other => Err(ParseError::new(
                format!(
                    "unknown instruction `{other}` (expected set, clear, call_method, \
                     call_method_to_temp, or conditional_action)"
                ),
                span,
            )),
        }
    }

    fn parse_target(&mut self) -> Result<Target, ParseError> {
        let (path, span) = self.parse_path()?;
        Ok(Target { path, span })
    }

    fn parse_call_spec(&mut self) -> Result<CallSpec, ParseError> {
        let (method, start) = self.cursor.expect_ident("method name")?;
        let args = self.parse_call_args()?;
        Ok(CallSpec {
            method,
            args,
            span: start.merge(self.previous_span()),
        })
    }

    /// After `call_method`: the call, an optional result projection, and an
    /// optional `->` binding.
    fn parse_call_method(&mut self) -> Result<Instruction, ParseError> {
        let call = self.parse_call_spec()?;
        let mut projection = Path::new();
        self.parse_path_tail(&mut projection)?;

        if !self.check(&TokenKind::Arrow) {
            if !projection.is_empty() {
                return Err(ParseError::unexpected(
                    "`->` after result path",
                    self.current_kind(),
                    self.current_span(),
                ));
            }
            return Ok(Instruction::CallMethod { call, bind: None });
        }
        self.advance();

        let bind = if self.check(&TokenKind::LBrace) {
            self.parse_multi_binding(&projection)?
        } else {
            let target = self.parse_target()?;
            ResultBinding::Field { projection, target }
        };

        Ok(Instruction::CallMethod {
            call,
            bind: Some(bind),
        })
    }

    /// `{ a.value: data.a, b.options: data.items }`; each source path is
    /// taken relative to `prefix`.
    fn parse_multi_binding(&mut self, prefix: &Path) -> Result<ResultBinding, ParseError> {
        self.cursor.expect(&TokenKind::LBrace, "`{`")?;
        let mut entries = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            let target = self.parse_target()?;
            self.cursor.expect(&TokenKind::Colon, "`:`")?;
            let (source, _) = self.parse_path()?;

            let mut full = prefix.clone();
            for segment in source.segments() {
                full.push(segment.clone());
            }
            entries.push((target, full));

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        self.cursor.expect(&TokenKind::RBrace, "`,` or `}`")?;
        if entries.is_empty() {
            return Err(ParseError::new(
                "empty result binding",
                self.previous_span(),
            ));
        }
        Ok(ResultBinding::Multi(entries))
    }

    /// `if c then a (elif c then a)* [else a]`
    fn parse_conditional(&mut self) -> Result<Instruction, ParseError> {
        self.cursor.expect_word("if")?;
        let mut branches = vec![self.parse_branch()?];

        while self.check_word("elif") {
            self.advance();
            branches.push(self.parse_branch()?);
        }

        let otherwise = if self.check_word("else") {
            self.advance();
            Some(Box::new(self.parse_instruction()?))
        } else {
            None
        };

        Ok(Instruction::Conditional(ConditionalAction {
            branches,
            otherwise,
        }))
    }

    fn parse_branch(&mut self) -> Result<ConditionalBranch, ParseError> {
        let condition = self.parse_expr()?;
        self.cursor.expect_word("then")?;
        let action = Box::new(self.parse_instruction()?);
        Ok(ConditionalBranch { condition, action })
    }
}
