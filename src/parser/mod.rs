pub mod ast;

use thiserror::Error;

use crate::scanner::Scanner;

use self::ast::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unterminated expansion starting at offset {0}")]
    UnterminatedExpansion(usize),
    #[error("Expected an identifier at offset {0}")]
    InvalidIdentifier(usize),
    #[error("Unexpected character '{0}' in expansion at offset {1}")]
    MalformedModifier(char, usize),
    #[error("Expected an integer at offset {0}")]
    InvalidOffset(usize),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a template string into an [`Expression`] tree.
pub fn parse(input: &str) -> ParseResult<Expression> {
    Parser::new(input).parse()
}

#[inline(always)]
fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

#[inline(always)]
fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
        }
    }

    pub fn parse(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_expression(false)?;
        // The top-level loop only ever stops at end of input.
        debug_assert!(self.scanner.is_eof());
        Ok(expression)
    }

    /// The top-level loop, reused for the nested content of modifiers. When
    /// `in_expansion` is true the loop stops, without consuming it, at the
    /// `}` closing the enclosing expansion.
    fn parse_expression(&mut self, in_expansion: bool) -> ParseResult<Expression> {
        let mut items = Vec::new();
        loop {
            match self.scanner.peek() {
                None => break,
                Some('}') if in_expansion => break,
                Some('\\') => self.parse_escape(in_expansion, &mut items),
                Some('$') => self.parse_dollar(in_expansion, &mut items)?,
                Some(_) => {
                    let text = self.parse_text(in_expansion);
                    items.push(ExpressionItem::Text(text));
                }
            }
        }
        Ok(Expression::new(items))
    }

    /// Accumulates a literal run, ending before the next `\`, `$`, closing
    /// delimiter or end of input.
    fn parse_text(&mut self, in_expansion: bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.scanner.peek() {
            if c == '\\' || c == '$' || (in_expansion && c == '}') {
                break;
            }
            self.scanner.advance();
            text.push(c);
        }
        text
    }

    /// Consumes the remainder of the current scanning context verbatim; `$`
    /// and `\` are no longer special here.
    fn take_literal(&mut self, in_expansion: bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.scanner.peek() {
            if in_expansion && c == '}' {
                break;
            }
            self.scanner.advance();
            text.push(c);
        }
        text
    }

    /// Handles a run of backslashes. An even run is literal; an odd run
    /// escapes a following `$`, turning it and the rest of the scanning
    /// context into literal text.
    fn parse_escape(&mut self, in_expansion: bool, items: &mut Vec<ExpressionItem>) {
        let mut backslashes = 0;
        while self.scanner.peek() == Some('\\') {
            self.scanner.advance();
            backslashes += 1;
        }
        if backslashes % 2 == 0 {
            items.push(ExpressionItem::Text("\\".repeat(backslashes)));
            return;
        }
        if backslashes > 1 {
            items.push(ExpressionItem::Text("\\".repeat(backslashes - 1)));
        }
        if self.scanner.peek() == Some('$') {
            self.scanner.advance();
            items.push(ExpressionItem::Text("$".to_owned()));
            let rest = self.take_literal(in_expansion);
            if !rest.is_empty() {
                items.push(ExpressionItem::Text(rest));
            }
        } else {
            // Lone backslash before ordinary text; no escape applies.
            let mut text = String::from("\\");
            text.push_str(&self.parse_text(in_expansion));
            items.push(ExpressionItem::Text(text));
        }
    }

    /// Handles a `$`: either the start of an expansion, or literal text when
    /// what follows cannot start one.
    fn parse_dollar(
        &mut self,
        in_expansion: bool,
        items: &mut Vec<ExpressionItem>,
    ) -> ParseResult<()> {
        let start = self.scanner.pos();
        self.scanner.advance();
        match self.scanner.peek() {
            Some('{') => {
                self.scanner.advance();
                let expansion = self.parse_braced_expansion(start)?;
                items.push(ExpressionItem::Expansion(expansion));
            }
            Some(c) if is_identifier_start(c) => {
                let identifier = self.parse_identifier()?;
                items.push(ExpressionItem::Expansion(VariableExpansion::new(
                    identifier,
                    vec![],
                )));
            }
            Some('(') => {
                self.scanner.advance();
                items.push(ExpressionItem::Text("$(".to_owned()));
                let rest = self.take_literal(in_expansion);
                if !rest.is_empty() {
                    items.push(ExpressionItem::Text(rest));
                }
            }
            _ => {
                items.push(ExpressionItem::Text("$".to_owned()));
                let rest = self.take_literal(in_expansion);
                if !rest.is_empty() {
                    items.push(ExpressionItem::Text(rest));
                }
            }
        }
        Ok(())
    }

    /// Parses `IDENT ... }` after a `${`. `start` is the offset of the `$`,
    /// used for unterminated-expansion reporting.
    fn parse_braced_expansion(&mut self, start: usize) -> ParseResult<VariableExpansion> {
        let identifier = self.parse_identifier()?;
        let mut modifiers = Vec::new();
        loop {
            // `:-` must win over `:` so that `${X:-1}` is a default value,
            // not a substring with a negative offset.
            if self.scanner.rest().starts_with(":-") {
                self.scanner.advance();
                self.scanner.advance();
                let content = self.parse_expression(true)?;
                modifiers.push(Modifier::EmptyValue {
                    identifier: identifier.clone(),
                    content,
                });
                self.expect_closing_brace(start)?;
                break;
            }
            match self.scanner.peek() {
                None => return Err(ParseError::UnterminatedExpansion(start)),
                Some('}') => {
                    self.scanner.advance();
                    break;
                }
                Some('-') => {
                    self.scanner.advance();
                    let content = self.parse_expression(true)?;
                    modifiers.push(Modifier::UnsetValue {
                        identifier: identifier.clone(),
                        content,
                    });
                    self.expect_closing_brace(start)?;
                    break;
                }
                Some('?') => {
                    self.scanner.advance();
                    let message = self.parse_expression(true)?;
                    modifiers.push(Modifier::Required {
                        identifier: identifier.clone(),
                        message,
                    });
                    self.expect_closing_brace(start)?;
                    break;
                }
                Some(':') => {
                    self.scanner.advance();
                    let offset = self.parse_number()?;
                    let length = if self.scanner.peek() == Some(':') {
                        self.scanner.advance();
                        Some(self.parse_number()?)
                    } else {
                        None
                    };
                    // Not terminal: an unset/empty/required modifier may
                    // still follow.
                    modifiers.push(Modifier::Substring {
                        identifier: identifier.clone(),
                        offset,
                        length,
                    });
                }
                Some(c) => return Err(ParseError::MalformedModifier(c, self.scanner.pos())),
            }
        }
        Ok(VariableExpansion::new(identifier, modifiers))
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.scanner.peek() {
            Some(c) if is_identifier_start(c) => (),
            _ => return Err(ParseError::InvalidIdentifier(self.scanner.pos())),
        }
        let mut identifier = String::new();
        while let Some(c) = self.scanner.peek() {
            if !is_identifier_char(c) {
                break;
            }
            self.scanner.advance();
            identifier.push(c);
        }
        Ok(identifier)
    }

    /// Parses a signed integer: optional spaces or tabs, an optional `-`,
    /// then one or more decimal digits.
    fn parse_number(&mut self) -> ParseResult<i64> {
        while matches!(self.scanner.peek(), Some(' ' | '\t')) {
            self.scanner.advance();
        }
        let negative = if self.scanner.peek() == Some('-') {
            self.scanner.advance();
            true
        } else {
            false
        };
        let start = self.scanner.pos();
        let mut digits = String::new();
        while let Some(c) = self.scanner.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.scanner.advance();
            digits.push(c);
        }
        if digits.is_empty() {
            return Err(ParseError::InvalidOffset(start));
        }
        let number: i64 = digits
            .parse()
            .map_err(|_| ParseError::InvalidOffset(start))?;
        Ok(if negative { -number } else { number })
    }

    fn expect_closing_brace(&mut self, start: usize) -> ParseResult<()> {
        match self.scanner.advance() {
            Some('}') => Ok(()),
            _ => Err(ParseError::UnterminatedExpansion(start)),
        }
    }
}
