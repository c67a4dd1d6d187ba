// src/parser/ast.rs

//! Recursive-descent parser producing an evaluation tree.
//!
//! Grammar:
//!
//! ```text
//! expr   := term   (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := NUMBER | '(' expr ')'
//! ```
//!
//! Both the parser and the tree walks that follow it recurse once per tree
//! level, so input is capped at [`MAX_OPERATIONS`] operators and
//! [`MAX_NESTING`] levels of parentheses.

use crate::errors::{ParseError, ParseErrorKind};
use crate::parser::lexer::{Token, TokenKind};
use crate::types::Operation;

/// Most binary operations a single expression may contain.
pub const MAX_OPERATIONS: usize = 1_000;

/// Deepest parenthesis nesting accepted.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    Binary {
        op: Operation,
        lhs: Box<Ast>,
        rhs: Box<Ast>,
    },
}

impl Ast {
    /// Number of binary operations in the tree.
    pub fn operation_count(&self) -> usize {
        match self {
            Ast::Number(_) => 0,
            Ast::Binary { lhs, rhs, .. } => 1 + lhs.operation_count() + rhs.operation_count(),
        }
    }
}

/// Parse a token stream. `input_len` is the character length of the source,
/// used as the position of "unexpected end of input" errors.
pub fn parse(tokens: &[Token], input_len: usize) -> Result<Ast, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new(0, ParseErrorKind::Empty));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        input_len,
        operations: 0,
        depth: 0,
    };
    let ast = parser.expr()?;

    if let Some(tok) = parser.peek() {
        let kind = match tok.kind {
            TokenKind::RParen => ParseErrorKind::UnmatchedParen,
            other => ParseErrorKind::UnexpectedToken(other.describe()),
        };
        return Err(ParseError::new(tok.position, kind));
    }

    Ok(ast)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    input_len: usize,
    operations: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Consume the next token if it is an operator of the given precedence.
    fn take_op(&mut self, precedence: u8) -> Result<Option<Operation>, ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                position,
            }) if op.precedence() == precedence => {
                self.operations += 1;
                if self.operations > MAX_OPERATIONS {
                    return Err(ParseError::new(
                        position,
                        ParseErrorKind::TooManyOperations {
                            max: MAX_OPERATIONS,
                        },
                    ));
                }
                self.pos += 1;
                Ok(Some(op))
            }
            _ => Ok(None),
        }
    }

    fn expr(&mut self) -> Result<Ast, ParseError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.take_op(1)? {
            let rhs = self.term()?;
            lhs = Ast::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Ast, ParseError> {
        let mut lhs = self.factor()?;
        while let Some(op) = self.take_op(2)? {
            let rhs = self.factor()?;
            lhs = Ast::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Ast, ParseError> {
        let tok = self
            .next()
            .ok_or_else(|| ParseError::new(self.input_len, ParseErrorKind::UnexpectedEnd))?;

        match tok.kind {
            TokenKind::Number(v) => Ok(Ast::Number(v)),
            TokenKind::LParen => {
                self.depth += 1;
                if self.depth > MAX_NESTING {
                    return Err(ParseError::new(
                        tok.position,
                        ParseErrorKind::NestingTooDeep { max: MAX_NESTING },
                    ));
                }
                let inner = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ParseError::new(
                        other.position,
                        ParseErrorKind::UnexpectedToken(other.kind.describe()),
                    )),
                    None => Err(ParseError::new(tok.position, ParseErrorKind::UnclosedParen)),
                }
            }
            other => Err(ParseError::new(
                tok.position,
                ParseErrorKind::UnexpectedToken(other.describe()),
            )),
        }
    }
}
