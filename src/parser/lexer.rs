// src/parser/lexer.rs

//! Tokenizer for arithmetic expressions.

use crate::errors::{ParseError, ParseErrorKind};
use crate::types::Operation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Op(Operation),
    LParen,
    RParen,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(v) => v.to_string(),
            TokenKind::Op(op) => op.symbol().to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
        }
    }
}

/// A token plus the character offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Split `input` into tokens. Whitespace is skipped; `×` and `÷` are
/// accepted as spellings of `*` and `/`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let kind = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokenKind::Number(parse_number(&text, start)?),
                    position: start,
                });
                continue;
            }
            '+' => TokenKind::Op(Operation::Add),
            '-' | '−' => TokenKind::Op(Operation::Subtract),
            '*' | '×' => TokenKind::Op(Operation::Multiply),
            '/' | '÷' => TokenKind::Op(Operation::Divide),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            other => {
                return Err(ParseError::new(i, ParseErrorKind::UnexpectedChar(other)));
            }
        };
        tokens.push(Token { kind, position: i });
        i += 1;
    }

    Ok(tokens)
}

fn parse_number(text: &str, position: usize) -> Result<f64, ParseError> {
    let invalid = || ParseError::new(position, ParseErrorKind::InvalidNumber(text.to_string()));

    if text.matches('.').count() > 1 || !text.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}
