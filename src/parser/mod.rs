// src/parser/mod.rs

//! Expression parsing and graph building.
//!
//! - [`lexer`] turns the raw text into tokens.
//! - [`ast`] applies precedence, associativity and parentheses.
//! - [`builder`] flattens the tree into task descriptors, bottom-up.

pub mod ast;
pub mod builder;
pub mod lexer;

pub use ast::{Ast, MAX_NESTING, MAX_OPERATIONS};
pub use builder::{Plan, PlanOperand, TaskSpec};

use crate::config::Timings;
use crate::errors::ParseError;

/// Parse `input` and build its task plan in one go.
pub fn build_plan(input: &str, timings: &Timings) -> Result<Plan, ParseError> {
    let ast = parse_expression(input)?;
    Ok(builder::linearize(&ast, timings))
}

/// Parse `input` into an evaluation tree.
pub fn parse_expression(input: &str) -> Result<Ast, ParseError> {
    let tokens = lexer::tokenize(input)?;
    ast::parse(&tokens, input.chars().count())
}
