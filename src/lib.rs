//! # flecha
//!
//! Interpreter for a small strict functional language with
//! algebraic data constructors, curried lambdas, `let`, `case`, and two
//! printing primitives.
//!
//! Source text is tokenized by [`lexer`], parsed and desugared into the core
//! AST of [`ast`] by [`parser`], and run by the tree-walking interpreter in
//! [`eval`].

use std::io::Write;

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod location;
pub mod parser;

pub use ast::{CaseBranch, Definition, Expr, Program};
pub use error::{Error, ErrorKind, Result};
pub use eval::{run, Interpreter, Value};
pub use lexer::{Token, Tokenizer};

/// Parse a whole program. Illegal characters are skipped by the tokenizer.
pub fn parse_program_source(source: &str) -> Result<Program> {
    parser::parse(Tokenizer::new(source))
}

/// Parse a single expression spanning the whole source.
pub fn parse_expression_source(source: &str) -> Result<Expr> {
    parser::parse_expression(Tokenizer::new(source))
}

/// Parse and run a program, writing what it prints to `out`. Returns the value
/// bound to `main`.
///
/// ```
/// let mut out = Vec::new();
/// flecha::eval_source("def main = unsafePrintInt (1 + 2 * 3)", &mut out).unwrap();
/// assert_eq!(out, b"7");
/// ```
pub fn eval_source<W: Write>(source: &str, out: W) -> Result<Value> {
    let program = parse_program_source(source)?;
    run(&program, out)
}
