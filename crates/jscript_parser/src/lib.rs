//! jscript_parser: Recursive descent parser for jscript.
//!
//! Pulls tokens from the scanner on demand and builds the arena AST.
//! Syntax errors are recovered from at statement granularity so one pass
//! can report several of them; excessive nesting aborts the parse.

mod error;
mod parser;
mod precedence;
mod utilities;

pub use error::ParseError;
pub use parser::{Parser, DEFAULT_MAX_NESTING_DEPTH};

use jscript_ast::Ast;

/// Parse a complete program in permissive mode with default limits.
pub fn parse(source_text: &str) -> Result<Ast, ParseError> {
    Parser::new(source_text).parse()
}
