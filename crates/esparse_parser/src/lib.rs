//! esparse_parser: Recursive descent grammar engine with pluggable AST
//! dialects.
//!
//! The engine parses JavaScript over the esparse lexer's state record and
//! dispatches every node-construction and validation step through a dialect
//! hook table. Two dialects ship here: [`Base`], which emits the base node
//! shapes, and [`Estree`], which emits the standardized ESTree schema.
//!
//! ```no_run
//! use esparse_parser::{parse_estree, Options};
//!
//! let file = parse_estree(Options::default(), "var answer = 42;").unwrap();
//! assert_eq!(file.program.body.len(), 1);
//! ```

mod estree;
mod hooks;
mod parser;
mod precedence;

pub use estree::Estree;
pub use hooks::{
    Base, ClassMethodShape, Dialect, LiteralToken, MethodParts, ObjectMemberShape,
};
pub use parser::{NodeStart, Parser};

pub use esparse_ast as ast;
pub use esparse_diagnostics::{ParseResult, SyntaxError};
pub use esparse_lexer::Options;

use esparse_ast::File;

/// Parse with the base dialect.
pub fn parse(options: Options, input: &str) -> ParseResult<File> {
    Parser::<Base>::new(options, input).parse()
}

/// Parse with the ESTree dialect.
pub fn parse_estree(options: Options, input: &str) -> ParseResult<File> {
    Parser::<Estree>::new(options, input).parse()
}
