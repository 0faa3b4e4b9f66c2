//! Front-end for the TypeScript subset: tokens, lexer, AST and parser.
//!
//! # Example
//!
//! ```ignore
//! use javelin_engine::parser::Parser;
//!
//! let module = Parser::new("export function add(a: number, b = 1) { return a + b; }")
//!     .expect("lexes")
//!     .parse()
//!     .expect("parses");
//! assert_eq!(module.statements.len(), 1);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};
