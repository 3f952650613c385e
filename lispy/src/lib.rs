//! Lispy interpreter library
//!
//! A small Lisp with S-expressions, quoted Q-expressions, curried lambdas and
//! errors as first-class values.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::Span;
pub use error::{ReadError, Result};
