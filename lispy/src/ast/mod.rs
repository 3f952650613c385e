//! Abstract Syntax Tree definitions
//!
//! The tree mirrors the surface syntax one-to-one: literals keep their raw
//! source text and comments survive as nodes. Turning the tree into runtime
//! values (number conversion, string unescaping, dropping comments) is the
//! reader's job, see [`crate::interp::read_program`].

mod span;

pub use span::*;

use serde::{Deserialize, Serialize};

/// Root node: every top-level form of a source unit, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Spanned<Expr>>,
}

/// A single syntax node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal as written, e.g. `-42`
    Number(String),
    /// Identifier, including operator glyphs such as `+` or `&&`
    Symbol(String),
    /// String literal including its surrounding quotes, escapes not decoded
    Str(String),
    /// `;` line comment, text included
    Comment(String),
    /// `( ... )`
    SExpr(Vec<Spanned<Expr>>),
    /// `{ ... }`
    QExpr(Vec<Spanned<Expr>>),
}
