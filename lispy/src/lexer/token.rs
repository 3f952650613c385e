//! Token definitions

use logos::Logos;
use std::fmt;

/// Lispy token
///
/// Wherever a number can start, a number is read: a symbol never begins with
/// a digit, nor with `-` followed by a digit. So `1-2` is the two numbers
/// `1` and `-2`, and `12abc` is `12` then `abc`.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[regex(r"-?[0-9]+", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[a-zA-Z_+*/\\=<>!&|][a-zA-Z0-9_+\-*/\\=<>!&|]*", |lex| lex.slice().to_string())]
    #[regex(r"-([a-zA-Z_+\-*/\\=<>!&|][a-zA-Z0-9_+\-*/\\=<>!&|]*)?", |lex| lex.slice().to_string())]
    Symbol(String),

    /// Raw literal, quotes and escapes included
    #[regex(r#""(\\.|[^"\\])*""#, |lex| lex.slice().to_string())]
    Str(String),

    #[regex(r";[^\r\n]*", |lex| lex.slice().to_string())]
    Comment(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Number(s) | Token::Symbol(s) | Token::Str(s) | Token::Comment(s) => {
                write!(f, "{s}")
            }
        }
    }
}
