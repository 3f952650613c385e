//! Parser implementation using lalrpop
//!
//! The generated parser tables are wrapped in [`Parser`], which is built once
//! by whoever needs it (the interpreter, the CLI) and passed around by
//! reference.

use crate::ast::{Program, Span};
use crate::error::{ReadError, Result};
use crate::lexer::{tokenize, Token};
use std::path::Path;


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

/// Deepest bracket nesting accepted by [`Parser::new`]
pub const DEFAULT_MAX_NESTING: usize = 10_000;

/// Source text to [`Program`] front end
pub struct Parser {
    program: grammar::ProgramParser,
    max_nesting: usize,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            program: grammar::ProgramParser::new(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Reject input whose brackets nest deeper than `limit`
    pub fn with_max_nesting(mut self, limit: usize) -> Self {
        self.max_nesting = limit;
        self
    }

    /// Parse already tokenized input
    pub fn parse_tokens(&self, tokens: Vec<(Token, Span)>) -> Result<Program> {
        self.check_nesting(&tokens)?;

        let token_iter = tokens
            .into_iter()
            .map(|(tok, span)| (span.start, tok, span.end));

        self.program.parse(token_iter).map_err(|e| {
            let span = match &e {
                lalrpop_util::ParseError::InvalidToken { location } => {
                    Span::new(*location, *location + 1)
                }
                lalrpop_util::ParseError::UnrecognizedEof { location, .. } => {
                    Span::new(*location, *location + 1)
                }
                lalrpop_util::ParseError::UnrecognizedToken { token, .. } => {
                    Span::new(token.0, token.2)
                }
                lalrpop_util::ParseError::ExtraToken { token } => Span::new(token.0, token.2),
                lalrpop_util::ParseError::User { .. } => Span::new(0, 1),
            };
            ReadError::parser(format!("{e}"), span)
        })
    }

    /// Bound the tree depth before any tree is built
    fn check_nesting(&self, tokens: &[(Token, Span)]) -> Result<()> {
        let mut depth = 0usize;
        for (tok, span) in tokens {
            match tok {
                Token::LParen | Token::LBrace => {
                    depth += 1;
                    if depth > self.max_nesting {
                        return Err(ReadError::too_deep(self.max_nesting, *span));
                    }
                }
                Token::RParen | Token::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Ok(())
    }

    /// Tokenize and parse a source string
    pub fn parse(&self, source: &str) -> Result<Program> {
        let tokens = tokenize(source)?;
        self.parse_tokens(tokens)
    }

    /// Read a file and parse its contents, returning both
    pub fn parse_file(&self, path: &Path) -> Result<(String, Program)> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ReadError::io_error(format!("{}: {e}", path.display())))?;
        let program = self.parse(&source)?;
        Ok((source, program))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
