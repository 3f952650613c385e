//! Front-end error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ReadError>;

/// Failure to turn source text into an AST
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl ReadError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    /// Brackets opened deeper than the parser accepts
    pub fn too_deep(limit: usize, span: Span) -> Self {
        Self::parser(format!("nesting deeper than {limit} levels"), span)
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } | Self::Parser { message, .. } | Self::Io { message } => {
                message
            }
        }
    }
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Report error with ariadne on stderr
pub fn report_error(filename: &str, source: &str, error: &ReadError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        ReadError::Lexer { .. } => "Lexer",
        ReadError::Parser { .. } => "Parser",
        ReadError::Io { .. } => "IO",
    };

    let printed = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .eprint((filename, Source::from(source)))
    };

    if printed.is_err() {
        eprintln!("{error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_error_display() {
        let err = ReadError::lexer("unexpected character: \"@\"", Span::new(3, 4));
        assert_eq!(err.to_string(), "Lexer error at 3..4: unexpected character: \"@\"");
        assert_eq!(err.span(), Some(Span::new(3, 4)));
    }

    #[test]
    fn test_io_error_has_no_span() {
        let err = ReadError::io_error("No such file or directory");
        assert!(err.span().is_none());
        assert_eq!(err.message(), "No such file or directory");
        assert_eq!(err.to_string(), "IO error: No such file or directory");
    }

    #[test]
    fn test_from_std_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.lspy");
        let err: ReadError = io.into();
        assert!(matches!(err, ReadError::Io { .. }));
        assert!(err.message().contains("missing.lspy"));
    }
}
