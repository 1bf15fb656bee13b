//! Error types and reporting

use crate::ast::{Position, Span};
use crate::config::ConfigError;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias for compilation
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compile error: the source is rejected before evaluation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Lexer error at {pos}: {message}")]
    Lexer {
        message: String,
        span: Span,
        pos: Position,
    },

    #[error("Parser error at {pos}: {message}")]
    Parser {
        message: String,
        span: Span,
        pos: Position,
    },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span, pos: Position) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
            pos,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span, pos: Position) -> Self {
        Self::Parser {
            message: message.into(),
            span,
            pos,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => *span,
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            Self::Lexer { pos, .. } | Self::Parser { pos, .. } => *pos,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } | Self::Parser { message, .. } => message,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Lexer",
            Self::Parser { .. } => "Parser",
        }
    }

    /// Render the error as an annotated source excerpt.
    pub fn render(&self, filename: &str, source: &str) -> String {
        render_report(filename, source, self.span(), self.kind(), self.message())
    }
}

/// Build an ariadne report for a span and return it as plain text.
pub(crate) fn render_report(filename: &str, source: &str, span: Span, kind: &str, message: &str) -> String {
    use ariadne::{Config, Label, Report, ReportKind, Source};

    let range = span.start.min(source.len())..span.end.min(source.len());
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, (filename, range.clone()))
        .with_config(Config::default().with_color(false))
        .with_message(format!("{kind} error"))
        .with_label(Label::new((filename, range)).with_message(message))
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{kind} error: {message}"),
    }
}

/// Any failure of `Interpreter::execute` and friends
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Annotated source excerpt when the error carries a location.
    pub fn render(&self, filename: &str, source: &str) -> String {
        match self {
            Error::Compile(err) => err.render(filename, source),
            Error::Runtime(err) => err.render(filename, source),
            Error::Config(err) => err.to_string(),
        }
    }

    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            Error::Runtime(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_compile(&self) -> Option<&CompileError> {
        match self {
            Error::Compile(err) => Some(err),
            _ => None,
        }
    }
}
