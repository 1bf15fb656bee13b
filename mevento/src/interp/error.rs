//! Runtime errors for the interpreter

use crate::ast::{Position, Span};
use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Innermost node being evaluated when the error surfaced
    pub span: Option<Span>,
    pub pos: Option<Position>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operand of the wrong type
    TypeError,
    /// Integer or float division/modulo by zero
    DivisionByZero,
    /// List write past the end
    IndexOutOfBounds,
    /// Indexing a value that is neither list nor map
    NotIndexable,
    /// `for ... in` over a non-list
    NotIterable,
    /// `for (a, b) in` over an element that cannot be split
    Destructure,
    /// Raised by a registered host function
    Host,
    /// Stopped through a cancel token
    Cancelled,
    /// Exceeded the configured loop iteration limit
    IterationLimit,
    /// A string would grow past the allowed size
    SizeLimit,
    /// Control flow escaped to where it cannot be handled
    Internal,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            span: None,
            pos: None,
        }
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("type error: expected {expected}, got {got}"),
        )
    }

    pub fn invalid_operands(op: &str, left: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("type error: cannot apply `{op}` to {left} and {right}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds for length {len}"),
        )
    }

    pub fn not_indexable(type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotIndexable,
            format!("cannot index into a value of type {type_name}"),
        )
    }

    pub fn not_iterable(type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotIterable,
            format!("cannot iterate over a value of type {type_name}"),
        )
    }

    pub fn destructure(type_name: &str) -> Self {
        Self::new(
            ErrorKind::Destructure,
            format!("cannot destructure {type_name} into two bindings"),
        )
    }

    /// Error raised by host code; surfaced to the caller unchanged.
    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Host, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "execution cancelled")
    }

    pub fn iteration_limit(limit: u64) -> Self {
        Self::new(
            ErrorKind::IterationLimit,
            format!("loop iteration limit of {limit} exceeded"),
        )
    }

    pub fn size_limit(limit: usize) -> Self {
        Self::new(
            ErrorKind::SizeLimit,
            format!("string result exceeds the limit of {limit} bytes"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach a location unless one is already set.
    pub fn located(mut self, span: Span, pos: Position) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
            self.pos = Some(pos);
        }
        self
    }

    /// Render the error as an annotated source excerpt.
    pub fn render(&self, filename: &str, source: &str) -> String {
        match self.span {
            Some(span) => crate::error::render_report(filename, source, span, "Runtime", &self.message),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "Runtime error at {pos}: {}", self.message),
            None => write!(f, "Runtime error: {}", self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
