//! Mevento: an embeddable scripting language
//!
//! Sources are tokenized with a per-language keyword dictionary, parsed into
//! an immutable AST (memoized in a process-wide compile cache) and evaluated
//! by a tree-walking interpreter that calls back into host-registered
//! functions.

pub mod ast;
pub mod cache;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod util;

pub use ast::{Program, Span};
pub use config::{Config, ConfigError};
pub use error::{CompileError, Error, Result};
pub use interp::{Bindings, CancelToken, Interpreter, RuntimeError, Value};
