//! Tree-walking interpreter

/// Lifecycle event: `info!` when the instance runs with `debug`, else `debug!`.
macro_rules! debug_event {
    ($interp:expr, $($arg:tt)+) => {
        if $interp.config.debug {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

mod error;
mod eval;
mod interpreter;
pub mod ops;
mod registry;
mod scope;
mod value;

pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Flow;
pub use interpreter::{Bindings, CancelToken, Interpreter};
pub use registry::{FunctionRegistry, HostFn, global_functions};
pub use scope::{ROOT_SCOPE, Scope, ScopeStack};
pub use value::{List, Map, Object, Value};
