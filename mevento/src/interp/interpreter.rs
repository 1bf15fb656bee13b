//! Interpreter instances and their host-facing API

use super::registry::{self, FunctionRegistry, HostFn};
use super::scope::{ROOT_SCOPE, Scope, ScopeStack};
use super::{InterpResult, RuntimeError, Value};
use crate::ast::Program;
use crate::cache;
use crate::config::{Config, ConfigError};
use crate::error::Error;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host-supplied variable bindings
pub type Bindings = FxHashMap<String, Value>;

/// Cooperative cancellation flag, checked at every loop iteration boundary
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so the instance can run again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A script interpreter
///
/// Owns a root scope that persists across `execute` calls and a function
/// registry seeded from the process-wide one when the instance is created.
#[derive(Debug)]
pub struct Interpreter {
    pub(super) scopes: ScopeStack,
    pub(super) functions: FunctionRegistry,
    pub(super) config: Config,
    pub(super) cancel: CancelToken,
}

impl Interpreter {
    /// Create a new interpreter with empty root bindings
    pub fn new() -> Self {
        Self::with_root(Scope::new(ROOT_SCOPE))
    }

    /// Create an interpreter that uses `root` as its root scope.
    pub fn with_root(root: Scope) -> Self {
        Interpreter {
            scopes: ScopeStack::with_root(root),
            functions: registry::global_functions(),
            config: Config::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Create an interpreter with `config`, registering its languages.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        config.register_languages()?;
        let mut interp = Self::new();
        interp.config = config;
        Ok(interp)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile `source` and evaluate it against this instance.
    ///
    /// `bindings` are assigned into the scope chain before evaluation starts.
    pub fn execute(&mut self, source: &str, use_cache: bool, bindings: Option<&Bindings>) -> Result<Value, Error> {
        let program = cache::compile(source, use_cache)?;
        if let Some(bindings) = bindings {
            for (name, value) in bindings {
                self.scopes.assign(name, value.clone());
            }
        }
        Ok(self.execute_program(&program)?)
    }

    /// Evaluate `source`, caching according to the instance configuration.
    pub fn eval(&mut self, source: &str) -> Result<Value, Error> {
        self.execute(source, self.config.cache, None)
    }

    /// Evaluate an already compiled program.
    pub fn execute_program(&mut self, program: &Program) -> InterpResult<Value> {
        debug_event!(self, program = %program.name, statements = program.body.len(), "execute");
        let depth = self.scopes.depth();
        let result = self.eval_program(program);
        self.scopes.truncate(depth);
        match &result {
            Ok(value) => debug_event!(self, result = value.type_name(), "execute finished"),
            Err(err) => debug_event!(self, error = %err, "execute failed"),
        }
        result
    }

    /// One-shot evaluation on a fresh instance.
    pub fn run(source: &str, use_cache: bool) -> Result<Value, Error> {
        Interpreter::new().execute(source, use_cache, None)
    }

    /// Register a function visible to this instance only.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value], &mut Interpreter) -> InterpResult<Value> + Send + Sync + 'static,
    {
        debug_event!(self, function = name, "register function");
        self.functions.register(name, function);
    }

    pub fn unregister_function(&mut self, name: &str) -> bool {
        debug_event!(self, function = name, "unregister function");
        self.functions.unregister(name).is_some()
    }

    pub fn resolve_function(&self, name: &str) -> Option<HostFn> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Register a function for every interpreter created from now on.
    pub fn register<F>(name: &str, function: F)
    where
        F: Fn(&[Value], &mut Interpreter) -> InterpResult<Value> + Send + Sync + 'static,
    {
        registry::register_global(name, function);
    }

    pub fn unregister(name: &str) -> bool {
        registry::unregister_global(name)
    }

    /// Snapshot of the root bindings
    pub fn memory(&self) -> Bindings {
        self.scopes.root().snapshot()
    }

    /// Shared handle to the root scope
    pub fn root(&self) -> Scope {
        self.scopes.root().clone()
    }

    /// Look up a variable along the active scope chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes.get(name)
    }

    /// Assign a variable with script assignment semantics.
    pub fn set(&mut self, name: &str, value: Value) {
        self.scopes.assign(name, value);
    }

    /// Merge another instance's functions and root bindings into this one.
    pub fn copy_attributes(&mut self, other: &Interpreter) {
        self.functions.extend(&other.functions);
        let root = self.scopes.root();
        for (name, value) in other.scopes.root().snapshot() {
            root.set(name, value);
        }
    }

    /// New instance with copies of this one's functions and root bindings.
    pub fn fork(&self) -> Self {
        let mut fork = Interpreter::new();
        fork.config = self.config.clone();
        fork.copy_attributes(self);
        fork
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Raise a host error from inside a registered function.
    pub fn error(message: impl Into<String>) -> RuntimeError {
        RuntimeError::host(message)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Forks the instance: functions and root bindings are copied, not linked.
impl Clone for Interpreter {
    fn clone(&self) -> Self {
        self.fork()
    }
}
