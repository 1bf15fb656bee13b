//! Function registries
//!
//! Host functions live in a process-wide registry and in a per-interpreter
//! copy seeded from it at construction. Scripts only see the instance copy.

use super::{InterpResult, Interpreter, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Host callable: receives the evaluated arguments and the calling interpreter
pub type HostFn = Arc<dyn Fn(&[Value], &mut Interpreter) -> InterpResult<Value> + Send + Sync>;

static GLOBAL_FUNCTIONS: LazyLock<RwLock<FunctionRegistry>> =
    LazyLock::new(|| RwLock::new(FunctionRegistry::new()));

/// Name → host function table
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, HostFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value], &mut Interpreter) -> InterpResult<Value> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(function));
    }

    pub fn insert(&mut self, name: impl Into<String>, function: HostFn) {
        self.functions.insert(name.into(), function);
    }

    pub fn unregister(&mut self, name: &str) -> Option<HostFn> {
        self.functions.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<HostFn> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Copy every entry of `other` into this registry.
    pub fn extend(&mut self, other: &FunctionRegistry) {
        for (name, function) in &other.functions {
            self.functions.insert(name.clone(), Arc::clone(function));
        }
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Register a function in the process-wide registry.
///
/// Interpreters created afterwards see it; existing ones keep their copy.
pub fn register_global<F>(name: &str, function: F)
where
    F: Fn(&[Value], &mut Interpreter) -> InterpResult<Value> + Send + Sync + 'static,
{
    tracing::debug!(function = name, "register global function");
    GLOBAL_FUNCTIONS.write().register(name, function);
}

pub fn unregister_global(name: &str) -> bool {
    tracing::debug!(function = name, "unregister global function");
    GLOBAL_FUNCTIONS.write().unregister(name).is_some()
}

/// Copy of the process-wide registry
pub fn global_functions() -> FunctionRegistry {
    GLOBAL_FUNCTIONS.read().clone()
}
