//! Scope stack for environment management
//!
//! Each scope owns its own binding table behind a mutex, so the root scope
//! can be handed to the host and read or written while a script runs on
//! another thread. Child scopes are pushed and popped in strict stack order.

use super::Value;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Name of the root scope of every interpreter
pub const ROOT_SCOPE: &str = "root";

/// A single named scope; cloning shares the binding table
#[derive(Debug, Clone)]
pub struct Scope {
    name: Arc<str>,
    bindings: Arc<Mutex<FxHashMap<String, Value>>>,
}

impl Scope {
    pub fn new(name: &str) -> Self {
        Scope {
            name: Arc::from(name),
            bindings: Arc::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.lock().get(name).cloned()
    }

    /// Bind `name` in this scope, replacing any previous binding.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings.lock().insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.bindings.lock().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.lock().contains_key(name)
    }

    /// Copy of the current bindings
    pub fn snapshot(&self) -> FxHashMap<String, Value> {
        self.bindings.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }

    pub fn clear(&self) {
        self.bindings.lock().clear();
    }

    /// True when both handles refer to the same binding table.
    pub fn same_as(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }

    /// Overwrite `name` if bound here; returns whether it was.
    fn replace(&self, name: &str, value: Value) -> Result<(), Value> {
        let mut bindings = self.bindings.lock();
        match bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(value),
        }
    }
}

/// Stack-based scope management for the evaluator
#[derive(Debug, Clone)]
pub struct ScopeStack {
    /// Stack of scopes, index 0 is the root
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Create a new scope stack with a fresh root scope
    pub fn new() -> Self {
        Self::with_root(Scope::new(ROOT_SCOPE))
    }

    /// Create a scope stack over an existing root scope
    pub fn with_root(root: Scope) -> Self {
        ScopeStack { scopes: vec![root] }
    }

    /// Push a new scope onto the stack
    /// Returns the new scope depth (for debugging)
    pub fn push_scope(&mut self, name: &str) -> usize {
        self.scopes.push(Scope::new(name));
        tracing::trace!(scope = name, depth = self.scopes.len(), "push scope");
        self.scopes.len() - 1
    }

    /// Drop every scope above `depth` (at least the root remains).
    pub fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth.max(1));
        tracing::trace!(depth = self.scopes.len(), "truncate scopes");
    }

    /// Current scope depth
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn root(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn current(&self) -> &Scope {
        // the root is never popped, so the stack is never empty
        &self.scopes[self.scopes.len() - 1]
    }

    /// Define a variable in the current (topmost) scope
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.current().set(name, value);
    }

    /// Look up a variable, searching from current scope to root
    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Assignment semantics: update the innermost binding, else define in
    /// the current scope.
    pub fn assign(&mut self, name: &str, value: Value) {
        let mut value = value;
        for scope in self.scopes.iter().rev() {
            match scope.replace(name, value) {
                Ok(()) => return,
                Err(back) => value = back,
            }
        }
        self.define(name, value);
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_define_get() {
        let mut stack = ScopeStack::new();
        stack.define("x", Value::Int(42));
        assert_eq!(stack.get("x"), Some(Value::Int(42)));
        assert_eq!(stack.get("y"), None);
    }

    #[test]
    fn test_scope_push_truncate() {
        let mut stack = ScopeStack::new();
        stack.define("x", Value::Int(1));

        let depth = stack.depth();
        stack.push_scope("block");
        stack.define("y", Value::Int(2));
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
        assert_eq!(stack.get("y"), Some(Value::Int(2)));

        stack.truncate(depth);
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
        assert_eq!(stack.get("y"), None);
    }

    #[test]
    fn test_shadowing() {
        let mut stack = ScopeStack::new();
        stack.define("x", Value::Int(1));
        stack.push_scope("block");
        stack.define("x", Value::Int(2));
        assert_eq!(stack.get("x"), Some(Value::Int(2)));
        stack.truncate(1);
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_assign_updates_innermost_existing() {
        let mut stack = ScopeStack::new();
        stack.define("x", Value::Int(1));
        stack.push_scope("block");
        stack.assign("x", Value::Int(10));
        assert!(stack.current().is_empty());
        stack.truncate(1);
        assert_eq!(stack.get("x"), Some(Value::Int(10)));
    }

    #[test]
    fn test_assign_defines_in_current_when_unbound() {
        let mut stack = ScopeStack::new();
        stack.push_scope("block");
        stack.assign("c", Value::Int(3));
        assert_eq!(stack.get("c"), Some(Value::Int(3)));
        stack.truncate(1);
        assert_eq!(stack.get("c"), None);
    }

    #[test]
    fn test_truncate_keeps_root() {
        let mut stack = ScopeStack::new();
        stack.define("x", Value::Int(1));
        stack.push_scope("a");
        stack.push_scope("b");
        assert_eq!(stack.depth(), 3);
        stack.truncate(0);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_shared_root_handle() {
        let root = Scope::new(ROOT_SCOPE);
        let mut stack = ScopeStack::with_root(root.clone());
        stack.define("x", Value::Int(7));
        assert_eq!(root.get("x"), Some(Value::Int(7)));
        root.set("y", Value::from("host"));
        assert_eq!(stack.get("y"), Some(Value::from("host")));
        assert!(stack.root().same_as(&root));
    }
}
