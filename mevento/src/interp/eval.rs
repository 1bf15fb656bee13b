//! Tree-walking evaluation
//!
//! Every node evaluates to a [`Flow`]: either a value or a control-flow
//! signal travelling outward to the nearest loop (break/continue) or to the
//! program root (return).

use super::{InterpResult, Interpreter, Object, RuntimeError, Value, ops};
use crate::ast::{BinOp, Binding, Direction, Expr, Literal, LogicalOp, Node, Program};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE, SUGGESTION_THRESHOLD, find_similar_name};

/// Result of evaluating a node
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Value),
    Break,
    Continue,
    Return(Value),
}

impl Flow {
    pub fn null() -> Self {
        Flow::Value(Value::Null)
    }
}

/// Unwrap a value or propagate the signal out of the enclosing function.
macro_rules! value {
    ($flow:expr) => {
        match $flow? {
            Flow::Value(value) => value,
            signal => return Ok(signal),
        }
    };
}

impl Interpreter {
    /// Evaluate a whole program against the root scope.
    pub(super) fn eval_program(&mut self, program: &Program) -> InterpResult<Value> {
        let mut last = Value::Null;
        for node in &program.body {
            match self.eval_node(node)? {
                Flow::Value(value) => last = value,
                Flow::Return(value) => return Ok(value),
                Flow::Break | Flow::Continue => {
                    return Err(RuntimeError::internal("loop signal reached the program root")
                        .located(node.span, node.pos));
                }
            }
        }
        Ok(last)
    }

    /// Evaluate a node; errors are tagged with the innermost location.
    pub(super) fn eval_node(&mut self, node: &Node) -> InterpResult<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.eval_inner(node).map_err(|e| e.located(node.span, node.pos))
        })
    }

    fn eval_inner(&mut self, node: &Node) -> InterpResult<Flow> {
        match &node.node {
            Expr::Literal(lit) => Ok(Flow::Value(literal(lit))),

            Expr::Ident(name) => Ok(Flow::Value(self.scopes.get(name).unwrap_or_default())),

            Expr::Block(stmts) => self.with_scope("block", |this| this.eval_block(stmts)),

            Expr::ExprStmt(expr) => self.eval_node(expr),

            Expr::Assign { target, value } => {
                let value = value!(self.eval_node(value));
                match &target.node {
                    Expr::Ident(name) => self.scopes.assign(name, value.clone()),
                    Expr::Index { owner, key } => {
                        let owner = value!(self.eval_node(owner));
                        let key = value!(self.eval_node(key));
                        ops::index_set(&owner, &key, value.clone())
                            .map_err(|e| e.located(target.span, target.pos))?;
                    }
                    _ => return Err(RuntimeError::internal("invalid assignment target")),
                }
                Ok(Flow::Value(value))
            }

            Expr::Call { callee, args } => {
                let Some(function) = self.functions.get(&callee.node) else {
                    let hint = find_similar_name(&callee.node, self.functions.names(), SUGGESTION_THRESHOLD);
                    debug_event!(self, function = %callee.node, suggestion = ?hint, "call to unregistered function");
                    return Ok(Flow::null());
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(value!(self.eval_node(arg)));
                }
                Ok(Flow::Value(function(&values, self)?))
            }

            Expr::Binary { left, op, right } => {
                let left = value!(self.eval_node(left));
                let right = value!(self.eval_node(right));
                ops::binary(*op, &left, &right).map(Flow::Value)
            }

            Expr::Unary { op, expr } => {
                let value = value!(self.eval_node(expr));
                ops::unary(*op, &value).map(Flow::Value)
            }

            Expr::Logical { left, op, right } => {
                let left = value!(self.eval_node(left));
                let result = match op {
                    LogicalOp::Nullish if !left.is_null() => left,
                    LogicalOp::Nullish => value!(self.eval_node(right)),
                    LogicalOp::And if !left.is_truthy() => Value::Bool(false),
                    LogicalOp::Or if left.is_truthy() => Value::Bool(true),
                    LogicalOp::And | LogicalOp::Or => Value::Bool(value!(self.eval_node(right)).is_truthy()),
                };
                Ok(Flow::Value(result))
            }

            Expr::If { cond, then_branch, else_branch } => {
                if value!(self.eval_node(cond)).is_truthy() {
                    self.eval_node(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_node(else_branch)
                } else {
                    Ok(Flow::null())
                }
            }

            Expr::Index { owner, key } => {
                let owner = value!(self.eval_node(owner));
                let key = value!(self.eval_node(key));
                ops::index_get(&owner, &key).map(Flow::Value)
            }

            Expr::Object(props) => {
                let mut object = Object::new();
                for prop in props {
                    let key = value!(self.eval_node(&prop.key));
                    let value = value!(self.eval_node(&prop.value));
                    object.insert(key.to_string(), value);
                }
                Ok(Flow::Value(Value::map(object)))
            }

            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(value!(self.eval_node(item)));
                }
                Ok(Flow::Value(Value::list(values)))
            }

            Expr::While { cond, body, retain } => self.eval_while(cond, body, *retain),

            Expr::For { var, start, bound, direction, step, body, retain } => {
                self.with_scope("for", |this| {
                    let start = value!(this.eval_node(start));
                    this.scopes.assign(&var.node, start);
                    this.eval_counting(&var.node, bound, *direction, step, body, *retain)
                })
            }

            Expr::ForOf { target, collection, body, retain } => {
                let collection = value!(self.eval_node(collection));
                let Some(items) = collection.to_vec() else {
                    return Err(RuntimeError::not_iterable(collection.type_name())
                        .located(node.span, node.pos));
                };
                self.with_scope("for-of", |this| this.eval_for_of(target, items, body, *retain))
            }

            Expr::Break => Ok(Flow::Break),
            Expr::Continue => Ok(Flow::Continue),
            Expr::Return(value) => match value {
                Some(expr) => Ok(Flow::Return(value!(self.eval_node(expr)))),
                None => Ok(Flow::Return(Value::Null)),
            },
        }
    }

    /// Run `f` inside a fresh child scope, popping it on every exit path.
    fn with_scope<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> InterpResult<T>) -> InterpResult<T> {
        let depth = self.scopes.push_scope(name);
        let result = f(self);
        self.scopes.truncate(depth);
        result
    }

    fn eval_block(&mut self, stmts: &[Node]) -> InterpResult<Flow> {
        let mut last = Flow::null();
        for stmt in stmts {
            last = self.eval_node(stmt)?;
            if !matches!(last, Flow::Value(_)) {
                break;
            }
        }
        Ok(last)
    }

    fn eval_while(&mut self, cond: &Node, body: &Node, retain: bool) -> InterpResult<Flow> {
        let mut retained = Vec::new();
        let mut iterations = 0;
        loop {
            if !value!(self.eval_node(cond)).is_truthy() {
                break;
            }
            self.checkpoint(&mut iterations)?;
            match self.eval_node(body)? {
                Flow::Break => break,
                Flow::Continue => continue,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Value(value) => {
                    if retain {
                        retained.push(value);
                    }
                }
            }
        }
        Ok(loop_result(retain, retained))
    }

    fn eval_counting(
        &mut self,
        var: &str,
        bound: &Node,
        direction: Direction,
        step: &Node,
        body: &Node,
        retain: bool,
    ) -> InterpResult<Flow> {
        let mut retained = Vec::new();
        let mut iterations = 0;
        loop {
            let limit = value!(self.eval_node(bound));
            let Some(limit) = limit.as_float() else {
                return Err(RuntimeError::type_error("numeric loop bound", limit.type_name())
                    .located(bound.span, bound.pos));
            };
            let current = self.loop_var(var)?;
            let in_range = match direction {
                Direction::Up => limit >= current,
                Direction::Down => limit <= current,
            };
            if !in_range {
                break;
            }
            self.checkpoint(&mut iterations)?;

            match self.eval_node(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Continue => {}
                Flow::Value(value) => {
                    if retain {
                        retained.push(value);
                    }
                }
            }

            let delta = value!(self.eval_node(step));
            if !delta.is_number() {
                return Err(RuntimeError::type_error("numeric loop step", delta.type_name())
                    .located(step.span, step.pos));
            }
            let current = self.scopes.get(var).unwrap_or_default();
            let next = match direction {
                Direction::Up => ops::binary(BinOp::Add, &current, &delta)?,
                Direction::Down => ops::binary(BinOp::Sub, &current, &delta)?,
            };
            self.scopes.assign(var, next);
        }
        Ok(loop_result(retain, retained))
    }

    fn eval_for_of(&mut self, target: &Binding, items: Vec<Value>, body: &Node, retain: bool) -> InterpResult<Flow> {
        let mut retained = Vec::new();
        let mut iterations = 0;
        for item in items {
            self.checkpoint(&mut iterations)?;
            self.bind(target, item)?;
            match self.eval_node(body)? {
                Flow::Break => break,
                Flow::Continue => continue,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Value(value) => {
                    if retain {
                        retained.push(value);
                    }
                }
            }
        }
        Ok(loop_result(retain, retained))
    }

    fn bind(&mut self, target: &Binding, item: Value) -> InterpResult<()> {
        match target {
            Binding::Single(name) => self.scopes.assign(&name.node, item),
            Binding::Pair(first, second) => {
                let parts = item.to_vec().filter(|parts| parts.len() >= 2);
                let Some(mut parts) = parts else {
                    return Err(RuntimeError::destructure(item.type_name()).located(first.span, first.pos));
                };
                parts.truncate(2);
                let b = parts.pop().unwrap_or_default();
                let a = parts.pop().unwrap_or_default();
                self.scopes.assign(&first.node, a);
                self.scopes.assign(&second.node, b);
            }
        }
        Ok(())
    }

    fn loop_var(&self, var: &str) -> InterpResult<f64> {
        let value = self.scopes.get(var).unwrap_or_default();
        value
            .as_float()
            .ok_or_else(|| RuntimeError::type_error("numeric loop variable", value.type_name()))
    }

    /// Called before every loop body runs.
    fn checkpoint(&self, iterations: &mut u64) -> InterpResult<()> {
        if self.cancel.is_cancelled() {
            return Err(RuntimeError::cancelled());
        }
        *iterations += 1;
        match self.config.max_iterations {
            Some(limit) if *iterations > limit => Err(RuntimeError::iteration_limit(limit)),
            _ => Ok(()),
        }
    }
}

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(x) => Value::Float(*x),
        Literal::Str(s) => Value::from(s.as_str()),
    }
}

fn loop_result(retain: bool, retained: Vec<Value>) -> Flow {
    if retain {
        Flow::Value(Value::list(retained))
    } else {
        Flow::null()
    }
}
