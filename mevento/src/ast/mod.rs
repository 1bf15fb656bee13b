//! Abstract Syntax Tree definitions

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Name given to a program compiled from a bare source string
pub const MODULE_NAME: &str = "<module>";

/// A compiled script: the root node of every AST
///
/// Built once by the parser and never mutated, so it can be shared across
/// threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub source: String,
    pub body: Vec<Node>,
}

impl Program {
    /// Indented, human-readable tree of the program.
    pub fn dump(&self) -> String {
        let mut out = format!("Root {}\n", self.name);
        for node in &self.body {
            dump_node(&mut out, node, 1);
        }
        out
    }

    /// JSON form of the AST.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn line(out: &mut String, depth: usize, pos: Position, text: std::fmt::Arguments<'_>) {
    let _ = writeln!(out, "{:indent$}{} @{}", "", text, pos, indent = depth * 2);
}

fn dump_node(out: &mut String, node: &Node, depth: usize) {
    let pos = node.pos;
    match &node.node {
        Expr::Literal(lit) => line(out, depth, pos, format_args!("Literal {}", lit)),
        Expr::Ident(name) => line(out, depth, pos, format_args!("Identifier {}", name)),
        Expr::Block(stmts) => {
            line(out, depth, pos, format_args!("Block"));
            for stmt in stmts {
                dump_node(out, stmt, depth + 1);
            }
        }
        Expr::ExprStmt(expr) => {
            line(out, depth, pos, format_args!("ExpressionStatement"));
            dump_node(out, expr, depth + 1);
        }
        Expr::Assign { target, value } => {
            line(out, depth, pos, format_args!("Assignment"));
            dump_node(out, target, depth + 1);
            dump_node(out, value, depth + 1);
        }
        Expr::Call { callee, args } => {
            line(out, depth, pos, format_args!("Call {}", callee.node));
            for arg in args {
                dump_node(out, arg, depth + 1);
            }
        }
        Expr::Binary { left, op, right } => {
            line(out, depth, pos, format_args!("BinaryOp {}", op));
            dump_node(out, left, depth + 1);
            dump_node(out, right, depth + 1);
        }
        Expr::Unary { op, expr } => {
            line(out, depth, pos, format_args!("UnaryOp {}", op));
            dump_node(out, expr, depth + 1);
        }
        Expr::Logical { left, op, right } => {
            line(out, depth, pos, format_args!("LogicalOp {}", op));
            dump_node(out, left, depth + 1);
            dump_node(out, right, depth + 1);
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => {
            line(out, depth, pos, format_args!("If"));
            dump_node(out, cond, depth + 1);
            dump_node(out, then_branch, depth + 1);
            if let Some(alt) = else_branch {
                dump_node(out, alt, depth + 1);
            }
        }
        Expr::Index { owner, key } => {
            line(out, depth, pos, format_args!("IndexAccess"));
            dump_node(out, owner, depth + 1);
            dump_node(out, key, depth + 1);
        }
        Expr::Object(props) => {
            line(out, depth, pos, format_args!("ObjectLiteral"));
            for prop in props {
                dump_node(out, &prop.key, depth + 1);
                dump_node(out, &prop.value, depth + 2);
            }
        }
        Expr::Array(items) => {
            line(out, depth, pos, format_args!("ArrayLiteral"));
            for item in items {
                dump_node(out, item, depth + 1);
            }
        }
        Expr::While { cond, body, retain } => {
            line(out, depth, pos, format_args!("WhileLoop retain={}", retain));
            dump_node(out, cond, depth + 1);
            dump_node(out, body, depth + 1);
        }
        Expr::For {
            var,
            start,
            bound,
            direction,
            step,
            body,
            retain,
        } => {
            line(
                out,
                depth,
                pos,
                format_args!("ForLoop {} {} retain={}", var.node, direction, retain),
            );
            dump_node(out, start, depth + 1);
            dump_node(out, bound, depth + 1);
            dump_node(out, step, depth + 1);
            dump_node(out, body, depth + 1);
        }
        Expr::ForOf {
            target,
            collection,
            body,
            retain,
        } => {
            match target {
                Binding::Single(name) => line(
                    out,
                    depth,
                    pos,
                    format_args!("ForOfLoop {} retain={}", name.node, retain),
                ),
                Binding::Pair(a, b) => line(
                    out,
                    depth,
                    pos,
                    format_args!("ForOfLoop ({}, {}) retain={}", a.node, b.node, retain),
                ),
            }
            dump_node(out, collection, depth + 1);
            dump_node(out, body, depth + 1);
        }
        Expr::Break => line(out, depth, pos, format_args!("Break")),
        Expr::Continue => line(out, depth, pos, format_args!("Continue")),
        Expr::Return(value) => {
            line(out, depth, pos, format_args!("Return"));
            if let Some(value) = value {
                dump_node(out, value, depth + 1);
            }
        }
    }
}
