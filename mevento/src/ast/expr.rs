//! Expression AST nodes

use super::Spanned;
use serde::{Deserialize, Serialize};

/// A located expression node
pub type Node = Spanned<Expr>;

/// Expression
///
/// Statements are expressions too: every node evaluates to a value or a
/// control-flow signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Literal(Literal),

    /// Variable reference
    Ident(String),

    /// `{ stmt; ... }` with its own scope
    Block(Vec<Node>),

    /// Expression used as a statement
    ExprStmt(Box<Node>),

    /// Assignment: target is an `Ident` or an `Index`
    Assign {
        target: Box<Node>,
        value: Box<Node>,
    },

    /// Host function call
    Call {
        callee: Spanned<String>,
        args: Vec<Node>,
    },

    /// Binary operation
    Binary {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },

    /// Unary operation
    Unary {
        op: UnOp,
        expr: Box<Node>,
    },

    /// Short-circuit operation
    Logical {
        left: Box<Node>,
        op: LogicalOp,
        right: Box<Node>,
    },

    /// Conditional: if cond then_branch else else_branch
    If {
        cond: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },

    /// Index access: owner[key]
    Index {
        owner: Box<Node>,
        key: Box<Node>,
    },

    /// Object literal, properties in written order
    Object(Vec<Property>),

    /// Array literal
    Array(Vec<Node>),

    /// while cond body
    While {
        cond: Box<Node>,
        body: Box<Node>,
        retain: bool,
    },

    /// for var = start till bound [up|down] [with step] body
    For {
        var: Spanned<String>,
        start: Box<Node>,
        bound: Box<Node>,
        direction: Direction,
        step: Box<Node>,
        body: Box<Node>,
        retain: bool,
    },

    /// for target in collection body
    ForOf {
        target: Binding,
        collection: Box<Node>,
        body: Box<Node>,
        retain: bool,
    },

    Break,
    Continue,
    Return(Option<Box<Node>>),
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Object literal property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// A bare identifier key is stored as a string literal
    pub key: Node,
    pub value: Node,
}

/// Loop binding of a for-of loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    Single(Spanned<String>),
    /// `(a, b)` binds the first two items of each element
    Pair(Spanned<String>, Spanned<String>),
}

/// Counting direction of a for loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    /// Binding power for precedence climbing. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 10,
            BinOp::Add | BinOp::Sub => 20,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 40,
        }
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Logical not (!)
    Not,
    /// Negation (-)
    Neg,
    /// Numeric identity (+)
    Plus,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Not => write!(f, "!"),
            UnOp::Neg => write!(f, "-"),
            UnOp::Plus => write!(f, "+"),
        }
    }
}

/// Short-circuit operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    /// `??`: right side only when the left is null
    Nullish,
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOp::And => write!(f, "&&"),
            LogicalOp::Or => write!(f, "||"),
            LogicalOp::Nullish => write!(f, "??"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(BinOp::Mul.precedence() > BinOp::Add.precedence());
        assert!(BinOp::Add.precedence() > BinOp::Eq.precedence());
        assert_eq!(BinOp::Mod.precedence(), BinOp::Div.precedence());
        assert_eq!(BinOp::Le.precedence(), 10);
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(BinOp::Ge.to_string(), ">=");
        assert_eq!(UnOp::Not.to_string(), "!");
        assert_eq!(LogicalOp::Nullish.to_string(), "??");
        assert_eq!(Direction::default().to_string(), "up");
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Null.to_string(), "null");
        assert_eq!(Literal::Float(2.0).to_string(), "2.0");
        assert_eq!(Literal::Str("a\nb".into()).to_string(), "\"a\\nb\"");
    }
}
