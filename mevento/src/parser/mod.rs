//! Hand-written parser
//!
//! Recursive descent for statements, precedence climbing for binary
//! operators. The first error aborts the parse; there is no partial AST.

use crate::ast::{
    BinOp, Binding, Direction, Expr, Literal, LogicalOp, MODULE_NAME, Node, Position, Program,
    Property, Span, Spanned, UnOp,
};
use crate::error::{CompileError, Result};
use crate::lexer::{Dictionary, Keyword, Lexer, Token, TokenKind};
use crate::util::{self, STACK_GROW_SIZE, STACK_RED_ZONE, SUGGESTION_THRESHOLD};
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Parse source into a program named `<module>`
pub fn parse(source: &str) -> Result<Program> {
    parse_named(MODULE_NAME, source)
}

/// Parse source into a program with the given name
pub fn parse_named(name: &str, source: &str) -> Result<Program> {
    let mut parser = Parser::new(source)?;
    let body = parser.program()?;
    tracing::trace!(name, statements = body.len(), language = parser.dictionary.tag(), "parsed");
    Ok(Program {
        name: name.to_string(),
        source: source.to_string(),
        body,
    })
}

/// Parser state
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    prev_end: usize,
    /// Loop bodies currently open; `break`/`continue` need at least one
    loop_depth: usize,
    /// Blocks currently open; a `}` may end an expression statement inside one
    block_depth: usize,
    dictionary: Arc<Dictionary>,
}

impl Parser {
    /// Scan the whole source up front.
    pub fn new(source: &str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if eof {
                break;
            }
        }
        Ok(Self {
            tokens,
            index: 0,
            prev_end: 0,
            loop_depth: 0,
            block_depth: 0,
            dictionary: Arc::clone(lexer.dictionary()),
        })
    }

    // -------------------------------------------------------------------------
    // Token navigation
    // -------------------------------------------------------------------------

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.index.min(last)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.kind(), TokenKind::Keyword(k) if *k == kw)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
            self.prev_end = token.span.end;
        }
        token
    }

    fn skip_eols(&mut self) {
        while self.at(&TokenKind::Eol) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.kind(), TokenKind::Eol | TokenKind::Semi) {
            self.advance();
        }
    }

    /// Kind of the first token after any end-of-lines.
    fn peek_past_eols(&self) -> &TokenKind {
        self.tokens[self.index..]
            .iter()
            .find(|t| t.kind != TokenKind::Eol)
            .map_or_else(|| self.kind(), |t| &t.kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.at(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("`{}`", kind)))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Token> {
        if self.at_keyword(kw) {
            Ok(self.advance())
        } else {
            let spelling = self.dictionary.spelling_of(kw).unwrap_or(kw.id()).to_string();
            Err(self.unexpected(&format!("`{}`", spelling)))
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Spanned::new(name, token.span, token.pos))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn start(&self) -> (usize, Position) {
        let token = self.current();
        (token.span.start, token.pos)
    }

    fn node(&self, expr: Expr, start: (usize, Position)) -> Node {
        let end = self.prev_end.max(start.0);
        Spanned::new(expr, Span::new(start.0, end), start.1)
    }

    fn error_at(&self, message: impl Into<String>, token: &Token) -> CompileError {
        CompileError::parser(message, token.span, token.pos)
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let token = self.current();
        if let TokenKind::Invalid(text) = &token.kind {
            return self.error_at(format!("invalid character `{}`", text), token);
        }
        let found = match &token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Eol => "end of line".to_string(),
            kind => format!("{} `{}`", kind.name(), token.text),
        };
        self.error_at(format!("expected {}, found {}", expected, found), token)
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn program(&mut self) -> Result<Vec<Node>> {
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            if self.at(&TokenKind::Eof) {
                return Ok(body);
            }
            body.push(self.statement()?);
        }
    }

    fn statement(&mut self) -> Result<Node> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.statement_inner())
    }

    fn statement_inner(&mut self) -> Result<Node> {
        match self.kind() {
            TokenKind::LBrace => self.block(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_loop(false),
            TokenKind::Keyword(Keyword::For) => self.for_loop(false),
            _ => {
                let start = self.start();
                let expr = self.expression()?;
                let stmt = self.node(Expr::ExprStmt(Box::new(expr)), start);
                self.end_statement(&stmt)?;
                Ok(stmt)
            }
        }
    }

    /// `;`, end of line, end of input, or the `}` closing an enclosing block.
    fn end_statement(&mut self, stmt: &Node) -> Result<()> {
        match self.kind() {
            TokenKind::Semi | TokenKind::Eol => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::RBrace if self.block_depth > 0 => Ok(()),
            _ => {
                let mut err = self.unexpected("end of statement");
                if let CompileError::Parser { message, .. } = &mut err {
                    message.push_str(&self.keyword_hint(stmt));
                }
                Err(err)
            }
        }
    }

    /// "did you mean" hint when a statement starts with a misspelled keyword.
    fn keyword_hint(&self, stmt: &Node) -> String {
        let Expr::ExprStmt(expr) = &stmt.node else {
            return String::new();
        };
        let name = match &expr.node {
            Expr::Ident(name) => name.as_str(),
            Expr::Call { callee, .. } => callee.node.as_str(),
            _ => return String::new(),
        };
        let threshold = if name.chars().count() <= 3 { 1 } else { SUGGESTION_THRESHOLD };
        util::format_suggestion_hint(util::find_similar_name(name, self.dictionary.spellings(), threshold))
    }

    fn block(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect(TokenKind::LBrace)?;
        self.block_depth += 1;
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            match self.kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.unexpected("`}`")),
                _ => stmts.push(self.statement()?),
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.block_depth -= 1;
        Ok(self.node(Expr::Block(stmts), start))
    }

    /// Body of an `if` branch or a loop: a block or a single expression.
    fn branch(&mut self) -> Result<Node> {
        self.skip_eols();
        if self.at(&TokenKind::LBrace) {
            self.block()
        } else {
            self.expression()
        }
    }

    fn loop_body(&mut self) -> Result<Node> {
        self.loop_depth += 1;
        let body = self.branch();
        self.loop_depth -= 1;
        body
    }

    /// Condition with optional surrounding parentheses.
    fn condition(&mut self) -> Result<Node> {
        if self.at(&TokenKind::LParen) {
            let start = self.start();
            self.advance();
            let cond = self.expression()?;
            self.expect(TokenKind::RParen)?;
            Ok(self.node(cond.node, start))
        } else {
            self.expression()
        }
    }

    fn if_expr(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_keyword(Keyword::If)?;
        let cond = self.condition()?;
        let then_branch = self.branch()?;

        let else_branch = if matches!(self.peek_past_eols(), TokenKind::Keyword(Keyword::Else)) {
            self.skip_eols();
            self.advance();
            Some(Box::new(self.branch()?))
        } else {
            None
        };

        Ok(self.node(
            Expr::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            start,
        ))
    }

    fn while_loop(&mut self, retain: bool) -> Result<Node> {
        let start = self.start();
        self.expect_keyword(Keyword::While)?;
        let cond = self.condition()?;
        let body = self.loop_body()?;
        Ok(self.node(
            Expr::While {
                cond: Box::new(cond),
                body: Box::new(body),
                retain,
            },
            start,
        ))
    }

    /// Counting (`for i = a till b`) or iterating (`for x in xs`) loop.
    ///
    /// `in_expression` decides retention for counting loops; iterating loops
    /// always retain.
    fn for_loop(&mut self, in_expression: bool) -> Result<Node> {
        let start = self.start();
        self.expect_keyword(Keyword::For)?;

        if self.at(&TokenKind::LParen) {
            self.advance();
            let first = self.expect_ident()?;
            self.expect(TokenKind::Comma)?;
            let second = self.expect_ident()?;
            self.expect(TokenKind::RParen)?;
            return self.for_of(start, Binding::Pair(first, second));
        }

        let header = self.expression()?;
        match header.node {
            Expr::Assign { target, value } => {
                let target = *target;
                let var = match target.node {
                    Expr::Ident(name) => Spanned::new(name, target.span, target.pos),
                    _ => {
                        return Err(CompileError::parser(
                            "malformed for header: loop variable must be an identifier",
                            target.span,
                            target.pos,
                        ));
                    }
                };
                self.expect_keyword(Keyword::Till)?;
                let bound = self.expression()?;

                let direction = if self.at_keyword(Keyword::Up) {
                    self.advance();
                    Direction::Up
                } else if self.at_keyword(Keyword::Down) {
                    self.advance();
                    Direction::Down
                } else {
                    Direction::default()
                };

                let step = if self.at_keyword(Keyword::With) {
                    self.advance();
                    self.expression()?
                } else {
                    let (offset, pos) = self.start();
                    Spanned::new(Expr::Literal(Literal::Int(1)), Span::new(offset, offset), pos)
                };

                let body = self.loop_body()?;
                Ok(self.node(
                    Expr::For {
                        var,
                        start: value,
                        bound: Box::new(bound),
                        direction,
                        step: Box::new(step),
                        body: Box::new(body),
                        retain: in_expression,
                    },
                    start,
                ))
            }
            Expr::Ident(name) if self.at_keyword(Keyword::In) => {
                let var = Spanned::new(name, header.span, header.pos);
                self.for_of(start, Binding::Single(var))
            }
            _ => Err(CompileError::parser(
                "malformed for header: expected `name = start` or `name in collection`",
                header.span,
                header.pos,
            )),
        }
    }

    fn for_of(&mut self, start: (usize, Position), target: Binding) -> Result<Node> {
        self.expect_keyword(Keyword::In)?;
        let collection = self.expression()?;
        let body = self.loop_body()?;
        Ok(self.node(
            Expr::ForOf {
                target,
                collection: Box::new(collection),
                body: Box::new(body),
                retain: true,
            },
            start,
        ))
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    /// Full expression, including assignment.
    pub fn expression(&mut self) -> Result<Node> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.expression_inner())
    }

    fn expression_inner(&mut self) -> Result<Node> {
        let start = self.start();
        let left = self.logical()?;

        if !self.at(&TokenKind::Assign) {
            return Ok(left);
        }
        if !matches!(left.node, Expr::Ident(_) | Expr::Index { .. }) {
            return Err(CompileError::parser("invalid assignment target", left.span, left.pos));
        }
        self.advance();
        let value = self.expression()?;
        Ok(self.node(
            Expr::Assign {
                target: Box::new(left),
                value: Box::new(value),
            },
            start,
        ))
    }

    /// `&&`, `||` and `??` over climbed binary expressions, left-associative.
    fn logical(&mut self) -> Result<Node> {
        let start = self.start();
        let mut left = self.binary(0)?;
        loop {
            let op = match self.kind() {
                TokenKind::AndAnd => LogicalOp::And,
                TokenKind::OrOr => LogicalOp::Or,
                TokenKind::Nullish => LogicalOp::Nullish,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.binary(0)?;
            left = self.node(
                Expr::Logical {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                start,
            );
        }
    }

    fn binary_op(&self) -> Option<BinOp> {
        Some(match self.kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Ge => BinOp::Ge,
            _ => return None,
        })
    }

    /// Precedence climbing; operators below `min_prec` end the expression.
    fn binary(&mut self, min_prec: u8) -> Result<Node> {
        let start = self.start();
        let mut left = self.unary()?;
        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.binary(prec + 1)?;
            left = self.node(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Node> {
        let op = match self.kind() {
            TokenKind::Bang => UnOp::Not,
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Plus => UnOp::Plus,
            _ => return self.postfix(),
        };
        let start = self.start();
        self.advance();
        let expr = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.unary())?;
        Ok(self.node(
            Expr::Unary {
                op,
                expr: Box::new(expr),
            },
            start,
        ))
    }

    /// Calls and index access, chained.
    fn postfix(&mut self) -> Result<Node> {
        let start = self.start();
        let mut node = self.factor()?;
        loop {
            match self.kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.expression()?;
                    self.expect(TokenKind::RBracket)?;
                    node = self.node(
                        Expr::Index {
                            owner: Box::new(node),
                            key: Box::new(key),
                        },
                        start,
                    );
                }
                TokenKind::LParen => {
                    let callee = match node.node {
                        Expr::Ident(name) => Spanned::new(name, node.span, node.pos),
                        _ => {
                            let paren = self.current().clone();
                            return Err(self.error_at("only a bare identifier can be called", &paren));
                        }
                    };
                    self.advance();
                    let args = self.list(TokenKind::RParen, Self::expression)?;
                    node = self.node(Expr::Call { callee, args }, start);
                }
                _ => return Ok(node),
            }
        }
    }

    /// Comma-separated items up to `close`; trailing commas and line breaks allowed.
    fn list<T>(&mut self, close: TokenKind, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut items = Vec::new();
        loop {
            self.skip_eols();
            if self.at(&close) {
                break;
            }
            items.push(item(self)?);
            self.skip_eols();
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else if !self.at(&close) {
                return Err(self.unexpected(&format!("`,` or `{}`", close)));
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn factor(&mut self) -> Result<Node> {
        let start = self.start();
        let token = self.current().clone();

        let expr = match token.kind {
            TokenKind::Int(n) => {
                self.advance();
                Expr::Literal(Literal::Int(n))
            }
            TokenKind::Float(x) => {
                self.advance();
                Expr::Literal(Literal::Float(x))
            }
            TokenKind::Str(s) => {
                self.advance();
                Expr::Literal(Literal::Str(s))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Expr::Ident(name)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Expr::Literal(Literal::Bool(true))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Expr::Literal(Literal::Bool(false))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Expr::Literal(Literal::Null)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                inner.node
            }
            TokenKind::LBracket => {
                self.advance();
                Expr::Array(self.list(TokenKind::RBracket, Self::expression)?)
            }
            TokenKind::LBrace => {
                self.advance();
                Expr::Object(self.list(TokenKind::RBrace, Self::property)?)
            }
            TokenKind::Keyword(Keyword::If) => return self.if_expr(),
            TokenKind::Keyword(Keyword::While) => return self.while_loop(true),
            TokenKind::Keyword(Keyword::For) => return self.for_loop(true),
            TokenKind::Keyword(kw @ (Keyword::Break | Keyword::Continue)) => {
                if self.loop_depth == 0 {
                    return Err(self.error_at(format!("`{}` outside of a loop", token.text), &token));
                }
                self.advance();
                if kw == Keyword::Break { Expr::Break } else { Expr::Continue }
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let ends_value = matches!(
                    self.kind(),
                    TokenKind::Eol
                        | TokenKind::Semi
                        | TokenKind::Eof
                        | TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::Comma
                        | TokenKind::Keyword(Keyword::Else)
                );
                let value = if ends_value { None } else { Some(Box::new(self.expression()?)) };
                Expr::Return(value)
            }
            TokenKind::Invalid(ref text) => {
                return Err(self.error_at(format!("invalid character `{}`", text), &token));
            }
            _ => return Err(self.unexpected("expression")),
        };

        Ok(self.node(expr, start))
    }

    /// `key: value` where key is a string, `[expr]`, or a bare name.
    fn property(&mut self) -> Result<Property> {
        let token = self.current().clone();
        let key = match &token.kind {
            TokenKind::Str(s) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Str(s.clone())), token.span, token.pos)
            }
            TokenKind::Ident(_) | TokenKind::Keyword(_) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Str(token.text.clone())), token.span, token.pos)
            }
            TokenKind::LBracket => {
                self.advance();
                let key = self.expression()?;
                self.expect(TokenKind::RBracket)?;
                key
            }
            _ => return Err(self.unexpected("property key")),
        };
        self.expect(TokenKind::Colon)?;
        self.skip_eols();
        let value = self.expression()?;
        Ok(Property { key, value })
    }
}
