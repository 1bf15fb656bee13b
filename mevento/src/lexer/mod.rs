//! Lexer implementation using logos
//!
//! Raw tokens come from logos; identifiers are then translated through the
//! keyword dictionary chosen by an optional leading `<tag>` directive.

pub mod keywords;
mod token;

pub use keywords::Dictionary;
pub use token::{Keyword, LexError, Number, RawToken, Token, TokenKind};

use crate::ast::{LineIndex, Span};
use crate::error::{CompileError, Result};
use logos::Logos;
use std::sync::Arc;

/// Streaming lexer over one source text
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, RawToken>,
    dictionary: Arc<Dictionary>,
    lines: LineIndex,
}

impl<'src> Lexer<'src> {
    /// Create a lexer, consuming a leading `<tag>` directive if present.
    pub fn new(source: &'src str) -> Self {
        let (inner, dictionary) = match probe_directive(source) {
            Some((inner, tag)) => {
                let dictionary = keywords::resolve(tag);
                tracing::trace!(tag, language = dictionary.tag(), "language directive");
                (inner, dictionary)
            }
            None => (RawToken::lexer(source), keywords::default_language()),
        };

        Self {
            source,
            inner,
            dictionary,
            lines: LineIndex::new(source),
        }
    }

    /// The dictionary in effect for this source.
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Next token; returns `Eof` forever once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let Some(result) = self.inner.next() else {
                let end = self.source.len();
                return Ok(self.token(TokenKind::Eof, Span::new(end, end)));
            };

            let span: Span = self.inner.span().into();
            let kind = match result {
                Ok(RawToken::Comment) => continue,
                Ok(RawToken::Eol) => TokenKind::Eol,
                Ok(RawToken::Ident) => {
                    let text = self.inner.slice();
                    match self.dictionary.lookup(text) {
                        Some(kw) => TokenKind::Keyword(kw),
                        None => TokenKind::Ident(text.to_string()),
                    }
                }
                Ok(RawToken::Number(Number::Int(n))) => TokenKind::Int(n),
                Ok(RawToken::Number(Number::Float(x))) => TokenKind::Float(x),
                Ok(RawToken::Str(s)) => TokenKind::Str(s),
                Ok(RawToken::EqEq) => TokenKind::EqEq,
                Ok(RawToken::NotEq) => TokenKind::NotEq,
                Ok(RawToken::Ge) => TokenKind::Ge,
                Ok(RawToken::Le) => TokenKind::Le,
                Ok(RawToken::AndAnd) => TokenKind::AndAnd,
                Ok(RawToken::OrOr) => TokenKind::OrOr,
                Ok(RawToken::Nullish) => TokenKind::Nullish,
                Ok(RawToken::Assign) => TokenKind::Assign,
                Ok(RawToken::Gt) => TokenKind::Gt,
                Ok(RawToken::Lt) => TokenKind::Lt,
                Ok(RawToken::Bang) => TokenKind::Bang,
                Ok(RawToken::Plus) => TokenKind::Plus,
                Ok(RawToken::Minus) => TokenKind::Minus,
                Ok(RawToken::Star) => TokenKind::Star,
                Ok(RawToken::Slash) => TokenKind::Slash,
                Ok(RawToken::Percent) => TokenKind::Percent,
                Ok(RawToken::LParen) => TokenKind::LParen,
                Ok(RawToken::RParen) => TokenKind::RParen,
                Ok(RawToken::LBrace) => TokenKind::LBrace,
                Ok(RawToken::RBrace) => TokenKind::RBrace,
                Ok(RawToken::LBracket) => TokenKind::LBracket,
                Ok(RawToken::RBracket) => TokenKind::RBracket,
                Ok(RawToken::Comma) => TokenKind::Comma,
                Ok(RawToken::Semi) => TokenKind::Semi,
                Ok(RawToken::Colon) => TokenKind::Colon,
                Err(LexError::UnexpectedCharacter) => TokenKind::Invalid(self.inner.slice().to_string()),
                Err(err) => {
                    let pos = self.lines.position(self.source, span.start);
                    return Err(CompileError::lexer(err.to_string(), span, pos));
                }
            };
            return Ok(self.token(kind, span));
        }
    }

    fn token(&self, kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            text: self.source.get(span.start..span.end).unwrap_or_default().to_string(),
            span,
            pos: self.lines.position(self.source, span.start),
        }
    }
}

/// `<` identifier `>` at the start of input, with the lexer positioned after it.
fn probe_directive(source: &str) -> Option<(logos::Lexer<'_, RawToken>, &str)> {
    let mut lexer = RawToken::lexer(source);
    if !matches!(lexer.next(), Some(Ok(RawToken::Lt))) {
        return None;
    }
    if !matches!(lexer.next(), Some(Ok(RawToken::Ident))) {
        return None;
    }
    let tag = lexer.slice();
    if !matches!(lexer.next(), Some(Ok(RawToken::Gt))) {
        return None;
    }
    Some((lexer, tag))
}

/// Tokenize a whole source; the last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
