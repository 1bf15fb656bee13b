//! Token definitions

use crate::ast::{Position, Span};
use logos::Logos;
use thiserror::Error;

/// Errors raised while scanning a single token
#[derive(Debug, Clone, Default, PartialEq, Error)]
pub enum LexError {
    /// No rule matches; surfaced to the parser as an `Invalid` token
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// Numeric literal payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Raw token as produced by logos, before keyword translation
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t]+")]
pub enum RawToken {
    /// Line and block comments, skipped
    #[token("#", skip_comment)]
    Comment,

    #[token("\n")]
    #[token("\r")]
    #[token("\u{2028}")]
    #[token("\u{2029}")]
    Eol,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"[0-9]", lex_number)]
    Number(Number),

    #[token("\"", |lex| lex_string(lex, '"'))]
    #[token("'", |lex| lex_string(lex, '\''))]
    Str(String),

    // Operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token(">=")]
    Ge,
    #[token("<=")]
    Le,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("??")]
    Nullish,
    #[token("=")]
    Assign,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
}

fn is_eol(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// `# ...` runs to end of line, `#* ... *#` to the closing marker or end of input.
fn skip_comment(lex: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let rest = lex.remainder();
    let len = match rest.strip_prefix('*') {
        Some(body) => body.find("*#").map_or(rest.len(), |end| end + 3),
        None => rest.find(is_eol).unwrap_or(rest.len()),
    };
    lex.bump(len);
    logos::Skip
}

fn lex_number(lex: &mut logos::Lexer<RawToken>) -> Result<Number, LexError> {
    let first = lex.slice().as_bytes()[0];
    let rest = lex.remainder().as_bytes();

    let radix = match (first, rest.first().copied()) {
        (b'0', Some(b'b' | b'B')) => 2,
        (b'0', Some(b'o' | b'O')) => 8,
        (b'0', Some(b'x' | b'X')) => 16,
        _ => 10,
    };

    let fraction_follows =
        |at: usize| rest.get(at) == Some(&b'.') && rest.get(at + 1).is_some_and(u8::is_ascii_digit);

    if radix != 10 {
        let digits = rest[1..]
            .iter()
            .take_while(|b| if radix == 16 { b.is_ascii_hexdigit() } else { b.is_ascii_digit() })
            .count();
        let literal = &lex.remainder()[1..1 + digits];
        let end = 1 + digits;
        if fraction_follows(end) {
            let frac = rest[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
            lex.bump(end + 1 + frac);
            return Err(LexError::InvalidNumber(format!(
                "fractional part on base-{} literal `{}`",
                radix,
                lex.slice()
            )));
        }
        lex.bump(end);
        if digits == 0 {
            return Err(LexError::InvalidNumber(format!("`{}` has no digits", lex.slice())));
        }
        return i64::from_str_radix(literal, radix)
            .map(Number::Int)
            .map_err(|e| LexError::InvalidNumber(format!("`{}`: {}", lex.slice(), e)));
    }

    let mut end = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    let is_float = fraction_follows(end);
    if is_float {
        end += 1 + rest[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
    }
    lex.bump(end);

    let text = lex.slice();
    if is_float {
        text.parse::<f64>()
            .map(Number::Float)
            .map_err(|e| LexError::InvalidNumber(format!("`{}`: {}", text, e)))
    } else {
        text.parse::<i64>()
            .map(Number::Int)
            .map_err(|e| LexError::InvalidNumber(format!("`{}`: {}", text, e)))
    }
}

fn hex_escape(chars: &mut std::str::CharIndices<'_>, width: usize) -> Result<char, LexError> {
    let mut code = 0u32;
    let mut seen = String::new();
    for _ in 0..width {
        match chars.next() {
            Some((_, ch)) if ch.is_ascii_hexdigit() => {
                seen.push(ch);
                code = code * 16 + ch.to_digit(16).unwrap_or(0);
            }
            Some((_, ch)) => {
                seen.push(ch);
                return Err(LexError::InvalidEscape(format!("expected {} hex digits, got `{}`", width, seen)));
            }
            None => return Err(LexError::UnterminatedString),
        }
    }
    char::from_u32(code).ok_or_else(|| LexError::InvalidEscape(format!("`{}` is not a valid code point", seen)))
}

fn lex_string(lex: &mut logos::Lexer<RawToken>, delim: char) -> Result<String, LexError> {
    let rest = lex.remainder();
    let mut value = String::new();
    let mut chars = rest.char_indices();

    while let Some((i, ch)) = chars.next() {
        if ch == delim {
            lex.bump(i + ch.len_utf8());
            return Ok(value);
        }
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            break;
        };
        match esc {
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'u' | 'x' => {
                let width = if esc == 'u' { 4 } else { 2 };
                match hex_escape(&mut chars, width) {
                    Ok(decoded) => value.push(decoded),
                    Err(err) => {
                        lex.bump(chars.offset());
                        return Err(err);
                    }
                }
            }
            // Kept verbatim
            '0' | 'a' | 'v' => {
                value.push('\\');
                value.push(esc);
            }
            other => value.push(other),
        }
    }

    lex.bump(rest.len());
    Err(LexError::UnterminatedString)
}

/// Canonical keyword ids shared by every dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Else,
    True,
    False,
    Null,
    While,
    For,
    With,
    Up,
    Down,
    Till,
    In,
    Break,
    Continue,
    Return,
}

impl Keyword {
    pub const ALL: [Keyword; 15] = [
        Keyword::If,
        Keyword::Else,
        Keyword::True,
        Keyword::False,
        Keyword::Null,
        Keyword::While,
        Keyword::For,
        Keyword::With,
        Keyword::Up,
        Keyword::Down,
        Keyword::Till,
        Keyword::In,
        Keyword::Break,
        Keyword::Continue,
        Keyword::Return,
    ];

    /// Canonical id, which is also the English spelling.
    pub fn id(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::With => "with",
            Keyword::Up => "up",
            Keyword::Down => "down",
            Keyword::Till => "till",
            Keyword::In => "in",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::Return => "return",
        }
    }

    pub fn from_id(id: &str) -> Option<Keyword> {
        Keyword::ALL.into_iter().find(|kw| kw.id() == id)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Token kind seen by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),

    // Operators
    Assign,
    EqEq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    AndAnd,
    OrOr,
    Nullish,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,

    Eol,
    /// Character no rule accepts
    Invalid(String),
    Eof,
}

impl TokenKind {
    /// Short kind name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Int(_) | TokenKind::Float(_) => "number",
            TokenKind::Str(_) => "string",
            TokenKind::Eol => "end of line",
            TokenKind::Invalid(_) => "invalid character",
            TokenKind::Eof => "end of input",
            TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::Comma
            | TokenKind::Semi
            | TokenKind::Colon => "punctuation",
            _ => "operator",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "{}", kw),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Int(n) => write!(f, "{}", n),
            TokenKind::Float(x) => write!(f, "{:?}", x),
            TokenKind::Str(s) => write!(f, "{:?}", s),
            TokenKind::Assign => write!(f, "="),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Ge => write!(f, ">="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Le => write!(f, "<="),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::AndAnd => write!(f, "&&"),
            TokenKind::OrOr => write!(f, "||"),
            TokenKind::Nullish => write!(f, "??"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semi => write!(f, ";"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Eol => write!(f, "\\n"),
            TokenKind::Invalid(s) => write!(f, "{}", s),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A scanned token: kind, source text, byte span and line/column
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub pos: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: &str) -> Vec<Result<RawToken, LexError>> {
        RawToken::lexer(source).collect()
    }

    #[test]
    fn test_raw_operators_maximal_munch() {
        assert_eq!(
            raw("== = >= > ?? &&"),
            vec![
                Ok(RawToken::EqEq),
                Ok(RawToken::Assign),
                Ok(RawToken::Ge),
                Ok(RawToken::Gt),
                Ok(RawToken::Nullish),
                Ok(RawToken::AndAnd),
            ]
        );
    }

    #[test]
    fn test_raw_line_comment_keeps_newline() {
        assert_eq!(
            raw("a # note\nb"),
            vec![Ok(RawToken::Ident), Ok(RawToken::Eol), Ok(RawToken::Ident)]
        );
    }

    #[test]
    fn test_raw_block_comment() {
        assert_eq!(
            raw("a #* one\ntwo *# b"),
            vec![Ok(RawToken::Ident), Ok(RawToken::Ident)]
        );
    }

    #[test]
    fn test_raw_unterminated_block_comment_runs_to_end() {
        assert_eq!(raw("a #* never closed\n b"), vec![Ok(RawToken::Ident)]);
    }

    #[test]
    fn test_raw_eol_variants() {
        assert_eq!(raw("\n\r\u{2028}\u{2029}").len(), 4);
    }

    #[test]
    fn test_raw_decimal_numbers() {
        assert_eq!(raw("42"), vec![Ok(RawToken::Number(Number::Int(42)))]);
        assert_eq!(raw("1.5"), vec![Ok(RawToken::Number(Number::Float(1.5)))]);
    }

    #[test]
    fn test_raw_dot_without_digit_is_not_consumed() {
        let tokens = raw("1.");
        assert_eq!(tokens[0], Ok(RawToken::Number(Number::Int(1))));
        assert_eq!(tokens[1], Err(LexError::UnexpectedCharacter));
    }

    #[test]
    fn test_raw_prefixed_numbers() {
        assert_eq!(raw("0x1F"), vec![Ok(RawToken::Number(Number::Int(31)))]);
        assert_eq!(raw("0B101"), vec![Ok(RawToken::Number(Number::Int(5)))]);
        assert_eq!(raw("0o17"), vec![Ok(RawToken::Number(Number::Int(15)))]);
    }

    #[test]
    fn test_raw_prefixed_number_errors() {
        assert!(matches!(raw("0x")[0], Err(LexError::InvalidNumber(_))));
        assert!(matches!(raw("0b12")[0], Err(LexError::InvalidNumber(_))));
        assert!(matches!(raw("0x1.5")[0], Err(LexError::InvalidNumber(_))));
    }

    #[test]
    fn test_raw_integer_overflow() {
        assert!(matches!(raw("99999999999999999999")[0], Err(LexError::InvalidNumber(_))));
    }

    #[test]
    fn test_raw_string_escapes() {
        assert_eq!(
            raw(r"'Molo\nMala\a\m'"),
            vec![Ok(RawToken::Str("Molo\nMala\\am".to_string()))]
        );
        assert_eq!(raw(r#""say \"hi\"""#), vec![Ok(RawToken::Str("say \"hi\"".to_string()))]);
        assert_eq!(raw(r"'é\x41'"), vec![Ok(RawToken::Str("éA".to_string()))]);
        assert_eq!(raw(r"'\0\v\\'"), vec![Ok(RawToken::Str("\\0\\v\\".to_string()))]);
    }

    #[test]
    fn test_raw_string_bad_escapes() {
        assert!(matches!(raw(r"'\u12g4'")[0], Err(LexError::InvalidEscape(_))));
        assert!(matches!(raw(r"'\ud800'")[0], Err(LexError::InvalidEscape(_))));
    }

    #[test]
    fn test_raw_unterminated_string() {
        assert_eq!(raw("'abc"), vec![Err(LexError::UnterminatedString)]);
        assert_eq!(raw("'abc\\"), vec![Err(LexError::UnterminatedString)]);
    }

    #[test]
    fn test_keyword_ids_roundtrip() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_id(kw.id()), Some(kw));
        }
        assert_eq!(Keyword::from_id("si"), None);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Keyword(Keyword::Till).to_string(), "till");
        assert_eq!(TokenKind::LBrace.to_string(), "{");
        assert_eq!(TokenKind::Eof.to_string(), "EOF");
        assert_eq!(TokenKind::Ident("x".into()).name(), "identifier");
    }
}
