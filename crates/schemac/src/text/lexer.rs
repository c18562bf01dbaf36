//! Tokenizer for text literals.
//!
//! Produces a flat token stream. Brackets are not matched here, only counted
//! so that pathological nesting is rejected before the recursive parser runs.

use crate::error::{SourceError, Span};
use crate::limits::MAX_NESTING_DEPTH;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Integer(u64),
    Float(f64),
    String(String),
    /// `0x"..."` binary literal.
    Binary(Vec<u8>),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
    Minus,
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Turns source text into tokens.
///
/// Implementations stop at the first lexical error.
pub trait Tokenizer: Send + Sync {
    fn lex(&self, input: &str) -> Result<Vec<Token>, SourceError>;
}

/// The default [`Tokenizer`].
#[derive(Debug, Clone, Copy)]
pub struct Lexer {
    max_nesting_depth: usize,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(MAX_NESTING_DEPTH)
    }
}

impl Lexer {
    pub fn new(max_nesting_depth: usize) -> Self {
        Self { max_nesting_depth }
    }
}

impl Tokenizer for Lexer {
    fn lex(&self, input: &str) -> Result<Vec<Token>, SourceError> {
        let mut scanner = Scanner {
            src: input.as_bytes(),
            text: input,
            pos: 0,
        };
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        while let Some(token) = scanner.next_token()? {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    if depth > self.max_nesting_depth {
                        return Err(SourceError::new(token.span, "Nesting too deep."));
                    }
                }
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}

struct Scanner<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => self.pos += 1,
                b'#' => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, SourceError> {
        self.skip_whitespace_and_comments();

        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;

        let kind = match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(),
            b'0'..=b'9' => self.lex_number()?,
            b'"' => self.lex_string()?,
            b'(' | b')' | b'[' | b']' | b',' | b'=' | b'-' | b'.' => {
                self.pos += 1;
                match ch {
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b'[' => TokenKind::LBracket,
                    b']' => TokenKind::RBracket,
                    b',' => TokenKind::Comma,
                    b'=' => TokenKind::Equals,
                    b'-' => TokenKind::Minus,
                    _ => TokenKind::Dot,
                }
            }
            _ => {
                let width = self.text[start..].chars().next().map_or(1, char::len_utf8);
                self.pos += width;
                return Err(SourceError::new(self.span_from(start), "Unexpected character."));
            }
        };

        Ok(Some(Token {
            kind,
            span: self.span_from(start),
        }))
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            self.pos += 1;
        }
        TokenKind::Identifier(self.text[start..self.pos].to_string())
    }

    fn lex_number(&mut self) -> Result<TokenKind, SourceError> {
        let start = self.pos;

        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            if self.peek_at(2) == Some(b'"') {
                return self.lex_binary();
            }
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            if digits_start == self.pos {
                return Err(SourceError::new(self.span_from(start), "Invalid hex literal."));
            }
            return self.integer(start, digits_start, 16);
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        if is_float {
            let text = &self.text[start..self.pos];
            return text
                .parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| SourceError::new(self.span_from(start), "Invalid float literal."));
        }

        if self.src[start] == b'0' && self.pos - start > 1 {
            // Leading zero means octal.
            return self.integer(start, start + 1, 8);
        }
        self.integer(start, start, 10)
    }

    fn integer(
        &self,
        start: usize,
        digits_start: usize,
        radix: u32,
    ) -> Result<TokenKind, SourceError> {
        let digits = &self.text[digits_start..self.pos];
        u64::from_str_radix(digits, radix)
            .map(TokenKind::Integer)
            .map_err(|_| {
                let message = if radix == 8 && digits.bytes().any(|c| c >= b'8') {
                    "Invalid octal literal."
                } else {
                    "Integer literal is too large."
                };
                SourceError::new(self.span_from(start), message)
            })
    }

    fn lex_binary(&mut self) -> Result<TokenKind, SourceError> {
        let start = self.pos;
        self.pos += 3; // 0x"

        let mut bytes = Vec::new();
        let mut high: Option<u8> = None;
        loop {
            let Some(ch) = self.peek() else {
                return Err(SourceError::new(
                    self.span_from(start),
                    "Binary literal is not terminated.",
                ));
            };
            self.pos += 1;
            match ch {
                b'"' => break,
                b' ' | b'\t' | b'\r' | b'\n' => {}
                _ => {
                    let Some(nibble) = hex_value(ch) else {
                        return Err(SourceError::new(
                            Span::new(self.pos as u32 - 1, self.pos as u32),
                            "Invalid character in binary literal.",
                        ));
                    };
                    match high.take() {
                        Some(h) => bytes.push(h << 4 | nibble),
                        None => high = Some(nibble),
                    }
                }
            }
        }

        if high.is_some() {
            return Err(SourceError::new(
                self.span_from(start),
                "Binary literal has an odd number of hex digits.",
            ));
        }
        Ok(TokenKind::Binary(bytes))
    }

    fn lex_string(&mut self) -> Result<TokenKind, SourceError> {
        let start = self.pos;
        self.pos += 1;

        let mut bytes = Vec::new();
        loop {
            let Some(ch) = self.peek() else {
                return Err(SourceError::new(
                    self.span_from(start),
                    "String literal is not terminated.",
                ));
            };
            self.pos += 1;
            match ch {
                b'"' => break,
                b'\\' => {
                    let escape_start = self.pos - 1;
                    let Some(esc) = self.peek() else {
                        continue;
                    };
                    self.pos += 1;
                    let byte = match esc {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'0' => 0,
                        b'a' => 0x07,
                        b'b' => 0x08,
                        b'f' => 0x0c,
                        b'v' => 0x0b,
                        b'\\' | b'"' | b'\'' | b'?' => esc,
                        b'x' => {
                            let value = self
                                .peek()
                                .and_then(hex_value)
                                .zip(self.peek_at(1).and_then(hex_value));
                            let Some((h, l)) = value else {
                                return Err(SourceError::new(
                                    self.span_from(escape_start),
                                    "Invalid escape sequence.",
                                ));
                            };
                            self.pos += 2;
                            h << 4 | l
                        }
                        _ => {
                            return Err(SourceError::new(
                                self.span_from(escape_start),
                                "Invalid escape sequence.",
                            ));
                        }
                    };
                    bytes.push(byte);
                }
                _ => bytes.push(ch),
            }
        }

        String::from_utf8(bytes)
            .map(TokenKind::String)
            .map_err(|_| {
                SourceError::new(self.span_from(start), "String literal is not valid UTF-8.")
            })
    }
}

fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::default()
            .lex(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation_and_names() {
        assert_eq!(
            kinds("(a = b.c, [x])"),
            vec![
                TokenKind::LParen,
                TokenKind::Identifier("a".into()),
                TokenKind::Equals,
                TokenKind::Identifier("b".into()),
                TokenKind::Dot,
                TokenKind::Identifier("c".into()),
                TokenKind::Comma,
                TokenKind::LBracket,
                TokenKind::Identifier("x".into()),
                TokenKind::RBracket,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0 42 0x1F 017 1.5 2e3 -7"),
            vec![
                TokenKind::Integer(0),
                TokenKind::Integer(42),
                TokenKind::Integer(31),
                TokenKind::Integer(15),
                TokenKind::Float(1.5),
                TokenKind::Float(2000.0),
                TokenKind::Minus,
                TokenKind::Integer(7),
            ]
        );
    }

    #[test]
    fn test_integer_too_large() {
        let err = Lexer::default().lex("  99999999999999999999").unwrap_err();
        assert_eq!(err.message, "Integer literal is too large.");
        assert_eq!(err.span, Span::new(2, 22));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#""hi\n\"there\"\x41""#),
            vec![TokenKind::String("hi\n\"there\"A".into())]
        );
        assert_eq!(kinds("\"caf\u{e9}\""), vec![TokenKind::String("caf\u{e9}".into())]);
    }

    #[test]
    fn test_string_errors() {
        let err = Lexer::default().lex(r#""abc"#).unwrap_err();
        assert_eq!(err.message, "String literal is not terminated.");
        let err = Lexer::default().lex(r#""a\qb""#).unwrap_err();
        assert_eq!(err.message, "Invalid escape sequence.");
        assert_eq!(err.span, Span::new(2, 4));
    }

    #[test]
    fn test_binary_literal() {
        assert_eq!(kinds(r#"0x"00 ff 1a""#), vec![TokenKind::Binary(vec![0x00, 0xff, 0x1a])]);
        assert_eq!(kinds(r#"0x"""#), vec![TokenKind::Binary(vec![])]);
        let err = Lexer::default().lex(r#"0x"abc""#).unwrap_err();
        assert_eq!(err.message, "Binary literal has an odd number of hex digits.");
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("# leading\n1 # trailing\n2"),
            vec![TokenKind::Integer(1), TokenKind::Integer(2)]
        );
        assert!(kinds("   # only a comment").is_empty());
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::default().lex("(a = 1) ; ").unwrap_err();
        assert_eq!(err.message, "Unexpected character.");
        assert_eq!(err.span, Span::new(8, 9));
    }

    #[test]
    fn test_nesting_limit() {
        let lexer = Lexer::new(3);
        assert!(lexer.lex("[[[1]]]").is_ok());
        let err = lexer.lex("[[[[1]]]]").unwrap_err();
        assert_eq!(err.message, "Nesting too deep.");
        assert_eq!(err.span, Span::new(3, 4));
    }
}
