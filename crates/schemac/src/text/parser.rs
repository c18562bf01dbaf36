//! Expression grammar for text literals.
//!
//! ```text
//! expr  := ['-'] number | ['-'] 'inf' | string | 0x"hex" | 'embed' string
//!        | name ('.' name)* | '[' [expr (',' expr)*] ']'
//!        | '(' [param (',' param)*] ')'
//! param := [name '='] expr
//! ```

use crate::error::Span;
use crate::text::lexer::{Token, TokenKind};

/// A value annotated with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub value: T,
    pub span: Span,
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Integer(u64),
    /// Magnitude of a negated integer literal.
    NegativeInteger(u64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    /// A possibly dotted name, such as `true` or `Foo.bar`.
    Name(String),
    /// `embed "file"`; holds the filename.
    Embed(Located<String>),
    List(Vec<Expression>),
    Tuple(Vec<Param>),
}

/// One element of a tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<Located<String>>,
    pub value: Expression,
}

impl Expression {
    /// Returns true for a parenthesized tuple.
    pub fn is_tuple(&self) -> bool {
        matches!(self.kind, ExprKind::Tuple(_))
    }

    /// Returns the tuple elements, if this is a tuple.
    pub fn as_tuple(&self) -> Option<&[Param]> {
        match &self.kind {
            ExprKind::Tuple(params) => Some(params),
            _ => None,
        }
    }

    /// Short description of the expression kind.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ExprKind::Integer(_) | ExprKind::NegativeInteger(_) => "integer",
            ExprKind::Float(_) => "float",
            ExprKind::String(_) => "string",
            ExprKind::Binary(_) => "binary",
            ExprKind::Name(_) => "name",
            ExprKind::Embed(_) => "embed",
            ExprKind::List(_) => "list",
            ExprKind::Tuple(_) => "tuple",
        }
    }
}

/// Cursor over a token slice.
///
/// Tracks the furthest position any parse attempt reached, so a failed
/// parse can point at the most plausible error location.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    best: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            best: 0,
        }
    }

    /// Index of the next unconsumed token.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Furthest index reached, including failed attempts.
    pub fn best(&self) -> usize {
        self.best
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    /// Consumes and returns the next token.
    pub fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.best = self.best.max(self.pos);
        Some(token)
    }

    /// Consumes the next token if it has the given kind.
    pub fn eat(&mut self, kind: &TokenKind) -> Option<&'a Token> {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.bump()
        } else {
            self.mark_failure();
            None
        }
    }

    /// Records that a parse attempt failed at the current position.
    pub fn mark_failure(&mut self) {
        self.best = self.best.max(self.pos);
    }

    /// Rewinds to an earlier position. `best` is kept.
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }
}

/// Parses one expression starting at the cursor.
///
/// On success the cursor is left after the expression. On failure the
/// cursor's `best` position marks where parsing got stuck.
pub trait ExpressionParser: Send + Sync {
    fn expression(&self, cursor: &mut TokenCursor<'_>) -> Option<Expression>;
}

/// The default [`ExpressionParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralParser;

impl ExpressionParser for LiteralParser {
    fn expression(&self, cursor: &mut TokenCursor<'_>) -> Option<Expression> {
        let start = cursor.position();
        let result = parse_expression(cursor);
        if result.is_none() {
            cursor.mark_failure();
            cursor.reset(start);
        }
        result
    }
}

fn parse_expression(cursor: &mut TokenCursor<'_>) -> Option<Expression> {
    let Some(token) = cursor.peek() else {
        cursor.mark_failure();
        return None;
    };

    match &token.kind {
        TokenKind::Integer(v) => {
            cursor.bump();
            Some(leaf(ExprKind::Integer(*v), token.span))
        }
        TokenKind::Float(v) => {
            cursor.bump();
            Some(leaf(ExprKind::Float(*v), token.span))
        }
        TokenKind::String(s) => {
            cursor.bump();
            Some(leaf(ExprKind::String(s.clone()), token.span))
        }
        TokenKind::Binary(b) => {
            cursor.bump();
            Some(leaf(ExprKind::Binary(b.clone()), token.span))
        }
        TokenKind::Minus => parse_negation(cursor),
        TokenKind::Identifier(name) if name == "embed" => parse_embed(cursor),
        TokenKind::Identifier(_) => parse_name(cursor),
        TokenKind::LBracket => parse_list(cursor),
        TokenKind::LParen => parse_tuple(cursor),
        _ => {
            cursor.mark_failure();
            None
        }
    }
}

fn leaf(kind: ExprKind, span: Span) -> Expression {
    Expression { kind, span }
}

fn parse_negation(cursor: &mut TokenCursor<'_>) -> Option<Expression> {
    let minus = cursor.bump()?;
    let Some(operand) = cursor.peek() else {
        cursor.mark_failure();
        return None;
    };
    let span = minus.span.to(operand.span);

    let kind = match &operand.kind {
        TokenKind::Integer(v) => ExprKind::NegativeInteger(*v),
        TokenKind::Float(v) => ExprKind::Float(-v),
        TokenKind::Identifier(name) if name == "inf" => ExprKind::Float(f64::NEG_INFINITY),
        _ => {
            cursor.mark_failure();
            return None;
        }
    };
    cursor.bump();
    Some(leaf(kind, span))
}

fn parse_embed(cursor: &mut TokenCursor<'_>) -> Option<Expression> {
    // `embed` alone is an ordinary name.
    let Some(Token {
        kind: TokenKind::String(filename),
        span: filename_span,
    }) = cursor.peek_at(1)
    else {
        return parse_name(cursor);
    };

    let keyword = cursor.bump()?;
    cursor.bump();
    Some(leaf(
        ExprKind::Embed(Located {
            value: filename.clone(),
            span: *filename_span,
        }),
        keyword.span.to(*filename_span),
    ))
}

fn parse_name(cursor: &mut TokenCursor<'_>) -> Option<Expression> {
    let first = cursor.bump()?;
    let TokenKind::Identifier(name) = &first.kind else {
        return None;
    };
    let mut name = name.clone();
    let mut span = first.span;

    while cursor.peek().is_some_and(|t| t.kind == TokenKind::Dot) {
        cursor.bump();
        match cursor.peek() {
            Some(Token {
                kind: TokenKind::Identifier(part),
                span: part_span,
            }) => {
                name.push('.');
                name.push_str(part);
                span = span.to(*part_span);
                cursor.bump();
            }
            _ => {
                cursor.mark_failure();
                return None;
            }
        }
    }

    Some(leaf(ExprKind::Name(name), span))
}

fn parse_list(cursor: &mut TokenCursor<'_>) -> Option<Expression> {
    let open = cursor.bump()?;
    let mut items = Vec::new();

    if let Some(close) = cursor.eat(&TokenKind::RBracket) {
        return Some(leaf(ExprKind::List(items), open.span.to(close.span)));
    }

    loop {
        items.push(parse_expression(cursor)?);
        if cursor.eat(&TokenKind::Comma).is_some() {
            continue;
        }
        let close = cursor.eat(&TokenKind::RBracket)?;
        return Some(leaf(ExprKind::List(items), open.span.to(close.span)));
    }
}

fn parse_tuple(cursor: &mut TokenCursor<'_>) -> Option<Expression> {
    let open = cursor.bump()?;
    let mut params = Vec::new();

    if let Some(close) = cursor.eat(&TokenKind::RParen) {
        return Some(leaf(ExprKind::Tuple(params), open.span.to(close.span)));
    }

    loop {
        params.push(parse_param(cursor)?);
        if cursor.eat(&TokenKind::Comma).is_some() {
            continue;
        }
        let close = cursor.eat(&TokenKind::RParen)?;
        return Some(leaf(ExprKind::Tuple(params), open.span.to(close.span)));
    }
}

fn parse_param(cursor: &mut TokenCursor<'_>) -> Option<Param> {
    let named = matches!(
        (cursor.peek(), cursor.peek_at(1)),
        (
            Some(Token { kind: TokenKind::Identifier(_), .. }),
            Some(Token { kind: TokenKind::Equals, .. })
        )
    );

    let name = if named {
        let token = cursor.bump()?;
        cursor.bump();
        match &token.kind {
            TokenKind::Identifier(name) => Some(Located {
                value: name.clone(),
                span: token.span,
            }),
            _ => None,
        }
    } else {
        None
    };

    let value = parse_expression(cursor)?;
    Some(Param { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::lexer::{Lexer, Tokenizer};

    fn parse(input: &str) -> (Option<Expression>, usize, usize, usize) {
        let tokens = Lexer::default().lex(input).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let expr = LiteralParser.expression(&mut cursor);
        (expr, cursor.position(), cursor.best(), tokens.len())
    }

    fn parse_ok(input: &str) -> Expression {
        let (expr, pos, _, len) = parse(input);
        let expr = expr.unwrap();
        assert_eq!(pos, len, "unconsumed tokens in {:?}", input);
        expr
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse_ok("42").kind, ExprKind::Integer(42));
        assert_eq!(parse_ok("-42").kind, ExprKind::NegativeInteger(42));
        assert_eq!(parse_ok("-1.5").kind, ExprKind::Float(-1.5));
        assert_eq!(parse_ok("-inf").kind, ExprKind::Float(f64::NEG_INFINITY));
        assert_eq!(parse_ok("\"s\"").kind, ExprKind::String("s".into()));
        assert_eq!(parse_ok("Foo.bar").kind, ExprKind::Name("Foo.bar".into()));
    }

    #[test]
    fn test_spans() {
        let expr = parse_ok("  -  7");
        assert_eq!(expr.span, Span::new(2, 6));
        let expr = parse_ok("(a = 1)");
        assert_eq!(expr.span, Span::new(0, 7));
    }

    #[test]
    fn test_tuple() {
        let expr = parse_ok("(a = 1, b = [2, 3], 4)");
        let params = expr.as_tuple().unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name.as_ref().unwrap().value, "a");
        assert_eq!(params[0].name.as_ref().unwrap().span, Span::new(1, 2));
        assert!(matches!(&params[1].value.kind, ExprKind::List(items) if items.len() == 2));
        assert!(params[2].name.is_none());
    }

    #[test]
    fn test_empty_aggregates() {
        assert_eq!(parse_ok("()").kind, ExprKind::Tuple(vec![]));
        assert_eq!(parse_ok("[]").kind, ExprKind::List(vec![]));
    }

    #[test]
    fn test_embed() {
        let expr = parse_ok("embed \"data.bin\"");
        match expr.kind {
            ExprKind::Embed(filename) => {
                assert_eq!(filename.value, "data.bin");
                assert_eq!(filename.span, Span::new(6, 16));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parse_ok("embed").kind, ExprKind::Name("embed".into()));
    }

    #[test]
    fn test_trailing_tokens_left_unconsumed() {
        let (expr, pos, _, len) = parse("(a = 1) extra");
        assert!(expr.unwrap().is_tuple());
        assert_eq!(pos, 5);
        assert_eq!(len, 6);
    }

    #[test]
    fn test_failure_reports_best_position() {
        // Stuck at the closing paren where a value was expected
        let (expr, _, best, _) = parse("(a = )");
        assert!(expr.is_none());
        assert_eq!(best, 3);

        // Ran off the end
        let (expr, _, best, len) = parse("(a = 1, b = [1, 2");
        assert!(expr.is_none());
        assert_eq!(best, len);
    }
}
