//! Error types for text decoding.

use thiserror::Error;

/// Half-open byte range `[start, end)` into the decoded input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Creates a span from byte offsets.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns the smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A positional error raised by the lexer, parser, translator or resolver.
///
/// Collaborators hand back at most one of these; the decoder converts it into
/// a [`DecodeError::Syntax`] with line and column information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (bytes {}..{})", span.start, span.end)]
pub struct SourceError {
    pub span: Span,
    pub message: String,
}

impl SourceError {
    /// Creates an error covering `span`.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Error while decoding text into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A located error from lexing, parsing or translation.
    ///
    /// `line` is 1-based; columns are byte offsets from the newline that
    /// precedes the error (or from the start of input on the first line).
    #[error("line {line}: {start_col}-{end_col}: {message}")]
    Syntax {
        line: u32,
        start_col: u32,
        end_col: u32,
        message: String,
    },

    #[error("failed to read input")]
    EmptyInput,

    #[error("premature end of input")]
    PrematureEnd,

    #[error("extra tokens in input")]
    ExtraTokens,

    #[error("input does not contain a struct")]
    NotAStruct,

    #[error("input length {len} exceeds maximum {max}")]
    InputTooLong { len: usize, max: usize },
}

impl DecodeError {
    /// Returns the message without position information.
    pub fn message(&self) -> String {
        match self {
            DecodeError::Syntax { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the 1-based line of a located error.
    pub fn line(&self) -> Option<u32> {
        match self {
            DecodeError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}
