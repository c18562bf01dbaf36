//! Decoding pipeline: lex, parse a single expression, translate.
//!
//! The first error from any stage ends the decode. Positional errors are
//! converted to line/column form by [`ErrorLocator`].

use tracing::debug;

use crate::error::{DecodeError, SourceError};
use crate::limits::{MAX_NESTING_DEPTH, MAX_SPAN_OFFSET};
use crate::schema::{Orphan, Orphanage, StructBuilder, Type};
use crate::text::lexer::{Lexer, Tokenizer};
use crate::text::parser::{ExprKind, Expression, ExpressionParser, LiteralParser, TokenCursor};
use crate::text::translate::{DenyExternal, LiteralTranslator, ValueTranslator};

/// The three collaborators a decode runs through.
pub struct Frontend {
    pub tokenizer: Box<dyn Tokenizer>,
    pub parser: Box<dyn ExpressionParser>,
    pub translator: Box<dyn ValueTranslator>,
}

impl Default for Frontend {
    fn default() -> Self {
        Self::new(MAX_NESTING_DEPTH)
    }
}

impl Frontend {
    /// Built-in lexer, parser and translator.
    pub fn new(max_nesting_depth: usize) -> Self {
        Self {
            tokenizer: Box::new(Lexer::new(max_nesting_depth)),
            parser: Box::new(LiteralParser),
            translator: Box::new(LiteralTranslator),
        }
    }
}

impl std::fmt::Debug for Frontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontend").finish_non_exhaustive()
    }
}

/// Converts byte-offset errors into line/column errors for one input.
#[derive(Debug, Clone, Copy)]
pub struct ErrorLocator<'a> {
    input: &'a str,
}

impl<'a> ErrorLocator<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Locates `error` within the input.
    ///
    /// The line is 1-based. Columns are measured from the newline ending the
    /// previous line (so they start at 1 on later lines), or from offset 0 on
    /// the first line.
    pub fn locate(&self, error: SourceError) -> DecodeError {
        let start = (error.span.start as usize).min(self.input.len());

        let mut line = 1u32;
        let mut line_start = 0u32;
        for (i, byte) in self.input.as_bytes()[..start].iter().enumerate() {
            if *byte == b'\n' {
                line += 1;
                line_start = i as u32;
            }
        }

        DecodeError::Syntax {
            line,
            start_col: error.span.start - line_start,
            end_col: error.span.end.max(error.span.start) - line_start,
            message: error.message,
        }
    }
}

/// Lexes and parses `input` as exactly one expression.
pub(crate) fn lex_and_parse(
    frontend: &Frontend,
    input: &str,
    max_input_len: usize,
) -> Result<Expression, DecodeError> {
    let max_input_len = max_input_len.min(MAX_SPAN_OFFSET);
    if input.len() > max_input_len {
        return Err(failed(DecodeError::InputTooLong {
            len: input.len(),
            max: max_input_len,
        }));
    }
    let locator = ErrorLocator::new(input);

    let tokens = frontend
        .tokenizer
        .lex(input)
        .map_err(|e| failed(locator.locate(e)))?;
    debug!(tokens = tokens.len(), "lexed text input");

    if tokens.is_empty() {
        return Err(failed(DecodeError::EmptyInput));
    }

    let mut cursor = TokenCursor::new(&tokens);
    match frontend.parser.expression(&mut cursor) {
        Some(expression) => {
            if !cursor.is_at_end() {
                return Err(failed(DecodeError::ExtraTokens));
            }
            debug!(kind = expression.kind_name(), "parsed text input");
            Ok(expression)
        }
        None => {
            let best = cursor.best();
            match tokens.get(best) {
                None => Err(failed(DecodeError::PrematureEnd)),
                Some(token) => Err(failed(
                    locator.locate(SourceError::new(token.span, "Parse error")),
                )),
            }
        }
    }
}

/// Decodes a struct literal into `builder`.
///
/// The builder is only updated if the whole decode succeeds.
pub(crate) fn decode_into(
    frontend: &Frontend,
    input: &str,
    max_input_len: usize,
    builder: &mut StructBuilder,
) -> Result<(), DecodeError> {
    let expression = lex_and_parse(frontend, input, max_input_len)?;
    let ExprKind::Tuple(params) = &expression.kind else {
        return Err(failed(DecodeError::NotAStruct));
    };

    let mut scratch = builder.clone();
    frontend
        .translator
        .fill_struct_value(&mut scratch, params, &DenyExternal)
        .map_err(|e| failed(ErrorLocator::new(input).locate(e)))?;
    *builder = scratch;
    Ok(())
}

/// Decodes a value of type `ty` and adopts it into `orphanage`.
pub(crate) fn decode_new(
    frontend: &Frontend,
    input: &str,
    max_input_len: usize,
    ty: &Type,
    orphanage: &mut Orphanage,
) -> Result<Orphan, DecodeError> {
    let expression = lex_and_parse(frontend, input, max_input_len)?;
    let value = frontend
        .translator
        .compile_value(&expression, ty, &DenyExternal)
        .map_err(|e| failed(ErrorLocator::new(input).locate(e)))?;
    Ok(orphanage.adopt(value))
}

fn failed(error: DecodeError) -> DecodeError {
    debug!(%error, "text decode failed");
    error
}
