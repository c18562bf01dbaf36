//! Text literal codec.
//!
//! Converts between values and the `(field = value, ...)` literal syntax used
//! in schema files, test fixtures and debug output.
//!
//! ```rust
//! use std::sync::Arc;
//! use schemac::schema::{Field, Orphanage, StructSchema, Type, Value};
//! use schemac::text::TextCodec;
//!
//! let schema = Arc::new(StructSchema::new(
//!     0xd0a2_4a29_3b76_b8f1,
//!     "Point",
//!     vec![Field::new("x", Type::Int32), Field::new("y", Type::Int32)],
//! ));
//! let ty = Type::Struct(schema);
//!
//! let codec = TextCodec::new();
//! let mut orphanage = Orphanage::new();
//! let orphan = codec.decode_new("(x = 1, y = -2)", &ty, &mut orphanage).unwrap();
//!
//! let value = orphanage.take(orphan).unwrap();
//! assert_eq!(codec.encode(&value), "(x = 1, y = -2)");
//! ```

pub mod decode;
pub mod encode;
pub mod lexer;
pub mod parser;
pub mod translate;

pub use decode::{ErrorLocator, Frontend};
pub use encode::encode;
pub use lexer::{Lexer, Token, TokenKind, Tokenizer};
pub use parser::{
    ExprKind, Expression, ExpressionParser, LiteralParser, Located, Param, TokenCursor,
};
pub use translate::{DenyExternal, LiteralTranslator, Resolver, ValueTranslator};

use crate::error::DecodeError;
use crate::limits::{MAX_INPUT_LEN, MAX_NESTING_DEPTH, MAX_SPAN_OFFSET};
use crate::schema::{Orphan, Orphanage, StructBuilder, Type, Value};

/// Options for [`TextCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Render structs and lists over multiple lines.
    pub pretty_print: bool,
    /// Inputs longer than this are rejected without lexing. Values above
    /// [`MAX_SPAN_OFFSET`] are clamped.
    pub max_input_len: usize,
    /// Deepest allowed bracket nesting.
    pub max_nesting_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            pretty_print: false,
            max_input_len: MAX_INPUT_LEN,
            max_nesting_depth: MAX_NESTING_DEPTH,
        }
    }
}

/// Encodes values to text and decodes text literals into values.
///
/// Decoding accepts literal input only: references to named constants and
/// `embed` expressions are always rejected.
#[derive(Debug)]
pub struct TextCodec {
    options: CodecOptions,
    frontend: Frontend,
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCodec {
    /// Creates a codec with default options (compact output).
    pub fn new() -> Self {
        Self::with_options(CodecOptions::default())
    }

    pub fn with_options(mut options: CodecOptions) -> Self {
        options.max_input_len = options.max_input_len.min(MAX_SPAN_OFFSET);
        Self {
            options,
            frontend: Frontend::new(options.max_nesting_depth),
        }
    }

    /// Replaces the lexer, parser and translator.
    ///
    /// The nesting limit is enforced by the tokenizer, so
    /// [`CodecOptions::max_nesting_depth`] has no effect on a custom frontend.
    /// Build it with [`Frontend::new`] to keep a depth limit.
    pub fn with_frontend(mut self, frontend: Frontend) -> Self {
        self.frontend = frontend;
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn set_pretty_print(&mut self, enabled: bool) {
        self.options.pretty_print = enabled;
    }

    pub fn pretty_print(&self) -> bool {
        self.options.pretty_print
    }

    /// Renders `value`, pretty-printing aggregates if enabled.
    pub fn encode(&self, value: &Value) -> String {
        encode(value, self.options.pretty_print)
    }

    /// Decodes a struct literal `( name = value, ... )` into `builder`.
    ///
    /// Fails with [`DecodeError::NotAStruct`] if the input is some other
    /// kind of expression. On failure the builder is left untouched.
    pub fn decode_into(&self, input: &str, builder: &mut StructBuilder) -> Result<(), DecodeError> {
        decode::decode_into(&self.frontend, input, self.options.max_input_len, builder)
    }

    /// Decodes a literal of type `ty` and adopts the value into `orphanage`.
    pub fn decode_new(
        &self,
        input: &str,
        ty: &Type,
        orphanage: &mut Orphanage,
    ) -> Result<Orphan, DecodeError> {
        decode::decode_new(&self.frontend, input, self.options.max_input_len, ty, orphanage)
    }
}
