//! Identifier and text-representation layer of a schema compiler.
//!
//! This crate provides the two pieces of the compiler that carry strict
//! compatibility contracts:
//!
//! - **Implicit IDs**: stable 64-bit identifiers for declarations that were
//!   not given an explicit `@0x...` ID, derived from the parent's ID with MD5.
//! - **Text codec**: encoding values as `(field = value, ...)` literals and
//!   decoding such literals back into typed values.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use schemac::{derive_child_id, format_id, TextCodec};
//! use schemac::schema::{Field, StructBuilder, StructSchema, Type, Value};
//!
//! let file_id = 0xdbb9_ad1f_14bf_0b36;
//! let person_id = derive_child_id(file_id, "Person");
//! assert_eq!(format_id(person_id), "@0xed5bcc458b243f52");
//!
//! let schema = Arc::new(StructSchema::new(
//!     person_id,
//!     "Person",
//!     vec![Field::new("name", Type::Text), Field::new("age", Type::UInt8)],
//! ));
//!
//! let codec = TextCodec::new();
//! let mut builder = StructBuilder::new(schema);
//! codec.decode_into("(name = \"Alice\", age = 30)", &mut builder).unwrap();
//!
//! let person = builder.build();
//! assert_eq!(person.get("age"), Some(&Value::UInt(30)));
//! ```
//!
//! # Modules
//!
//! - [`id`]: streaming MD5 and ID derivation
//! - [`schema`]: types and dynamic values that literals decode into
//! - [`text`]: lexer, parser, translator, encoder and the [`TextCodec`]
//! - [`error`]: error types
//! - [`limits`]: default decode limits
//!
//! # Errors
//!
//! Decoding stops at the first problem. Errors from the lexer, parser or
//! translator carry a 1-based line number and a column range within that
//! line.

pub mod error;
pub mod id;
pub mod limits;
pub mod schema;
pub mod text;

// Re-export commonly used types at crate root
pub use error::{DecodeError, SourceError, Span};
pub use id::{
    derive_child_id, derive_group_id, derive_method_params_id, format_id, is_valid_id, parse_id,
    StreamingDigest,
};
pub use schema::{Orphan, Orphanage, StructBuilder, Type, Value};
pub use text::{encode, CodecOptions, TextCodec};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
