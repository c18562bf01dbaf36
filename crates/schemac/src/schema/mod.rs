//! Schema types and dynamic values.
//!
//! This is the in-memory stand-in for a compiled schema and its message
//! storage: text literals are type-checked against [`Type`] and materialized
//! as [`Value`]s inside a [`StructBuilder`] or an [`Orphanage`].

pub mod types;
pub mod value;

pub use types::{EnumSchema, Field, StructSchema, Type};
pub use value::{EnumValue, Orphan, Orphanage, StructBuilder, StructValue, Value};
