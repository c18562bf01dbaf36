//! Schema types that text literals are checked against.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// The static type of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Text,
    Data,
    List(Box<Type>),
    Enum(Arc<EnumSchema>),
    Struct(Arc<StructSchema>),
}

impl Type {
    /// Shorthand for `Type::List(Box::new(element))`.
    pub fn list_of(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    /// Returns the inclusive range of a signed integer type.
    pub fn signed_range(&self) -> Option<(i64, i64)> {
        match self {
            Type::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Type::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Type::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Type::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Returns the maximum of an unsigned integer type.
    pub fn unsigned_max(&self) -> Option<u64> {
        match self {
            Type::UInt8 => Some(u8::MAX as u64),
            Type::UInt16 => Some(u16::MAX as u64),
            Type::UInt32 => Some(u32::MAX as u64),
            Type::UInt64 => Some(u64::MAX),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("Void"),
            Type::Bool => f.write_str("Bool"),
            Type::Int8 => f.write_str("Int8"),
            Type::Int16 => f.write_str("Int16"),
            Type::Int32 => f.write_str("Int32"),
            Type::Int64 => f.write_str("Int64"),
            Type::UInt8 => f.write_str("UInt8"),
            Type::UInt16 => f.write_str("UInt16"),
            Type::UInt32 => f.write_str("UInt32"),
            Type::UInt64 => f.write_str("UInt64"),
            Type::Float32 => f.write_str("Float32"),
            Type::Float64 => f.write_str("Float64"),
            Type::Text => f.write_str("Text"),
            Type::Data => f.write_str("Data"),
            Type::List(element) => write!(f, "List({})", element),
            Type::Enum(schema) => f.write_str(&schema.name),
            Type::Struct(schema) => f.write_str(&schema.name),
        }
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A struct declaration.
#[derive(Debug, Clone)]
pub struct StructSchema {
    pub id: u64,
    pub name: String,
    fields: Vec<Field>,
    by_name: FxHashMap<String, usize>,
}

impl StructSchema {
    /// Creates a struct schema. Later duplicates of a field name are shadowed
    /// by the first declaration.
    pub fn new(id: u64, name: impl Into<String>, fields: Vec<Field>) -> Self {
        let mut by_name = FxHashMap::default();
        for (index, field) in fields.iter().enumerate() {
            by_name.entry(field.name.clone()).or_insert(index);
        }
        Self {
            id,
            name: name.into(),
            fields,
            by_name,
        }
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

impl PartialEq for StructSchema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.fields == other.fields
    }
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub id: u64,
    pub name: String,
    pub enumerants: Vec<String>,
}

impl EnumSchema {
    pub fn new<S: Into<String>>(
        id: u64,
        name: impl Into<String>,
        enumerants: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            enumerants: enumerants.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the ordinal of the named enumerant.
    pub fn ordinal(&self, name: &str) -> Option<u16> {
        self.enumerants
            .iter()
            .position(|e| e == name)
            .and_then(|i| u16::try_from(i).ok())
    }

    /// Returns the name of the enumerant at `ordinal`.
    pub fn enumerant(&self, ordinal: u16) -> Option<&str> {
        self.enumerants.get(ordinal as usize).map(String::as_str)
    }
}
