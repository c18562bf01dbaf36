//! Dynamically typed values and the storage decoded values are written into.

use std::sync::Arc;

use crate::schema::types::{EnumSchema, Field, StructSchema};

/// A value of some schema type.
///
/// Integers keep only their signedness; the declared width lives in the
/// [`Type`](crate::schema::Type) the value was checked against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Data(Vec<u8>),
    List(Vec<Value>),
    Enum(EnumValue),
    Struct(StructValue),
}

impl Value {
    /// Returns true for struct and list values.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Value::Struct(_) | Value::List(_))
    }
}

/// An enumerant of a particular enum.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub schema: Arc<EnumSchema>,
    pub ordinal: u16,
}

impl EnumValue {
    /// Returns the enumerant name, if the ordinal is known to the schema.
    pub fn name(&self) -> Option<&str> {
        self.schema.enumerant(self.ordinal)
    }
}

/// A struct instance. Each field is either set or absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    schema: Arc<StructSchema>,
    slots: Vec<Option<Value>>,
}

impl StructValue {
    /// Creates a struct with every field absent.
    pub fn new(schema: Arc<StructSchema>) -> Self {
        let slots = vec![None; schema.fields().len()];
        Self { schema, slots }
    }

    pub fn schema(&self) -> &Arc<StructSchema> {
        &self.schema
    }

    /// Returns the value of the named field, if set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.schema.field_index(name)?;
        self.slots[index].as_ref()
    }

    /// Returns the value at `index`, if set.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Sets the named field. Returns false if the struct has no such field.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.schema.field_index(name) {
            Some(index) => {
                self.slots[index] = Some(value);
                true
            }
            None => false,
        }
    }

    /// Iterates over set fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .filter_map(|(field, slot)| slot.as_ref().map(|value| (field, value)))
    }

    /// Number of set fields.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pre-allocated struct storage that a tuple literal is decoded into.
#[derive(Debug, Clone)]
pub struct StructBuilder {
    value: StructValue,
}

impl StructBuilder {
    /// Creates a builder with every field absent.
    pub fn new(schema: Arc<StructSchema>) -> Self {
        Self {
            value: StructValue::new(schema),
        }
    }

    pub fn schema(&self) -> &Arc<StructSchema> {
        self.value.schema()
    }

    /// Sets the field at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a field of the schema.
    pub fn set_index(&mut self, index: usize, value: Value) {
        self.value.slots[index] = Some(value);
    }

    /// Returns the value being built.
    pub fn as_value(&self) -> &StructValue {
        &self.value
    }

    /// Finishes building.
    pub fn build(self) -> StructValue {
        self.value
    }
}

/// Handle to a value held by an [`Orphanage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orphan(usize);

/// Caller-owned storage that freshly decoded values are adopted into.
#[derive(Debug, Clone, Default)]
pub struct Orphanage {
    slots: Vec<Option<Value>>,
}

impl Orphanage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` and returns its handle.
    pub fn adopt(&mut self, value: Value) -> Orphan {
        self.slots.push(Some(value));
        Orphan(self.slots.len() - 1)
    }

    /// Borrows an adopted value. `None` once it has been taken.
    pub fn get(&self, orphan: Orphan) -> Option<&Value> {
        self.slots.get(orphan.0).and_then(Option::as_ref)
    }

    /// Moves an adopted value out of storage.
    pub fn take(&mut self, orphan: Orphan) -> Option<Value> {
        self.slots.get_mut(orphan.0).and_then(Option::take)
    }

    /// Number of values still held.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
