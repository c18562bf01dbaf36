//! Rendering values as text literals.
//!
//! The compact form puts everything on one line. The pretty form breaks
//! structs (and lists of aggregates) over several lines with two-space
//! indentation. Both forms parse back to the same value.

use std::fmt::{self, Write};

use crate::schema::Value;

/// Renders `value` as text.
///
/// `pretty_print` only affects structs and lists; scalars always use the
/// compact form. Enum values whose ordinal has no enumerant are written as
/// the bare ordinal.
pub fn encode(value: &Value, pretty_print: bool) -> String {
    if pretty_print && value.is_aggregate() {
        Pretty(value).to_string()
    } else {
        value.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_compact(f, self)
    }
}

/// Multi-line rendering of a value.
struct Pretty<'a>(&'a Value);

impl fmt::Display for Pretty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pretty(f, self.0, 0)
    }
}

fn write_compact<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Struct(s) => {
            out.write_char('(')?;
            for (i, (field, value)) in s.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{} = ", field.name)?;
                write_compact(out, value)?;
            }
            out.write_char(')')
        }
        Value::List(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_compact(out, item)?;
            }
            out.write_char(']')
        }
        scalar => write_scalar(out, scalar),
    }
}

fn write_scalar<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Void => out.write_str("void"),
        Value::Bool(b) => write!(out, "{}", b),
        Value::Int(v) => write!(out, "{}", v),
        Value::UInt(v) => write!(out, "{}", v),
        Value::Float(v) => write_float(out, *v),
        Value::Text(s) => write_text(out, s),
        Value::Data(bytes) => {
            out.write_str("0x\"")?;
            for byte in bytes {
                write!(out, "{:02x}", byte)?;
            }
            out.write_char('"')
        }
        Value::Enum(e) => match e.name() {
            Some(name) => out.write_str(name),
            None => write!(out, "{}", e.ordinal),
        },
        Value::Struct(_) | Value::List(_) => write_compact(out, value),
    }
}

fn write_float<W: Write>(out: &mut W, v: f64) -> fmt::Result {
    if v.is_nan() {
        out.write_str("nan")
    } else if v.is_infinite() {
        out.write_str(if v > 0.0 { "inf" } else { "-inf" })
    } else {
        // Debug keeps a decimal point or exponent, so the literal lexes as a float.
        write!(out, "{:?}", v)
    }
}

fn write_text<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(out, "\\x{:02x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

fn indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str("  ")?;
    }
    Ok(())
}

fn write_pretty<W: Write>(out: &mut W, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Struct(s) if !s.is_empty() => {
            out.write_str("(\n")?;
            let count = s.len();
            for (i, (field, value)) in s.iter().enumerate() {
                indent(out, depth + 1)?;
                write!(out, "{} = ", field.name)?;
                write_pretty(out, value, depth + 1)?;
                out.write_str(if i + 1 < count { ",\n" } else { "\n" })?;
            }
            indent(out, depth)?;
            out.write_char(')')
        }
        Value::List(items) if items.iter().any(Value::is_aggregate) => {
            out.write_str("[\n")?;
            for (i, item) in items.iter().enumerate() {
                indent(out, depth + 1)?;
                write_pretty(out, item, depth + 1)?;
                out.write_str(if i + 1 < items.len() { ",\n" } else { "\n" })?;
            }
            indent(out, depth)?;
            out.write_char(']')
        }
        other => write_compact(out, other),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{EnumSchema, EnumValue, Field, StructSchema, StructValue, Type};

    fn point_schema() -> Arc<StructSchema> {
        Arc::new(StructSchema::new(
            0x8000_0000_0000_0030,
            "Point",
            vec![Field::new("x", Type::Int32), Field::new("y", Type::Int32)],
        ))
    }

    fn point(x: i64, y: i64) -> Value {
        let mut value = StructValue::new(point_schema());
        value.set("x", Value::Int(x));
        value.set("y", Value::Int(y));
        Value::Struct(value)
    }

    fn shape() -> Value {
        let schema = Arc::new(StructSchema::new(
            0x8000_0000_0000_0031,
            "Shape",
            vec![
                Field::new("name", Type::Text),
                Field::new("points", Type::list_of(Type::Struct(point_schema()))),
                Field::new("origin", Type::Struct(point_schema())),
            ],
        ));
        let mut value = StructValue::new(schema);
        value.set("name", Value::Text("tri".into()));
        value.set("points", Value::List(vec![point(0, 0), point(1, 2)]));
        Value::Struct(value)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encode(&Value::Void, false), "void");
        assert_eq!(encode(&Value::Bool(true), true), "true");
        assert_eq!(encode(&Value::Int(-5), false), "-5");
        assert_eq!(encode(&Value::UInt(u64::MAX), false), "18446744073709551615");
        assert_eq!(encode(&Value::Float(1.0), false), "1.0");
        assert_eq!(encode(&Value::Float(1e300), false), "1e300");
        assert_eq!(encode(&Value::Float(f64::NEG_INFINITY), false), "-inf");
        assert_eq!(encode(&Value::Float(f64::NAN), false), "nan");
        assert_eq!(encode(&Value::Data(vec![0, 0xab]), false), "0x\"00ab\"");
    }

    #[test]
    fn test_text_escapes() {
        let value = Value::Text("a\"b\\c\nd\u{1}\u{e9}".into());
        assert_eq!(encode(&value, false), r#""a\"b\\c\nd\x01é""#);
    }

    #[test]
    fn test_enum() {
        let schema = Arc::new(EnumSchema::new(0x8000_0000_0000_0032, "Color", ["red", "green"]));
        let green = Value::Enum(EnumValue {
            schema: Arc::clone(&schema),
            ordinal: 1,
        });
        assert_eq!(encode(&green, false), "green");
        let unknown = Value::Enum(EnumValue { schema, ordinal: 7 });
        assert_eq!(encode(&unknown, false), "7");
    }

    #[test]
    fn test_compact_aggregates() {
        assert_eq!(encode(&point(1, -2), false), "(x = 1, y = -2)");
        assert_eq!(
            encode(&shape(), false),
            "(name = \"tri\", points = [(x = 0, y = 0), (x = 1, y = 2)])"
        );
        assert_eq!(shape().to_string(), encode(&shape(), false));
    }

    #[test]
    fn test_pretty_aggregates() {
        let expected = "\
(
  name = \"tri\",
  points = [
    (
      x = 0,
      y = 0
    ),
    (
      x = 1,
      y = 2
    )
  ]
)";
        assert_eq!(encode(&shape(), true), expected);
    }

    #[test]
    fn test_pretty_keeps_scalar_lists_inline() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(encode(&list, true), "[1, 2]");
        assert_eq!(encode(&Value::List(vec![]), true), "[]");
    }
}
