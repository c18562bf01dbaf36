//! Translation of parsed expressions into typed values.

use std::sync::Arc;

use tracing::debug;

use crate::error::{SourceError, Span};
use crate::schema::{EnumValue, StructBuilder, Type, Value};
use crate::text::parser::{ExprKind, Expression, Param};

/// Answers references to things outside the literal being translated.
pub trait Resolver {
    /// Looks up a named constant. `Ok(None)` means "no such constant".
    fn resolve_constant(&self, name: &str, span: Span) -> Result<Option<Value>, SourceError>;

    /// Reads the contents of an embedded file. `Ok(None)` means "not found".
    fn read_embed(&self, filename: &str, span: Span) -> Result<Option<Vec<u8>>, SourceError>;
}

/// A [`Resolver`] that rejects every external reference.
///
/// Used when decoding standalone text, which must be fully literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyExternal;

impl Resolver for DenyExternal {
    fn resolve_constant(&self, _name: &str, span: Span) -> Result<Option<Value>, SourceError> {
        Err(SourceError::new(span, "External constants not allowed."))
    }

    fn read_embed(&self, _filename: &str, span: Span) -> Result<Option<Vec<u8>>, SourceError> {
        Err(SourceError::new(span, "External embeds not allowed."))
    }
}

/// Builds typed values from expressions.
pub trait ValueTranslator: Send + Sync {
    /// Assigns each `name = value` element of `tuple` to the matching field.
    fn fill_struct_value(
        &self,
        builder: &mut StructBuilder,
        tuple: &[Param],
        resolver: &dyn Resolver,
    ) -> Result<(), SourceError>;

    /// Compiles `expr` into a value of type `ty`.
    fn compile_value(
        &self,
        expr: &Expression,
        ty: &Type,
        resolver: &dyn Resolver,
    ) -> Result<Value, SourceError>;
}

/// The default [`ValueTranslator`]. Accepts literal values only; every other
/// name is passed to the resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralTranslator;

impl ValueTranslator for LiteralTranslator {
    fn fill_struct_value(
        &self,
        builder: &mut StructBuilder,
        tuple: &[Param],
        resolver: &dyn Resolver,
    ) -> Result<(), SourceError> {
        let schema = Arc::clone(builder.schema());
        let mut assigned = vec![false; schema.fields().len()];

        for param in tuple {
            let Some(name) = &param.name else {
                return Err(SourceError::new(param.value.span, "Missing field name."));
            };
            let Some(index) = schema.field_index(&name.value) else {
                return Err(SourceError::new(
                    name.span,
                    format!("Struct {} has no field named '{}'.", schema.name, name.value),
                ));
            };
            if assigned[index] {
                return Err(SourceError::new(
                    name.span,
                    format!("Field '{}' assigned more than once.", name.value),
                ));
            }
            assigned[index] = true;

            let field = &schema.fields()[index];
            let value = self.compile_value(&param.value, &field.ty, resolver)?;
            builder.set_index(index, value);
        }

        debug!(
            schema = %schema.name,
            fields = tuple.len(),
            "filled struct value"
        );
        Ok(())
    }

    fn compile_value(
        &self,
        expr: &Expression,
        ty: &Type,
        resolver: &dyn Resolver,
    ) -> Result<Value, SourceError> {
        match &expr.kind {
            ExprKind::Integer(v) => compile_integer(*v, false, ty, expr),
            ExprKind::NegativeInteger(v) => compile_integer(*v, true, ty, expr),
            ExprKind::Float(v) => match ty {
                Type::Float32 => Ok(Value::Float(*v as f32 as f64)),
                Type::Float64 => Ok(Value::Float(*v)),
                _ => Err(mismatch(ty, expr)),
            },
            ExprKind::String(s) => match ty {
                Type::Text => Ok(Value::Text(s.clone())),
                Type::Data => Ok(Value::Data(s.as_bytes().to_vec())),
                _ => Err(mismatch(ty, expr)),
            },
            ExprKind::Binary(bytes) => match ty {
                Type::Data => Ok(Value::Data(bytes.clone())),
                _ => Err(mismatch(ty, expr)),
            },
            ExprKind::Name(name) => self.compile_name(name, ty, expr, resolver),
            ExprKind::Embed(filename) => {
                let contents = resolver
                    .read_embed(&filename.value, filename.span)?
                    .ok_or_else(|| {
                        SourceError::new(
                            filename.span,
                            format!("Couldn't read file '{}'.", filename.value),
                        )
                    })?;
                match ty {
                    Type::Data => Ok(Value::Data(contents)),
                    Type::Text => String::from_utf8(contents)
                        .map(Value::Text)
                        .map_err(|_| {
                            SourceError::new(filename.span, "Embedded file is not valid UTF-8.")
                        }),
                    _ => Err(mismatch(ty, expr)),
                }
            }
            ExprKind::List(items) => {
                let Type::List(element) = ty else {
                    return Err(mismatch(ty, expr));
                };
                items
                    .iter()
                    .map(|item| self.compile_value(item, element, resolver))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            ExprKind::Tuple(params) => {
                let Type::Struct(schema) = ty else {
                    return Err(mismatch(ty, expr));
                };
                let mut builder = StructBuilder::new(Arc::clone(schema));
                self.fill_struct_value(&mut builder, params, resolver)?;
                Ok(Value::Struct(builder.build()))
            }
        }
    }
}

impl LiteralTranslator {
    fn compile_name(
        &self,
        name: &str,
        ty: &Type,
        expr: &Expression,
        resolver: &dyn Resolver,
    ) -> Result<Value, SourceError> {
        // Enumerants shadow keywords of the same name.
        if let Type::Enum(schema) = ty {
            if let Some(ordinal) = schema.ordinal(name) {
                return Ok(Value::Enum(EnumValue {
                    schema: Arc::clone(schema),
                    ordinal,
                }));
            }
        }

        let keyword = match (name, ty) {
            ("void", Type::Void) => Some(Value::Void),
            ("true", Type::Bool) => Some(Value::Bool(true)),
            ("false", Type::Bool) => Some(Value::Bool(false)),
            ("inf", Type::Float32 | Type::Float64) => Some(Value::Float(f64::INFINITY)),
            ("nan", Type::Float32 | Type::Float64) => Some(Value::Float(f64::NAN)),
            ("void" | "true" | "false" | "inf" | "nan", _) => return Err(mismatch(ty, expr)),
            _ => None,
        };
        if let Some(value) = keyword {
            return Ok(value);
        }

        resolver
            .resolve_constant(name, expr.span)?
            .ok_or_else(|| SourceError::new(expr.span, format!("Not defined: {}", name)))
    }
}

fn compile_integer(
    magnitude: u64,
    negative: bool,
    ty: &Type,
    expr: &Expression,
) -> Result<Value, SourceError> {
    let out_of_range =
        || SourceError::new(expr.span, format!("Integer value out of range for {}.", ty));

    if let Some((min, max)) = ty.signed_range() {
        let value = if negative {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };
        if value < min as i128 || value > max as i128 {
            return Err(out_of_range());
        }
        return Ok(Value::Int(value as i64));
    }

    if let Some(max) = ty.unsigned_max() {
        if (negative && magnitude != 0) || magnitude > max {
            return Err(out_of_range());
        }
        return Ok(Value::UInt(magnitude));
    }

    // Ordinals without a known enumerant are written as plain integers.
    if let Type::Enum(schema) = ty {
        return match u16::try_from(magnitude) {
            Ok(ordinal) if !negative || magnitude == 0 => Ok(Value::Enum(EnumValue {
                schema: Arc::clone(schema),
                ordinal,
            })),
            _ => Err(out_of_range()),
        };
    }

    let value = if negative {
        -(magnitude as f64)
    } else {
        magnitude as f64
    };
    match ty {
        Type::Float32 => Ok(Value::Float(value as f32 as f64)),
        Type::Float64 => Ok(Value::Float(value)),
        _ => Err(mismatch(ty, expr)),
    }
}

fn mismatch(ty: &Type, expr: &Expression) -> SourceError {
    SourceError::new(
        expr.span,
        format!("Type mismatch; expected {}, found {}.", ty, expr.kind_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, Field, StructSchema};
    use crate::text::lexer::{Lexer, Tokenizer};
    use crate::text::parser::{ExpressionParser, LiteralParser, TokenCursor};

    fn expr(input: &str) -> Expression {
        let tokens = Lexer::default().lex(input).unwrap();
        LiteralParser.expression(&mut TokenCursor::new(&tokens)).unwrap()
    }

    fn compile(input: &str, ty: &Type) -> Result<Value, SourceError> {
        LiteralTranslator.compile_value(&expr(input), ty, &DenyExternal)
    }

    fn color() -> Type {
        Type::Enum(Arc::new(EnumSchema::new(0x8000_0000_0000_0020, "Color", ["red", "green"])))
    }

    fn person() -> Arc<StructSchema> {
        Arc::new(StructSchema::new(
            0x8000_0000_0000_0021,
            "Person",
            vec![
                Field::new("name", Type::Text),
                Field::new("age", Type::UInt8),
                Field::new("tags", Type::list_of(Type::Text)),
            ],
        ))
    }

    /// Resolver that knows a single constant.
    struct OneConstant;

    impl Resolver for OneConstant {
        fn resolve_constant(&self, name: &str, _span: Span) -> Result<Option<Value>, SourceError> {
            Ok((name == "answer").then_some(Value::UInt(42)))
        }

        fn read_embed(&self, _filename: &str, _span: Span) -> Result<Option<Vec<u8>>, SourceError> {
            Ok(Some(b"hello".to_vec()))
        }
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(compile("127", &Type::Int8).unwrap(), Value::Int(127));
        assert_eq!(compile("-128", &Type::Int8).unwrap(), Value::Int(-128));
        assert!(compile("128", &Type::Int8).is_err());
        assert!(compile("-129", &Type::Int8).is_err());
        assert_eq!(
            compile("-9223372036854775808", &Type::Int64).unwrap(),
            Value::Int(i64::MIN)
        );
        assert_eq!(compile("255", &Type::UInt8).unwrap(), Value::UInt(255));
        assert_eq!(compile("-0", &Type::UInt8).unwrap(), Value::UInt(0));
        let err = compile("-1", &Type::UInt8).unwrap_err();
        assert_eq!(err.message, "Integer value out of range for UInt8.");
    }

    #[test]
    fn test_numbers_into_floats() {
        assert_eq!(compile("3", &Type::Float64).unwrap(), Value::Float(3.0));
        assert_eq!(compile("-2.5", &Type::Float64).unwrap(), Value::Float(-2.5));
        assert_eq!(compile("inf", &Type::Float32).unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(compile("0.1", &Type::Float32).unwrap(), Value::Float(0.1f32 as f64));
        assert!(matches!(compile("nan", &Type::Float64).unwrap(), Value::Float(v) if v.is_nan()));
    }

    #[test]
    fn test_keywords_and_enums() {
        assert_eq!(compile("void", &Type::Void).unwrap(), Value::Void);
        assert_eq!(compile("true", &Type::Bool).unwrap(), Value::Bool(true));
        let Value::Enum(green) = compile("green", &color()).unwrap() else {
            panic!("expected enum");
        };
        assert_eq!(green.ordinal, 1);
        assert_eq!(green.name(), Some("green"));

        let err = compile("true", &Type::Int32).unwrap_err();
        assert_eq!(err.message, "Type mismatch; expected Int32, found name.");
    }

    #[test]
    fn test_enumerants_shadow_keywords() {
        let mode = Arc::new(EnumSchema::new(0x8000_0000_0000_0022, "Mode", ["void", "nan"]));
        let ty = Type::Enum(Arc::clone(&mode));
        assert_eq!(
            compile("void", &ty).unwrap(),
            Value::Enum(EnumValue {
                schema: Arc::clone(&mode),
                ordinal: 0
            })
        );
        assert_eq!(
            compile("nan", &ty).unwrap(),
            Value::Enum(EnumValue {
                schema: mode,
                ordinal: 1
            })
        );
        // Keywords still apply to their own types
        assert_eq!(compile("void", &Type::Void).unwrap(), Value::Void);
        let err = compile("true", &ty).unwrap_err();
        assert_eq!(err.message, "Type mismatch; expected Mode, found name.");
    }

    #[test]
    fn test_enum_from_ordinal() {
        let Value::Enum(value) = compile("5", &color()).unwrap() else {
            panic!("expected enum");
        };
        assert_eq!(value.ordinal, 5);
        assert_eq!(value.name(), None);

        let err = compile("65536", &color()).unwrap_err();
        assert_eq!(err.message, "Integer value out of range for Color.");
        assert!(compile("-1", &color()).is_err());
    }

    #[test]
    fn test_text_and_data() {
        assert_eq!(compile("\"hi\"", &Type::Text).unwrap(), Value::Text("hi".into()));
        assert_eq!(compile("\"hi\"", &Type::Data).unwrap(), Value::Data(b"hi".to_vec()));
        assert_eq!(compile("0x\"0001\"", &Type::Data).unwrap(), Value::Data(vec![0, 1]));
        assert!(compile("0x\"0001\"", &Type::Text).is_err());
    }

    #[test]
    fn test_struct_literal() {
        let ty = Type::Struct(person());
        let input = "(name = \"Ada\", age = 36, tags = [\"x\"])";
        let Value::Struct(value) = compile(input, &ty).unwrap() else {
            panic!("expected struct");
        };
        assert_eq!(value.get("name"), Some(&Value::Text("Ada".into())));
        assert_eq!(value.get("age"), Some(&Value::UInt(36)));
        assert_eq!(value.get("tags"), Some(&Value::List(vec![Value::Text("x".into())])));
    }

    #[test]
    fn test_struct_errors() {
        let ty = Type::Struct(person());

        let err = compile("(nmae = \"Ada\")", &ty).unwrap_err();
        assert_eq!(err.message, "Struct Person has no field named 'nmae'.");
        assert_eq!(err.span, Span::new(1, 5));

        let err = compile("(age = 1, age = 2)", &ty).unwrap_err();
        assert_eq!(err.message, "Field 'age' assigned more than once.");
        assert_eq!(err.span, Span::new(10, 13));

        let err = compile("(\"Ada\")", &ty).unwrap_err();
        assert_eq!(err.message, "Missing field name.");
    }

    #[test]
    fn test_deny_external() {
        let err = compile("someConst", &Type::UInt32).unwrap_err();
        assert_eq!(err.message, "External constants not allowed.");
        assert_eq!(err.span, Span::new(0, 9));

        let err = compile("embed \"file.bin\"", &Type::Data).unwrap_err();
        assert_eq!(err.message, "External embeds not allowed.");
        assert_eq!(err.span, Span::new(6, 16));

        // Unknown enumerants fall through to the resolver as well
        let err = compile("blue", &color()).unwrap_err();
        assert_eq!(err.message, "External constants not allowed.");
    }

    #[test]
    fn test_permissive_resolver() {
        let value = LiteralTranslator
            .compile_value(&expr("answer"), &Type::UInt32, &OneConstant)
            .unwrap();
        assert_eq!(value, Value::UInt(42));

        let err = LiteralTranslator
            .compile_value(&expr("question"), &Type::UInt32, &OneConstant)
            .unwrap_err();
        assert_eq!(err.message, "Not defined: question");

        let value = LiteralTranslator
            .compile_value(&expr("embed \"greeting.txt\""), &Type::Text, &OneConstant)
            .unwrap();
        assert_eq!(value, Value::Text("hello".into()));
    }
}
