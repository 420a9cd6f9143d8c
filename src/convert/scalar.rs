//! Built-in conversions between scalar types.

use crate::convert::BeanConverter;
use crate::models::{MapperError, Result, TypeRef, Value, builtin};
use std::sync::Arc;

/// Converts between `bool`, `int`, `float` and `text`.
#[derive(Debug, Clone)]
pub struct ScalarConverter {
    source: TypeRef,
    target: TypeRef,
}

const PAIRS: &[(&str, &str)] = &[
    (builtin::INT, builtin::TEXT),
    (builtin::TEXT, builtin::INT),
    (builtin::FLOAT, builtin::TEXT),
    (builtin::TEXT, builtin::FLOAT),
    (builtin::BOOL, builtin::TEXT),
    (builtin::TEXT, builtin::BOOL),
    (builtin::INT, builtin::FLOAT),
    (builtin::FLOAT, builtin::INT),
];

/// The converters registered unless `without_default_converters` is set.
pub fn default_converters() -> Vec<Arc<dyn BeanConverter>> {
    PAIRS
        .iter()
        .map(|(source, target)| {
            Arc::new(ScalarConverter {
                source: TypeRef::named(source),
                target: TypeRef::named(target),
            }) as Arc<dyn BeanConverter>
        })
        .collect()
}

impl BeanConverter for ScalarConverter {
    fn supports(&self, source: &TypeRef, target: &TypeRef) -> bool {
        &self.source == source && &self.target == target
    }

    fn convert(&self, value: Value, target: &TypeRef) -> Result<Value> {
        let fail = |message: String| MapperError::conversion(&self.source, target, message);

        match (value, target.name()) {
            (Value::Int(i), Some(builtin::TEXT)) => Ok(Value::Text(i.to_string())),
            (Value::Float(f), Some(builtin::TEXT)) => Ok(Value::Text(f.to_string())),
            (Value::Bool(b), Some(builtin::TEXT)) => Ok(Value::Text(b.to_string())),
            (Value::Int(i), Some(builtin::FLOAT)) => Ok(Value::Float(i as f64)),
            (Value::Text(s), Some(builtin::INT)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| fail(format!("'{s}' is not an integer: {e}"))),
            (Value::Text(s), Some(builtin::FLOAT)) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| fail(format!("'{s}' is not a number: {e}"))),
            (Value::Text(s), Some(builtin::BOOL)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(fail(format!("'{s}' is not a boolean"))),
            },
            (Value::Float(f), Some(builtin::INT)) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Ok(Value::Int(f as i64))
                } else {
                    Err(fail(format!("{f} has no exact integer value")))
                }
            }
            (other, _) => Err(fail(format!("unexpected value {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: Value, source: TypeRef, target: TypeRef) -> Result<Value> {
        let converter = default_converters()
            .into_iter()
            .find(|c| c.supports(&source, &target))
            .expect("converter registered");
        converter.convert(value, &target)
    }

    #[test]
    fn test_text_to_int() {
        let value = convert(Value::from(" 42 "), TypeRef::text(), TypeRef::int()).unwrap();
        assert_eq!(value, Value::Int(42));

        let err = convert(Value::from("forty"), TypeRef::text(), TypeRef::int()).unwrap_err();
        assert!(matches!(err, MapperError::ConversionFailed { .. }));
    }

    #[test]
    fn test_float_to_int_requires_whole_number() {
        assert_eq!(
            convert(Value::Float(3.0), TypeRef::float(), TypeRef::int()).unwrap(),
            Value::Int(3)
        );
        assert!(convert(Value::Float(3.5), TypeRef::float(), TypeRef::int()).is_err());
    }

    #[test]
    fn test_float_to_int_rejects_out_of_range() {
        // i64::MAX rounds up to 2^63 as a float, which no i64 can hold
        let err = convert(Value::Float(i64::MAX as f64), TypeRef::float(), TypeRef::int()).unwrap_err();
        assert!(matches!(err, MapperError::ConversionFailed { .. }));

        assert_eq!(
            convert(Value::Float(i64::MIN as f64), TypeRef::float(), TypeRef::int()).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_bool_round_trip_through_text() {
        let text = convert(Value::Bool(true), TypeRef::boolean(), TypeRef::text()).unwrap();
        assert_eq!(text, Value::from("true"));
        let back = convert(text, TypeRef::text(), TypeRef::boolean()).unwrap();
        assert_eq!(back, Value::Bool(true));
    }

    #[test]
    fn test_no_converter_for_unrelated_pair() {
        let text = TypeRef::text();
        assert!(
            !default_converters()
                .iter()
                .any(|c| c.supports(&text, &TypeRef::named("Person")))
        );
    }
}
