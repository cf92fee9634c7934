//! Scalar coercion between parsed values and declared types.
//!
//! Parsers produce loosely typed values: attribute names are always
//! text, and lax input may quote numbers or booleans. These helpers
//! bring such values to a declared scalar type. Containers and beans are
//! converted by the parser session, which recurses through them.

use alloc::string::{String, ToString};

use thiserror::Error;

use crate::info::{TypeHandle, TypeKind};
use crate::value::{Number, StreamRef, Value};

/// Failure of a scalar conversion.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum ConvertError {
    /// The target type has no string constructor.
    #[error("Invalid conversion from string to class '{0}'")]
    FromString(String),
    #[error("Could not convert '{text}' to class '{target}': {reason}")]
    Text {
        text: String,
        target: String,
        reason: String,
    },
    #[error("Could not convert a {found} to class '{target}'")]
    Mismatch { found: &'static str, target: String },
}

/// Converts text, such as a map key, to a value of type `ty`.
///
/// - `Any` and `String` keep the text; `Uri` marks it as a URI.
/// - `Bool` is `true` only for a case-insensitive `"true"`.
/// - `Char` takes the first code point, or null for empty text.
/// - Numbers parse with [`Number::parse`].
/// - Other types need a [`from_string`](TypeHandle::from_string) hook.
///
/// # Examples
///
/// ```
/// use marshal_reflect::convert::convert_str;
/// use marshal_reflect::{TypeHandle, Value};
///
/// assert_eq!(convert_str("TRUE", &TypeHandle::bool()), Ok(Value::Bool(true)));
/// assert_eq!(convert_str("yes", &TypeHandle::bool()), Ok(Value::Bool(false)));
/// assert_eq!(convert_str("12", &TypeHandle::integer()), Ok(Value::from(12)));
/// assert!(convert_str("x", &TypeHandle::untyped_map()).is_err());
/// ```
pub fn convert_str(text: &str, ty: &TypeHandle) -> Result<Value, ConvertError> {
    match ty.kind() {
        TypeKind::Any | TypeKind::String => Ok(Value::from(text)),
        TypeKind::Void => Ok(Value::Null),
        TypeKind::Uri => Ok(Value::uri(text)),
        TypeKind::Bool => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
        TypeKind::Char => Ok(text.chars().next().map_or(Value::Null, Value::Char)),
        kind @ (TypeKind::Integer | TypeKind::Float) => Number::parse(text, Some(kind))
            .map(Value::Number)
            .ok_or_else(|| ConvertError::Text {
                text: text.into(),
                target: ty.to_string(),
                reason: "not a number".into(),
            }),
        TypeKind::Stream => Ok(Value::Stream(StreamRef::new(text.as_bytes()))),
        _ => match ty.from_string() {
            Some(from_string) => from_string(text).map_err(|reason| ConvertError::Text {
                text: text.into(),
                target: ty.to_string(),
                reason,
            }),
            None => Err(ConvertError::FromString(ty.to_string())),
        },
    }
}

/// Converts a scalar value to type `ty`.
///
/// Null stays null and `Any` accepts everything. Numbers narrow to
/// integers by truncation. Text is handed to [`convert_str`]. A value
/// already of type `ty` is returned as is.
pub fn convert_scalar(value: &Value, ty: &TypeHandle) -> Result<Value, ConvertError> {
    let mismatch = || ConvertError::Mismatch {
        found: value.kind_name(),
        target: ty.to_string(),
    };

    let converted = match (ty.kind(), value) {
        (_, Value::Null) | (TypeKind::Void, _) => Value::Null,
        (TypeKind::Any, _) => value.clone(),
        (_, Value::String(text) | Value::Uri(text)) => convert_str(text, ty)?,
        (TypeKind::Bool, Value::Bool(_)) => value.clone(),
        (TypeKind::Bool, Value::Number(n)) => Value::Bool(n.as_f64() != 0.0),
        (TypeKind::Integer, Value::Number(n)) => {
            Value::from(n.as_i64().unwrap_or(n.as_f64() as i64))
        }
        (TypeKind::Float, Value::Number(n)) => Value::from(n.as_f64()),
        (TypeKind::Char, Value::Char(_)) => value.clone(),
        (TypeKind::Char, Value::Number(n)) => n
            .as_i64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(char::from_u32)
            .map(Value::Char)
            .ok_or_else(mismatch)?,
        (TypeKind::String, _) => value
            .as_text()
            .map(|text| Value::String(text.into_owned()))
            .ok_or_else(mismatch)?,
        (TypeKind::Uri, _) => value.as_text().map(Value::uri).ok_or_else(mismatch)?,
        _ if value.runtime_type() == *ty => value.clone(),
        _ => return Err(mismatch()),
    };
    Ok(converted)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{ConvertError, convert_scalar, convert_str};
    use crate::info::TypeHandle;
    use crate::value::Value;

    fn parse_hex_color(text: &str) -> Result<Value, alloc::string::String> {
        text.strip_prefix('#')
            .map(|rest| Value::from(rest.to_ascii_uppercase()))
            .ok_or_else(|| "missing '#'".to_string())
    }

    #[test]
    fn str_to_scalars() {
        assert_eq!(convert_str("", &TypeHandle::char()), Ok(Value::Null));
        assert_eq!(convert_str("xyz", &TypeHandle::char()), Ok(Value::Char('x')));
        assert_eq!(convert_str("2.5", &TypeHandle::float()), Ok(Value::from(2.5)));
        assert_eq!(convert_str("/a", &TypeHandle::uri()), Ok(Value::uri("/a")));
        assert!(matches!(
            convert_str("abc", &TypeHandle::integer()),
            Err(ConvertError::Text { .. })
        ));
    }

    #[test]
    fn str_through_from_string_hook() {
        let color = TypeHandle::abstract_bean("Color").with_from_string(parse_hex_color);
        assert_eq!(convert_str("#ff0", &color), Ok(Value::from("FF0")));
        assert!(matches!(convert_str("ff0", &color), Err(ConvertError::Text { .. })));

        let err = convert_str("x", &TypeHandle::abstract_bean("Plain")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid conversion from string to class 'Plain'");
    }

    #[test]
    fn scalar_widening_and_narrowing() {
        assert_eq!(convert_scalar(&Value::from(3), &TypeHandle::float()), Ok(Value::from(3.0)));
        assert_eq!(convert_scalar(&Value::from(3.9), &TypeHandle::integer()), Ok(Value::from(3)));
        assert_eq!(convert_scalar(&Value::from("7"), &TypeHandle::integer()), Ok(Value::from(7)));
        assert_eq!(convert_scalar(&Value::from(65), &TypeHandle::char()), Ok(Value::Char('A')));
        assert_eq!(convert_scalar(&Value::from(1), &TypeHandle::string()), Ok(Value::from("1")));
        assert_eq!(convert_scalar(&Value::Null, &TypeHandle::integer()), Ok(Value::Null));
        assert!(matches!(
            convert_scalar(&Value::from(true), &TypeHandle::untyped_map()),
            Err(ConvertError::Mismatch { found: "bool", .. })
        ));
    }
}
