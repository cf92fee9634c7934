use core::cmp::Ordering;
use core::fmt;

use crate::info::TypeKind;

// -----------------------------------------------------------------------------
// Number

/// An integer or floating point number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Parses the text of a number.
    ///
    /// - Empty text is zero.
    /// - `0x`/`0X` prefixed text (optionally signed) is hexadecimal.
    /// - With `Some(TypeKind::Integer)` the text must denote an integral
    ///   value; `"3.0"` is accepted as `3`.
    /// - With `Some(TypeKind::Float)` the result is always a float.
    /// - Otherwise text with a fraction or exponent is a float, and
    ///   integers that overflow `i64` fall back to float.
    ///
    /// # Examples
    ///
    /// ```
    /// use marshal_reflect::{Number, TypeKind};
    ///
    /// assert_eq!(Number::parse("42", None), Some(Number::Integer(42)));
    /// assert_eq!(Number::parse("-0x1F", None), Some(Number::Integer(-31)));
    /// assert_eq!(Number::parse("1e3", None), Some(Number::Float(1000.0)));
    /// assert_eq!(Number::parse("7", Some(TypeKind::Float)), Some(Number::Float(7.0)));
    /// assert_eq!(Number::parse("7.5", Some(TypeKind::Integer)), None);
    /// ```
    pub fn parse(text: &str, kind: Option<TypeKind>) -> Option<Number> {
        let text = text.trim();
        if text.is_empty() {
            return Some(match kind {
                Some(TypeKind::Float) => Self::Float(0.0),
                _ => Self::Integer(0),
            });
        }

        if let Some(value) = parse_hex(text) {
            return Some(match kind {
                Some(TypeKind::Float) => Self::Float(value as f64),
                _ => Self::Integer(value),
            });
        }

        let text = text.strip_prefix('+').unwrap_or(text);
        match kind {
            Some(TypeKind::Float) => text.parse().ok().map(Self::Float),
            Some(TypeKind::Integer) => match text.parse::<i64>() {
                Ok(value) => Some(Self::Integer(value)),
                Err(_) => {
                    let value: f64 = text.parse().ok()?;
                    is_integral(value).then_some(Self::Integer(value as i64))
                }
            },
            _ => {
                if text.contains(['.', 'e', 'E']) {
                    return text.parse().ok().map(Self::Float);
                }
                match text.parse::<i64>() {
                    Ok(value) => Some(Self::Integer(value)),
                    Err(_) => text.parse().ok().map(Self::Float),
                }
            }
        }
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// The value as an integer, if it is integral.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(value),
            Self::Float(value) => is_integral(value).then_some(value as i64),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Numeric comparison; `None` only when a NaN is involved.
    pub fn natural_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

fn parse_hex(text: &str) -> Option<i64> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))?;
    let value = i64::from_str_radix(digits, 16).ok()?;
    Some(if negative { -value } else { value })
}

fn is_integral(value: f64) -> bool {
    value.is_finite()
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
        && (value as i64) as f64 == value
}

impl fmt::Display for Number {
    /// Floats always carry a fraction or exponent, so `1.0` stays `1.0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => fmt::Display::fmt(value, f),
            Self::Float(value) => fmt::Debug::fmt(value, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::Number;
    use crate::info::TypeKind;

    #[test]
    fn parse_infers_kind() {
        assert_eq!(Number::parse("", None), Some(Number::Integer(0)));
        assert_eq!(Number::parse("+12", None), Some(Number::Integer(12)));
        assert_eq!(Number::parse("-1.25", None), Some(Number::Float(-1.25)));
        assert_eq!(
            Number::parse("99999999999999999999", None),
            Some(Number::Float(99999999999999999999.0))
        );
        assert_eq!(Number::parse("12a", None), None);
    }

    #[test]
    fn parse_with_declared_kind() {
        assert_eq!(Number::parse("3.0", Some(TypeKind::Integer)), Some(Number::Integer(3)));
        assert_eq!(Number::parse("0x10", Some(TypeKind::Float)), Some(Number::Float(16.0)));
        assert_eq!(Number::parse("", Some(TypeKind::Float)), Some(Number::Float(0.0)));
        assert_eq!(Number::parse("abc", Some(TypeKind::Integer)), None);
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(0.5).to_string(), "0.5");
        assert_eq!(Number::Integer(-7).to_string(), "-7");
    }
}
