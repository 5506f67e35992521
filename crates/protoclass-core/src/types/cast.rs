//! Coercive casting
//!
//! A value whose tag already matches the target is returned unchanged.
//! Otherwise `undefined` is treated as `null` and converted per target.

use super::TypeTag;
use crate::value::Value;

/// Cast target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastTarget {
    /// Display string (`null` becomes the empty string)
    String,
    /// 32-bit truncating integer conversion
    Integer,
    /// Leading-float parse (`null` becomes 0)
    Float,
    /// Boolean (`null` false, numbers by value, everything else true)
    Boolean,
    /// Date from a timestamp
    Date,
    /// Any other tag name; the value is returned unchanged
    Other(String),
}

impl CastTarget {
    /// Parse a target name
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => CastTarget::String,
            "integer" => CastTarget::Integer,
            "float" => CastTarget::Float,
            "boolean" => CastTarget::Boolean,
            "date" => CastTarget::Date,
            other => CastTarget::Other(other.to_string()),
        }
    }

    /// Target name
    pub fn as_str(&self) -> &str {
        match self {
            CastTarget::String => "string",
            CastTarget::Integer => "integer",
            CastTarget::Float => "float",
            CastTarget::Boolean => "boolean",
            CastTarget::Date => "date",
            CastTarget::Other(name) => name,
        }
    }
}

/// Wrap to a signed 32-bit integer the way `value | 0` does
fn to_int32(f: f64) -> i64 {
    if !f.is_finite() {
        return 0;
    }
    let modulo = f.trunc().rem_euclid(4_294_967_296.0);
    let wrapped = if modulo >= 2_147_483_648.0 {
        modulo - 4_294_967_296.0
    } else {
        modulo
    };
    wrapped as i64
}

/// Parse the longest numeric prefix of `s`, as `parseFloat` does
pub(crate) fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut cursor = fraction_start;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        mantissa_digits += cursor - fraction_start;
        end = cursor;
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let exponent_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exponent_start {
            end = cursor;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_float(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        other => parse_float_prefix(&other.to_string()),
    }
}

pub(super) fn cast(tag: TypeTag, value: &Value, target: &CastTarget) -> Value {
    if tag.as_str() == target.as_str() {
        return value.clone();
    }

    let value = if value.is_undefined() {
        Value::Null
    } else {
        value.clone()
    };

    match target {
        CastTarget::String => match value {
            Value::Null => Value::string(""),
            other => Value::string(other.to_string()),
        },
        CastTarget::Integer => Value::Int(to_int32(value.to_number())),
        CastTarget::Float => match value {
            Value::Null => Value::Float(0.0),
            other => Value::Float(parse_float(&other)),
        },
        CastTarget::Boolean => match value {
            Value::Null => Value::Bool(false),
            Value::Bool(b) => Value::Bool(b),
            Value::Int(_) | Value::Float(_) => {
                let f = parse_float(&value);
                Value::Bool(f != 0.0 && !f.is_nan())
            }
            _ => Value::Bool(true),
        },
        CastTarget::Date => match value {
            Value::Date(ms) => Value::Date(ms),
            Value::Null => Value::Date(0.0),
            Value::Int(_) | Value::Float(_) => {
                let ms = value.to_number();
                Value::Date(if ms.is_finite() { ms.trunc() } else { f64::NAN })
            }
            // only numeric timestamps are understood
            Value::Str(ref s) => match s.trim().parse::<f64>() {
                Ok(ms) if ms.is_finite() => Value::Date(ms.trunc()),
                _ => Value::Date(f64::NAN),
            },
            _ => Value::Date(f64::NAN),
        },
        CastTarget::Other(_) => value,
    }
}
