//! Type utility service
//!
//! Type-tag detection, structural clone, structural equality and coercive
//! casting. The class registry consumes these through the [`TypeUtility`]
//! trait so hosts can substitute their own rules.

mod cast;

pub use cast::CastTarget;

use crate::object::ObjectRef;
use crate::value::{format_number, Value};
use std::fmt;

/// Coarse runtime type of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Booleans
    Boolean,
    /// Integers and floats
    Number,
    /// Strings
    String,
    /// Dates
    Date,
    /// Arrays
    Array,
    /// Objects and instances
    Object,
    /// Functions and class constructors
    Function,
}

impl TypeTag {
    /// Lower-case tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Undefined => "undefined",
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Function => "function",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type utility consumed by the class runtime
pub trait TypeUtility: Send + Sync {
    /// Detect the type tag of `value`
    fn type_tag(&self, value: &Value) -> TypeTag;

    /// Structural clone; `plain` restricts the result to data a JSON
    /// round-trip would preserve
    fn clone_value(&self, value: &Value, plain: bool) -> Value;

    /// Same structure and values, even if not the same objects
    fn structurally_equal(&self, a: &Value, b: &Value) -> bool;

    /// Coerce `value` to `target`
    fn cast(&self, value: &Value, target: &CastTarget) -> Value;
}

/// Default type utility
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTypeUtility;

impl StandardTypeUtility {
    fn clone_plain(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Undefined | Value::Function(_) | Value::Class(_) => None,
            Value::Float(f) if !f.is_finite() => Some(Value::Null),
            Value::Date(ms) if ms.is_nan() => Some(Value::Null),
            Value::Date(ms) => Some(Value::string(format_number(*ms))),
            Value::Array(items) => Some(Value::array(
                items
                    .to_vec()
                    .iter()
                    .map(|item| self.clone_plain(item).unwrap_or(Value::Null))
                    .collect(),
            )),
            Value::Object(object) => {
                let copy = ObjectRef::new();
                for (key, item) in object.own_entries() {
                    if let Some(item) = self.clone_plain(&item) {
                        copy.set(key, item);
                    }
                }
                Some(Value::Object(copy))
            }
            other => Some(other.clone()),
        }
    }
}

impl TypeUtility for StandardTypeUtility {
    fn type_tag(&self, value: &Value) -> TypeTag {
        match value {
            Value::Undefined => TypeTag::Undefined,
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Int(_) | Value::Float(_) => TypeTag::Number,
            Value::Str(_) => TypeTag::String,
            Value::Date(_) => TypeTag::Date,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
            Value::Function(_) | Value::Class(_) => TypeTag::Function,
        }
    }

    fn clone_value(&self, value: &Value, plain: bool) -> Value {
        if value.is_nullish() {
            return value.clone();
        }
        if plain {
            return self.clone_plain(value).unwrap_or(Value::Undefined);
        }
        match value {
            Value::Array(items) => Value::array(
                items
                    .to_vec()
                    .iter()
                    .map(|item| self.clone_value(item, false))
                    .collect(),
            ),
            // only plain objects are copied; instances keep their identity
            Value::Object(object) if object.proto().is_none() => {
                let copy = ObjectRef::new();
                for (key, item) in object.own_entries() {
                    copy.set(key, self.clone_value(&item, false));
                }
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }

    fn structurally_equal(&self, a: &Value, b: &Value) -> bool {
        let tag = self.type_tag(a);
        if tag != self.type_tag(b) {
            return false;
        }
        match (a, b) {
            (Value::Date(x), Value::Date(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Value::Object(x), Value::Object(y)) => {
                if x.len() != y.len() {
                    return false;
                }
                x.own_entries().iter().all(|(key, value)| match y.get_own(key) {
                    Some(other) => self.structurally_equal(value, &other),
                    None => false,
                })
            }
            (Value::Array(x), Value::Array(y)) => {
                let (x, y) = (x.to_vec(), y.to_vec());
                x.len() == y.len()
                    && x.iter().zip(y.iter()).all(|(l, r)| self.structurally_equal(l, r))
            }
            _ => a == b,
        }
    }

    fn cast(&self, value: &Value, target: &CastTarget) -> Value {
        cast::cast(self.type_tag(value), value, target)
    }
}
