//! Dynamic value representation
//!
//! Scalars are stored inline; objects, arrays, functions and classes are
//! shared handles. Equality follows the host's strict-equality rules:
//! scalars compare by value, reference variants by identity.

use crate::class::Class;
use crate::function::Function;
use crate::object::ObjectRef;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Dynamically typed value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value (unset property, missing argument)
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Date as milliseconds since the Unix epoch (NaN for an invalid date)
    Date(f64),
    /// Shared mutable array
    Array(ArrayRef),
    /// Shared object
    Object(ObjectRef),
    /// Native function
    Function(Function),
    /// Class constructor
    Class(Arc<Class>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Create an array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(items))
    }

    /// Check if this value is undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if this value is null or undefined
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Host truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract numeric value (integers widen)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Extract array handle
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Extract function handle
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Extract class handle
    pub fn as_class(&self) -> Option<&Arc<Class>> {
        match self {
            Value::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Numeric conversion with the host's `Number()` rules
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Date(ms) => *ms,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    match trimmed {
                        "Infinity" | "+Infinity" => f64::INFINITY,
                        "-Infinity" => f64::NEG_INFINITY,
                        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
                    }
                }
            }
            Value::Array(a) => match a.len() {
                0 => 0.0,
                1 => a.get(0).to_number(),
                _ => f64::NAN,
            },
            Value::Object(_) | Value::Function(_) | Value::Class(_) => f64::NAN,
        }
    }
}

/// Format a float the way the host prints numbers
pub(crate) fn format_number(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if f == 0.0 {
        // covers -0
        "0".to_string()
    } else if f == f.trunc() && f.abs() < 1e21 {
        format!("{:.0}", f)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", format_number(*x)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(ms) => {
                if ms.is_nan() {
                    write!(f, "Invalid Date")
                } else {
                    write!(f, "{}", format_number(*ms))
                }
            }
            Value::Array(a) => {
                let parts: Vec<String> = a
                    .to_vec()
                    .iter()
                    .map(|v| if v.is_nullish() { String::new() } else { v.to_string() })
                    .collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => match func.method_name() {
                Some(name) => write!(f, "function {}", name),
                None => write!(f, "function"),
            },
            Value::Class(c) => write!(f, "class {}", c.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Date(ms) => write!(f, "Date({})", ms),
            Value::Array(a) => write!(f, "Array(len={})", a.len()),
            Value::Object(o) => write!(f, "{:?}", o),
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Class(c) => write!(f, "Class({})", c.name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<Arc<Class>> for Value {
    fn from(c: Arc<Class>) -> Self {
        Value::Class(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

/// Shared mutable array
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    /// Create an array from elements
    pub fn new(items: Vec<Value>) -> Self {
        ArrayRef(Arc::new(RwLock::new(items)))
    }

    /// Get array length
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Check if array is empty
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Get element at index (undefined when out of bounds)
    pub fn get(&self, index: usize) -> Value {
        self.0.read().get(index).cloned().unwrap_or_default()
    }

    /// Set element at index, growing with undefined holes
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.write();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }

    /// Append an element
    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Snapshot of the elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
