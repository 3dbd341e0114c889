//! Runtime values and property keys.

use jscript_convert::{array_index, array_index_from_number, number_to_string, Primitive};
use std::fmt;
use std::rc::Rc;

/// Handle to an object in a [`Runtime`](crate::Runtime) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A runtime value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectId),
    /// Fills an argument slot the caller did not supply. Reads as
    /// `undefined` everywhere except where a callee asks for it.
    Missing,
}

impl Value {
    pub fn string(text: &str) -> Self {
        Value::String(Rc::from(text))
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null | Value::Missing)
    }

    /// The primitive form of a non-object value.
    pub fn as_primitive(&self) -> Option<Primitive> {
        Some(match self {
            Value::Undefined | Value::Missing => Primitive::Undefined,
            Value::Null => Primitive::Null,
            Value::Boolean(b) => Primitive::Boolean(*b),
            Value::Number(n) => Primitive::Number(*n),
            Value::String(s) => Primitive::String(s.clone()),
            Value::Object(_) => return None,
        })
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Undefined => Value::Undefined,
            Primitive::Null => Value::Null,
            Primitive::Boolean(b) => Value::Boolean(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::String(s) => Value::String(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Object(value)
    }
}

// ============================================================================
// Property keys
// ============================================================================

/// A property key. Strings in canonical array-index form are always
/// represented as [`PropertyKey::Index`], so `"3"` and `3` name the same
/// property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    Name(Rc<str>),
}

impl PropertyKey {
    pub fn index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::Name(_) => None,
        }
    }

    /// The key as a property name string.
    pub fn to_name(&self) -> Rc<str> {
        match self {
            PropertyKey::Index(i) => Rc::from(i.to_string()),
            PropertyKey::Name(name) => name.clone(),
        }
    }

    pub fn from_number(value: f64) -> Self {
        match array_index_from_number(value) {
            Some(index) => PropertyKey::Index(index),
            None => PropertyKey::Name(Rc::from(number_to_string(value))),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        match array_index(value) {
            Some(index) => PropertyKey::Index(index),
            None => PropertyKey::Name(Rc::from(value)),
        }
    }
}

impl From<Rc<str>> for PropertyKey {
    fn from(value: Rc<str>) -> Self {
        match array_index(&value) {
            Some(index) => PropertyKey::Index(index),
            None => PropertyKey::Name(value),
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(value: u32) -> Self {
        PropertyKey::Index(value)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Index(i) => write!(f, "{i}"),
            PropertyKey::Name(name) => f.write_str(name),
        }
    }
}
