//! The abstract conversion operations over primitive values.

use crate::error::ConversionError;
use crate::number::{number_to_string, string_to_number};
use std::fmt;
use std::rc::Rc;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// A value that is not an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Boolean(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Number(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(Rc::from(value))
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(Rc::from(value))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String(s) => f.write_str(s),
            other => f.write_str(&to_string(other)),
        }
    }
}

/// Conversion hint passed to `ToPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredType {
    #[default]
    Default,
    Number,
    String,
}

/// Anything that can be reduced to a primitive.
///
/// Primitives convert to themselves. The runtime implements this for
/// objects by calling `valueOf` and `toString` in the order the hint asks
/// for, which is why conversion may fail and may need mutable access.
pub trait ToPrimitive {
    type Error: From<ConversionError>;

    fn to_primitive(&mut self, hint: PreferredType) -> Result<Primitive, Self::Error>;
}

impl ToPrimitive for Primitive {
    type Error = ConversionError;

    fn to_primitive(&mut self, _hint: PreferredType) -> Result<Primitive, ConversionError> {
        Ok(self.clone())
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// The `typeof` name of a primitive.
pub fn type_name(value: &Primitive) -> &'static str {
    match value {
        Primitive::Undefined => "undefined",
        Primitive::Null => "object",
        Primitive::Boolean(_) => "boolean",
        Primitive::Number(_) => "number",
        Primitive::String(_) => "string",
    }
}

pub fn to_boolean(value: &Primitive) -> bool {
    match value {
        Primitive::Undefined | Primitive::Null => false,
        Primitive::Boolean(b) => *b,
        Primitive::Number(n) => !(*n == 0.0 || n.is_nan()),
        Primitive::String(s) => !s.is_empty(),
    }
}

pub fn to_number(value: &Primitive) -> f64 {
    match value {
        Primitive::Undefined => f64::NAN,
        Primitive::Null => 0.0,
        Primitive::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Primitive::Number(n) => *n,
        Primitive::String(s) => string_to_number(s),
    }
}

pub fn to_string(value: &Primitive) -> String {
    match value {
        Primitive::Undefined => "undefined".to_string(),
        Primitive::Null => "null".to_string(),
        Primitive::Boolean(b) => b.to_string(),
        Primitive::Number(n) => number_to_string(*n),
        Primitive::String(s) => s.to_string(),
    }
}

/// `ToNumber` on any convertible value, going through `ToPrimitive` first.
pub fn to_number_with<T: ToPrimitive + ?Sized>(value: &mut T) -> Result<f64, T::Error> {
    Ok(to_number(&value.to_primitive(PreferredType::Number)?))
}

/// `ToString` on any convertible value, going through `ToPrimitive` first.
pub fn to_string_with<T: ToPrimitive + ?Sized>(value: &mut T) -> Result<String, T::Error> {
    Ok(to_string(&value.to_primitive(PreferredType::String)?))
}

/// Truncate toward zero. `NaN` becomes `0`; infinities are kept.
pub fn to_integer(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.trunc()
    }
}

pub fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let modulo = value.trunc() % TWO_POW_32;
    let modulo = if modulo < 0.0 { modulo + TWO_POW_32 } else { modulo };
    modulo as u32
}

pub fn to_int32(value: f64) -> i32 {
    to_uint32(value) as i32
}

pub fn to_uint16(value: f64) -> u16 {
    to_uint32(value) as u16
}
