//! jscript_convert: Value conversions and constant folding.
//!
//! The abstract conversion operations (to-number, to-string, to-boolean,
//! to-integer and the wrapping integer conversions) over primitive values,
//! the number formatting and parsing rules they rely on, and a folder that
//! evaluates operators over literal operands at compile time.
//!
//! Everything here is pure. Objects take part through [`ToPrimitive`],
//! which the runtime implements on top of its own `valueOf`/`toString`
//! dispatch.

mod constant;
mod conversions;
mod error;
mod number;

pub use constant::{evaluate_constant, fold_binary, fold_equality, fold_logical, fold_relational, fold_unary, ConstantValue};
pub use conversions::{
    to_boolean, to_int32, to_integer, to_number, to_number_with, to_string, to_string_with,
    to_uint16, to_uint32, type_name, Primitive, PreferredType, ToPrimitive,
};
pub use error::ConversionError;
pub use number::{array_index, array_index_from_number, array_length, is_js_whitespace, number_to_string, string_to_number};
