//! Conversion errors.

/// A conversion that has no defined result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// An object produced no primitive from `valueOf` or `toString`.
    #[error("cannot convert object to a primitive value")]
    NoDefaultValue,

    /// A value that cannot be used where an object is required.
    #[error("'{value}' is null or not an object")]
    NotAnObject { value: String },

    #[error("invalid array length: {value}")]
    InvalidArrayLength { value: String },
}

impl ConversionError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ConversionError::NoDefaultValue => "no_default_value",
            ConversionError::NotAnObject { .. } => "not_an_object",
            ConversionError::InvalidArrayLength { .. } => "invalid_array_length",
        }
    }
}
