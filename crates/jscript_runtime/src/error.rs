//! Runtime errors.

use crate::value::ObjectId;
use jscript_convert::ConversionError;

/// A failure raised by the late-binding runtime.
///
/// These surface to the caller as values; nothing in the runtime aborts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("'{value}' is not a function")]
    NotCallable { value: String },

    #[error("'{value}' is not a constructor")]
    NotConstructible { value: String },

    #[error("object #{} does not exist", id.index())]
    InvalidObject { id: ObjectId },

    #[error("setting this prototype would create a cycle")]
    PrototypeCycle,

    #[error("prototype chain exceeds {limit} links")]
    PrototypeChainTooDeep { limit: usize },

    #[error("'{value}' is not a valid instanceof operand")]
    InvalidInstanceOf { value: String },

    #[error("no dynamic scope is active")]
    ScopeUnderflow,

    /// Raised by host functions.
    #[error("{message}")]
    Host { message: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl RuntimeError {
    pub fn message_key(&self) -> &'static str {
        match self {
            RuntimeError::NotCallable { .. } => "not_callable",
            RuntimeError::NotConstructible { .. } => "not_constructible",
            RuntimeError::InvalidObject { .. } => "invalid_object",
            RuntimeError::PrototypeCycle => "prototype_cycle",
            RuntimeError::PrototypeChainTooDeep { .. } => "prototype_chain_too_deep",
            RuntimeError::InvalidInstanceOf { .. } => "invalid_instanceof",
            RuntimeError::ScopeUnderflow => "scope_underflow",
            RuntimeError::Host { .. } => "host_error",
            RuntimeError::Conversion(err) => err.message_key(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        RuntimeError::Host { message: message.into() }
    }
}
