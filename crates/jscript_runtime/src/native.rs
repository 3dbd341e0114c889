//! Host-native members and callables.
//!
//! A host type exposes its members through [`NativeMemberProvider`]. The
//! runtime only ever asks it what a name is and then reads, writes or
//! invokes it; there is no reflection.

use crate::error::RuntimeError;
use crate::runtime::Runtime;
use crate::value::Value;
use bitflags::bitflags;
use std::fmt;
use std::rc::Rc;

bitflags! {
    /// Implicit inputs a callee asks for besides its declared parameters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CallingConvention: u8 {
        /// Receives the `this` value.
        const RECEIVER = 1 << 0;
        /// Receives a handle to the runtime.
        const CONTEXT  = 1 << 1;
        /// Collects arguments past the declared ones instead of dropping them.
        const VARIADIC = 1 << 2;
    }
}

/// Declared type of a host parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotType {
    /// Passed through untouched.
    #[default]
    Any,
    Boolean,
    Number,
    Int32,
    UInt32,
    String,
    Object,
}

/// Parameter types and calling convention of a host callable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeSignature {
    pub convention: CallingConvention,
    pub params: Vec<SlotType>,
}

impl NativeSignature {
    pub fn new(params: Vec<SlotType>) -> Self {
        Self { convention: CallingConvention::empty(), params }
    }

    pub fn with_convention(mut self, convention: CallingConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_variadic(&self) -> bool {
        self.convention.contains(CallingConvention::VARIADIC)
    }

    /// Whether any slot asks for coercion.
    pub fn is_typed(&self) -> bool {
        self.params.iter().any(|slot| *slot != SlotType::Any)
    }
}

/// What a host type exposes under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeMember {
    Field,
    /// A value computed on read.
    Accessor,
    Method(NativeSignature),
}

/// The arguments handed to a host callable, shaped by its convention.
pub struct NativeCall<'a> {
    pub receiver: Option<Value>,
    pub context: Option<&'a mut Runtime>,
    pub args: Vec<Value>,
    /// Extra arguments, present only for variadic callees.
    pub rest: Option<Vec<Value>>,
}

impl NativeCall<'_> {
    /// The argument in slot `index`, or the missing sentinel.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or(Value::Missing)
    }
}

impl fmt::Debug for NativeCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCall")
            .field("receiver", &self.receiver)
            .field("context", &self.context.is_some())
            .field("args", &self.args)
            .field("rest", &self.rest)
            .finish()
    }
}

/// Member lookup surface of a host-native type.
pub trait NativeMemberProvider: fmt::Debug {
    /// Name used in `[object Name]` and in error messages.
    fn type_name(&self) -> &str;

    fn member(&self, name: &str) -> Option<NativeMember>;

    /// Read a field or accessor.
    fn get_member(&self, name: &str) -> Result<Value, RuntimeError>;

    /// Write a field or accessor. Returns false when the member is read-only.
    fn set_member(&self, _name: &str, _value: Value) -> Result<bool, RuntimeError> {
        Ok(false)
    }

    fn invoke(&self, name: &str, call: NativeCall<'_>) -> Result<Value, RuntimeError>;
}

// ============================================================================
// Function payloads
// ============================================================================

pub type HostBody = Rc<dyn Fn(NativeCall<'_>) -> Result<Value, RuntimeError>>;

/// A strongly typed function implemented by the host.
#[derive(Clone)]
pub struct HostFunction {
    pub name: Rc<str>,
    pub signature: NativeSignature,
    pub constructible: bool,
    pub body: HostBody,
}

impl HostFunction {
    pub fn new(
        name: &str,
        signature: NativeSignature,
        body: impl Fn(NativeCall<'_>) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self { name: Rc::from(name), signature, constructible: false, body: Rc::new(body) }
    }

    pub fn constructible(mut self) -> Self {
        self.constructible = true;
        self
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("constructible", &self.constructible)
            .finish_non_exhaustive()
    }
}

/// Executes a script function: receives the runtime, `this` and the
/// arguments.
pub type ScriptBody = Rc<dyn Fn(&mut Runtime, Value, Vec<Value>) -> Result<Value, RuntimeError>>;

/// A user-defined function. Its body is supplied by whatever backend
/// compiled it. Script functions accept any number of arguments and are
/// never coerced.
#[derive(Clone)]
pub struct ScriptFunction {
    pub name: Rc<str>,
    pub params: Vec<Rc<str>>,
    pub body: ScriptBody,
}

impl ScriptFunction {
    pub fn new(
        name: &str,
        params: &[&str],
        body: impl Fn(&mut Runtime, Value, Vec<Value>) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            params: params.iter().map(|p| Rc::from(*p)).collect(),
            body: Rc::new(body),
        }
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
