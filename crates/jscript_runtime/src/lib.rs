//! jscript_runtime: Late-binding runtime.
//!
//! Objects live in an arena owned by [`Runtime`] and are addressed by
//! [`ObjectId`]. Property reads walk the prototype chain and memoize the
//! owning ancestor in a per-object resolution cache. Host types take part
//! through [`NativeMemberProvider`], and [`Runtime::call`] assembles
//! arguments according to each callee's calling convention.

mod call;
mod error;
mod native;
mod object;
mod runtime;
mod value;

pub use call::Callee;
pub use error::RuntimeError;
pub use native::{
    CallingConvention, HostBody, HostFunction, NativeCall, NativeMember, NativeMemberProvider,
    NativeSignature, ScriptBody, ScriptFunction, SlotType,
};
pub use object::{CacheEntry, FunctionObject, JsObject, ObjectClass, Slot};
pub use runtime::{Runtime, MAX_PROTOTYPE_CHAIN};
pub use value::{ObjectId, PropertyKey, Value};
