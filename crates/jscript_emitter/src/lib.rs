//! jscript_emitter: Hands resolved nodes to a code-emission backend.
//!
//! The engine does not generate code itself. [`Emitter`] walks a resolved
//! tree in post order and passes every node to a [`Backend`] together
//! with its binding decision: a static binding, or late dispatch through
//! the runtime. What the backend produces is its own business.

mod backend;
mod emitter;

pub use backend::{Access, Backend, EmitNode, RecordingBackend};
pub use emitter::{EmitResult, Emitter};
