//! jscript_core: Core utilities shared by every stage of the jscript engine.
//!
//! Provides symbol interning, text spans and positions, and the hash
//! collections used by the resolver and the runtime.

pub mod collections;
pub mod intern;
pub mod text;

// Re-export commonly used types
pub use intern::{Interner, Symbol};
pub use text::{LineAndColumn, TextSpan};
