//! jscript_ast: Abstract syntax tree for the jscript engine.
//!
//! Defines the token kinds, the arena that owns every node of a
//! compilation unit, the closed set of node kinds and the node flags.

pub mod ast;
pub mod dump;
pub mod node;
pub mod syntax_kind;
pub mod types;

// Re-export key types
pub use ast::Ast;
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::NodeFlags;
