//! jscript_binder: Scope resolution.
//!
//! Builds the Environment (per-namespace scope chains over a binding
//! arena) and resolves every identifier of a tree to a static binding or a
//! late-bound runtime lookup. Captured variables, per-function metadata,
//! jump targets and folded constants are recorded in a [`Resolution`].

mod binding;
mod environment;
mod error;
mod labels;
mod resolver;

pub use binding::{Binding, BindingId, BindingKind, Reference, Storage};
pub use environment::{Environment, ScopeChain, DEFAULT_GLOBALS};
pub use error::ResolveError;
pub use labels::{ActiveLabel, LabelTable};
pub use resolver::{resolve, FunctionInfo, Resolution, Resolver, ResolverOptions, ScopeStats};
