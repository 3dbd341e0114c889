//! Binding definitions.

use jscript_ast::NodeId;
use jscript_core::Symbol;

/// Index of a binding in the environment's binding arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BindingId(u32);

impl BindingId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What introduced a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// A name the host predefines in the global scope.
    GlobalBuiltin,
    FunctionDeclaration,
    /// The name of a function expression, visible inside its own body.
    FunctionExpression,
    FormalParameter,
    VariableDeclaration,
    CatchVariable,
    /// Hidden slot holding the pending completion of a `try...finally`.
    TryVariable,
}

impl BindingKind {
    /// Whether `var` may reuse a binding of this kind in the same scope.
    pub fn is_var_reusable(self) -> bool {
        matches!(
            self,
            BindingKind::VariableDeclaration
                | BindingKind::FormalParameter
                | BindingKind::FunctionDeclaration
                | BindingKind::FunctionExpression
        )
    }
}

/// Where a binding's value lives at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// A property of the global object.
    Global,
    /// A slot in the declaring function's frame.
    Local { slot: u32 },
    /// Promoted to a shared frame because a nested function refers to it.
    Captured,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Symbol,
    pub kind: BindingKind,
    /// The declaring node: declarator, function, `try` or `catch`. `None` for builtins.
    pub declaration: Option<NodeId>,
    /// The function whose frame owns the binding, or the program root.
    pub owner: Option<NodeId>,
    /// Function nesting depth of the owner. The program is depth 0.
    pub function_depth: u32,
    /// Scope depth of the environment when the binding was declared.
    pub lexical_depth: u32,
    pub storage: Storage,
}

impl Binding {
    pub fn builtin(name: Symbol) -> Self {
        Self {
            name,
            kind: BindingKind::GlobalBuiltin,
            declaration: None,
            owner: None,
            function_depth: 0,
            lexical_depth: 0,
            storage: Storage::Global,
        }
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.storage == Storage::Captured
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.storage == Storage::Global
    }
}

/// How an identifier reference was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Statically bound.
    Static(BindingId),
    /// Looked up at run time through the dynamic scope chain. `fallback` is
    /// the static binding to use if no scope object has the name.
    Late { fallback: Option<BindingId> },
    /// The implicit `arguments` object of the enclosing function.
    Arguments,
}

impl Reference {
    pub fn binding(self) -> Option<BindingId> {
        match self {
            Reference::Static(id) => Some(id),
            Reference::Late { fallback } => fallback,
            Reference::Arguments => None,
        }
    }

    pub fn is_late(self) -> bool {
        matches!(self, Reference::Late { .. })
    }
}
