//! The Environment: per-namespace scope chains over a shared binding arena.
//!
//! Each namespace owns a [`ScopeChain`]. A chain keeps, per symbol, the head
//! of a singly linked list of the bindings that currently shadow each
//! other. Entering a scope only records a marker; exiting pops every link
//! pushed since that marker and restores the heads they shadowed, so the
//! cost of a scope is proportional to what it declared.

use crate::binding::{Binding, BindingId};
use jscript_core::collections::FxHashMap;
use jscript_core::{Interner, Symbol};

/// One entry of a scope chain.
#[derive(Debug, Clone)]
struct ChainLink {
    value: BindingId,
    shadowed_symbol: Symbol,
    /// The link this one shadows, if the symbol was already bound.
    previous: Option<usize>,
}

/// Scope chain of one namespace.
#[derive(Debug, Default)]
pub struct ScopeChain {
    links: Vec<ChainLink>,
    heads: FxHashMap<Symbol, usize>,
    /// `links.len()` at each open scope.
    markers: Vec<usize>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.markers.len() as u32
    }

    pub fn enter_scope(&mut self) {
        self.markers.push(self.links.len());
    }

    /// Pop every binding introduced since the matching `enter_scope`.
    /// Returns `false` if no scope was open.
    pub fn exit_scope(&mut self) -> bool {
        let Some(marker) = self.markers.pop() else {
            return false;
        };
        while self.links.len() > marker {
            let Some(link) = self.links.pop() else {
                break;
            };
            match link.previous {
                Some(previous) => {
                    self.heads.insert(link.shadowed_symbol, previous);
                }
                None => {
                    self.heads.remove(&link.shadowed_symbol);
                }
            }
        }
        true
    }

    pub fn bind(&mut self, symbol: Symbol, binding: BindingId) {
        let previous = self.heads.get(&symbol).copied();
        self.heads.insert(symbol, self.links.len());
        self.links.push(ChainLink {
            value: binding,
            shadowed_symbol: symbol,
            previous,
        });
    }

    pub fn lookup(&self, symbol: Symbol) -> Option<BindingId> {
        self.heads.get(&symbol).map(|&head| self.links[head].value)
    }

    /// The binding for `symbol` if it was declared in the innermost open scope.
    pub fn lookup_in_current_scope(&self, symbol: Symbol) -> Option<BindingId> {
        let marker = self.markers.last().copied().unwrap_or(0);
        self.heads
            .get(&symbol)
            .filter(|&&head| head >= marker)
            .map(|&head| self.links[head].value)
    }

    /// Every binding for `symbol` from innermost to outermost.
    pub fn shadowed(&self, symbol: Symbol) -> impl Iterator<Item = BindingId> + '_ {
        let head = self.heads.get(&symbol).copied();
        std::iter::successors(head, move |&index| self.links[index].previous).map(move |index| self.links[index].value)
    }
}

#[derive(Debug)]
struct Namespace {
    name: Symbol,
    chain: ScopeChain,
}

/// Scope state for one compilation unit.
#[derive(Debug)]
pub struct Environment {
    bindings: Vec<Binding>,
    global: ScopeChain,
    /// Open namespaces, innermost last. Lookups fall back to `global`.
    namespaces: Vec<Namespace>,
    scopes_entered: u32,
    scopes_exited: u32,
    try_variable_name: Symbol,
}

/// Names predefined in the global scope.
pub const DEFAULT_GLOBALS: &[&str] = &[
    "undefined",
    "NaN",
    "Infinity",
    "Object",
    "Function",
    "Array",
    "String",
    "Boolean",
    "Number",
    "Math",
    "Date",
    "RegExp",
    "Error",
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
    "eval",
    "parseInt",
    "parseFloat",
    "isNaN",
    "isFinite",
    "escape",
    "unescape",
    "encodeURI",
    "decodeURI",
    "encodeURIComponent",
    "decodeURIComponent",
    "ActiveXObject",
    "GetObject",
    "Enumerator",
    "VBArray",
    "ScriptEngine",
    "ScriptEngineMajorVersion",
    "ScriptEngineMinorVersion",
    "ScriptEngineBuildVersion",
];

/// Name of the hidden binding behind `try...finally`. Not a valid identifier.
const TRY_VARIABLE_NAME: &str = "%try";

impl Environment {
    /// An environment whose global scope holds `DEFAULT_GLOBALS` plus `extra_globals`.
    pub fn new(interner: &mut Interner, extra_globals: &[String]) -> Self {
        let mut env = Self {
            bindings: Vec::new(),
            global: ScopeChain::new(),
            namespaces: Vec::new(),
            scopes_entered: 0,
            scopes_exited: 0,
            try_variable_name: interner.intern_static(TRY_VARIABLE_NAME),
        };
        for &name in DEFAULT_GLOBALS {
            let symbol = interner.intern_static(name);
            env.declare(symbol, Binding::builtin(symbol));
        }
        for name in extra_globals {
            let symbol = interner.intern(name);
            if env.lookup(symbol).is_none() {
                env.declare(symbol, Binding::builtin(symbol));
            }
        }
        env
    }

    pub fn try_variable_name(&self) -> Symbol {
        self.try_variable_name
    }

    fn chain(&self) -> &ScopeChain {
        self.namespaces.last().map_or(&self.global, |ns| &ns.chain)
    }

    fn chain_mut(&mut self) -> &mut ScopeChain {
        match self.namespaces.last_mut() {
            Some(ns) => &mut ns.chain,
            None => &mut self.global,
        }
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    pub fn enter_scope(&mut self) {
        self.scopes_entered += 1;
        self.chain_mut().enter_scope();
    }

    pub fn exit_scope(&mut self) {
        if self.chain_mut().exit_scope() {
            self.scopes_exited += 1;
        } else {
            tracing::debug!("exit_scope called with no open scope");
        }
    }

    /// Scope depth of the current namespace.
    pub fn depth(&self) -> u32 {
        self.chain().depth()
    }

    pub fn scopes_entered(&self) -> u32 {
        self.scopes_entered
    }

    pub fn scopes_exited(&self) -> u32 {
        self.scopes_exited
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Open a namespace with its own, initially empty, scope chain.
    pub fn enter_namespace(&mut self, name: Symbol) {
        self.namespaces.push(Namespace {
            name,
            chain: ScopeChain::new(),
        });
    }

    /// Close the innermost namespace and return its name.
    pub fn exit_namespace(&mut self) -> Option<Symbol> {
        let namespace = self.namespaces.pop()?;
        if namespace.chain.depth() != 0 {
            tracing::debug!(depth = namespace.chain.depth(), "namespace closed with open scopes");
        }
        Some(namespace.name)
    }

    pub fn current_namespace(&self) -> Option<Symbol> {
        self.namespaces.last().map(|ns| ns.name)
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Add a binding to the innermost scope of the current namespace.
    pub fn declare(&mut self, symbol: Symbol, binding: Binding) -> BindingId {
        let id = BindingId::new(self.bindings.len());
        self.bindings.push(binding);
        self.chain_mut().bind(symbol, id);
        id
    }

    /// Innermost binding of `symbol`, searching the current namespace and
    /// then the global namespace.
    pub fn lookup(&self, symbol: Symbol) -> Option<BindingId> {
        self.chain().lookup(symbol).or_else(|| {
            if self.namespaces.is_empty() {
                None
            } else {
                self.global.lookup(symbol)
            }
        })
    }

    pub fn lookup_in_current_scope(&self, symbol: Symbol) -> Option<BindingId> {
        self.chain().lookup_in_current_scope(symbol)
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.index()]
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingKind;

    fn var(name: Symbol, depth: u32) -> Binding {
        Binding {
            kind: BindingKind::VariableDeclaration,
            lexical_depth: depth,
            ..Binding::builtin(name)
        }
    }

    #[test]
    fn test_inner_scope_shadows_and_restores() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut chain = ScopeChain::new();

        chain.bind(x, BindingId::new(0));
        chain.enter_scope();
        chain.bind(x, BindingId::new(1));
        assert_eq!(chain.lookup(x), Some(BindingId::new(1)));
        assert_eq!(chain.shadowed(x).collect::<Vec<_>>(), vec![BindingId::new(1), BindingId::new(0)]);

        assert!(chain.exit_scope());
        assert_eq!(chain.lookup(x), Some(BindingId::new(0)));
        assert_eq!(chain.depth(), 0);
        assert!(!chain.exit_scope());
    }

    #[test]
    fn test_exit_removes_names_first_bound_in_scope() {
        let mut interner = Interner::new();
        let y = interner.intern("y");
        let mut chain = ScopeChain::new();

        chain.enter_scope();
        chain.bind(y, BindingId::new(0));
        chain.bind(y, BindingId::new(1));
        assert_eq!(chain.lookup_in_current_scope(y), Some(BindingId::new(1)));
        chain.exit_scope();
        assert_eq!(chain.lookup(y), None);
    }

    #[test]
    fn test_current_scope_lookup_ignores_outer() {
        let mut interner = Interner::new();
        let z = interner.intern("z");
        let mut chain = ScopeChain::new();

        chain.bind(z, BindingId::new(0));
        chain.enter_scope();
        assert_eq!(chain.lookup(z), Some(BindingId::new(0)));
        assert_eq!(chain.lookup_in_current_scope(z), None);
    }

    #[test]
    fn test_builtins_are_global() {
        let mut interner = Interner::new();
        let env = Environment::new(&mut interner, &["WScript".to_string()]);
        let object = interner.get("Object").unwrap();
        let host = interner.get("WScript").unwrap();

        let id = env.lookup(object).unwrap();
        assert_eq!(env.binding(id).kind, BindingKind::GlobalBuiltin);
        assert!(env.binding(id).is_global());
        assert!(env.lookup(host).is_some());
    }

    #[test]
    fn test_namespace_falls_back_to_global() {
        let mut interner = Interner::new();
        let mut env = Environment::new(&mut interner, &[]);
        let ns = interner.intern("Lib");
        let a = interner.intern("a");
        let math = interner.get("Math").unwrap();

        env.enter_namespace(ns);
        let local = env.declare(a, var(a, 0));
        assert_eq!(env.lookup(a), Some(local));
        assert!(env.lookup(math).is_some());
        assert_eq!(env.current_namespace(), Some(ns));

        assert_eq!(env.exit_namespace(), Some(ns));
        assert_eq!(env.lookup(a), None);
    }

    #[test]
    fn test_scope_counters() {
        let mut interner = Interner::new();
        let mut env = Environment::new(&mut interner, &[]);
        env.enter_scope();
        env.enter_scope();
        assert_eq!(env.depth(), 2);
        env.exit_scope();
        env.exit_scope();
        env.exit_scope();
        assert_eq!(env.depth(), 0);
        assert_eq!(env.scopes_entered(), 2);
        assert_eq!(env.scopes_exited(), 2);
    }
}
