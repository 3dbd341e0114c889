//! Symbol interning.
//!
//! Every identifier in a compilation unit is interned once so that equality
//! and hashing on names are integer operations. The interner is an ordinary
//! value owned by the unit being compiled; there is no process-wide table.

use lasso::{Rodeo, Spur};
use std::fmt;

/// An interned identifier. Two symbols from the same [`Interner`] are equal
/// exactly when their text is equal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Symbol(Spur);

impl Symbol {
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.0)
    }
}

/// Single-threaded string interner scoped to one compilation unit.
#[derive(Default)]
pub struct Interner {
    rodeo: Rodeo,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the existing symbol if it was seen before.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Symbol {
        Symbol(self.rodeo.get_or_intern(s))
    }

    #[inline]
    pub fn intern_static(&mut self, s: &'static str) -> Symbol {
        Symbol(self.rodeo.get_or_intern_static(s))
    }

    /// Look up a string without interning it.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.rodeo.get(s).map(Symbol)
    }

    #[inline]
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.rodeo.resolve(&symbol.0)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}
