//! Active statement labels of the function being resolved.

use jscript_ast::NodeId;
use jscript_core::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLabel {
    pub name: Symbol,
    /// The labelled statement.
    pub statement: NodeId,
    /// Whether the label (possibly through further labels) names a loop.
    pub is_loop: bool,
}

/// Labels currently in scope, innermost last.
#[derive(Debug, Default)]
pub struct LabelTable {
    active: Vec<ActiveLabel>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: Symbol) -> Option<&ActiveLabel> {
        self.active.iter().rev().find(|label| label.name == name)
    }

    pub fn is_active(&self, name: Symbol) -> bool {
        self.lookup(name).is_some()
    }

    pub fn push(&mut self, label: ActiveLabel) {
        self.active.push(label);
    }

    pub fn pop(&mut self) -> Option<ActiveLabel> {
        self.active.pop()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jscript_core::Interner;

    #[test]
    fn test_innermost_label_wins() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut labels = LabelTable::new();

        labels.push(ActiveLabel { name: a, statement: NodeId::new(1), is_loop: false });
        labels.push(ActiveLabel { name: b, statement: NodeId::new(2), is_loop: true });
        assert!(labels.lookup(b).unwrap().is_loop);
        assert_eq!(labels.lookup(a).unwrap().statement, NodeId::new(1));

        labels.pop();
        assert!(!labels.is_active(b));
        assert_eq!(labels.len(), 1);
    }
}
