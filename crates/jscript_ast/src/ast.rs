//! The node arena.
//!
//! All nodes of one compilation unit live in a single `Vec`, in allocation
//! order. Children are always allocated before their parent, so a parent
//! link can be filled in when the parent itself is allocated.

use crate::node::{FunctionKind, FunctionNode, Node, NodeId, NodeKind};
use crate::types::NodeFlags;
use jscript_core::text::TextSpan;
use jscript_core::{Interner, Symbol};

/// A parsed compilation unit: the node arena, its root and its symbols.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    interner: Interner,
    source_name: String,
}

impl Ast {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    pub fn with_interner(source_name: impl Into<String>, interner: Interner) -> Self {
        Self {
            source_name: source_name.into(),
            interner,
            ..Self::default()
        }
    }

    /// Allocate a node and point its children back at it.
    pub fn alloc(&mut self, kind: NodeKind, span: TextSpan, line: u32, column: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        kind.for_each_child(|child| {
            if let Some(node) = self.nodes.get_mut(child.index()) {
                node.parent = Some(id);
            }
        });
        self.nodes.push(Node {
            kind,
            span,
            line,
            column,
            flags: NodeFlags::NONE,
            parent: None,
        });
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn add_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.flags |= flags;
        }
    }

    /// Widen a node's span, e.g. to cover surrounding parentheses.
    pub fn set_span(&mut self, id: NodeId, span: TextSpan) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.span = span;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    pub fn intern(&mut self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    #[inline]
    pub fn name(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    pub fn function(&self, id: NodeId) -> Option<&FunctionNode> {
        self.kind(id).as_function()
    }

    /// The nearest function strictly enclosing `id`.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| matches!(self.kind(a), NodeKind::Function(_)))
    }

    /// The nearest enclosing function literal that is an expression, as
    /// opposed to a hoisted declaration.
    pub fn enclosing_function_expression(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&a| {
            matches!(self.kind(a), NodeKind::Function(f) if f.kind != FunctionKind::Statement)
        })
    }

    /// Whether `id` is inside a loop body of the same function.
    pub fn is_inside_loop(&self, id: NodeId) -> bool {
        self.ancestors_in_function(id).any(|a| self.kind(a).is_loop())
    }

    /// Whether `id` is inside a loop or a `switch` of the same function.
    pub fn is_inside_breakable(&self, id: NodeId) -> bool {
        self.ancestors_in_function(id)
            .any(|a| self.kind(a).is_loop() || matches!(self.kind(a), NodeKind::Switch { .. }))
    }

    /// Whether `id` lies in the body of a `with` statement of the same function.
    pub fn is_inside_with(&self, id: NodeId) -> bool {
        let mut child = id;
        for a in self.ancestors_in_function(id) {
            if let NodeKind::With { body, .. } = self.kind(a) {
                if *body == child {
                    return true;
                }
            }
            child = a;
        }
        false
    }

    pub fn is_inside_function(&self, id: NodeId) -> bool {
        self.enclosing_function(id).is_some()
    }

    fn ancestors_in_function(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.ancestors(id)
            .take_while(move |&a| !matches!(self.kind(a), NodeKind::Function(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Literal, Parameter};

    fn span() -> TextSpan {
        TextSpan::default()
    }

    #[test]
    fn test_parent_links() {
        let mut ast = Ast::new("t.js");
        let one = ast.alloc(NodeKind::Literal(Literal::Number(1.0)), span(), 1, 1);
        let stmt = ast.alloc(NodeKind::ExpressionStatement { expression: one }, span(), 1, 1);
        let root = ast.alloc(NodeKind::Program { body: vec![stmt] }, span(), 1, 1);
        ast.set_root(root);

        assert_eq!(ast.parent(one), Some(stmt));
        assert_eq!(ast.parent(stmt), Some(root));
        assert_eq!(ast.parent(root), None);
        assert_eq!(ast.ancestors(one).collect::<Vec<_>>(), vec![stmt, root]);
    }

    #[test]
    fn test_loop_queries_stop_at_function() {
        let mut ast = Ast::new("t.js");
        let brk = ast.alloc(NodeKind::Break { label: None }, span(), 1, 1);
        let f = ast.alloc(
            NodeKind::Function(FunctionNode {
                name: None,
                params: Vec::<Parameter>::new(),
                body: vec![brk],
                kind: FunctionKind::Expression,
            }),
            span(),
            1,
            1,
        );
        let stmt = ast.alloc(NodeKind::ExpressionStatement { expression: f }, span(), 1, 1);
        let test = ast.alloc(NodeKind::Literal(Literal::Boolean(true)), span(), 1, 1);
        let _loop = ast.alloc(NodeKind::While { test, body: stmt }, span(), 1, 1);

        assert!(ast.is_inside_loop(stmt));
        assert!(!ast.is_inside_loop(brk));
        assert_eq!(ast.enclosing_function(brk), Some(f));
        assert_eq!(ast.enclosing_function_expression(brk), Some(f));
    }

    #[test]
    fn test_with_body_detection() {
        let mut ast = Ast::new("t.js");
        let x = ast.intern("x");
        let obj = ast.alloc(NodeKind::Identifier { name: x }, span(), 1, 1);
        let inner = ast.alloc(NodeKind::Identifier { name: x }, span(), 1, 1);
        let body = ast.alloc(NodeKind::ExpressionStatement { expression: inner }, span(), 1, 1);
        ast.alloc(NodeKind::With { object: obj, body }, span(), 1, 1);

        assert!(ast.is_inside_with(inner));
        assert!(!ast.is_inside_with(obj));
    }
}
