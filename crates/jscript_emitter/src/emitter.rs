//! The emit walk.

use crate::backend::{Access, Backend, EmitNode};
use jscript_ast::{Ast, NodeId, NodeKind};
use jscript_binder::{Reference, Resolution};
use tracing::debug;

/// Counts gathered during one emit pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitResult {
    pub nodes: usize,
    pub functions: usize,
    pub late_references: usize,
    pub folded: usize,
}

/// Walks a resolved tree and feeds it to a backend.
pub struct Emitter<'a> {
    ast: &'a Ast,
    resolution: &'a Resolution,
    /// Emit folded expressions as their value instead of their operands.
    pub fold_constants: bool,
}

impl<'a> Emitter<'a> {
    pub fn new(ast: &'a Ast, resolution: &'a Resolution) -> Self {
        Self { ast, resolution, fold_constants: true }
    }

    pub fn emit<B: Backend>(&self, backend: &mut B) -> Result<EmitResult, B::Error> {
        let mut result = EmitResult::default();
        if let Some(root) = self.ast.root() {
            self.emit_node(backend, root, &mut result)?;
        }
        debug!(
            nodes = result.nodes,
            functions = result.functions,
            late = result.late_references,
            folded = result.folded,
            "emit finished"
        );
        Ok(result)
    }

    fn emit_node<B: Backend>(&self, backend: &mut B, id: NodeId, result: &mut EmitResult) -> Result<(), B::Error> {
        let node = self.ast.node(id);
        let constant = self.resolution.constant(id).filter(|_| self.fold_constants);

        let function = match node.kind {
            NodeKind::Program { .. } | NodeKind::Function(_) => self.resolution.function(id),
            _ => None,
        };
        if let Some(info) = function {
            backend.enter_function(id, info)?;
            result.functions += 1;
        }

        if constant.is_some() {
            result.folded += 1;
        } else {
            for child in node.kind.children() {
                self.emit_node(backend, child, result)?;
            }
        }

        let access = self.access(id, &node.kind);
        if access.is_late() {
            result.late_references += 1;
        }
        let emit = EmitNode { id, node, access, constant, jump_target: self.resolution.jump_target(id) };
        backend.emit(self.ast, emit)?;
        result.nodes += 1;

        if let Some(info) = function {
            backend.exit_function(id, info)?;
        }
        Ok(())
    }

    /// The binding decision for a node.
    fn access(&self, id: NodeId, kind: &'a NodeKind) -> Access<'a> {
        if let NodeKind::Member { property, .. } = kind {
            return Access::Property { name: self.ast.name(*property) };
        }
        if let Some(binding_id) = self.resolution.declaration(id) {
            return Access::Declare { id: binding_id, binding: self.resolution.binding(binding_id) };
        }
        match (self.resolution.reference(id), kind) {
            (Some(Reference::Static(binding_id)), _) => {
                Access::Static { id: binding_id, binding: self.resolution.binding(binding_id) }
            }
            (Some(Reference::Late { fallback }), NodeKind::Identifier { name }) => {
                Access::Late { name: self.ast.name(*name), fallback }
            }
            (Some(Reference::Arguments), _) => Access::Arguments,
            _ => Access::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use jscript_binder::{resolve, ResolverOptions};

    #[test]
    fn test_empty_program() {
        let mut ast = jscript_parser::parse("").unwrap();
        let (resolution, _) = resolve(&mut ast, &ResolverOptions::default());
        let mut backend = RecordingBackend::new();
        let result = Emitter::new(&ast, &resolution).emit(&mut backend).unwrap();
        assert_eq!(result.functions, 1);
        assert_eq!(result.nodes, 1);
        assert_eq!(backend.lines.len(), 3);
    }
}
