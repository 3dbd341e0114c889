//! The resolver.
//!
//! Walks the tree once, driven by each node's own children, and decides for
//! every identifier whether it is statically bound or late bound. Along the
//! way it:
//! - hoists `var` and function declarations into their function scope
//! - marks variables referenced from nested functions as captured
//! - validates `break`/`continue` targets, `return`, `delete` and
//!   assignment targets
//! - folds operators over literal operands
//!
//! Errors are reported per node. Resolution of sibling nodes continues, so
//! one pass surfaces every independent problem.

use crate::binding::{Binding, BindingId, BindingKind, Reference, Storage};
use crate::environment::Environment;
use crate::error::ResolveError;
use crate::labels::{ActiveLabel, LabelTable};
use jscript_ast::node::{FunctionKind, FunctionNode, NodeId, NodeKind, Parameter, UnaryOp};
use jscript_ast::Ast;
use jscript_convert::{
    evaluate_constant, fold_binary, fold_equality, fold_logical, fold_relational, fold_unary, to_boolean,
    ConstantValue,
};
use jscript_core::collections::{FxHashMap, FxIndexMap, FxIndexSet};
use jscript_core::Symbol;
use jscript_diagnostics::{DiagnosticCollection, Severity};

/// Settings for one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Undeclared identifiers and redeclarations are errors instead of warnings.
    pub strict: bool,
    /// Host names to predefine in the global scope.
    pub predefined_globals: Vec<String>,
}

/// What the resolver learned about one function, or about the program.
#[derive(Debug, Clone, Default)]
pub struct FunctionInfo {
    /// `None` for the program.
    pub kind: Option<FunctionKind>,
    /// Function nesting depth. The program is 0.
    pub depth: u32,
    /// Binding of the function's own name, if it has one.
    pub name: Option<BindingId>,
    pub params: Vec<BindingId>,
    /// Frame bindings other than parameters, in declaration order.
    pub locals: Vec<BindingId>,
    /// Variables of enclosing functions this function needs, in first-use order.
    pub outer_uses: FxIndexSet<BindingId>,
    pub uses_this: bool,
    pub uses_arguments: bool,
    pub uses_eval: bool,
    pub contains_with: bool,
    pub slot_count: u32,
}

/// Scope bookkeeping after a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub entered: u32,
    pub exited: u32,
    pub final_depth: u32,
}

/// The output of resolution: every binding and every decision made.
#[derive(Debug, Default)]
pub struct Resolution {
    bindings: Vec<Binding>,
    references: FxHashMap<NodeId, Reference>,
    declarations: FxHashMap<NodeId, BindingId>,
    functions: FxIndexMap<NodeId, FunctionInfo>,
    constants: FxHashMap<NodeId, ConstantValue>,
    jump_targets: FxHashMap<NodeId, NodeId>,
    scope_stats: ScopeStats,
}

impl Resolution {
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter().enumerate().map(|(i, b)| (BindingId::new(i), b))
    }

    /// Bindings whose name is `name`, in declaration order.
    pub fn bindings_named(&self, name: Symbol) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings().filter(move |(_, b)| b.name == name)
    }

    /// How the identifier (or initialized declarator) at `node` was resolved.
    pub fn reference(&self, node: NodeId) -> Option<Reference> {
        self.references.get(&node).copied()
    }

    /// The binding a declarator, function, `catch` or `try` node introduced or reused.
    pub fn declaration(&self, node: NodeId) -> Option<BindingId> {
        self.declarations.get(&node).copied()
    }

    /// Metadata for a function node, or for the program root.
    pub fn function(&self, node: NodeId) -> Option<&FunctionInfo> {
        self.functions.get(&node)
    }

    /// Every function in the order resolution reached it. The program comes first.
    pub fn functions(&self) -> impl Iterator<Item = (NodeId, &FunctionInfo)> {
        self.functions.iter().map(|(id, info)| (*id, info))
    }

    /// The folded value of an operator expression over literal operands.
    pub fn constant(&self, node: NodeId) -> Option<&ConstantValue> {
        self.constants.get(&node)
    }

    /// The statement a `break` or `continue` transfers control to.
    pub fn jump_target(&self, node: NodeId) -> Option<NodeId> {
        self.jump_targets.get(&node).copied()
    }

    pub fn scope_stats(&self) -> ScopeStats {
        self.scope_stats
    }
}

/// How an identifier is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Read,
    Write,
    TypeOf,
}

/// Resolve a whole tree.
pub fn resolve(ast: &mut Ast, options: &ResolverOptions) -> (Resolution, DiagnosticCollection) {
    let env = Environment::new(ast.interner_mut(), &options.predefined_globals);
    let ast = &*ast;
    let mut resolver = Resolver::new(ast, env, options.strict);
    if let Some(root) = ast.root() {
        resolver.visit(root);
    }
    resolver.finish()
}

pub struct Resolver<'a> {
    ast: &'a Ast,
    env: Environment,
    strict: bool,
    eval: Option<Symbol>,
    arguments: Option<Symbol>,

    references: FxHashMap<NodeId, Reference>,
    declarations: FxHashMap<NodeId, BindingId>,
    functions: FxIndexMap<NodeId, FunctionInfo>,
    constants: FxHashMap<NodeId, ConstantValue>,
    jump_targets: FxHashMap<NodeId, NodeId>,

    /// The program root and the functions being resolved, innermost last.
    function_stack: Vec<NodeId>,
    labels: LabelTable,
    /// Scope depth of each open `with` body, innermost last.
    with_depths: Vec<u32>,
    diagnostics: DiagnosticCollection,
}

impl<'a> Resolver<'a> {
    /// `env` must have been created over `ast`'s interner.
    pub fn new(ast: &'a Ast, env: Environment, strict: bool) -> Self {
        Self {
            ast,
            env,
            strict,
            eval: ast.interner().get("eval"),
            arguments: ast.interner().get("arguments"),
            references: FxHashMap::default(),
            declarations: FxHashMap::default(),
            functions: FxIndexMap::default(),
            constants: FxHashMap::default(),
            jump_targets: FxHashMap::default(),
            function_stack: Vec::new(),
            labels: LabelTable::new(),
            with_depths: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn finish(mut self) -> (Resolution, DiagnosticCollection) {
        let scope_stats = ScopeStats {
            entered: self.env.scopes_entered(),
            exited: self.env.scopes_exited(),
            final_depth: self.env.depth(),
        };
        if scope_stats.entered != scope_stats.exited || scope_stats.final_depth != 0 {
            tracing::debug!(?scope_stats, "scopes unbalanced after resolution");
        }
        self.diagnostics.sort();
        let resolution = Resolution {
            bindings: self.env.into_bindings(),
            references: self.references,
            declarations: self.declarations,
            functions: self.functions,
            constants: self.constants,
            jump_targets: self.jump_targets,
            scope_stats,
        };
        (resolution, self.diagnostics)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Resolve `node` and its children, recording errors of children and
    /// returning the error of `node` itself, if any.
    pub fn resolve(&mut self, node: NodeId) -> Result<(), ResolveError> {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Program { body } => {
                self.resolve_program(node, body);
                Ok(())
            }

            NodeKind::Identifier { name } => self.resolve_identifier(node, *name, Usage::Read),
            NodeKind::Literal(_) | NodeKind::Empty | NodeKind::Debugger => Ok(()),
            NodeKind::This => {
                if let Some(info) = self.current_info_mut() {
                    info.uses_this = true;
                }
                Ok(())
            }
            NodeKind::ArrayLiteral { elements } => {
                self.visit_all(elements.iter().flatten().copied());
                Ok(())
            }
            NodeKind::ObjectLiteral { properties } => {
                self.visit_all(properties.iter().map(|p| p.value));
                Ok(())
            }
            NodeKind::Function(function) => self.resolve_function(node, function),
            NodeKind::Member { object, .. } => {
                self.visit(*object);
                Ok(())
            }
            NodeKind::Index { object, index } => {
                self.visit(*object);
                self.visit(*index);
                Ok(())
            }
            NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
                self.visit(*callee);
                self.visit_all(arguments.iter().copied());
                Ok(())
            }
            NodeKind::Unary { op, operand } => {
                let result = self.resolve_unary(*op, *operand);
                self.fold(node);
                result
            }
            NodeKind::Update { operand, .. } => {
                self.visit(*operand);
                self.check_assignment_target(*operand)
            }
            NodeKind::Binary { left, right, .. }
            | NodeKind::Relational { left, right, .. }
            | NodeKind::Equality { left, right, .. }
            | NodeKind::Logical { left, right, .. } => {
                self.visit(*left);
                self.visit(*right);
                self.fold(node);
                Ok(())
            }
            NodeKind::Conditional { test, consequent, alternate } => {
                self.visit_all([*test, *consequent, *alternate]);
                self.fold(node);
                Ok(())
            }
            NodeKind::Assign { target, value, .. } => {
                match ast.kind(*target) {
                    NodeKind::Identifier { name } => {
                        let result = self.resolve_identifier(*target, *name, Usage::Write);
                        self.record_result(result);
                    }
                    _ => self.visit(*target),
                }
                self.visit(*value);
                self.check_assignment_target(*target)
            }
            NodeKind::Comma { expressions } => {
                self.visit_all(expressions.iter().copied());
                self.fold(node);
                Ok(())
            }

            NodeKind::Block { body } => {
                self.visit_all(body.iter().copied());
                Ok(())
            }
            NodeKind::ExpressionStatement { expression } => {
                self.visit(*expression);
                Ok(())
            }
            NodeKind::VarDeclaration { declarators } => {
                self.visit_all(declarators.iter().copied());
                Ok(())
            }
            NodeKind::VariableDeclarator { name, init } => self.resolve_declarator(node, *name, *init),
            NodeKind::If { test, consequent, alternate } => {
                self.visit(*test);
                self.visit(*consequent);
                self.visit_all(alternate.iter().copied());
                Ok(())
            }
            NodeKind::While { test, body } => {
                self.visit(*test);
                self.visit(*body);
                Ok(())
            }
            NodeKind::DoWhile { body, test } => {
                self.visit(*body);
                self.visit(*test);
                Ok(())
            }
            NodeKind::For { init, test, update, body } => {
                self.visit_all(init.iter().chain(test).chain(update).copied());
                self.visit(*body);
                Ok(())
            }
            NodeKind::ForIn { left, right, body } => {
                match ast.kind(*left) {
                    NodeKind::Identifier { name } => {
                        let result = self.resolve_identifier(*left, *name, Usage::Write);
                        self.record_result(result);
                    }
                    _ => self.visit(*left),
                }
                self.visit(*right);
                self.visit(*body);
                Ok(())
            }
            NodeKind::Switch { discriminant, clauses } => {
                self.visit(*discriminant);
                self.visit_all(clauses.iter().copied());
                Ok(())
            }
            NodeKind::SwitchClause { test, body } => {
                self.visit_all(test.iter().chain(body).copied());
                Ok(())
            }
            NodeKind::Try { block, handler, finalizer } => {
                self.resolve_try(node, *block, *handler, *finalizer);
                Ok(())
            }
            NodeKind::Catch { param, body } => {
                let (param, body) = (*param, *body);
                self.with_scope(|this| {
                    let binding = this.declare_local(param, BindingKind::CatchVariable, Some(node));
                    this.declarations.insert(node, binding);
                    this.visit(body);
                });
                Ok(())
            }
            NodeKind::Throw { argument } => {
                self.visit(*argument);
                Ok(())
            }
            NodeKind::Return { argument } => {
                self.visit_all(argument.iter().copied());
                if self.in_function() {
                    Ok(())
                } else {
                    let (line, column) = self.position(node);
                    Err(ResolveError::ReturnOutsideFunction { line, column })
                }
            }
            NodeKind::Break { label } => self.resolve_jump(node, *label, false),
            NodeKind::Continue { label } => self.resolve_jump(node, *label, true),
            NodeKind::Labelled { label, body } => self.resolve_labelled(node, *label, *body),
            NodeKind::With { object, body } => {
                if let Some(info) = self.current_info_mut() {
                    info.contains_with = true;
                }
                self.visit(*object);
                let body = *body;
                self.with_scope(|this| {
                    this.with_depths.push(this.env.depth());
                    this.visit(body);
                    this.with_depths.pop();
                });
                Ok(())
            }
        }
    }

    /// Resolve a child, recording its error and carrying on.
    fn visit(&mut self, node: NodeId) {
        let result = self.resolve(node);
        self.record_result(result);
    }

    fn visit_all(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn record_result(&mut self, result: Result<(), ResolveError>) {
        if let Err(error) = result {
            tracing::debug!(key = error.message_key(), "resolve error");
            self.diagnostics
                .add(error.to_diagnostic(self.ast.source_name(), Severity::Error));
        }
    }

    /// Return `error`, or in permissive mode record it as a warning when it
    /// is one of the downgradable kinds.
    fn report(&mut self, error: ResolveError) -> Result<(), ResolveError> {
        if !self.strict && error.is_downgradable() {
            tracing::warn!(key = error.message_key(), "downgraded to a warning in permissive mode");
            self.diagnostics
                .add(error.to_diagnostic(self.ast.source_name(), Severity::Warning));
            Ok(())
        } else {
            Err(error)
        }
    }

    fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.env.enter_scope();
        let result = f(self);
        self.env.exit_scope();
        result
    }

    // ========================================================================
    // Functions and hoisting
    // ========================================================================

    fn resolve_program(&mut self, root: NodeId, body: &[NodeId]) {
        self.functions.insert(root, FunctionInfo::default());
        self.function_stack.push(root);
        self.hoist(body);
        self.detect_eval(root);
        self.visit_all(body.iter().copied());
        self.function_stack.pop();
    }

    fn resolve_function(&mut self, node: NodeId, function: &FunctionNode) -> Result<(), ResolveError> {
        let info = FunctionInfo {
            kind: Some(function.kind),
            depth: self.current_depth() + 1,
            name: self.declarations.get(&node).copied(),
            ..FunctionInfo::default()
        };
        self.functions.insert(node, info);

        let saved_labels = std::mem::take(&mut self.labels);
        self.function_stack.push(node);
        self.with_scope(|this| {
            if function.kind != FunctionKind::Statement {
                if let Some(name) = function.name {
                    let binding = this.declare_local(name, BindingKind::FunctionExpression, Some(node));
                    this.declarations.insert(node, binding);
                    if let Some(info) = this.current_info_mut() {
                        info.name = Some(binding);
                    }
                }
            }
            this.declare_parameters(node, &function.params);
            this.hoist(&function.body);
            this.detect_eval(node);
            this.visit_all(function.body.iter().copied());
        });
        self.function_stack.pop();
        self.labels = saved_labels;
        Ok(())
    }

    fn declare_parameters(&mut self, function: NodeId, params: &[Parameter]) {
        for param in params {
            let duplicate = self
                .env
                .lookup_in_current_scope(param.name)
                .is_some_and(|existing| self.env.binding(existing).kind == BindingKind::FormalParameter);
            if duplicate {
                let (line, column) = self.position(function);
                let name = self.ast.name(param.name).to_string();
                let result = self.report(ResolveError::DuplicateParameter { name, line, column });
                self.record_result(result);
            }
            self.declare_local(param.name, BindingKind::FormalParameter, Some(function));
        }
    }

    /// Declare the function statements of `body`, then every `var` nested in
    /// its statements. Nested functions are left to their own pass.
    fn hoist(&mut self, body: &[NodeId]) {
        let ast = self.ast;
        for &statement in body {
            if let NodeKind::Function(function) = ast.kind(statement) {
                if function.kind == FunctionKind::Statement {
                    if let Some(name) = function.name {
                        self.hoist_function(statement, name);
                    }
                }
            }
        }
        for &statement in body {
            self.hoist_vars(statement);
        }
    }

    fn hoist_function(&mut self, node: NodeId, name: Symbol) {
        let redeclared = self
            .env
            .lookup_in_current_scope(name)
            .is_some_and(|existing| self.env.binding(existing).kind == BindingKind::FunctionDeclaration);
        if redeclared {
            let (line, column) = self.position(node);
            let text = self.ast.name(name).to_string();
            let result = self.report(ResolveError::DuplicateDeclaration { name: text, line, column });
            self.record_result(result);
        }
        // The later declaration shadows the earlier one.
        let binding = self.declare_local(name, BindingKind::FunctionDeclaration, Some(node));
        self.declarations.insert(node, binding);
    }

    fn hoist_vars(&mut self, node: NodeId) {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::VarDeclaration { declarators } => {
                for &declarator in declarators {
                    if let NodeKind::VariableDeclarator { name, .. } = ast.kind(declarator) {
                        self.hoist_var(declarator, *name);
                    }
                }
            }
            NodeKind::Block { body } | NodeKind::SwitchClause { body, .. } => {
                body.iter().for_each(|&statement| self.hoist_vars(statement));
            }
            NodeKind::If { consequent, alternate, .. } => {
                self.hoist_vars(*consequent);
                alternate.iter().for_each(|&statement| self.hoist_vars(statement));
            }
            NodeKind::While { body, .. }
            | NodeKind::DoWhile { body, .. }
            | NodeKind::Labelled { body, .. }
            | NodeKind::With { body, .. }
            | NodeKind::Catch { body, .. } => self.hoist_vars(*body),
            NodeKind::For { init, body, .. } => {
                init.iter().for_each(|&init| self.hoist_vars(init));
                self.hoist_vars(*body);
            }
            NodeKind::ForIn { left, body, .. } => {
                self.hoist_vars(*left);
                self.hoist_vars(*body);
            }
            NodeKind::Switch { clauses, .. } => clauses.iter().for_each(|&clause| self.hoist_vars(clause)),
            NodeKind::Try { block, handler, finalizer } => {
                self.hoist_vars(*block);
                handler.iter().chain(finalizer).for_each(|&part| self.hoist_vars(part));
            }
            _ => {}
        }
    }

    fn hoist_var(&mut self, declarator: NodeId, name: Symbol) {
        if let Some(existing) = self.env.lookup_in_current_scope(name) {
            if self.env.binding(existing).kind.is_var_reusable() {
                self.declarations.insert(declarator, existing);
                return;
            }
        }
        let binding = self.declare_local(name, BindingKind::VariableDeclaration, Some(declarator));
        self.declarations.insert(declarator, binding);
    }

    /// Flag the current function if it calls `eval` and `eval` is the global one.
    fn detect_eval(&mut self, function: NodeId) {
        let Some(eval) = self.eval else {
            return;
        };
        let global_eval = self
            .env
            .lookup(eval)
            .map_or(true, |id| self.env.binding(id).kind == BindingKind::GlobalBuiltin);
        if !global_eval {
            return;
        }

        let ast = self.ast;
        let mut found = false;
        let mut stack = ast.kind(function).children();
        while let Some(node) = stack.pop() {
            match ast.kind(node) {
                NodeKind::Function(_) => continue,
                NodeKind::Call { callee, .. } => {
                    if matches!(ast.kind(*callee), NodeKind::Identifier { name } if *name == eval) {
                        found = true;
                        break;
                    }
                }
                _ => {}
            }
            ast.kind(node).for_each_child(|child| stack.push(child));
        }
        if found {
            if let Some(info) = self.current_info_mut() {
                info.uses_eval = true;
            }
        }
    }

    /// Declare a binding in the current frame and assign it a slot.
    fn declare_local(&mut self, name: Symbol, kind: BindingKind, declaration: Option<NodeId>) -> BindingId {
        let owner = self.function_stack.last().copied();
        let function_depth = self.current_depth();
        let lexical_depth = self.env.depth();
        let slot = match self.current_info_mut() {
            Some(info) => {
                info.slot_count += 1;
                info.slot_count - 1
            }
            None => 0,
        };
        let id = self.env.declare(
            name,
            Binding {
                name,
                kind,
                declaration,
                owner,
                function_depth,
                lexical_depth,
                storage: Storage::Local { slot },
            },
        );
        if let Some(info) = self.current_info_mut() {
            if kind == BindingKind::FormalParameter {
                info.params.push(id);
            } else {
                info.locals.push(id);
            }
        }
        id
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn resolve_identifier(&mut self, node: NodeId, name: Symbol, usage: Usage) -> Result<(), ResolveError> {
        let reference = match self.env.lookup(name) {
            Some(binding) => {
                self.note_use(binding);
                let lexical_depth = self.env.binding(binding).lexical_depth;
                match self.with_depths.last() {
                    Some(&with_depth) if lexical_depth < with_depth => Reference::Late { fallback: Some(binding) },
                    _ => Reference::Static(binding),
                }
            }
            None if Some(name) == self.arguments && self.in_function() => {
                if let Some(info) = self.current_info_mut() {
                    info.uses_arguments = true;
                }
                Reference::Arguments
            }
            None => {
                self.references.insert(node, Reference::Late { fallback: None });
                if usage == Usage::TypeOf || !self.with_depths.is_empty() || self.eval_in_scope() {
                    return Ok(());
                }
                let (line, column) = self.position(node);
                let name = self.ast.name(name).to_string();
                tracing::debug!(%name, ?usage, "undeclared identifier");
                return self.report(ResolveError::UndeclaredIdentifier { name, line, column });
            }
        };
        self.references.insert(node, reference);
        Ok(())
    }

    /// Mark `binding` captured if it belongs to an enclosing function, and
    /// record it in every function between the use and the owner.
    fn note_use(&mut self, binding: BindingId) {
        let (kind, owner_depth, name) = {
            let b = self.env.binding(binding);
            (b.kind, b.function_depth, b.name)
        };
        if kind == BindingKind::GlobalBuiltin || owner_depth >= self.current_depth() {
            return;
        }
        if !self.env.binding(binding).is_captured() {
            tracing::trace!(name = self.ast.name(name), "variable captured by nested function");
            self.env.binding_mut(binding).storage = Storage::Captured;
        }
        for function in self.function_stack.iter().rev() {
            let Some(info) = self.functions.get_mut(function) else {
                continue;
            };
            if info.depth <= owner_depth {
                break;
            }
            info.outer_uses.insert(binding);
        }
    }

    fn eval_in_scope(&self) -> bool {
        self.function_stack
            .iter()
            .any(|f| self.functions.get(f).is_some_and(|info| info.uses_eval))
    }

    fn resolve_declarator(&mut self, node: NodeId, name: Symbol, init: Option<NodeId>) -> Result<(), ResolveError> {
        if !self.declarations.contains_key(&node) {
            // Declarators outside a hoisted body, e.g. when resolving a detached subtree.
            let binding = self.declare_local(name, BindingKind::VariableDeclaration, Some(node));
            self.declarations.insert(node, binding);
        }
        match init {
            Some(init) => {
                self.visit(init);
                self.resolve_identifier(node, name, Usage::Write)
            }
            None => Ok(()),
        }
    }

    fn resolve_unary(&mut self, op: UnaryOp, operand: NodeId) -> Result<(), ResolveError> {
        let NodeKind::Identifier { name } = self.ast.kind(operand) else {
            self.visit(operand);
            return Ok(());
        };
        let name = *name;
        match op {
            UnaryOp::TypeOf => self.resolve_identifier(operand, name, Usage::TypeOf),
            UnaryOp::Delete => {
                let result = self.resolve_identifier(operand, name, Usage::Read);
                self.record_result(result);
                match self.references.get(&operand) {
                    Some(Reference::Static(binding))
                        if self.env.binding(*binding).kind != BindingKind::GlobalBuiltin =>
                    {
                        let (line, column) = self.position(operand);
                        Err(ResolveError::IllegalDeleteTarget {
                            name: self.ast.name(name).to_string(),
                            line,
                            column,
                        })
                    }
                    _ => Ok(()),
                }
            }
            _ => self.resolve_identifier(operand, name, Usage::Read),
        }
    }

    fn check_assignment_target(&self, target: NodeId) -> Result<(), ResolveError> {
        if self.ast.kind(target).is_reference() {
            Ok(())
        } else {
            let (line, column) = self.position(target);
            Err(ResolveError::IllegalAssignmentTarget { line, column })
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn resolve_try(&mut self, node: NodeId, block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId>) {
        if finalizer.is_none() {
            self.visit(block);
            self.visit_all(handler);
            return;
        }
        self.with_scope(|this| {
            let name = this.env.try_variable_name();
            let binding = this.declare_local(name, BindingKind::TryVariable, Some(node));
            this.declarations.insert(node, binding);
            this.visit(block);
            this.visit_all(handler.into_iter().chain(finalizer));
        });
    }

    fn resolve_jump(&mut self, node: NodeId, label: Option<Symbol>, is_continue: bool) -> Result<(), ResolveError> {
        let (line, column) = self.position(node);
        let ast = self.ast;
        let target = match label {
            None => {
                let target = ast
                    .ancestors(node)
                    .take_while(|&a| !matches!(ast.kind(a), NodeKind::Function(_)))
                    .find(|&a| {
                        let kind = ast.kind(a);
                        kind.is_loop() || (!is_continue && matches!(kind, NodeKind::Switch { .. }))
                    });
                match target {
                    Some(target) => target,
                    None if is_continue => return Err(ResolveError::ContinueOutsideLoop { line, column }),
                    None => return Err(ResolveError::BreakOutsideLoop { line, column }),
                }
            }
            Some(label) => {
                let name = || ast.name(label).to_string();
                let Some(active) = self.labels.lookup(label).copied() else {
                    return Err(ResolveError::UndefinedLabel { label: name(), line, column });
                };
                if !is_continue {
                    active.statement
                } else if active.is_loop {
                    self.labelled_body(active.statement)
                } else {
                    return Err(ResolveError::ContinueTargetNotLoop { label: name(), line, column });
                }
            }
        };
        self.jump_targets.insert(node, target);
        Ok(())
    }

    fn resolve_labelled(&mut self, node: NodeId, label: Symbol, body: NodeId) -> Result<(), ResolveError> {
        if self.labels.is_active(label) {
            self.visit(body);
            let (line, column) = self.position(node);
            return Err(ResolveError::DuplicateLabel {
                label: self.ast.name(label).to_string(),
                line,
                column,
            });
        }
        let is_loop = self.ast.kind(self.labelled_body(node)).is_loop();
        self.labels.push(ActiveLabel { name: label, statement: node, is_loop });
        self.visit(body);
        self.labels.pop();
        Ok(())
    }

    /// The statement under a chain of labels.
    fn labelled_body(&self, mut node: NodeId) -> NodeId {
        while let NodeKind::Labelled { body, .. } = self.ast.kind(node) {
            node = *body;
        }
        node
    }

    // ========================================================================
    // Constant folding
    // ========================================================================

    fn fold(&mut self, node: NodeId) {
        if let Some(value) = self.fold_node(node) {
            self.constants.insert(node, value);
        }
    }

    fn constant_of(&self, node: NodeId) -> Option<ConstantValue> {
        match self.ast.kind(node) {
            NodeKind::Literal(_) => evaluate_constant(self.ast, node),
            _ => self.constants.get(&node).cloned(),
        }
    }

    /// Fold `node` from the already folded values of its operands.
    fn fold_node(&self, node: NodeId) -> Option<ConstantValue> {
        match self.ast.kind(node) {
            NodeKind::Unary { op, operand } => fold_unary(*op, &self.constant_of(*operand)?),
            NodeKind::Binary { op, left, right } => {
                fold_binary(*op, &self.constant_of(*left)?, &self.constant_of(*right)?)
            }
            NodeKind::Relational { op, left, right } => {
                fold_relational(*op, &self.constant_of(*left)?, &self.constant_of(*right)?)
            }
            NodeKind::Equality { op, left, right } => {
                Some(fold_equality(*op, &self.constant_of(*left)?, &self.constant_of(*right)?))
            }
            NodeKind::Logical { op, left, right } => {
                let left = self.constant_of(*left)?;
                fold_logical(*op, &left).or_else(|| self.constant_of(*right))
            }
            NodeKind::Conditional { test, consequent, alternate } => {
                let test = self.constant_of(*test)?;
                if to_boolean(&test.to_primitive()) {
                    self.constant_of(*consequent)
                } else {
                    self.constant_of(*alternate)
                }
            }
            NodeKind::Comma { expressions } => {
                let mut last = None;
                for &expression in expressions {
                    last = Some(self.constant_of(expression)?);
                }
                last
            }
            _ => None,
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn current_depth(&self) -> u32 {
        self.function_stack.len().saturating_sub(1) as u32
    }

    fn in_function(&self) -> bool {
        self.function_stack.len() > 1
    }

    fn current_info_mut(&mut self) -> Option<&mut FunctionInfo> {
        let current = self.function_stack.last()?;
        self.functions.get_mut(current)
    }

    fn position(&self, node: NodeId) -> (u32, u32) {
        let node = self.ast.node(node);
        (node.line, node.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_source(source: &str, strict: bool) -> (Ast, Resolution, DiagnosticCollection) {
        let mut ast = jscript_parser::parse(source).unwrap();
        let options = ResolverOptions { strict, ..ResolverOptions::default() };
        let (resolution, diagnostics) = resolve(&mut ast, &options);
        (ast, resolution, diagnostics)
    }

    #[test]
    fn test_program_info_comes_first() {
        let (ast, resolution, _) = resolve_source("function f() {}", false);
        let (first, info) = resolution.functions().next().unwrap();
        assert_eq!(Some(first), ast.root());
        assert_eq!(info.kind, None);
        assert_eq!(info.depth, 0);
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        let (ast, resolution, _) = resolve_source("function f(a, b) { var c; function g() {} }", false);
        let f = resolution
            .functions()
            .find(|(_, info)| info.depth == 1 && info.params.len() == 2)
            .map(|(_, info)| info.clone())
            .unwrap();
        let slots: Vec<_> = f.params.iter().chain(&f.locals).map(|&id| resolution.binding(id).storage).collect();
        assert_eq!(
            slots,
            vec![
                Storage::Local { slot: 0 },
                Storage::Local { slot: 1 },
                Storage::Local { slot: 2 },
                Storage::Local { slot: 3 },
            ]
        );
        let g = ast.interner().get("g").unwrap();
        let (_, g_binding) = resolution.bindings_named(g).next().unwrap();
        assert_eq!(g_binding.kind, BindingKind::FunctionDeclaration);
        assert_eq!(f.slot_count, 4);
    }

    #[test]
    fn test_constants_are_recorded() {
        let (ast, resolution, _) = resolve_source("var x = 2 * 3 + 1;", false);
        let root = ast.root().unwrap();
        let NodeKind::Program { body } = ast.kind(root) else { unreachable!() };
        let NodeKind::VarDeclaration { declarators } = ast.kind(body[0]) else { unreachable!() };
        let NodeKind::VariableDeclarator { init: Some(init), .. } = ast.kind(declarators[0]) else {
            unreachable!()
        };
        assert_eq!(resolution.constant(*init), Some(&ConstantValue::Number(7.0)));
    }
}
