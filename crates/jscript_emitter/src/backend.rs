//! The backend contract.

use jscript_ast::{Ast, Node, NodeId, NodeKind};
use jscript_binder::{Binding, BindingId, FunctionInfo, Storage};
use jscript_convert::{to_string, ConstantValue};
use std::convert::Infallible;
use std::fmt::Write;

/// How a node's name is bound.
#[derive(Debug, Clone, Copy)]
pub enum Access<'r> {
    /// The node names nothing.
    None,
    /// The node declares a binding.
    Declare { id: BindingId, binding: &'r Binding },
    /// Statically resolved use.
    Static { id: BindingId, binding: &'r Binding },
    /// Look the name up at run time through the dynamic scope stack.
    /// `fallback` is the static binding to use when no scope object has
    /// the name.
    Late { name: &'r str, fallback: Option<BindingId> },
    /// The function's `arguments` object.
    Arguments,
    /// Property access by name; always dispatched by the runtime.
    Property { name: &'r str },
}

impl Access<'_> {
    pub fn is_late(&self) -> bool {
        matches!(self, Access::Late { .. } | Access::Property { .. })
    }
}

/// One resolved node as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct EmitNode<'r> {
    pub id: NodeId,
    pub node: &'r Node,
    pub access: Access<'r>,
    /// Compile-time value of a folded expression. Its operands are not
    /// emitted.
    pub constant: Option<&'r ConstantValue>,
    /// Statement a `break`/`continue` leaves or repeats.
    pub jump_target: Option<NodeId>,
}

impl EmitNode<'_> {
    pub fn kind(&self) -> &NodeKind {
        &self.node.kind
    }
}

/// Receives resolved nodes.
///
/// Children are emitted before their parent. Function bodies are
/// bracketed by `enter_function`/`exit_function`; the program itself is
/// treated as the outermost function.
pub trait Backend {
    type Error;

    fn enter_function(&mut self, _function: NodeId, _info: &FunctionInfo) -> Result<(), Self::Error> {
        Ok(())
    }

    fn emit(&mut self, ast: &Ast, node: EmitNode<'_>) -> Result<(), Self::Error>;

    fn exit_function(&mut self, _function: NodeId, _info: &FunctionInfo) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Writes one line per event. Used to inspect binding decisions.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub lines: Vec<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}

fn storage_text(binding: &Binding) -> String {
    match binding.storage {
        Storage::Global => "global".to_string(),
        Storage::Local { slot } => format!("local {slot}"),
        Storage::Captured => "captured".to_string(),
    }
}

fn kind_text(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Program { .. } => "program",
        NodeKind::Identifier { .. } => "identifier",
        NodeKind::Literal(_) => "literal",
        NodeKind::This => "this",
        NodeKind::ArrayLiteral { .. } => "array",
        NodeKind::ObjectLiteral { .. } => "object",
        NodeKind::Function(_) => "function",
        NodeKind::Member { .. } => "member",
        NodeKind::Index { .. } => "index",
        NodeKind::Call { .. } => "call",
        NodeKind::New { .. } => "new",
        NodeKind::Unary { .. } => "unary",
        NodeKind::Update { .. } => "update",
        NodeKind::Binary { .. } => "binary",
        NodeKind::Relational { .. } => "relational",
        NodeKind::Equality { .. } => "equality",
        NodeKind::Logical { .. } => "logical",
        NodeKind::Conditional { .. } => "conditional",
        NodeKind::Assign { .. } => "assign",
        NodeKind::Comma { .. } => "comma",
        NodeKind::Block { .. } => "block",
        NodeKind::Empty => "empty",
        NodeKind::ExpressionStatement { .. } => "expression-statement",
        NodeKind::VarDeclaration { .. } => "var",
        NodeKind::VariableDeclarator { .. } => "declarator",
        NodeKind::If { .. } => "if",
        NodeKind::While { .. } => "while",
        NodeKind::DoWhile { .. } => "do-while",
        NodeKind::For { .. } => "for",
        NodeKind::ForIn { .. } => "for-in",
        NodeKind::Switch { .. } => "switch",
        NodeKind::SwitchClause { .. } => "clause",
        NodeKind::Try { .. } => "try",
        NodeKind::Catch { .. } => "catch",
        NodeKind::Throw { .. } => "throw",
        NodeKind::Return { .. } => "return",
        NodeKind::Break { .. } => "break",
        NodeKind::Continue { .. } => "continue",
        NodeKind::Labelled { .. } => "label",
        NodeKind::With { .. } => "with",
        NodeKind::Debugger => "debugger",
    }
}

impl Backend for RecordingBackend {
    type Error = Infallible;

    fn enter_function(&mut self, function: NodeId, info: &FunctionInfo) -> Result<(), Infallible> {
        self.lines.push(format!("enter {:?} slots={}", function, info.slot_count));
        Ok(())
    }

    fn emit(&mut self, ast: &Ast, node: EmitNode<'_>) -> Result<(), Infallible> {
        let mut line = kind_text(node.kind()).to_string();
        let _ = match node.access {
            Access::None => Ok(()),
            Access::Declare { binding, .. } => {
                write!(line, " declare {} {}", ast.name(binding.name), storage_text(binding))
            }
            Access::Static { binding, .. } => {
                write!(line, " {} {}", ast.name(binding.name), storage_text(binding))
            }
            Access::Late { name, fallback } => match fallback {
                Some(_) => write!(line, " {name} late with fallback"),
                None => write!(line, " {name} late"),
            },
            Access::Arguments => write!(line, " arguments"),
            Access::Property { name } => write!(line, " .{name} late"),
        };
        if let Some(constant) = node.constant {
            let _ = match constant {
                ConstantValue::String(text) => write!(line, " = {text:?}"),
                other => write!(line, " = {}", to_string(&other.to_primitive())),
            };
        }
        if let Some(target) = node.jump_target {
            let _ = write!(line, " -> {target:?}");
        }
        self.lines.push(line);
        Ok(())
    }

    fn exit_function(&mut self, function: NodeId, _info: &FunctionInfo) -> Result<(), Infallible> {
        self.lines.push(format!("exit {function:?}"));
        Ok(())
    }
}
