//! AST node definitions.
//!
//! Nodes live in the [`Ast`](crate::Ast) arena and refer to each other by
//! [`NodeId`]. `NodeKind` is a closed sum type over every statement and
//! expression form, so passes over the tree match exhaustively.

use crate::types::NodeFlags;
use jscript_core::text::TextSpan;
use jscript_core::Symbol;
use std::fmt;

/// Index of a node in its arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: TextSpan,
    /// 1-based line of the first token.
    pub line: u32,
    /// 1-based column of the first token.
    pub column: u32,
    pub flags: NodeFlags,
    /// Back-reference to the owning node. Never an ownership edge.
    pub parent: Option<NodeId>,
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn text(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }

    pub fn is_word(self) -> bool {
        matches!(self, UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn text(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Arithmetic, shift and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    pub fn text(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOp {
    Lt,
    Gt,
    LtEq,
    GtEq,
    In,
    InstanceOf,
}

impl RelationalOp {
    pub fn text(self) -> &'static str {
        match self {
            RelationalOp::Lt => "<",
            RelationalOp::Gt => ">",
            RelationalOp::LtEq => "<=",
            RelationalOp::GtEq => ">=",
            RelationalOp::In => "in",
            RelationalOp::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqualityOp {
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
}

impl EqualityOp {
    pub fn text(self) -> &'static str {
        match self {
            EqualityOp::Eq => "==",
            EqualityOp::NotEq => "!=",
            EqualityOp::StrictEq => "===",
            EqualityOp::StrictNotEq => "!==",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn text(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// `=` or a compound assignment; compound forms carry their binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

impl AssignOp {
    pub fn text(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Compound(BinaryOp::Add) => "+=",
            AssignOp::Compound(BinaryOp::Sub) => "-=",
            AssignOp::Compound(BinaryOp::Mul) => "*=",
            AssignOp::Compound(BinaryOp::Div) => "/=",
            AssignOp::Compound(BinaryOp::Mod) => "%=",
            AssignOp::Compound(BinaryOp::Shl) => "<<=",
            AssignOp::Compound(BinaryOp::Shr) => ">>=",
            AssignOp::Compound(BinaryOp::UShr) => ">>>=",
            AssignOp::Compound(BinaryOp::BitAnd) => "&=",
            AssignOp::Compound(BinaryOp::BitOr) => "|=",
            AssignOp::Compound(BinaryOp::BitXor) => "^=",
        }
    }
}

// ============================================================================
// Literals and functions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    RegExp { pattern: String, flags: String },
}

/// Key of an object-literal property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Identifier(Symbol),
    String(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub name: PropertyName,
    pub value: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: Symbol,
    pub span: TextSpan,
}

/// How a function literal appeared in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// A declaration at program or function-body level. Hoisted.
    Statement,
    /// A function literal used as a value.
    Expression,
    /// A function literal that forms a whole statement by itself in a nested
    /// position. Its value is discarded and its name is not hoisted.
    ExpressionStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: Option<Symbol>,
    pub params: Vec<Parameter>,
    pub body: Vec<NodeId>,
    pub kind: FunctionKind,
}

// ============================================================================
// NodeKind
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program { body: Vec<NodeId> },

    // -- Expressions --
    Identifier { name: Symbol },
    Literal(Literal),
    This,
    ArrayLiteral { elements: Vec<Option<NodeId>> },
    ObjectLiteral { properties: Vec<ObjectProperty> },
    Function(FunctionNode),
    Member { object: NodeId, property: Symbol },
    Index { object: NodeId, index: NodeId },
    Call { callee: NodeId, arguments: Vec<NodeId> },
    New { callee: NodeId, arguments: Vec<NodeId> },
    Unary { op: UnaryOp, operand: NodeId },
    Update { op: UpdateOp, prefix: bool, operand: NodeId },
    Binary { op: BinaryOp, left: NodeId, right: NodeId },
    Relational { op: RelationalOp, left: NodeId, right: NodeId },
    Equality { op: EqualityOp, left: NodeId, right: NodeId },
    Logical { op: LogicalOp, left: NodeId, right: NodeId },
    Conditional { test: NodeId, consequent: NodeId, alternate: NodeId },
    Assign { op: AssignOp, target: NodeId, value: NodeId },
    Comma { expressions: Vec<NodeId> },

    // -- Statements --
    Block { body: Vec<NodeId> },
    Empty,
    ExpressionStatement { expression: NodeId },
    VarDeclaration { declarators: Vec<NodeId> },
    VariableDeclarator { name: Symbol, init: Option<NodeId> },
    If { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
    While { test: NodeId, body: NodeId },
    DoWhile { body: NodeId, test: NodeId },
    For { init: Option<NodeId>, test: Option<NodeId>, update: Option<NodeId>, body: NodeId },
    /// `left` is a `VarDeclaration` with one declarator or a reference expression.
    ForIn { left: NodeId, right: NodeId, body: NodeId },
    Switch { discriminant: NodeId, clauses: Vec<NodeId> },
    /// A `case` clause, or `default` when `test` is `None`.
    SwitchClause { test: Option<NodeId>, body: Vec<NodeId> },
    Try { block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId> },
    Catch { param: Symbol, body: NodeId },
    Throw { argument: NodeId },
    Return { argument: Option<NodeId> },
    Break { label: Option<Symbol> },
    Continue { label: Option<Symbol> },
    Labelled { label: Symbol, body: NodeId },
    With { object: NodeId, body: NodeId },
    Debugger,
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.for_each_child(|id| out.push(id));
        out
    }

    pub fn for_each_child(&self, mut f: impl FnMut(NodeId)) {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => body.iter().copied().for_each(f),
            NodeKind::Identifier { .. }
            | NodeKind::Literal(_)
            | NodeKind::This
            | NodeKind::Empty
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Debugger => {}
            NodeKind::ArrayLiteral { elements } => elements.iter().flatten().copied().for_each(f),
            NodeKind::ObjectLiteral { properties } => properties.iter().for_each(|p| f(p.value)),
            NodeKind::Function(func) => func.body.iter().copied().for_each(f),
            NodeKind::Member { object, .. } => f(*object),
            NodeKind::Index { object, index } => {
                f(*object);
                f(*index);
            }
            NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
                f(*callee);
                arguments.iter().copied().for_each(f);
            }
            NodeKind::Unary { operand, .. } | NodeKind::Update { operand, .. } => f(*operand),
            NodeKind::Binary { left, right, .. }
            | NodeKind::Relational { left, right, .. }
            | NodeKind::Equality { left, right, .. }
            | NodeKind::Logical { left, right, .. } => {
                f(*left);
                f(*right);
            }
            NodeKind::Conditional { test, consequent, alternate } => {
                f(*test);
                f(*consequent);
                f(*alternate);
            }
            NodeKind::Assign { target, value, .. } => {
                f(*target);
                f(*value);
            }
            NodeKind::Comma { expressions } => expressions.iter().copied().for_each(f),
            NodeKind::ExpressionStatement { expression } => f(*expression),
            NodeKind::VarDeclaration { declarators } => declarators.iter().copied().for_each(f),
            NodeKind::VariableDeclarator { init, .. } => init.iter().copied().for_each(f),
            NodeKind::If { test, consequent, alternate } => {
                f(*test);
                f(*consequent);
                alternate.iter().copied().for_each(f);
            }
            NodeKind::While { test, body } => {
                f(*test);
                f(*body);
            }
            NodeKind::DoWhile { body, test } => {
                f(*body);
                f(*test);
            }
            NodeKind::For { init, test, update, body } => {
                init.iter().chain(test).chain(update).copied().for_each(&mut f);
                f(*body);
            }
            NodeKind::ForIn { left, right, body } => {
                f(*left);
                f(*right);
                f(*body);
            }
            NodeKind::Switch { discriminant, clauses } => {
                f(*discriminant);
                clauses.iter().copied().for_each(f);
            }
            NodeKind::SwitchClause { test, body } => {
                test.iter().chain(body).copied().for_each(f);
            }
            NodeKind::Try { block, handler, finalizer } => {
                f(*block);
                handler.iter().chain(finalizer).copied().for_each(f);
            }
            NodeKind::Catch { body, .. } => f(*body),
            NodeKind::Throw { argument } => f(*argument),
            NodeKind::Return { argument } => argument.iter().copied().for_each(f),
            NodeKind::Labelled { body, .. } => f(*body),
            NodeKind::With { object, body } => {
                f(*object);
                f(*body);
            }
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::While { .. } | NodeKind::DoWhile { .. } | NodeKind::For { .. } | NodeKind::ForIn { .. }
        )
    }

    /// Whether this node is a statement form.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block { .. }
                | NodeKind::Empty
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::VarDeclaration { .. }
                | NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::DoWhile { .. }
                | NodeKind::For { .. }
                | NodeKind::ForIn { .. }
                | NodeKind::Switch { .. }
                | NodeKind::Try { .. }
                | NodeKind::Throw { .. }
                | NodeKind::Return { .. }
                | NodeKind::Break { .. }
                | NodeKind::Continue { .. }
                | NodeKind::Labelled { .. }
                | NodeKind::With { .. }
                | NodeKind::Debugger
        ) || matches!(self, NodeKind::Function(f) if f.kind == FunctionKind::Statement)
    }

    /// Whether this expression can appear as an assignment target.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier { .. } | NodeKind::Member { .. } | NodeKind::Index { .. }
        )
    }

    pub fn as_function(&self) -> Option<&FunctionNode> {
        match self {
            NodeKind::Function(f) => Some(f),
            _ => None,
        }
    }
}
