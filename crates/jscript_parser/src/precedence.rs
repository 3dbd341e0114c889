//! Operator precedence for binary operators.

use jscript_ast::node::{BinaryOp, EqualityOp, LogicalOp, NodeId, NodeKind, RelationalOp};
use jscript_ast::syntax_kind::SyntaxKind;

/// Binary operator precedence levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    BitwiseOr = 3,
    BitwiseXor = 4,
    BitwiseAnd = 5,
    Equality = 6,
    Relational = 7,
    Shift = 8,
    Additive = 9,
    Multiplicative = 10,
    Invalid = 255,
}

pub fn get_binary_operator_precedence(kind: SyntaxKind) -> OperatorPrecedence {
    match kind {
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::BarToken => OperatorPrecedence::BitwiseOr,
        SyntaxKind::CaretToken => OperatorPrecedence::BitwiseXor,
        SyntaxKind::AmpersandToken => OperatorPrecedence::BitwiseAnd,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => OperatorPrecedence::Equality,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword
        | SyntaxKind::InKeyword => OperatorPrecedence::Relational,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => OperatorPrecedence::Shift,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        _ => OperatorPrecedence::Invalid,
    }
}

/// A binary operator token mapped onto the node family it builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Binary(BinaryOp),
    Relational(RelationalOp),
    Equality(EqualityOp),
    Logical(LogicalOp),
}

impl BinaryOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        let op = match kind {
            SyntaxKind::BarBarToken => Self::Logical(LogicalOp::Or),
            SyntaxKind::AmpersandAmpersandToken => Self::Logical(LogicalOp::And),
            SyntaxKind::BarToken => Self::Binary(BinaryOp::BitOr),
            SyntaxKind::CaretToken => Self::Binary(BinaryOp::BitXor),
            SyntaxKind::AmpersandToken => Self::Binary(BinaryOp::BitAnd),
            SyntaxKind::EqualsEqualsToken => Self::Equality(EqualityOp::Eq),
            SyntaxKind::ExclamationEqualsToken => Self::Equality(EqualityOp::NotEq),
            SyntaxKind::EqualsEqualsEqualsToken => Self::Equality(EqualityOp::StrictEq),
            SyntaxKind::ExclamationEqualsEqualsToken => Self::Equality(EqualityOp::StrictNotEq),
            SyntaxKind::LessThanToken => Self::Relational(RelationalOp::Lt),
            SyntaxKind::GreaterThanToken => Self::Relational(RelationalOp::Gt),
            SyntaxKind::LessThanEqualsToken => Self::Relational(RelationalOp::LtEq),
            SyntaxKind::GreaterThanEqualsToken => Self::Relational(RelationalOp::GtEq),
            SyntaxKind::InstanceOfKeyword => Self::Relational(RelationalOp::InstanceOf),
            SyntaxKind::InKeyword => Self::Relational(RelationalOp::In),
            SyntaxKind::LessThanLessThanToken => Self::Binary(BinaryOp::Shl),
            SyntaxKind::GreaterThanGreaterThanToken => Self::Binary(BinaryOp::Shr),
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken => Self::Binary(BinaryOp::UShr),
            SyntaxKind::PlusToken => Self::Binary(BinaryOp::Add),
            SyntaxKind::MinusToken => Self::Binary(BinaryOp::Sub),
            SyntaxKind::AsteriskToken => Self::Binary(BinaryOp::Mul),
            SyntaxKind::SlashToken => Self::Binary(BinaryOp::Div),
            SyntaxKind::PercentToken => Self::Binary(BinaryOp::Mod),
            _ => return None,
        };
        Some(op)
    }

    pub fn into_node(self, left: NodeId, right: NodeId) -> NodeKind {
        match self {
            Self::Binary(op) => NodeKind::Binary { op, left, right },
            Self::Relational(op) => NodeKind::Relational { op, left, right },
            Self::Equality(op) => NodeKind::Equality { op, left, right },
            Self::Logical(op) => NodeKind::Logical { op, left, right },
        }
    }
}
