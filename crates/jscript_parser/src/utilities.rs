//! Parser utility functions.

use jscript_ast::node::{AssignOp, BinaryOp, UnaryOp};
use jscript_ast::syntax_kind::SyntaxKind;

pub fn assignment_operator(kind: SyntaxKind) -> Option<AssignOp> {
    let op = match kind {
        SyntaxKind::EqualsToken => return Some(AssignOp::Assign),
        SyntaxKind::PlusEqualsToken => BinaryOp::Add,
        SyntaxKind::MinusEqualsToken => BinaryOp::Sub,
        SyntaxKind::AsteriskEqualsToken => BinaryOp::Mul,
        SyntaxKind::SlashEqualsToken => BinaryOp::Div,
        SyntaxKind::PercentEqualsToken => BinaryOp::Mod,
        SyntaxKind::LessThanLessThanEqualsToken => BinaryOp::Shl,
        SyntaxKind::GreaterThanGreaterThanEqualsToken => BinaryOp::Shr,
        SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => BinaryOp::UShr,
        SyntaxKind::AmpersandEqualsToken => BinaryOp::BitAnd,
        SyntaxKind::BarEqualsToken => BinaryOp::BitOr,
        SyntaxKind::CaretEqualsToken => BinaryOp::BitXor,
        _ => return None,
    };
    Some(AssignOp::Compound(op))
}

pub fn unary_operator(kind: SyntaxKind) -> Option<UnaryOp> {
    match kind {
        SyntaxKind::PlusToken => Some(UnaryOp::Plus),
        SyntaxKind::MinusToken => Some(UnaryOp::Minus),
        SyntaxKind::TildeToken => Some(UnaryOp::BitNot),
        SyntaxKind::ExclamationToken => Some(UnaryOp::Not),
        SyntaxKind::TypeOfKeyword => Some(UnaryOp::TypeOf),
        SyntaxKind::VoidKeyword => Some(UnaryOp::Void),
        SyntaxKind::DeleteKeyword => Some(UnaryOp::Delete),
        _ => None,
    }
}

/// Regular expression flags: each of `g`, `i`, `m` at most once.
pub fn is_valid_regexp_flags(flags: &str) -> bool {
    let mut seen = [false; 3];
    flags.chars().all(|c| {
        let slot = match c {
            'g' => 0,
            'i' => 1,
            'm' => 2,
            _ => return false,
        };
        !std::mem::replace(&mut seen[slot], true)
    })
}
