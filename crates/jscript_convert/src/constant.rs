//! Compile-time evaluation of operators over literal operands.

use crate::conversions::{to_boolean, to_int32, to_number, to_string, to_uint32, type_name, Primitive};
use jscript_ast::node::{BinaryOp, EqualityOp, Literal, LogicalOp, NodeId, NodeKind, RelationalOp, UnaryOp};
use jscript_ast::Ast;
use std::cmp::Ordering;

/// The result of evaluating a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

impl ConstantValue {
    pub fn to_primitive(&self) -> Primitive {
        match self {
            ConstantValue::Number(n) => Primitive::Number(*n),
            ConstantValue::String(s) => Primitive::from(s.as_str()),
            ConstantValue::Boolean(b) => Primitive::Boolean(*b),
            ConstantValue::Null => Primitive::Null,
            ConstantValue::Undefined => Primitive::Undefined,
        }
    }
}

impl From<Primitive> for ConstantValue {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Number(n) => ConstantValue::Number(n),
            Primitive::String(s) => ConstantValue::String(s.to_string()),
            Primitive::Boolean(b) => ConstantValue::Boolean(b),
            Primitive::Null => ConstantValue::Null,
            Primitive::Undefined => ConstantValue::Undefined,
        }
    }
}

/// Evaluate `node` if it is built only from literals and operators on them.
///
/// Identifiers never fold, not even `undefined` or `NaN`, since a script may
/// shadow them.
pub fn evaluate_constant(ast: &Ast, node: NodeId) -> Option<ConstantValue> {
    match ast.kind(node) {
        NodeKind::Literal(literal) => match literal {
            Literal::Null => Some(ConstantValue::Null),
            Literal::Boolean(b) => Some(ConstantValue::Boolean(*b)),
            Literal::Number(n) => Some(ConstantValue::Number(*n)),
            Literal::String(s) => Some(ConstantValue::String(s.clone())),
            Literal::RegExp { .. } => None,
        },
        NodeKind::Unary { op, operand } => fold_unary(*op, &evaluate_constant(ast, *operand)?),
        NodeKind::Binary { op, left, right } => {
            fold_binary(*op, &evaluate_constant(ast, *left)?, &evaluate_constant(ast, *right)?)
        }
        NodeKind::Relational { op, left, right } => {
            fold_relational(*op, &evaluate_constant(ast, *left)?, &evaluate_constant(ast, *right)?)
        }
        NodeKind::Equality { op, left, right } => Some(fold_equality(
            *op,
            &evaluate_constant(ast, *left)?,
            &evaluate_constant(ast, *right)?,
        )),
        NodeKind::Logical { op, left, right } => {
            let left = evaluate_constant(ast, *left)?;
            match fold_logical(*op, &left) {
                Some(short_circuit) => Some(short_circuit),
                None => evaluate_constant(ast, *right),
            }
        }
        NodeKind::Conditional { test, consequent, alternate } => {
            let test = evaluate_constant(ast, *test)?;
            if to_boolean(&test.to_primitive()) {
                evaluate_constant(ast, *consequent)
            } else {
                evaluate_constant(ast, *alternate)
            }
        }
        NodeKind::Comma { expressions } => {
            let mut last = None;
            for &expression in expressions {
                last = Some(evaluate_constant(ast, expression)?);
            }
            last
        }
        _ => None,
    }
}

pub fn fold_unary(op: UnaryOp, operand: &ConstantValue) -> Option<ConstantValue> {
    let value = operand.to_primitive();
    let folded = match op {
        UnaryOp::Plus => ConstantValue::Number(to_number(&value)),
        UnaryOp::Minus => ConstantValue::Number(-to_number(&value)),
        UnaryOp::BitNot => ConstantValue::Number(!to_int32(to_number(&value)) as f64),
        UnaryOp::Not => ConstantValue::Boolean(!to_boolean(&value)),
        UnaryOp::TypeOf => ConstantValue::String(type_name(&value).to_string()),
        UnaryOp::Void => ConstantValue::Undefined,
        // Deleting a non-reference yields true.
        UnaryOp::Delete => ConstantValue::Boolean(true),
    };
    Some(folded)
}

pub fn fold_binary(op: BinaryOp, left: &ConstantValue, right: &ConstantValue) -> Option<ConstantValue> {
    let (left, right) = (left.to_primitive(), right.to_primitive());
    if op == BinaryOp::Add && (matches!(left, Primitive::String(_)) || matches!(right, Primitive::String(_))) {
        let mut text = to_string(&left);
        text.push_str(&to_string(&right));
        return Some(ConstantValue::String(text));
    }

    let (a, b) = (to_number(&left), to_number(&right));
    let shift = to_uint32(b) & 31;
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Shl => to_int32(a).wrapping_shl(shift) as f64,
        BinaryOp::Shr => (to_int32(a) >> shift) as f64,
        BinaryOp::UShr => (to_uint32(a) >> shift) as f64,
        BinaryOp::BitAnd => (to_int32(a) & to_int32(b)) as f64,
        BinaryOp::BitOr => (to_int32(a) | to_int32(b)) as f64,
        BinaryOp::BitXor => (to_int32(a) ^ to_int32(b)) as f64,
    };
    Some(ConstantValue::Number(result))
}

/// `in` and `instanceof` need objects and never fold.
pub fn fold_relational(op: RelationalOp, left: &ConstantValue, right: &ConstantValue) -> Option<ConstantValue> {
    let ordering = compare(&left.to_primitive(), &right.to_primitive());
    let result = match op {
        RelationalOp::Lt => ordering == Some(Ordering::Less),
        RelationalOp::Gt => ordering == Some(Ordering::Greater),
        RelationalOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        RelationalOp::GtEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        RelationalOp::In | RelationalOp::InstanceOf => return None,
    };
    Some(ConstantValue::Boolean(result))
}

pub fn fold_equality(op: EqualityOp, left: &ConstantValue, right: &ConstantValue) -> ConstantValue {
    let (left, right) = (left.to_primitive(), right.to_primitive());
    let result = match op {
        EqualityOp::Eq => loose_equals(&left, &right),
        EqualityOp::NotEq => !loose_equals(&left, &right),
        EqualityOp::StrictEq => strict_equals(&left, &right),
        EqualityOp::StrictNotEq => !strict_equals(&left, &right),
    };
    ConstantValue::Boolean(result)
}

/// The value of `left op right` when `left` alone decides it, else `None`
/// and the result is the right operand.
pub fn fold_logical(op: LogicalOp, left: &ConstantValue) -> Option<ConstantValue> {
    let truthy = to_boolean(&left.to_primitive());
    match (op, truthy) {
        (LogicalOp::And, false) | (LogicalOp::Or, true) => Some(left.clone()),
        _ => None,
    }
}

// ============================================================================
// Comparison helpers
// ============================================================================

/// Abstract relational comparison. `None` when either side is `NaN`.
fn compare(left: &Primitive, right: &Primitive) -> Option<Ordering> {
    if let (Primitive::String(a), Primitive::String(b)) = (left, right) {
        // Strings compare by UTF-16 code units.
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }
    to_number(left).partial_cmp(&to_number(right))
}

fn strict_equals(left: &Primitive, right: &Primitive) -> bool {
    match (left, right) {
        (Primitive::Undefined, Primitive::Undefined) | (Primitive::Null, Primitive::Null) => true,
        (Primitive::Boolean(a), Primitive::Boolean(b)) => a == b,
        (Primitive::Number(a), Primitive::Number(b)) => a == b,
        (Primitive::String(a), Primitive::String(b)) => a == b,
        _ => false,
    }
}

fn loose_equals(left: &Primitive, right: &Primitive) -> bool {
    match (left, right) {
        (Primitive::Undefined | Primitive::Null, Primitive::Undefined | Primitive::Null) => true,
        (Primitive::Undefined | Primitive::Null, _) | (_, Primitive::Undefined | Primitive::Null) => false,
        (Primitive::String(_), Primitive::String(_)) | (Primitive::Boolean(_), Primitive::Boolean(_)) => {
            strict_equals(left, right)
        }
        _ => to_number(left) == to_number(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> ConstantValue {
        ConstantValue::Number(n)
    }

    fn string(s: &str) -> ConstantValue {
        ConstantValue::String(s.to_string())
    }

    #[test]
    fn test_addition_concatenates_strings() {
        assert_eq!(fold_binary(BinaryOp::Add, &num(1.0), &num(2.0)), Some(num(3.0)));
        assert_eq!(fold_binary(BinaryOp::Add, &string("a"), &num(1.0)), Some(string("a1")));
        assert_eq!(fold_binary(BinaryOp::Add, &ConstantValue::Null, &string("")), Some(string("null")));
        assert_eq!(fold_binary(BinaryOp::Add, &ConstantValue::Boolean(true), &num(1.0)), Some(num(2.0)));
    }

    #[test]
    fn test_shifts_wrap() {
        assert_eq!(fold_binary(BinaryOp::Shl, &num(1.0), &num(33.0)), Some(num(2.0)));
        assert_eq!(fold_binary(BinaryOp::Shr, &num(-8.0), &num(1.0)), Some(num(-4.0)));
        assert_eq!(fold_binary(BinaryOp::UShr, &num(-1.0), &num(0.0)), Some(num(4294967295.0)));
        assert_eq!(fold_binary(BinaryOp::BitOr, &num(2147483648.0), &num(0.0)), Some(num(-2147483648.0)));
    }

    #[test]
    fn test_equality() {
        assert_eq!(fold_equality(EqualityOp::Eq, &ConstantValue::Null, &ConstantValue::Undefined), ConstantValue::Boolean(true));
        assert_eq!(fold_equality(EqualityOp::StrictEq, &ConstantValue::Null, &ConstantValue::Undefined), ConstantValue::Boolean(false));
        assert_eq!(fold_equality(EqualityOp::Eq, &string("1"), &num(1.0)), ConstantValue::Boolean(true));
        assert_eq!(fold_equality(EqualityOp::Eq, &ConstantValue::Null, &num(0.0)), ConstantValue::Boolean(false));
        assert_eq!(fold_equality(EqualityOp::NotEq, &num(f64::NAN), &num(f64::NAN)), ConstantValue::Boolean(true));
    }

    #[test]
    fn test_relational() {
        assert_eq!(fold_relational(RelationalOp::Lt, &string("a"), &string("b")), Some(ConstantValue::Boolean(true)));
        assert_eq!(fold_relational(RelationalOp::Lt, &string("10"), &string("9")), Some(ConstantValue::Boolean(true)));
        assert_eq!(fold_relational(RelationalOp::Lt, &string("10"), &num(9.0)), Some(ConstantValue::Boolean(false)));
        assert_eq!(fold_relational(RelationalOp::GtEq, &num(f64::NAN), &num(1.0)), Some(ConstantValue::Boolean(false)));
        assert_eq!(fold_relational(RelationalOp::In, &string("a"), &num(1.0)), None);
    }

    #[test]
    fn test_unary() {
        assert_eq!(fold_unary(UnaryOp::TypeOf, &ConstantValue::Null), Some(string("object")));
        assert_eq!(fold_unary(UnaryOp::BitNot, &num(0.0)), Some(num(-1.0)));
        assert_eq!(fold_unary(UnaryOp::Not, &string("")), Some(ConstantValue::Boolean(true)));
        assert_eq!(fold_unary(UnaryOp::Void, &num(0.0)), Some(ConstantValue::Undefined));
        assert_eq!(fold_unary(UnaryOp::Minus, &string("3")), Some(num(-3.0)));
    }

    #[test]
    fn test_logical_short_circuit() {
        assert_eq!(fold_logical(LogicalOp::And, &num(0.0)), Some(num(0.0)));
        assert_eq!(fold_logical(LogicalOp::And, &num(1.0)), None);
        assert_eq!(fold_logical(LogicalOp::Or, &string("x")), Some(string("x")));
    }
}
