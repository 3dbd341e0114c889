use jscript_ast::NodeKind;
use jscript_convert::{evaluate_constant, ConstantValue};

fn fold(source: &str) -> Option<ConstantValue> {
    let ast = jscript_parser::parse(source).unwrap();
    let root = ast.root().unwrap();
    let NodeKind::Program { body } = ast.kind(root) else {
        panic!("expected a program");
    };
    let NodeKind::ExpressionStatement { expression } = ast.kind(body[0]) else {
        panic!("expected an expression statement");
    };
    evaluate_constant(&ast, *expression)
}

#[test]
fn test_arithmetic_respects_precedence() {
    assert_eq!(fold("1 + 2 * 3;"), Some(ConstantValue::Number(7.0)));
    assert_eq!(fold("(1 + 2) * 3;"), Some(ConstantValue::Number(9.0)));
    assert_eq!(fold("-(4 % 3);"), Some(ConstantValue::Number(-1.0)));
}

#[test]
fn test_string_operators() {
    assert_eq!(fold("'a' + 1 + 2;"), Some(ConstantValue::String("a12".into())));
    assert_eq!(fold("1 + 2 + 'a';"), Some(ConstantValue::String("3a".into())));
    assert_eq!(fold("typeof 'x';"), Some(ConstantValue::String("string".into())));
}

#[test]
fn test_logical_and_conditional() {
    assert_eq!(fold("0 || 'b';"), Some(ConstantValue::String("b".into())));
    assert_eq!(fold("1 && null;"), Some(ConstantValue::Null));
    assert_eq!(fold("1 < 2 ? 'yes' : 'no';"), Some(ConstantValue::String("yes".into())));
    assert_eq!(fold("0 && x;"), Some(ConstantValue::Number(0.0)));
    assert_eq!(fold("1, 2, 3;"), Some(ConstantValue::Number(3.0)));
}

#[test]
fn test_non_constant_operands() {
    assert_eq!(fold("x + 1;"), None);
    assert_eq!(fold("undefined;"), None);
    assert_eq!(fold("/a/g;"), None);
    assert_eq!(fold("'a' in 1;"), None);
    assert_eq!(fold("1 || x;"), Some(ConstantValue::Number(1.0)));
    assert_eq!(fold("1 && x;"), None);
}
