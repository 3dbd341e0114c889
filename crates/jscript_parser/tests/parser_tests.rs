//! Parser integration tests.

use jscript_ast::node::{FunctionKind, NodeKind};
use jscript_ast::{Ast, NodeFlags};
use jscript_parser::{ParseError, Parser, DEFAULT_MAX_NESTING_DEPTH};
use jscript_scanner::Scanner;

fn parse(source: &str) -> Ast {
    match Parser::new(source).parse() {
        Ok(ast) => ast,
        Err(e) => panic!("parse failed for {source:?}: {e}"),
    }
}

fn dump(source: &str) -> String {
    parse(source).dump()
}

/// Helper: the function kinds in allocation order.
fn function_kinds(ast: &Ast) -> Vec<FunctionKind> {
    (0..ast.len())
        .filter_map(|i| ast.function(jscript_ast::NodeId::new(i)).map(|f| f.kind))
        .collect()
}

#[test]
fn test_empty_program() {
    assert_eq!(dump(""), "(program)");
    assert_eq!(dump("  // nothing\n"), "(program)");
}

#[test]
fn test_var_declarations() {
    assert_eq!(dump("var a, b = 1;"), "(program (var (a) (b 1.0)))");
}

#[test]
fn test_operator_precedence_chain() {
    assert_eq!(dump("a || b && c | d ^ e & f;"), "(program (expr (|| a (&& b (| c (^ d (& e f)))))))");
    assert_eq!(dump("a == b < c << d + e * f;"), "(program (expr (== a (< b (<< c (+ d (* e f)))))))");
    assert_eq!(dump("a - b - c;"), "(program (expr (- (- a b) c)))");
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(dump("a = b += c;"), "(program (expr (= a (+= b c))))");
}

#[test]
fn test_conditional() {
    assert_eq!(dump("x = a ? b : c ? d : e;"), "(program (expr (= x (? a b (? c d e)))))");
}

#[test]
fn test_unary_and_update() {
    assert_eq!(dump("typeof -x;"), "(program (expr (typeof (- x))))");
    assert_eq!(dump("++a; b--;"), "(program (expr (pre++ a)) (expr (post-- b)))");
}

#[test]
fn test_postfix_not_across_line_break() {
    assert_eq!(dump("a\n++b"), "(program (expr a) (expr (pre++ b)))");
}

#[test]
fn test_member_index_and_call() {
    assert_eq!(dump("a.b[c](d, e).f;"), "(program (expr (. (call ([] (. a b) c) d e) f)))");
    assert_eq!(dump("x.if;"), "(program (expr (. x if)))");
}

#[test]
fn test_new_binds_argument_list() {
    let ast = parse("new Foo(1).bar();");
    assert_eq!(ast.dump(), "(program (expr (call (. (new Foo 1.0) bar))))");
    let news: Vec<_> = (0..ast.len())
        .map(jscript_ast::NodeId::new)
        .filter(|&id| matches!(ast.kind(id), NodeKind::New { .. }))
        .collect();
    assert_eq!(news.len(), 1);
    assert!(ast.node(news[0]).flags.contains(NodeFlags::HAS_ARGUMENTS));
}

#[test]
fn test_new_without_arguments() {
    assert_eq!(dump("new a.b;"), "(program (expr (new (. a b))))");
    assert_eq!(dump("new new X()();"), "(program (expr (new (new X))))");
}

#[test]
fn test_literals() {
    assert_eq!(
        dump("[1, , 2,]; ({a: 1, 'b': 2, 3: c});"),
        "(program (expr (array 1.0 _ 2.0)) (expr (object (a 1.0) (\"b\" 2.0) (3.0 c))))"
    );
    assert_eq!(dump("x = /ab+c/gi;"), "(program (expr (= x /ab+c/gi)))");
    assert_eq!(dump("null; true; this;"), "(program (expr null) (expr true) (expr this))");
}

#[test]
fn test_invalid_regexp_flags() {
    let result = Parser::new("x = /a/q;").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "invalid_regexp_flags"));
}

#[test]
fn test_statements() {
    assert_eq!(
        dump("while (a) b(); do c(); while (d) for (;;) break;"),
        "(program (while a (expr (call b))) (do (expr (call c)) d) (for _ _ _ (break)))"
    );
    assert_eq!(dump("for (var i = 0; i < n; i++) ;"), "(program (for (var (i 0.0)) (< i n) (post++ i) (empty)))");
    assert_eq!(dump("for (var k in o) ;"), "(program (for-in (var (k)) o (empty)))");
    assert_eq!(dump("for (a.b in o) ;"), "(program (for-in (. a b) o (empty)))");
}

#[test]
fn test_for_in_requires_reference() {
    let result = Parser::new("for (a + b in o) ;").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "invalid_for_in_target"));
}

#[test]
fn test_in_operator_allowed_inside_parentheses_of_for_init() {
    assert_eq!(dump("for (x = (a in b); x; ) ;"), "(program (for (= x (in a b)) x _ (empty)))");
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    assert_eq!(dump("if (a) if (b) c; else d;"), "(program (if a (if b (expr c) (expr d)) _))");
}

#[test]
fn test_switch_and_try() {
    assert_eq!(
        dump("switch (x) { case 1: a; default: b; case 2: }"),
        "(program (switch x (case 1.0 (expr a)) (default (expr b)) (case 2.0)))"
    );
    assert_eq!(
        dump("try { a; } catch (e) { b; } finally { c; }"),
        "(program (try (block (expr a)) (catch e (block (expr b))) (block (expr c))))"
    );
}

#[test]
fn test_try_without_handler() {
    let result = Parser::new("try { a; }").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "catch_or_finally_expected"));
}

#[test]
fn test_duplicate_default() {
    let result = Parser::new("switch (x) { default: default: }").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "multiple_default_clauses"));
}

#[test]
fn test_labels_break_continue() {
    assert_eq!(
        dump("outer: for (;;) { continue outer; break; }"),
        "(program (label outer (for _ _ _ (block (continue outer) (break)))))"
    );
}

#[test]
fn test_with_and_debugger() {
    assert_eq!(dump("with (o) x; debugger;"), "(program (with o (expr x)) (debugger))");
}

#[test]
fn test_restricted_productions() {
    assert_eq!(dump("function f() { return\n1; }"), "(program (function-statement f () (return) (expr 1.0)))");
    assert_eq!(dump("a: while (1) { break\na; }"), "(program (label a (while 1.0 (block (break) (expr a)))))");

    let result = Parser::new("throw\nx;").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "newline_after_throw"));
}

#[test]
fn test_asi_flags_statement() {
    let ast = parse("a = 1\nb = 2;");
    let root = ast.root().unwrap();
    let NodeKind::Program { body } = ast.kind(root) else { unreachable!() };
    assert!(ast.node(body[0]).flags.contains(NodeFlags::ASI_TERMINATED));
    assert!(!ast.node(body[1]).flags.contains(NodeFlags::ASI_TERMINATED));
}

#[test]
fn test_missing_semicolon_on_same_line_is_error() {
    let result = Parser::new("a b;").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "unexpected_token"));
}

#[test]
fn test_function_classification() {
    let ast = parse("function f() { function g() {} } if (x) { function h() {} } var v = function () {};");
    assert_eq!(
        function_kinds(&ast),
        vec![
            FunctionKind::Statement,
            FunctionKind::Statement,
            FunctionKind::ExpressionStatement,
            FunctionKind::Expression,
        ]
    );
}

#[test]
fn test_function_statement_in_nested_position_followed_by_call() {
    let ast = parse("{ function () { return 1; }(); }");
    assert_eq!(function_kinds(&ast), vec![FunctionKind::Expression]);
    assert_eq!(ast.dump(), "(program (block (expr (call (function _ () (return 1.0))))))");
}

#[test]
fn test_hoisted_declaration_is_not_called_by_following_parens() {
    assert_eq!(dump("function f() {}\n(1);"), "(program (function-statement f ()) (expr 1.0))");
}

#[test]
fn test_dangling_else_error_recovers() {
    let parser = Parser::new("if (a) else ;\nvar ok = 1;");
    let (ast, diagnostics) = parser.parse_with_recovery().unwrap();
    let errors: Vec<_> = diagnostics.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message_key, "unexpected_token");
    assert_eq!((errors[0].line, errors[0].column), (1, 8));
    assert!(ast.dump().contains("(var (ok 1.0))"));
}

#[test]
fn test_multiple_errors_in_one_pass() {
    let parser = Parser::new("var = 1;\nx = ;\ny = 2;");
    let (ast, diagnostics) = parser.parse_with_recovery().unwrap();
    assert_eq!(diagnostics.error_count(), 2);
    assert!(ast.dump().contains("(= y 2.0)"));
}

#[test]
fn test_errors_inside_block_stay_inside() {
    let parser = Parser::new("{ a b; c; }\nd;");
    let (ast, diagnostics) = parser.parse_with_recovery().unwrap();
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(ast.dump(), "(program (block (expr c)) (expr d))");
}

#[test]
fn test_scanner_errors_are_not_duplicated() {
    let parser = Parser::new("x = 'unterminated\ny = 1;");
    let (_, diagnostics) = parser.parse_with_recovery().unwrap();
    assert_eq!(diagnostics.error_count(), 1);
    assert!(diagnostics.contains_key("unterminated_string_literal"));
}

#[test]
fn test_unexpected_end_of_input() {
    let result = Parser::new("x = (1 + ").parse();
    assert!(matches!(&result, Err(e) if e.message_key() == "unexpected_end_of_input"));
}

#[test]
fn test_nesting_limit() {
    let deep = format!("x = {}1{};", "[".repeat(300), "]".repeat(300));
    match Parser::new(&deep).parse() {
        Err(ParseError::NestingTooDeep { limit, .. }) => assert_eq!(limit, DEFAULT_MAX_NESTING_DEPTH),
        other => panic!("expected nesting error, got {other:?}"),
    }
}

#[test]
fn test_long_operator_chain_counts_as_nesting() {
    let chain = format!("var s = ''{};", " + 'x'".repeat(20_000));
    assert!(matches!(Parser::new(&chain).parse(), Err(ParseError::NestingTooDeep { .. })));

    let calls = format!("f{};", "()".repeat(20_000));
    assert!(matches!(Parser::new(&calls).parse(), Err(ParseError::NestingTooDeep { .. })));

    let members = format!("o{};", ".p[0]".repeat(20_000));
    assert!(matches!(Parser::new(&members).parse(), Err(ParseError::NestingTooDeep { .. })));
}

#[test]
fn test_fatal_error_keeps_earlier_diagnostics() {
    let source = format!("var n = 017;\nvar = 1;\nx = {}1{};", "(".repeat(20), ")".repeat(20));
    let error = match Parser::new(&source).with_max_nesting_depth(8).parse_with_recovery() {
        Err(error) => error,
        Ok(_) => panic!("expected nesting error"),
    };
    assert_eq!(error.message_key(), "nesting_too_deep");
    let diagnostics = error.into_diagnostics("a.js");
    assert!(diagnostics.contains_key("legacy_octal_literal"));
    assert!(diagnostics.contains_key("nesting_too_deep"));
    assert!(diagnostics.error_count() >= 2);
    let lines: Vec<u32> = diagnostics.diagnostics().iter().map(|d| d.line).collect();
    assert_eq!(lines.first(), Some(&1));
    assert_eq!(lines.last(), Some(&3));
}

#[test]
fn test_chain_below_limit_parses() {
    let chain = format!("var s = ''{};", " + 'x'".repeat(50));
    assert!(Parser::new(&chain).parse().is_ok());
    let calls = format!("f{}.g;", "()".repeat(50));
    assert!(Parser::new(&calls).parse().is_ok());
}

#[test]
fn test_chain_depth_is_released_after_expression() {
    // Each statement's chain is charged separately.
    let statement = format!("x = a{};\n", " + a".repeat(60));
    let source = statement.repeat(10);
    assert!(Parser::new(&source).parse().is_ok());
}

#[test]
fn test_source_name_and_start_line_flow_into_diagnostics() {
    let scanner = Scanner::new("\n  )").with_source_name("inline.js").with_start_line(40);
    let (ast, diagnostics) = Parser::from_scanner(scanner).parse_with_recovery().unwrap();
    assert_eq!(ast.source_name(), "inline.js");
    let error = diagnostics.errors().next().unwrap();
    assert_eq!(error.source_name, "inline.js");
    assert_eq!((error.line, error.column), (41, 3));
}

#[test]
fn test_parent_links_after_parse() {
    let ast = parse("while (a) { break; }");
    let root = ast.root().unwrap();
    let brk = (0..ast.len())
        .map(jscript_ast::NodeId::new)
        .find(|&id| matches!(ast.kind(id), NodeKind::Break { .. }))
        .unwrap();
    assert!(ast.is_inside_loop(brk));
    assert_eq!(ast.ancestors(brk).last(), Some(root));
}
