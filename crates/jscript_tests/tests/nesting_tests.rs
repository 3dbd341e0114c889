//! Deep and long programs through the whole pipeline.
//!
//! Every tree the parser accepts must resolve, print and emit on a 2 MB
//! thread. Longer chains must be rejected with a diagnostic instead of
//! exhausting the stack.

use std::thread;

use jscript_compiler::{compile, Compiler};
use jscript_emitter::RecordingBackend;
use jscript_parser::{Parser, DEFAULT_MAX_NESTING_DEPTH};
use jscript_printer::print;

const SMALL_STACK: usize = 2 * 1024 * 1024;

fn on_small_stack(f: impl FnOnce() + Send + 'static) {
    thread::Builder::new()
        .stack_size(SMALL_STACK)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

/// The deepest `n` for which `shape(n)` still parses under the default limit.
fn deepest_accepted(shape: fn(usize) -> String) -> usize {
    let limit = DEFAULT_MAX_NESTING_DEPTH as usize;
    (1..=limit)
        .rev()
        .find(|&n| Parser::new(&shape(n)).parse().is_ok())
        .unwrap()
}

fn parens(n: usize) -> String {
    format!("x = {}1{};", "(".repeat(n), ")".repeat(n))
}

fn unary(n: usize) -> String {
    format!("x = {}y;", "!".repeat(n))
}

fn concatenation(n: usize) -> String {
    format!("var s = ''{};", " + 'x'".repeat(n))
}

fn calls(n: usize) -> String {
    format!("f{};", "()".repeat(n))
}

fn members(n: usize) -> String {
    format!("o{};", ".p[0]".repeat(n))
}

fn blocks(n: usize) -> String {
    format!("{}x = 1;{}", "{".repeat(n), "}".repeat(n))
}

fn functions(n: usize) -> String {
    format!("var f = {}0{};", "function () { return ".repeat(n), "; }".repeat(n))
}

fn compile_print_emit(source: &str) {
    let output = compile(source);
    assert!(!output.has_errors(), "{:?}", output.diagnostics.diagnostics());
    assert!(!print(&output.ast).is_empty());
    let mut backend = RecordingBackend::new();
    Compiler::default().emit(&output, &mut backend).unwrap();
}

#[test]
fn test_deepest_accepted_nesting_runs_on_small_stack() {
    let shapes: [fn(usize) -> String; 7] = [parens, unary, concatenation, calls, members, blocks, functions];
    for shape in shapes {
        let depth = deepest_accepted(shape);
        assert!(Parser::new(&shape(depth + 1)).parse().is_err());
        let source = shape(depth);
        on_small_stack(move || compile_print_emit(&source));
    }
}

#[test]
fn test_one_past_the_limit_is_rejected() {
    let depth = deepest_accepted(parens);
    let output = compile(&parens(depth + 1));
    assert!(output.diagnostics.contains_key("nesting_too_deep"));
    assert!(output.ast.root().is_none());
}

#[test]
fn test_long_chains_are_rejected_not_overflowed() {
    let sources = [concatenation(20_000), calls(20_000), members(20_000)];
    for source in sources {
        on_small_stack(move || {
            let output = compile(&source);
            assert!(output.has_errors());
            assert!(output.diagnostics.contains_key("nesting_too_deep"));
            assert!(output.ast.root().is_none());
        });
    }
}

#[test]
fn test_many_short_chains_are_accepted() {
    let statement = format!("s = s{};\n", " + 'x'".repeat(50));
    let source = format!("var s = '';\n{}", statement.repeat(500));
    let output = compile(&source);
    assert!(!output.has_errors(), "{:?}", output.diagnostics.diagnostics());
    assert_eq!(print(&output.ast).lines().count(), 501);
}
