//! jscript_compiler: Compiler orchestration.
//!
//! Runs one compilation unit through scanning, parsing and resolution,
//! collecting every diagnostic along the way, and drives an emit backend
//! over the result.

use std::io::Read;

use jscript_ast::Ast;
use jscript_binder::{resolve, Resolution, ResolverOptions};
use jscript_diagnostics::DiagnosticCollection;
use jscript_emitter::{Backend, EmitResult, Emitter};
use jscript_options::CompilerOptions;
use jscript_parser::Parser;
use jscript_scanner::Scanner;
use tracing::debug;

/// Everything one compilation produced.
#[derive(Debug)]
pub struct CompileOutput {
    pub ast: Ast,
    pub resolution: Resolution,
    /// Scanner, parser and resolver diagnostics, sorted by position.
    pub diagnostics: DiagnosticCollection,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// The compiler holds the options shared by every unit it compiles.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    pub options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compile in-memory source text.
    pub fn compile_str(&self, source_text: &str) -> CompileOutput {
        self.compile(Scanner::new(source_text))
    }

    /// Compile source pulled incrementally from a reader. Read failures
    /// are reported as diagnostics.
    pub fn compile_reader<R: Read + 'static>(&self, reader: R) -> CompileOutput {
        self.compile(Scanner::from_reader(reader))
    }

    fn compile(&self, scanner: Scanner) -> CompileOutput {
        let options = &self.options;
        let mut scanner = scanner
            .with_source_name(options.source_name.clone())
            .with_start_line(options.start_line)
            .with_strict(options.strict);
        scanner.set_warn_on_legacy_octal(options.warn_on_legacy_octal);

        // Parse
        debug!(source = %options.source_name, strict = options.strict, "parsing");
        let parser = Parser::from_scanner(scanner).with_max_nesting_depth(options.max_nesting_depth);
        let (mut ast, mut diagnostics) = match parser.parse_with_recovery() {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(%error, "parse aborted");
                (Ast::new(options.source_name.clone()), error.into_diagnostics(&options.source_name))
            }
        };

        // Resolve
        debug!(nodes = ast.len(), "resolving");
        let resolver_options = ResolverOptions {
            strict: options.strict,
            predefined_globals: options.predefined_globals.clone(),
        };
        let (resolution, resolve_diagnostics) = resolve(&mut ast, &resolver_options);
        diagnostics.extend(resolve_diagnostics);
        diagnostics.sort();

        debug!(
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "compiled"
        );
        CompileOutput {
            ast,
            resolution,
            diagnostics,
        }
    }

    /// Drive a backend over a compiled unit.
    pub fn emit<B: Backend>(&self, output: &CompileOutput, backend: &mut B) -> Result<EmitResult, B::Error> {
        debug!(source = %self.options.source_name, "emitting");
        Emitter::new(&output.ast, &output.resolution).emit(backend)
    }
}

/// Compile with default options.
pub fn compile(source_text: &str) -> CompileOutput {
    Compiler::default().compile_str(source_text)
}
