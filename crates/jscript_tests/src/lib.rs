//! jscript_tests: conformance suite harness.
//!
//! Each case compiles a snippet through the whole pipeline and compares
//! the diagnostic keys it produced against an expectation. Results are
//! grouped by category for the summary.

use std::collections::BTreeMap;
use std::fmt::Write;

use jscript_compiler::Compiler;
use jscript_options::CompilerOptions;

/// What a case is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// No diagnostics at all.
    Clean,
    /// Exactly these error keys, in order. Warnings are ignored.
    Errors(Vec<&'static str>),
    /// No errors and exactly these warning keys, in order.
    Warnings(Vec<&'static str>),
}

/// Result for a single conformance case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub category: String,
    pub passed: bool,
    /// Every key produced, as `key@line:column`.
    pub produced: Vec<String>,
}

/// Conformance suite runner.
#[derive(Debug, Default)]
pub struct ConformanceSuite {
    results: Vec<CaseResult>,
}

impl ConformanceSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, category: &str, source: &str, expected: Expectation) {
        self.add_with(name, category, source, CompilerOptions::default(), expected);
    }

    pub fn add_strict(&mut self, name: &str, category: &str, source: &str, expected: Expectation) {
        self.add_with(name, category, source, CompilerOptions::strict(), expected);
    }

    pub fn add_with(
        &mut self,
        name: &str,
        category: &str,
        source: &str,
        options: CompilerOptions,
        expected: Expectation,
    ) {
        let output = Compiler::new(options).compile_str(source);
        let diagnostics = output.diagnostics.diagnostics();
        let errors: Vec<&str> = diagnostics.iter().filter(|d| d.is_error()).map(|d| d.message_key).collect();
        let warnings: Vec<&str> = diagnostics.iter().filter(|d| !d.is_error()).map(|d| d.message_key).collect();

        let passed = match &expected {
            Expectation::Clean => diagnostics.is_empty(),
            Expectation::Errors(keys) => errors == *keys,
            Expectation::Warnings(keys) => errors.is_empty() && warnings == *keys,
        };

        self.results.push(CaseResult {
            name: name.to_string(),
            category: category.to_string(),
            passed,
            produced: diagnostics
                .iter()
                .map(|d| format!("{}@{}:{}", d.message_key, d.line, d.column))
                .collect(),
        });
    }

    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Passed and total counts per category.
    pub fn by_category(&self) -> BTreeMap<&str, (usize, usize)> {
        let mut categories = BTreeMap::new();
        for result in &self.results {
            let entry = categories.entry(result.category.as_str()).or_insert((0, 0));
            if result.passed {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
        categories
    }

    pub fn summary(&self) -> String {
        let total = self.results.len();
        let passed = total - self.failures().count();
        let mut out = String::new();
        let _ = writeln!(out, "=== jscript conformance ===");
        let _ = writeln!(out, "Passed: {} / {}", passed, total);
        for (category, (ok, count)) in self.by_category() {
            let _ = writeln!(out, "  {:<24} {}/{}", category, ok, count);
        }
        let failures: Vec<_> = self.failures().collect();
        if !failures.is_empty() {
            let _ = writeln!(out, "--- Failed ---");
            for failure in failures.iter().take(10) {
                let _ = writeln!(out, "  [{}] {}: {:?}", failure.category, failure.name, failure.produced);
            }
            if failures.len() > 10 {
                let _ = writeln!(out, "  ... and {} more failures", failures.len() - 10);
            }
        }
        out
    }
}
