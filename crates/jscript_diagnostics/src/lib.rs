//! jscript_diagnostics: Diagnostic records and the message catalogue.
//!
//! Scanning, parsing and resolution report problems as [`Diagnostic`]
//! records keyed by a stable message key. The engine only produces and
//! collects them; rendering is left to the caller.

use jscript_core::text::{LineAndColumn, TextSpan};
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A catalogue entry: stable key, numeric code, default severity and template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub key: &'static str,
    pub severity: Severity,
    /// Template text. May contain `{0}`, `{1}`, etc. placeholders.
    pub text: &'static str,
}

/// A realized diagnostic with location and resolved message text.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message_key: &'static str,
    pub code: u32,
    pub message: String,
    pub source_name: String,
    pub line: u32,
    pub column: u32,
    pub span: Option<TextSpan>,
    pub severity: Severity,
}

impl Diagnostic {
    /// Create a diagnostic with no location. The severity is the catalogue default.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            message_key: message.key,
            code: message.code,
            message: format_message(message.text, args),
            source_name: String::new(),
            line: 0,
            column: 0,
            span: None,
            severity: message.severity,
        }
    }

    /// Create a diagnostic at a source position.
    pub fn at(
        message: &DiagnosticMessage,
        args: &[&str],
        source_name: &str,
        position: LineAndColumn,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            line: position.line,
            column: position.column,
            ..Self::new(message, args)
        }
    }

    pub fn with_span(mut self, span: TextSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Override the catalogue severity, e.g. to downgrade in permissive mode.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_source_name(mut self, source_name: &str) -> Self {
        self.source_name = source_name.to_string();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn position(&self) -> LineAndColumn {
        LineAndColumn::new(self.line, self.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.source_name.is_empty() {
            write!(f, "{}({},{}): ", self.source_name, self.line, self.column)?;
        }
        write!(f, "{} JS{}: {}", self.severity, self.code, self.message)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated during one compilation, in report order.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Drop everything reported after the first `len` diagnostics.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    /// Whether any diagnostic carries the given message key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.diagnostics.iter().any(|d| d.message_key == key)
    }

    /// Sort diagnostics by source name and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.source_name
                .cmp(&b.source_name)
                .then(a.line.cmp(&b.line))
                .then(a.column.cmp(&b.column))
        });
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

// ============================================================================
// Message catalogue
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $key:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, key: $key, severity: Severity::Error, text: $msg }
        };
        ($code:expr, $key:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, key: $key, severity: Severity::Warning, text: $msg }
        };
    }

    // ========================================================================
    // Scanner (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1001, "unterminated_string_literal", Error, "Unterminated string literal.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1002, "unterminated_comment", Error, "'*/' expected.");
    pub const UNTERMINATED_REGEXP: DiagnosticMessage = diag!(1003, "unterminated_regexp", Error, "Unterminated regular expression literal.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1004, "invalid_character", Error, "Invalid character '{0}'.");
    pub const LEGACY_OCTAL_LITERAL: DiagnosticMessage = diag!(1005, "legacy_octal_literal", Warning, "Octal literal '{0}' uses legacy syntax.");
    pub const INVALID_OCTAL_DIGIT: DiagnosticMessage = diag!(1006, "invalid_octal_digit", Warning, "Digit '{0}' is not valid in an octal literal; '{1}' is read as decimal.");
    pub const HEX_DIGIT_EXPECTED: DiagnosticMessage = diag!(1007, "hex_digit_expected", Error, "Hexadecimal digit expected.");
    pub const DIGIT_EXPECTED: DiagnosticMessage = diag!(1008, "digit_expected", Error, "Digit expected.");
    pub const IDENTIFIER_AFTER_NUMERIC_LITERAL: DiagnosticMessage = diag!(1009, "identifier_after_numeric_literal", Error, "An identifier cannot immediately follow a numeric literal.");
    pub const ESCAPED_KEYWORD: DiagnosticMessage = diag!(1010, "escaped_keyword", Error, "Keyword '{0}' must not contain escaped characters.");
    pub const RESERVED_WORD_AS_IDENTIFIER: DiagnosticMessage = diag!(1011, "reserved_word_as_identifier", Error, "'{0}' is a reserved word and cannot be used as an identifier.");
    pub const INVALID_IDENTIFIER_ESCAPE: DiagnosticMessage = diag!(1012, "invalid_identifier_escape", Error, "Invalid escape sequence in identifier.");
    pub const SOURCE_READ_FAILED: DiagnosticMessage = diag!(1013, "source_read_failed", Error, "Failed to read source: {0}.");

    // ========================================================================
    // Parser (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1100, "unexpected_token", Error, "Unexpected token '{0}'.");
    pub const TOKEN_EXPECTED: DiagnosticMessage = diag!(1101, "token_expected", Error, "'{0}' expected.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1102, "expression_expected", Error, "Expression expected.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1103, "identifier_expected", Error, "Identifier expected.");
    pub const UNEXPECTED_END_OF_INPUT: DiagnosticMessage = diag!(1104, "unexpected_end_of_input", Error, "Unexpected end of input.");
    pub const NESTING_TOO_DEEP: DiagnosticMessage = diag!(1105, "nesting_too_deep", Error, "Program nesting exceeds the maximum depth of {0}.");
    pub const INVALID_FOR_IN_TARGET: DiagnosticMessage = diag!(1106, "invalid_for_in_target", Error, "The left-hand side of a 'for...in' statement must be a variable or a property access.");
    pub const MULTIPLE_DEFAULT_CLAUSES: DiagnosticMessage = diag!(1107, "multiple_default_clauses", Error, "A 'default' clause cannot appear more than once in a 'switch' statement.");
    pub const CATCH_OR_FINALLY_EXPECTED: DiagnosticMessage = diag!(1108, "catch_or_finally_expected", Error, "'catch' or 'finally' expected.");
    pub const NEWLINE_AFTER_THROW: DiagnosticMessage = diag!(1109, "newline_after_throw", Error, "Line break not permitted after 'throw'.");
    pub const INVALID_REGEXP_FLAGS: DiagnosticMessage = diag!(1110, "invalid_regexp_flags", Error, "Invalid regular expression flags '{0}'.");

    // ========================================================================
    // Resolver (1200-1299)
    // ========================================================================
    pub const UNDECLARED_IDENTIFIER: DiagnosticMessage = diag!(1200, "undeclared_identifier", Error, "Variable '{0}' has not been declared.");
    pub const DUPLICATE_LABEL: DiagnosticMessage = diag!(1201, "duplicate_label", Error, "Label '{0}' is already in scope.");
    pub const BREAK_OUTSIDE_LOOP: DiagnosticMessage = diag!(1202, "break_outside_loop", Error, "'break' must be inside a loop or switch.");
    pub const CONTINUE_OUTSIDE_LOOP: DiagnosticMessage = diag!(1203, "continue_outside_loop", Error, "'continue' must be inside a loop.");
    pub const UNDEFINED_LABEL: DiagnosticMessage = diag!(1204, "undefined_label", Error, "Label '{0}' not found.");
    pub const CONTINUE_TARGET_NOT_LOOP: DiagnosticMessage = diag!(1205, "continue_target_not_loop", Error, "Label '{0}' does not refer to a loop.");
    pub const RETURN_OUTSIDE_FUNCTION: DiagnosticMessage = diag!(1206, "return_outside_function", Error, "'return' statement outside of function.");
    pub const ILLEGAL_DELETE_TARGET: DiagnosticMessage = diag!(1207, "illegal_delete_target", Error, "Declared variable '{0}' cannot be deleted.");
    pub const ILLEGAL_ASSIGNMENT_TARGET: DiagnosticMessage = diag!(1208, "illegal_assignment_target", Error, "Invalid left-hand side in assignment.");
    pub const DUPLICATE_DECLARATION: DiagnosticMessage = diag!(1209, "duplicate_declaration", Error, "Function '{0}' is already declared in this scope.");
    pub const DUPLICATE_PARAMETER: DiagnosticMessage = diag!(1210, "duplicate_parameter", Error, "Duplicate parameter name '{0}'.");

    // ========================================================================
    // Runtime (1300-1399)
    // ========================================================================
    pub const EXTRA_ARGUMENTS_TRUNCATED: DiagnosticMessage = diag!(1300, "extra_arguments_truncated", Warning, "'{0}' accepts {1} argument(s); {2} extra argument(s) ignored.");
}
