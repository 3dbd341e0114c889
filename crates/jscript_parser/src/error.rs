//! Parse errors.

use jscript_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use jscript_core::text::LineAndColumn;

/// Why a parse did not produce a usable tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// One or more recoverable syntax errors. Every error found in the
    /// pass is included, along with any warnings.
    #[error("{} syntax error(s), first: {}", .diagnostics.error_count(), first_error(.diagnostics))]
    Syntax { diagnostics: DiagnosticCollection },

    /// Nesting exceeded the configured depth. Always fatal. `diagnostics`
    /// holds whatever scanning and parsing reported before the limit was hit.
    #[error("nesting exceeds the maximum depth of {limit} at line {line}, column {column}")]
    NestingTooDeep {
        line: u32,
        column: u32,
        limit: u32,
        diagnostics: DiagnosticCollection,
    },
}

fn first_error(diagnostics: &DiagnosticCollection) -> String {
    diagnostics
        .errors()
        .next()
        .map(|d| d.to_string())
        .unwrap_or_default()
}

impl ParseError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ParseError::Syntax { diagnostics } => diagnostics
                .errors()
                .next()
                .map(|d| d.message_key)
                .unwrap_or(messages::UNEXPECTED_TOKEN.key),
            ParseError::NestingTooDeep { .. } => messages::NESTING_TOO_DEEP.key,
        }
    }

    /// The error as diagnostic records, including those collected before
    /// a fatal error.
    pub fn into_diagnostics(self, source_name: &str) -> DiagnosticCollection {
        match self {
            ParseError::Syntax { diagnostics } => diagnostics,
            ParseError::NestingTooDeep {
                line,
                column,
                limit,
                mut diagnostics,
            } => {
                let limit = limit.to_string();
                diagnostics.add(Diagnostic::at(
                    &messages::NESTING_TOO_DEEP,
                    &[&limit],
                    source_name,
                    LineAndColumn::new(line, column),
                ));
                diagnostics.sort();
                diagnostics
            }
        }
    }
}
