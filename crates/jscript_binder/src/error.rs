//! Resolution errors.

use jscript_core::text::LineAndColumn;
use jscript_diagnostics::{messages, Diagnostic, DiagnosticMessage, Severity};

/// A problem found while resolving one node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("variable '{name}' has not been declared")]
    UndeclaredIdentifier { name: String, line: u32, column: u32 },

    #[error("label '{label}' is already in scope")]
    DuplicateLabel { label: String, line: u32, column: u32 },

    #[error("'break' outside of a loop or switch")]
    BreakOutsideLoop { line: u32, column: u32 },

    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop { line: u32, column: u32 },

    #[error("label '{label}' not found")]
    UndefinedLabel { label: String, line: u32, column: u32 },

    #[error("label '{label}' does not refer to a loop")]
    ContinueTargetNotLoop { label: String, line: u32, column: u32 },

    #[error("'return' outside of a function")]
    ReturnOutsideFunction { line: u32, column: u32 },

    #[error("declared variable '{name}' cannot be deleted")]
    IllegalDeleteTarget { name: String, line: u32, column: u32 },

    #[error("invalid assignment target")]
    IllegalAssignmentTarget { line: u32, column: u32 },

    #[error("function '{name}' is already declared in this scope")]
    DuplicateDeclaration { name: String, line: u32, column: u32 },

    #[error("duplicate parameter name '{name}'")]
    DuplicateParameter { name: String, line: u32, column: u32 },
}

impl ResolveError {
    fn message(&self) -> &'static DiagnosticMessage {
        match self {
            ResolveError::UndeclaredIdentifier { .. } => &messages::UNDECLARED_IDENTIFIER,
            ResolveError::DuplicateLabel { .. } => &messages::DUPLICATE_LABEL,
            ResolveError::BreakOutsideLoop { .. } => &messages::BREAK_OUTSIDE_LOOP,
            ResolveError::ContinueOutsideLoop { .. } => &messages::CONTINUE_OUTSIDE_LOOP,
            ResolveError::UndefinedLabel { .. } => &messages::UNDEFINED_LABEL,
            ResolveError::ContinueTargetNotLoop { .. } => &messages::CONTINUE_TARGET_NOT_LOOP,
            ResolveError::ReturnOutsideFunction { .. } => &messages::RETURN_OUTSIDE_FUNCTION,
            ResolveError::IllegalDeleteTarget { .. } => &messages::ILLEGAL_DELETE_TARGET,
            ResolveError::IllegalAssignmentTarget { .. } => &messages::ILLEGAL_ASSIGNMENT_TARGET,
            ResolveError::DuplicateDeclaration { .. } => &messages::DUPLICATE_DECLARATION,
            ResolveError::DuplicateParameter { .. } => &messages::DUPLICATE_PARAMETER,
        }
    }

    pub fn message_key(&self) -> &'static str {
        self.message().key
    }

    pub fn position(&self) -> LineAndColumn {
        let (line, column) = match self {
            ResolveError::UndeclaredIdentifier { line, column, .. }
            | ResolveError::DuplicateLabel { line, column, .. }
            | ResolveError::BreakOutsideLoop { line, column }
            | ResolveError::ContinueOutsideLoop { line, column }
            | ResolveError::UndefinedLabel { line, column, .. }
            | ResolveError::ContinueTargetNotLoop { line, column, .. }
            | ResolveError::ReturnOutsideFunction { line, column }
            | ResolveError::IllegalDeleteTarget { line, column, .. }
            | ResolveError::IllegalAssignmentTarget { line, column }
            | ResolveError::DuplicateDeclaration { line, column, .. }
            | ResolveError::DuplicateParameter { line, column, .. } => (*line, *column),
        };
        LineAndColumn::new(line, column)
    }

    /// Whether permissive mode reports this as a warning instead.
    pub fn is_downgradable(&self) -> bool {
        matches!(
            self,
            ResolveError::UndeclaredIdentifier { .. }
                | ResolveError::DuplicateDeclaration { .. }
                | ResolveError::DuplicateParameter { .. }
        )
    }

    pub fn to_diagnostic(&self, source_name: &str, severity: Severity) -> Diagnostic {
        let name = match self {
            ResolveError::UndeclaredIdentifier { name, .. }
            | ResolveError::IllegalDeleteTarget { name, .. }
            | ResolveError::DuplicateDeclaration { name, .. }
            | ResolveError::DuplicateParameter { name, .. } => name.as_str(),
            ResolveError::DuplicateLabel { label, .. }
            | ResolveError::UndefinedLabel { label, .. }
            | ResolveError::ContinueTargetNotLoop { label, .. } => label.as_str(),
            _ => "",
        };
        Diagnostic::at(self.message(), &[name], source_name, self.position()).with_severity(severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_carries_key_and_position() {
        let error = ResolveError::UndefinedLabel { label: "outer".into(), line: 3, column: 9 };
        let diagnostic = error.to_diagnostic("a.js", Severity::Error);
        assert_eq!(diagnostic.message_key, "undefined_label");
        assert_eq!((diagnostic.line, diagnostic.column), (3, 9));
        assert_eq!(diagnostic.message, "Label 'outer' not found.");
        assert_eq!(diagnostic.source_name, "a.js");
    }

    #[test]
    fn test_downgradable_cases() {
        assert!(ResolveError::UndeclaredIdentifier { name: "x".into(), line: 1, column: 1 }.is_downgradable());
        assert!(!ResolveError::BreakOutsideLoop { line: 1, column: 1 }.is_downgradable());
    }
}
