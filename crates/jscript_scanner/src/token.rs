//! Tokens produced by the scanner.

use jscript_ast::syntax_kind::SyntaxKind;

bitflags::bitflags! {
    /// Facts about a scanned token.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        const NONE                 = 0;
        /// A line terminator appeared between the previous token and this one.
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// The identifier was written with at least one `\uXXXX` escape.
        const ESCAPED              = 1 << 1;
        /// A numeric literal written with a leading zero.
        const LEGACY_OCTAL         = 1 << 2;
        const UNTERMINATED         = 1 << 3;
    }
}

/// A scanned token.
///
/// `text` holds the meaningful spelling: the unescaped name of an
/// identifier, the decoded value of a string, and the source text of
/// everything else. Regular expressions keep their full `/body/flags` form.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: String,
    pub value: Option<f64>,
    /// 1-based line, offset by the configured start line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    /// Character offset of the first character.
    pub start: u32,
    /// Character offset just past the last character.
    pub end: u32,
    pub flags: TokenFlags,
}

impl Token {
    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.kind == SyntaxKind::EndOfFileToken
    }

    /// Whether this token can be used as a property name after `.` or in an
    /// object literal: identifiers and keywords alike.
    pub fn is_identifier_name(&self) -> bool {
        self.kind == SyntaxKind::Identifier || self.kind.is_keyword()
    }

    /// Source-like text for diagnostics.
    pub fn describe(&self) -> &str {
        match self.kind {
            SyntaxKind::EndOfFileToken => "end of input",
            _ if !self.text.is_empty() => &self.text,
            kind => kind.display_text(),
        }
    }

    /// For a regular-expression token, split into pattern and flags.
    pub fn regexp_parts(&self) -> Option<(&str, &str)> {
        if self.kind != SyntaxKind::RegularExpressionLiteral {
            return None;
        }
        let body = self.text.strip_prefix('/')?;
        let close = body.rfind('/')?;
        Some((&body[..close], &body[close + 1..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regexp_parts() {
        let token = Token {
            kind: SyntaxKind::RegularExpressionLiteral,
            text: "/a\\/b/gi".to_string(),
            value: None,
            line: 1,
            column: 1,
            start: 0,
            end: 8,
            flags: TokenFlags::NONE,
        };
        assert_eq!(token.regexp_parts(), Some(("a\\/b", "gi")));
    }
}
