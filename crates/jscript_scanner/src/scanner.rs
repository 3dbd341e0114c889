//! The scanner.
//!
//! Produces tokens one at a time on demand, with a single-token pushback
//! slot for lookahead. Whether `/` starts a regular expression depends on
//! the syntactic position, so the parser sets the regex mode before asking
//! for the next token; a buffered token whose meaning depends on that mode
//! is rescanned when the mode changes.

use crate::char_codes::*;
use crate::source::SourceBuffer;
use crate::token::{Token, TokenFlags};
use jscript_ast::syntax_kind::{is_future_reserved_word, SyntaxKind};
use jscript_core::text::LineAndColumn;
use jscript_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage, Severity};
use std::io::Read;

/// A token sitting in the pushback slot, with the state it was scanned in.
#[derive(Debug, Clone)]
struct Pushback {
    token: Token,
    regex_allowed: bool,
    diagnostics_len: usize,
}

/// Saved scanner position for bounded lookahead.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pos: usize,
    line: u32,
    line_start: usize,
    pushback: Option<Pushback>,
    pending_line_break: bool,
    regex_allowed: bool,
    diagnostics_len: usize,
}

pub struct Scanner {
    source: SourceBuffer,
    source_name: String,
    /// Current character offset.
    pos: usize,
    line: u32,
    /// Offset of the first character of the current line.
    line_start: usize,
    strict: bool,
    warn_on_legacy_octal: bool,
    regex_allowed: bool,
    pushback: Option<Pushback>,
    /// Line-break flag to restore on a token that is being rescanned.
    pending_line_break: bool,

    // State of the token being scanned.
    token_start: usize,
    token_line: u32,
    token_column: u32,
    token_text: String,
    token_value: Option<f64>,
    token_flags: TokenFlags,
    last_scan_diagnostics: usize,

    diagnostics: DiagnosticCollection,
}

impl Scanner {
    /// Create a scanner over in-memory text.
    pub fn new(text: &str) -> Self {
        Self::with_source(SourceBuffer::from_text(text))
    }

    /// Create a scanner over a blocking byte source decoded as UTF-8.
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Self::with_source(SourceBuffer::from_reader(reader))
    }

    fn with_source(source: SourceBuffer) -> Self {
        Self {
            source,
            source_name: String::new(),
            pos: 0,
            line: 1,
            line_start: 0,
            strict: false,
            warn_on_legacy_octal: true,
            regex_allowed: true,
            pushback: None,
            pending_line_break: false,
            token_start: 0,
            token_line: 1,
            token_column: 1,
            token_text: String::new(),
            token_value: None,
            token_flags: TokenFlags::NONE,
            last_scan_diagnostics: 0,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Number the first line of the source `line` instead of 1.
    pub fn with_start_line(mut self, line: u32) -> Self {
        self.line = line;
        self.token_line = line;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn set_warn_on_legacy_octal(&mut self, warn: bool) {
        self.warn_on_legacy_octal = warn;
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether a `/` at the next token position starts a regular expression.
    pub fn set_regex_allowed(&mut self, allowed: bool) {
        self.regex_allowed = allowed;
    }

    pub fn regex_allowed(&self) -> bool {
        self.regex_allowed
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Token stream
    // ========================================================================

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token {
        self.discard_stale_pushback();
        match self.pushback.take() {
            Some(pushed) => pushed.token,
            None => self.scan_token(),
        }
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        self.discard_stale_pushback();
        let pushed = match self.pushback.take() {
            Some(pushed) => pushed,
            None => {
                let token = self.scan_token();
                Pushback {
                    token,
                    regex_allowed: self.regex_allowed,
                    diagnostics_len: self.last_scan_diagnostics,
                }
            }
        };
        &self.pushback.insert(pushed).token
    }

    /// Peek in significant-newline mode: `None` if the next token starts a
    /// new line or the input has ended.
    pub fn peek_same_line(&mut self) -> Option<&Token> {
        let token = self.peek();
        if token.has_preceding_line_break() || token.is_eof() {
            None
        } else {
            Some(token)
        }
    }

    /// Push a token back. Only one token can be pushed back at a time.
    pub fn unget(&mut self, token: Token) {
        debug_assert!(self.pushback.is_none(), "pushback slot already occupied");
        let diagnostics_len = if token.start as usize == self.token_start {
            self.last_scan_diagnostics
        } else {
            self.diagnostics.len()
        };
        self.pushback = Some(Pushback {
            token,
            regex_allowed: self.regex_allowed,
            diagnostics_len,
        });
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
            line_start: self.line_start,
            pushback: self.pushback.clone(),
            pending_line_break: self.pending_line_break,
            regex_allowed: self.regex_allowed,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    /// Return to a checkpoint, forgetting diagnostics reported since.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
        self.line_start = checkpoint.line_start;
        self.pushback = checkpoint.pushback;
        self.pending_line_break = checkpoint.pending_line_break;
        self.regex_allowed = checkpoint.regex_allowed;
        self.diagnostics.truncate(checkpoint.diagnostics_len);
    }

    /// Drop a buffered `/`-token that was scanned under the other regex mode
    /// and move back so it is scanned again.
    fn discard_stale_pushback(&mut self) {
        let stale = match &self.pushback {
            Some(p) => {
                p.regex_allowed != self.regex_allowed
                    && matches!(
                        p.token.kind,
                        SyntaxKind::SlashToken
                            | SyntaxKind::SlashEqualsToken
                            | SyntaxKind::RegularExpressionLiteral
                    )
            }
            None => false,
        };
        if !stale {
            return;
        }
        if let Some(p) = self.pushback.take() {
            let start = p.token.start as usize;
            self.pos = start;
            self.line = p.token.line;
            self.line_start = start + 1 - p.token.column as usize;
            self.pending_line_break = p.token.has_preceding_line_break();
            self.diagnostics.truncate(p.diagnostics_len);
        }
    }

    // ========================================================================
    // Character helpers
    // ========================================================================

    #[inline]
    fn char_at(&mut self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset)
    }

    #[inline]
    fn column_at(&self, pos: usize) -> u32 {
        (pos - self.line_start) as u32 + 1
    }

    /// Consume one line terminator, treating `\r\n` as a single break.
    fn consume_line_break(&mut self) {
        let ch = self.char_at(0);
        self.pos += 1;
        if ch == Some('\r') && self.char_at(0) == Some('\n') {
            self.pos += 1;
        }
        self.line += 1;
        self.line_start = self.pos;
    }

    fn skip_digits(&mut self) {
        while self.char_at(0).is_some_and(is_digit) {
            self.pos += 1;
        }
    }

    /// Read exactly four hex digits at `pos + offset`.
    fn read_hex4(&mut self, offset: usize) -> Option<u32> {
        let mut value = 0;
        for i in 0..4 {
            value = value * 16 + self.char_at(offset + i).and_then(hex_value)?;
        }
        Some(value)
    }

    fn mode_severity(&self) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    fn report_at(
        &mut self,
        message: &DiagnosticMessage,
        args: &[&str],
        line: u32,
        column: u32,
        severity: Option<Severity>,
    ) {
        let mut diagnostic = Diagnostic::at(message, args, &self.source_name, LineAndColumn::new(line, column));
        if let Some(severity) = severity {
            diagnostic = diagnostic.with_severity(severity);
        }
        self.diagnostics.add(diagnostic);
    }

    fn report_token(&mut self, message: &DiagnosticMessage, args: &[&str], severity: Option<Severity>) {
        self.report_at(message, args, self.token_line, self.token_column, severity);
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Skip whitespace and comments. Returns whether a line break was seen,
    /// or the start of an unterminated block comment.
    fn skip_trivia(&mut self) -> Result<bool, (usize, u32, u32)> {
        let mut line_break = false;
        while let Some(ch) = self.char_at(0) {
            match ch {
                c if is_line_break(c) => {
                    self.consume_line_break();
                    line_break = true;
                }
                c if is_white_space_single_line(c) => self.pos += 1,
                '/' => match self.char_at(1) {
                    Some('/') => {
                        self.pos += 2;
                        while self.char_at(0).is_some_and(|c| !is_line_break(c)) {
                            self.pos += 1;
                        }
                    }
                    Some('*') => {
                        let start = (self.pos, self.line, self.column_at(self.pos));
                        self.pos += 2;
                        loop {
                            match self.char_at(0) {
                                None => return Err(start),
                                Some('*') if self.char_at(1) == Some('/') => {
                                    self.pos += 2;
                                    break;
                                }
                                Some(c) if is_line_break(c) => {
                                    self.consume_line_break();
                                    line_break = true;
                                }
                                Some(_) => self.pos += 1,
                            }
                        }
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        Ok(line_break)
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    fn scan_token(&mut self) -> Token {
        self.last_scan_diagnostics = self.diagnostics.len();
        self.token_text.clear();
        self.token_value = None;
        self.token_flags = TokenFlags::NONE;
        if std::mem::take(&mut self.pending_line_break) {
            self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
        }

        match self.skip_trivia() {
            Ok(true) => self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK,
            Ok(false) => {}
            Err((start, line, column)) => {
                self.token_start = start;
                self.token_line = line;
                self.token_column = column;
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.report_token(&messages::UNTERMINATED_COMMENT, &[], None);
                return self.finish(SyntaxKind::ErrorToken);
            }
        }

        self.token_start = self.pos;
        self.token_line = self.line;
        self.token_column = self.column_at(self.pos);

        let Some(ch) = self.char_at(0) else {
            if let Some(error) = self.source.take_read_error() {
                let text = error.to_string();
                self.report_token(&messages::SOURCE_READ_FAILED, &[&text], None);
            }
            return self.finish(SyntaxKind::EndOfFileToken);
        };

        let kind = match ch {
            '(' => self.punct(1, SyntaxKind::OpenParenToken),
            ')' => self.punct(1, SyntaxKind::CloseParenToken),
            '{' => self.punct(1, SyntaxKind::OpenBraceToken),
            '}' => self.punct(1, SyntaxKind::CloseBraceToken),
            '[' => self.punct(1, SyntaxKind::OpenBracketToken),
            ']' => self.punct(1, SyntaxKind::CloseBracketToken),
            ';' => self.punct(1, SyntaxKind::SemicolonToken),
            ',' => self.punct(1, SyntaxKind::CommaToken),
            '~' => self.punct(1, SyntaxKind::TildeToken),
            '?' => self.punct(1, SyntaxKind::QuestionToken),
            ':' => self.punct(1, SyntaxKind::ColonToken),
            '.' => {
                if self.char_at(1).is_some_and(is_digit) {
                    self.scan_number()
                } else {
                    self.punct(1, SyntaxKind::DotToken)
                }
            }
            '<' => match (self.char_at(1), self.char_at(2)) {
                (Some('<'), Some('=')) => self.punct(3, SyntaxKind::LessThanLessThanEqualsToken),
                (Some('<'), _) => self.punct(2, SyntaxKind::LessThanLessThanToken),
                (Some('='), _) => self.punct(2, SyntaxKind::LessThanEqualsToken),
                _ => self.punct(1, SyntaxKind::LessThanToken),
            },
            '>' => self.scan_greater_than(),
            '=' => match (self.char_at(1), self.char_at(2)) {
                (Some('='), Some('=')) => self.punct(3, SyntaxKind::EqualsEqualsEqualsToken),
                (Some('='), _) => self.punct(2, SyntaxKind::EqualsEqualsToken),
                _ => self.punct(1, SyntaxKind::EqualsToken),
            },
            '!' => match (self.char_at(1), self.char_at(2)) {
                (Some('='), Some('=')) => self.punct(3, SyntaxKind::ExclamationEqualsEqualsToken),
                (Some('='), _) => self.punct(2, SyntaxKind::ExclamationEqualsToken),
                _ => self.punct(1, SyntaxKind::ExclamationToken),
            },
            '+' => match self.char_at(1) {
                Some('+') => self.punct(2, SyntaxKind::PlusPlusToken),
                Some('=') => self.punct(2, SyntaxKind::PlusEqualsToken),
                _ => self.punct(1, SyntaxKind::PlusToken),
            },
            '-' => match self.char_at(1) {
                Some('-') => self.punct(2, SyntaxKind::MinusMinusToken),
                Some('=') => self.punct(2, SyntaxKind::MinusEqualsToken),
                _ => self.punct(1, SyntaxKind::MinusToken),
            },
            '*' => self.punct_or_assign(SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken),
            '%' => self.punct_or_assign(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            '^' => self.punct_or_assign(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            '&' => match self.char_at(1) {
                Some('&') => self.punct(2, SyntaxKind::AmpersandAmpersandToken),
                Some('=') => self.punct(2, SyntaxKind::AmpersandEqualsToken),
                _ => self.punct(1, SyntaxKind::AmpersandToken),
            },
            '|' => match self.char_at(1) {
                Some('|') => self.punct(2, SyntaxKind::BarBarToken),
                Some('=') => self.punct(2, SyntaxKind::BarEqualsToken),
                _ => self.punct(1, SyntaxKind::BarToken),
            },
            '/' => {
                if self.regex_allowed {
                    self.scan_regex()
                } else {
                    self.punct_or_assign(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken)
                }
            }
            '\'' | '"' => self.scan_string(ch),
            '0'..='9' => self.scan_number(),
            '\\' => self.scan_identifier(),
            c if is_identifier_start(c) => self.scan_identifier(),
            c => {
                self.pos += 1;
                let text = c.to_string();
                self.report_token(&messages::INVALID_CHARACTER, &[&text], None);
                SyntaxKind::ErrorToken
            }
        };

        self.finish(kind)
    }

    fn finish(&mut self, kind: SyntaxKind) -> Token {
        let text = match kind {
            SyntaxKind::Identifier | SyntaxKind::StringLiteral => std::mem::take(&mut self.token_text),
            _ => self.source.slice(self.token_start, self.pos),
        };
        Token {
            kind,
            text,
            value: self.token_value.take(),
            line: self.token_line,
            column: self.token_column,
            start: self.token_start as u32,
            end: self.pos as u32,
            flags: self.token_flags,
        }
    }

    #[inline]
    fn punct(&mut self, len: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += len;
        kind
    }

    fn punct_or_assign(&mut self, plain: SyntaxKind, assign: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some('=') {
            self.punct(2, assign)
        } else {
            self.punct(1, plain)
        }
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        match (self.char_at(1), self.char_at(2), self.char_at(3)) {
            (Some('>'), Some('>'), Some('=')) => self.punct(4, SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken),
            (Some('>'), Some('>'), _) => self.punct(3, SyntaxKind::GreaterThanGreaterThanGreaterThanToken),
            (Some('>'), Some('='), _) => self.punct(3, SyntaxKind::GreaterThanGreaterThanEqualsToken),
            (Some('>'), _, _) => self.punct(2, SyntaxKind::GreaterThanGreaterThanToken),
            (Some('='), _, _) => self.punct(2, SyntaxKind::GreaterThanEqualsToken),
            _ => self.punct(1, SyntaxKind::GreaterThanToken),
        }
    }

    // -- Identifiers --

    fn scan_identifier(&mut self) -> SyntaxKind {
        let mut name = String::new();
        let mut escaped = false;
        loop {
            match self.char_at(0) {
                Some('\\') => {
                    let decoded = if self.char_at(1) == Some('u') {
                        self.read_hex4(2).and_then(char::from_u32)
                    } else {
                        None
                    };
                    let valid = decoded.filter(|&c| {
                        if name.is_empty() {
                            is_identifier_start(c)
                        } else {
                            is_identifier_part(c)
                        }
                    });
                    match valid {
                        Some(c) => {
                            name.push(c);
                            escaped = true;
                            self.pos += 6;
                        }
                        None => {
                            self.report_token(&messages::INVALID_IDENTIFIER_ESCAPE, &[], None);
                            self.pos += 1;
                            while self.char_at(0).is_some_and(is_identifier_part) {
                                self.pos += 1;
                            }
                            return SyntaxKind::ErrorToken;
                        }
                    }
                }
                Some(c) if (name.is_empty() && is_identifier_start(c)) || (!name.is_empty() && is_identifier_part(c)) => {
                    name.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }

        let kind = match SyntaxKind::from_keyword(&name) {
            Some(keyword) if !escaped => keyword,
            Some(_) => {
                let severity = self.mode_severity();
                self.report_token(&messages::ESCAPED_KEYWORD, &[&name], Some(severity));
                SyntaxKind::Identifier
            }
            None => {
                if is_future_reserved_word(&name) {
                    let severity = self.mode_severity();
                    self.report_token(&messages::RESERVED_WORD_AS_IDENTIFIER, &[&name], Some(severity));
                }
                SyntaxKind::Identifier
            }
        };
        if escaped {
            self.token_flags |= TokenFlags::ESCAPED;
        }
        if kind == SyntaxKind::Identifier {
            self.token_text = name;
        }
        kind
    }

    // -- Numbers --

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let first = self.char_at(0);
        if first == Some('0') && matches!(self.char_at(1), Some('x' | 'X')) {
            self.pos += 2;
            let mut value = 0f64;
            let mut digits = 0;
            while let Some(d) = self.char_at(0).and_then(hex_value) {
                value = value * 16.0 + d as f64;
                self.pos += 1;
                digits += 1;
            }
            if digits == 0 {
                self.report_token(&messages::HEX_DIGIT_EXPECTED, &[], None);
                return SyntaxKind::ErrorToken;
            }
            self.token_value = Some(value);
            return self.check_after_number();
        }
        if first == Some('0') && self.char_at(1).is_some_and(is_digit) {
            return self.scan_legacy_octal(start);
        }
        self.scan_decimal(start)
    }

    fn scan_decimal(&mut self, start: usize) -> SyntaxKind {
        self.skip_digits();
        if self.char_at(0) == Some('.') {
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.char_at(0), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.char_at(0), Some('+' | '-')) {
                self.pos += 1;
            }
            if !self.char_at(0).is_some_and(is_digit) {
                self.report_token(&messages::DIGIT_EXPECTED, &[], None);
                return SyntaxKind::ErrorToken;
            }
            self.skip_digits();
        }
        let text = self.source.slice(start, self.pos);
        self.token_value = text.parse::<f64>().ok();
        self.check_after_number()
    }

    /// A literal with a leading zero: octal if every digit allows it,
    /// otherwise decimal with a diagnostic.
    fn scan_legacy_octal(&mut self, start: usize) -> SyntaxKind {
        self.skip_digits();
        let text = self.source.slice(start, self.pos);
        match text.chars().find(|c| !is_octal_digit(*c)) {
            None => {
                let value = text
                    .chars()
                    .filter_map(|c| c.to_digit(8))
                    .fold(0f64, |acc, d| acc * 8.0 + d as f64);
                self.token_value = Some(value);
                self.token_flags |= TokenFlags::LEGACY_OCTAL;
                if self.strict {
                    self.report_token(&messages::LEGACY_OCTAL_LITERAL, &[&text], Some(Severity::Error));
                } else if self.warn_on_legacy_octal {
                    self.report_token(&messages::LEGACY_OCTAL_LITERAL, &[&text], Some(Severity::Warning));
                }
                self.check_after_number()
            }
            Some(bad) => {
                let severity = self.mode_severity();
                let digit = bad.to_string();
                self.report_token(&messages::INVALID_OCTAL_DIGIT, &[&digit, &text], Some(severity));
                self.pos = start;
                self.scan_decimal(start)
            }
        }
    }

    fn check_after_number(&mut self) -> SyntaxKind {
        if self.char_at(0).is_some_and(|c| is_identifier_start(c) || c == '\\') {
            self.report_token(&messages::IDENTIFIER_AFTER_NUMERIC_LITERAL, &[], None);
            while self.char_at(0).is_some_and(is_identifier_part) {
                self.pos += 1;
            }
            self.token_value = None;
            return SyntaxKind::ErrorToken;
        }
        SyntaxKind::NumericLiteral
    }

    // -- Strings --

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.char_at(0) {
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    self.scan_escape(&mut value);
                }
                Some(c) if !is_line_break(c) => {
                    value.push(c);
                    self.pos += 1;
                }
                _ => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    self.report_token(&messages::UNTERMINATED_STRING_LITERAL, &[], None);
                    return SyntaxKind::ErrorToken;
                }
            }
        }
        self.token_text = value;
        SyntaxKind::StringLiteral
    }

    /// Decode the escape following a backslash. Malformed `\x` and `\u`
    /// escapes decode to the escaped letter itself.
    fn scan_escape(&mut self, out: &mut String) {
        let Some(ch) = self.char_at(0) else {
            return;
        };
        let simple = match ch {
            'b' => Some('\u{8}'),
            'f' => Some('\u{C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{B}'),
            _ => None,
        };
        if let Some(decoded) = simple {
            out.push(decoded);
            self.pos += 1;
            return;
        }
        match ch {
            'x' => {
                let hi = self.char_at(1).and_then(hex_value);
                let lo = self.char_at(2).and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.extend(char::from_u32(hi * 16 + lo));
                        self.pos += 3;
                    }
                    _ => {
                        out.push('x');
                        self.pos += 1;
                    }
                }
            }
            'u' => match self.read_hex4(1) {
                Some(unit) => {
                    self.pos += 5;
                    out.push(self.decode_utf16_unit(unit));
                }
                None => {
                    out.push('u');
                    self.pos += 1;
                }
            },
            '0'..='7' => {
                let max_len = if ch <= '3' { 3 } else { 2 };
                let mut value = 0;
                let mut len = 0;
                while len < max_len {
                    match self.char_at(0).and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.pos += 1;
                            len += 1;
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            c if is_line_break(c) => self.consume_line_break(),
            other => {
                out.push(other);
                self.pos += 1;
            }
        }
    }

    /// Combine a surrogate pair written as two `\u` escapes. A lone
    /// surrogate decodes to U+FFFD.
    fn decode_utf16_unit(&mut self, unit: u32) -> char {
        if (0xD800..0xDC00).contains(&unit) && self.char_at(0) == Some('\\') && self.char_at(1) == Some('u') {
            if let Some(low) = self.read_hex4(2).filter(|low| (0xDC00..0xE000).contains(low)) {
                self.pos += 6;
                let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
        }
        char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    // -- Regular expressions --

    fn scan_regex(&mut self) -> SyntaxKind {
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.char_at(0) {
                Some('\\') => {
                    self.pos += 1;
                    if self.char_at(0).is_some_and(|c| !is_line_break(c)) {
                        self.pos += 1;
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some('/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(c) if !is_line_break(c) => self.pos += 1,
                _ => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    self.report_token(&messages::UNTERMINATED_REGEXP, &[], None);
                    return SyntaxKind::ErrorToken;
                }
            }
        }
        while self.char_at(0).is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        SyntaxKind::RegularExpressionLiteral
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("source", &self.source)
            .field("pos", &self.pos)
            .field("line", &self.line)
            .field("regex_allowed", &self.regex_allowed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token();
            if token.is_eof() {
                break;
            }
            out.push(token.kind);
        }
        out
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a >>>= b >>> c >> d >= e"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken,
                SyntaxKind::Identifier,
                SyntaxKind::GreaterThanGreaterThanGreaterThanToken,
                SyntaxKind::Identifier,
                SyntaxKind::GreaterThanGreaterThanToken,
                SyntaxKind::Identifier,
                SyntaxKind::GreaterThanEqualsToken,
                SyntaxKind::Identifier,
            ]
        );
        assert_eq!(
            kinds("!== === != == <<="),
            vec![
                SyntaxKind::ExclamationEqualsEqualsToken,
                SyntaxKind::EqualsEqualsEqualsToken,
                SyntaxKind::ExclamationEqualsToken,
                SyntaxKind::EqualsEqualsToken,
                SyntaxKind::LessThanLessThanEqualsToken,
            ]
        );
    }

    #[test]
    fn test_peek_then_next() {
        let mut scanner = Scanner::new("a b");
        assert_eq!(scanner.peek().text, "a");
        assert_eq!(scanner.peek().text, "a");
        assert_eq!(scanner.next_token().text, "a");
        assert_eq!(scanner.next_token().text, "b");
        assert!(scanner.next_token().is_eof());
    }

    #[test]
    fn test_unget() {
        let mut scanner = Scanner::new("x y");
        let x = scanner.next_token();
        scanner.unget(x.clone());
        assert_eq!(scanner.next_token(), x);
        assert_eq!(scanner.next_token().text, "y");
    }

    #[test]
    fn test_mode_change_rescans_buffered_slash() {
        let mut scanner = Scanner::new("/a/g");
        scanner.set_regex_allowed(false);
        assert_eq!(scanner.peek().kind, SyntaxKind::SlashToken);
        scanner.set_regex_allowed(true);
        let token = scanner.next_token();
        assert_eq!(token.kind, SyntaxKind::RegularExpressionLiteral);
        assert_eq!(token.text, "/a/g");
    }

    #[test]
    fn test_checkpoint_rewind() {
        let mut scanner = Scanner::new("a : b");
        let checkpoint = scanner.checkpoint();
        assert_eq!(scanner.next_token().text, "a");
        assert_eq!(scanner.next_token().kind, SyntaxKind::ColonToken);
        scanner.rewind(checkpoint);
        assert_eq!(scanner.next_token().text, "a");
    }

    #[test]
    fn test_line_tracking() {
        let mut scanner = Scanner::new("a\r\n  b\n/* x\n */ c").with_start_line(10);
        let a = scanner.next_token();
        let b = scanner.next_token();
        let c = scanner.next_token();
        assert_eq!((a.line, a.column), (10, 1));
        assert_eq!((b.line, b.column), (11, 3));
        assert!(b.has_preceding_line_break());
        assert_eq!((c.line, c.column), (13, 5));
    }
}
