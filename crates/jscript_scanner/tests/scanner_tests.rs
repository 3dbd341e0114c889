//! Scanner integration tests.

use jscript_ast::syntax_kind::SyntaxKind;
use jscript_diagnostics::Severity;
use jscript_scanner::{Scanner, Token, TokenFlags};
use std::io::{self, Read};

/// Helper: scan every token up to end of input.
fn scan_all(scanner: &mut Scanner) -> Vec<Token> {
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token();
        if token.is_eof() {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn scan_source(source: &str) -> Vec<Token> {
    scan_all(&mut Scanner::new(source))
}

fn single(source: &str) -> Token {
    let tokens = scan_source(source);
    assert_eq!(tokens.len(), 1, "expected one token in {source:?}, got {tokens:?}");
    tokens.into_iter().next().unwrap()
}

#[test]
fn test_empty_and_whitespace_only() {
    assert!(scan_source("").is_empty());
    assert!(scan_source("   \n\t \u{A0}\u{FEFF} // comment\n/* block */").is_empty());
}

#[test]
fn test_string_with_tab_escape() {
    let token = single(r#""a\tb""#);
    assert_eq!(token.kind, SyntaxKind::StringLiteral);
    assert_eq!(token.text, "a\tb");
    assert_eq!(token.text.chars().count(), 3);
}

#[test]
fn test_string_escapes() {
    assert_eq!(single(r"'\x41B\103'").text, "ABC");
    assert_eq!(single(r"'\0'").text, "\0");
    assert_eq!(single(r"'\b\f\v\r\n'").text, "\u{8}\u{C}\u{B}\r\n");
    assert_eq!(single(r"'\q\'\\'").text, "q'\\");
    // Octal escapes starting with 4-7 take at most two digits.
    assert_eq!(single(r"'\477'").text, "'7");
    assert_eq!(single(r"'\uD83D\uDE00'").text, "\u{1F600}");
}

#[test]
fn test_malformed_escapes_yield_letter() {
    assert_eq!(single(r"'\xZ1'").text, "xZ1");
    assert_eq!(single(r"'\u12'").text, "u12");
}

#[test]
fn test_line_continuation_in_string() {
    let mut scanner = Scanner::new("'ab\\\ncd' x");
    let tokens = scan_all(&mut scanner);
    assert_eq!(tokens[0].text, "abcd");
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn test_unterminated_string() {
    let mut scanner = Scanner::new("'abc\nx");
    let token = scanner.next_token();
    assert_eq!(token.kind, SyntaxKind::ErrorToken);
    assert!(token.flags.contains(TokenFlags::UNTERMINATED));
    assert!(scanner.diagnostics().contains_key("unterminated_string_literal"));
    let next = scanner.next_token();
    assert_eq!(next.text, "x");
    assert!(next.has_preceding_line_break());
}

#[test]
fn test_hex_literal() {
    let token = single("0x1F");
    assert_eq!(token.kind, SyntaxKind::NumericLiteral);
    assert_eq!(token.value, Some(31.0));

    let mut scanner = Scanner::new("0x");
    assert_eq!(scanner.next_token().kind, SyntaxKind::ErrorToken);
    assert!(scanner.diagnostics().contains_key("hex_digit_expected"));
}

#[test]
fn test_legacy_octal_permissive_warns() {
    let mut scanner = Scanner::new("017");
    let token = scanner.next_token();
    assert_eq!(token.kind, SyntaxKind::NumericLiteral);
    assert_eq!(token.value, Some(15.0));
    assert!(token.flags.contains(TokenFlags::LEGACY_OCTAL));
    let diagnostics = scanner.diagnostics().diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message_key, "legacy_octal_literal");
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_legacy_octal_strict_is_error() {
    let mut scanner = Scanner::new("017").with_strict(true);
    scanner.next_token();
    assert!(scanner.diagnostics().has_errors());
}

#[test]
fn test_legacy_octal_warning_can_be_disabled() {
    let mut scanner = Scanner::new("017");
    scanner.set_warn_on_legacy_octal(false);
    assert_eq!(scanner.next_token().value, Some(15.0));
    assert!(scanner.diagnostics().is_empty());
}

#[test]
fn test_invalid_octal_digit_reads_decimal() {
    let mut scanner = Scanner::new("019");
    let token = scanner.next_token();
    assert_eq!(token.kind, SyntaxKind::NumericLiteral);
    assert_eq!(token.value, Some(19.0));
    assert!(!token.flags.contains(TokenFlags::LEGACY_OCTAL));
    assert!(scanner.diagnostics().contains_key("invalid_octal_digit"));
    assert!(!scanner.diagnostics().has_errors());
}

#[test]
fn test_decimal_forms() {
    assert_eq!(single("3.25").value, Some(3.25));
    assert_eq!(single(".5").value, Some(0.5));
    assert_eq!(single("1e3").value, Some(1000.0));
    assert_eq!(single("2.5E-1").value, Some(0.25));
    assert_eq!(single("0").value, Some(0.0));

    let mut scanner = Scanner::new("1e+");
    assert_eq!(scanner.next_token().kind, SyntaxKind::ErrorToken);
    assert!(scanner.diagnostics().contains_key("digit_expected"));
}

#[test]
fn test_identifier_after_number() {
    let mut scanner = Scanner::new("3in x");
    assert_eq!(scanner.next_token().kind, SyntaxKind::ErrorToken);
    assert!(scanner.diagnostics().contains_key("identifier_after_numeric_literal"));
    assert_eq!(scanner.next_token().text, "x");
}

#[test]
fn test_keywords_and_identifiers() {
    let kinds: Vec<_> = scan_source("var x = typeof instanceofx").iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::VarKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::TypeOfKeyword,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_unicode_escape_in_identifier() {
    let token = single(r"\u0061bc");
    assert_eq!(token.kind, SyntaxKind::Identifier);
    assert_eq!(token.text, "abc");
    assert!(token.flags.contains(TokenFlags::ESCAPED));
}

#[test]
fn test_escaped_keyword_is_identifier_with_diagnostic() {
    let mut scanner = Scanner::new(r"\u0076ar");
    let token = scanner.next_token();
    assert_eq!(token.kind, SyntaxKind::Identifier);
    assert_eq!(token.text, "var");
    assert!(scanner.diagnostics().contains_key("escaped_keyword"));
    assert!(!scanner.diagnostics().has_errors());

    let mut strict = Scanner::new(r"\u0076ar").with_strict(true);
    strict.next_token();
    assert!(strict.diagnostics().has_errors());
}

#[test]
fn test_invalid_identifier_escape() {
    let mut scanner = Scanner::new(r"a\u00");
    assert_eq!(scanner.next_token().kind, SyntaxKind::ErrorToken);
    assert!(scanner.diagnostics().contains_key("invalid_identifier_escape"));
}

#[test]
fn test_future_reserved_word() {
    let mut scanner = Scanner::new("class");
    assert_eq!(scanner.next_token().kind, SyntaxKind::Identifier);
    assert!(scanner.diagnostics().contains_key("reserved_word_as_identifier"));
}

#[test]
fn test_invalid_character() {
    let mut scanner = Scanner::new("a # b");
    let tokens = scan_all(&mut scanner);
    assert_eq!(tokens[1].kind, SyntaxKind::ErrorToken);
    assert_eq!(tokens[2].text, "b");
    assert!(scanner.diagnostics().contains_key("invalid_character"));
}

#[test]
fn test_unterminated_comment() {
    let mut scanner = Scanner::new("a /* never closed");
    scanner.next_token();
    let token = scanner.next_token();
    assert_eq!(token.kind, SyntaxKind::ErrorToken);
    assert_eq!((token.line, token.column), (1, 3));
    assert!(scanner.diagnostics().contains_key("unterminated_comment"));
    assert!(scanner.next_token().is_eof());
}

#[test]
fn test_regex_only_where_allowed() {
    let mut scanner = Scanner::new("/[/]\\//gi");
    let token = scanner.next_token();
    assert_eq!(token.kind, SyntaxKind::RegularExpressionLiteral);
    assert_eq!(token.regexp_parts(), Some(("[/]\\/", "gi")));

    let mut scanner = Scanner::new("a /= b");
    scanner.next_token();
    scanner.set_regex_allowed(false);
    assert_eq!(scanner.next_token().kind, SyntaxKind::SlashEqualsToken);
}

#[test]
fn test_unterminated_regex() {
    let mut scanner = Scanner::new("/abc\n");
    assert_eq!(scanner.next_token().kind, SyntaxKind::ErrorToken);
    assert!(scanner.diagnostics().contains_key("unterminated_regexp"));
}

#[test]
fn test_rescan_drops_diagnostics_of_discarded_scan() {
    let mut scanner = Scanner::new("/ 1");
    // As a regex this is unterminated; as an operator it is fine.
    assert_eq!(scanner.peek().kind, SyntaxKind::ErrorToken);
    assert!(!scanner.diagnostics().is_empty());
    scanner.set_regex_allowed(false);
    assert_eq!(scanner.next_token().kind, SyntaxKind::SlashToken);
    assert!(scanner.diagnostics().is_empty());
}

#[test]
fn test_peek_same_line() {
    let mut scanner = Scanner::new("a\n++b");
    scanner.next_token();
    assert!(scanner.peek_same_line().is_none());
    assert_eq!(scanner.next_token().kind, SyntaxKind::PlusPlusToken);
    assert_eq!(scanner.peek_same_line().map(|t| t.kind), Some(SyntaxKind::Identifier));

    let mut at_end = Scanner::new("x");
    at_end.next_token();
    assert!(at_end.peek_same_line().is_none());
}

#[test]
fn test_unget_single_token() {
    let mut scanner = Scanner::new("if (x)");
    let first = scanner.next_token();
    assert_eq!(first.kind, SyntaxKind::IfKeyword);
    scanner.unget(first);
    assert_eq!(scanner.next_token().kind, SyntaxKind::IfKeyword);
    assert_eq!(scanner.next_token().kind, SyntaxKind::OpenParenToken);
}

#[test]
fn test_start_line_offsets_positions() {
    let mut scanner = Scanner::new("a\nb").with_start_line(42);
    let tokens = scan_all(&mut scanner);
    assert_eq!(tokens[0].line, 42);
    assert_eq!(tokens[1].line, 43);
}

#[test]
fn test_diagnostics_carry_source_name() {
    let mut scanner = Scanner::new("@").with_source_name("page.js");
    scanner.next_token();
    let diagnostic = &scanner.diagnostics().diagnostics()[0];
    assert_eq!(diagnostic.source_name, "page.js");
    assert_eq!((diagnostic.line, diagnostic.column), (1, 1));
}

/// Hands out one byte per read call.
struct OneByte(Vec<u8>, usize);

impl Read for OneByte {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.1 >= self.0.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.0[self.1];
        self.1 += 1;
        Ok(1)
    }
}

#[test]
fn test_streaming_source_matches_in_memory() {
    let text = "var s = 'héllo'; // ünïcode\nfunction f(a) { return a >>> 1; }";
    let streamed = scan_all(&mut Scanner::from_reader(OneByte(text.as_bytes().to_vec(), 0)));
    let in_memory = scan_source(text);
    assert_eq!(streamed, in_memory);
    assert_eq!(streamed[3].text, "héllo");
}

struct Failing;

impl Read for Failing {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
    }
}

#[test]
fn test_read_error_is_reported() {
    let mut scanner = Scanner::from_reader(Failing);
    assert!(scanner.next_token().is_eof());
    assert!(scanner.diagnostics().contains_key("source_read_failed"));
}
