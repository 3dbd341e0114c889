//! The jscript parser implementation.
//!
//! A predictive recursive descent parser. It pulls tokens from the scanner
//! one at a time and allocates nodes into the AST arena bottom-up, so every
//! child exists before its parent. The scanner's regex mode is set before
//! each peek: operand positions allow a regular expression literal, operator
//! positions read `/` as division.
//!
//! Internally every production returns [`PResult`]. A syntax failure
//! unwinds to the nearest statement list, which records it, skips to the
//! next statement terminator and carries on. Exceeding the nesting limit is
//! fatal and unwinds all the way out.

use jscript_ast::node::*;
use jscript_ast::syntax_kind::SyntaxKind;
use jscript_ast::types::NodeFlags;
use jscript_ast::Ast;
use jscript_core::text::{LineAndColumn, TextSpan};
use jscript_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use jscript_scanner::{Scanner, Token, TokenFlags};

use crate::error::ParseError;
use crate::precedence::{get_binary_operator_precedence, BinaryOperator, OperatorPrecedence};
use crate::utilities::{assignment_operator, is_valid_regexp_flags, unary_operator};

/// Default limit on statement and expression nesting. A tree this deep
/// parses, resolves and prints within a 2 MB thread stack.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 100;

enum ParseFailure {
    /// A syntax error not yet recorded.
    Syntax(Diagnostic),
    /// A syntax error the scanner already recorded (an error token).
    Reported,
    Fatal(ParseError),
}

impl From<ParseError> for ParseFailure {
    fn from(error: ParseError) -> Self {
        ParseFailure::Fatal(error)
    }
}

type PResult<T> = Result<T, ParseFailure>;

/// Position of the first token of a node.
#[derive(Debug, Clone, Copy)]
struct Start {
    pos: u32,
    line: u32,
    column: u32,
}

impl Start {
    fn of(token: &Token) -> Self {
        Self {
            pos: token.start,
            line: token.line,
            column: token.column,
        }
    }
}

/// Where a statement appears. Function literals at body level are hoisted
/// declarations; anywhere else they are expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementContext {
    Body,
    Nested,
}

/// What ends a statement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListEnd {
    EndOfFile,
    CloseBrace,
    /// `case`, `default` or `}`.
    SwitchClause,
}

pub struct Parser {
    ast: Ast,
    scanner: Scanner,
    diagnostics: DiagnosticCollection,
    max_depth: u32,
    depth: u32,
    /// End offset of the last consumed token.
    last_end: u32,
    /// A function literal already parsed at statement start that the
    /// expression parser must take as its first primary.
    pending_primary: Option<(NodeId, Start)>,
}

impl Parser {
    /// Create a parser over in-memory text with default scanner settings.
    pub fn new(source_text: &str) -> Self {
        Self::from_scanner(Scanner::new(source_text))
    }

    /// Create a parser over a configured scanner. The scanner's source
    /// name becomes the tree's source name.
    pub fn from_scanner(scanner: Scanner) -> Self {
        Self {
            ast: Ast::new(scanner.source_name()),
            scanner,
            diagnostics: DiagnosticCollection::new(),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            depth: 0,
            last_end: 0,
            pending_primary: None,
        }
    }

    pub fn with_max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Parse a whole program, failing if any syntax error was found.
    /// Warnings are dropped; use [`Parser::parse_with_recovery`] to keep them.
    pub fn parse(self) -> Result<Ast, ParseError> {
        let (ast, diagnostics) = self.parse_with_recovery()?;
        if diagnostics.has_errors() {
            return Err(ParseError::Syntax { diagnostics });
        }
        Ok(ast)
    }

    /// Parse a whole program, returning the recovered tree together with
    /// every diagnostic from scanning and parsing. Only a fatal error
    /// prevents a tree from being produced.
    pub fn parse_with_recovery(mut self) -> Result<(Ast, DiagnosticCollection), ParseError> {
        let result = self.parse_program();
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(self.scanner.take_diagnostics());
        diagnostics.sort();
        match result {
            Ok(root) => {
                self.ast.set_root(root);
                Ok((self.ast, diagnostics))
            }
            Err(ParseError::NestingTooDeep { line, column, limit, .. }) => Err(ParseError::NestingTooDeep {
                line,
                column,
                limit,
                diagnostics,
            }),
            Err(ParseError::Syntax { diagnostics: reported }) => {
                diagnostics.extend(reported);
                diagnostics.sort();
                Err(ParseError::Syntax { diagnostics })
            }
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    fn next(&mut self) -> Token {
        let token = self.scanner.next_token();
        if !token.is_eof() {
            self.last_end = token.end;
        }
        token
    }

    /// Peek in an operand position, where `/` starts a regular expression.
    fn peek_operand(&mut self) -> SyntaxKind {
        self.scanner.set_regex_allowed(true);
        self.scanner.peek().kind
    }

    /// Peek in an operator position, where `/` is division.
    fn peek_operator(&mut self) -> SyntaxKind {
        self.scanner.set_regex_allowed(false);
        self.scanner.peek().kind
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.scanner.peek().kind == kind {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> PResult<Token> {
        if self.scanner.peek().kind == kind {
            return Ok(self.next());
        }
        let token = self.scanner.peek().clone();
        Err(self.expected(kind, &token))
    }

    fn expect_identifier(&mut self) -> PResult<Token> {
        if self.peek_operand() == SyntaxKind::Identifier {
            return Ok(self.next());
        }
        let token = self.scanner.peek().clone();
        Err(match token.kind {
            SyntaxKind::ErrorToken => ParseFailure::Reported,
            _ => self.error_at(&messages::IDENTIFIER_EXPECTED, &[], &token),
        })
    }

    /// Start position of the next node: the pending primary if there is
    /// one, else the next token read in operand mode.
    fn start_of_next(&mut self) -> Start {
        if let Some((_, start)) = self.pending_primary {
            return start;
        }
        self.scanner.set_regex_allowed(true);
        Start::of(self.scanner.peek())
    }

    /// Consume a statement terminator, inserting one automatically when the
    /// next token is on a new line, is `}` or ends the input. Returns
    /// whether the semicolon was inserted.
    fn consume_semicolon(&mut self) -> PResult<bool> {
        self.scanner.set_regex_allowed(false);
        let token = self.scanner.peek();
        if token.kind == SyntaxKind::SemicolonToken {
            self.next();
            return Ok(false);
        }
        if token.kind == SyntaxKind::CloseBraceToken || token.is_eof() || token.has_preceding_line_break() {
            return Ok(true);
        }
        let token = token.clone();
        Err(self.unexpected(&token))
    }

    fn alloc(&mut self, kind: NodeKind, start: Start) -> NodeId {
        let span = TextSpan::from_bounds(start.pos, self.last_end.max(start.pos));
        self.ast.alloc(kind, span, start.line, start.column)
    }

    /// Finish a simple statement: consume its terminator, then allocate it.
    fn finish_statement(&mut self, kind: NodeKind, start: Start) -> PResult<NodeId> {
        let inserted = self.consume_semicolon()?;
        let id = self.alloc(kind, start);
        if inserted {
            self.ast.add_flags(id, NodeFlags::ASI_TERMINATED);
        }
        Ok(id)
    }

    fn intern(&mut self, token: &Token) -> jscript_core::Symbol {
        self.ast.intern(&token.text)
    }

    /// Run `f` one nesting level deeper, failing fatally past the limit.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.max_depth {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Charge one nesting level for a node built by a loop rather than by
    /// recursion, such as each link of `a + b + c` or `f()()`. The levels
    /// are released by [`Parser::release`] once the loop ends.
    fn charge(&mut self, charged: &mut u32) -> PResult<()> {
        if self.depth >= self.max_depth {
            return Err(self.too_deep());
        }
        self.depth += 1;
        *charged += 1;
        Ok(())
    }

    fn release<T>(&mut self, charged: u32, result: PResult<T>) -> PResult<T> {
        self.depth -= charged;
        result
    }

    fn too_deep(&mut self) -> ParseFailure {
        let token = self.scanner.peek();
        ParseFailure::Fatal(ParseError::NestingTooDeep {
            line: token.line,
            column: token.column,
            limit: self.max_depth,
            diagnostics: DiagnosticCollection::new(),
        })
    }

    // ========================================================================
    // Diagnostics and recovery
    // ========================================================================

    fn error_at(&self, message: &DiagnosticMessage, args: &[&str], token: &Token) -> ParseFailure {
        let diagnostic = Diagnostic::at(
            message,
            args,
            self.ast.source_name(),
            LineAndColumn::new(token.line, token.column),
        )
        .with_span(TextSpan::from_bounds(token.start, token.end));
        ParseFailure::Syntax(diagnostic)
    }

    fn unexpected(&self, token: &Token) -> ParseFailure {
        match token.kind {
            SyntaxKind::ErrorToken => ParseFailure::Reported,
            SyntaxKind::EndOfFileToken => self.error_at(&messages::UNEXPECTED_END_OF_INPUT, &[], token),
            _ => self.error_at(&messages::UNEXPECTED_TOKEN, &[token.describe()], token),
        }
    }

    fn expected(&self, kind: SyntaxKind, token: &Token) -> ParseFailure {
        match token.kind {
            SyntaxKind::ErrorToken => ParseFailure::Reported,
            _ => self.error_at(&messages::TOKEN_EXPECTED, &[kind.display_text()], token),
        }
    }

    /// Record a failure caught by a statement list and skip ahead.
    fn recover(&mut self, failure: ParseFailure, end: ListEnd) -> Result<(), ParseError> {
        match failure {
            ParseFailure::Fatal(error) => return Err(error),
            ParseFailure::Syntax(diagnostic) => {
                tracing::debug!(
                    key = diagnostic.message_key,
                    line = diagnostic.line,
                    column = diagnostic.column,
                    "recovering from syntax error"
                );
                self.diagnostics.add(diagnostic);
            }
            ParseFailure::Reported => {
                tracing::debug!("recovering from scanner error token");
            }
        }
        self.pending_primary = None;
        self.synchronize(end);
        Ok(())
    }

    /// Skip tokens up to and including the next `;`, or up to a `}` that
    /// closes the enclosing list. At program level a stray `}` is consumed.
    fn synchronize(&mut self, end: ListEnd) {
        loop {
            match self.peek_operator() {
                SyntaxKind::EndOfFileToken => return,
                SyntaxKind::SemicolonToken => {
                    self.next();
                    return;
                }
                SyntaxKind::CloseBraceToken => {
                    if end == ListEnd::EndOfFile {
                        self.next();
                    }
                    return;
                }
                _ => {
                    self.next();
                }
            }
        }
    }

    // ========================================================================
    // Statement lists
    // ========================================================================

    fn parse_program(&mut self) -> Result<NodeId, ParseError> {
        let start = self.start_of_next();
        let body = self.parse_statement_list(ListEnd::EndOfFile, StatementContext::Body)?;
        Ok(self.alloc(NodeKind::Program { body }, start))
    }

    /// Parse statements until `end`, recovering from syntax errors. Only a
    /// fatal error escapes.
    fn parse_statement_list(&mut self, end: ListEnd, context: StatementContext) -> Result<Vec<NodeId>, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.peek_operand() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CloseBraceToken if end != ListEnd::EndOfFile => break,
                SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword if end == ListEnd::SwitchClause => break,
                SyntaxKind::CloseBraceToken => {
                    let token = self.next();
                    let failure = self.unexpected(&token);
                    if let ParseFailure::Syntax(diagnostic) = failure {
                        self.diagnostics.add(diagnostic);
                    }
                    continue;
                }
                _ => {}
            }
            match self.parse_statement(context) {
                Ok(statement) => body.push(statement),
                Err(failure) => self.recover(failure, end)?,
            }
        }
        Ok(body)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self, context: StatementContext) -> PResult<NodeId> {
        self.nested(|p| p.parse_statement_inner(context))
    }

    fn parse_statement_inner(&mut self, context: StatementContext) -> PResult<NodeId> {
        match self.peek_operand() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                let start = Start::of(&self.next());
                Ok(self.alloc(NodeKind::Empty, start))
            }
            SyntaxKind::VarKeyword => self.parse_var_statement(),
            SyntaxKind::FunctionKeyword => self.parse_function_at_statement_start(context),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ContinueKeyword => self.parse_break_or_continue(false),
            SyntaxKind::BreakKeyword => self.parse_break_or_continue(true),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::WithKeyword => self.parse_with_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::DebuggerKeyword => {
                let start = Start::of(&self.next());
                self.finish_statement(NodeKind::Debugger, start)
            }
            SyntaxKind::Identifier if self.is_labelled_statement() => self.parse_labelled_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// `ident :` ahead? Looks two tokens ahead and rewinds.
    fn is_labelled_statement(&mut self) -> bool {
        let checkpoint = self.scanner.checkpoint();
        self.scanner.next_token();
        let is_label = self.peek_operator() == SyntaxKind::ColonToken;
        self.scanner.rewind(checkpoint);
        is_label
    }

    fn parse_block(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.expect(SyntaxKind::OpenBraceToken)?);
        let body = self.parse_statement_list(ListEnd::CloseBrace, StatementContext::Nested)?;
        self.expect(SyntaxKind::CloseBraceToken)?;
        Ok(self.alloc(NodeKind::Block { body }, start))
    }

    fn parse_var_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        let declarators = self.parse_var_declarators(false)?;
        self.finish_statement(NodeKind::VarDeclaration { declarators }, start)
    }

    fn parse_var_declarators(&mut self, no_in: bool) -> PResult<Vec<NodeId>> {
        let mut declarators = Vec::new();
        loop {
            let name_token = self.expect_identifier()?;
            let start = Start::of(&name_token);
            let name = self.intern(&name_token);
            let init = if self.peek_operator() == SyntaxKind::EqualsToken {
                self.next();
                Some(self.parse_assignment_expression(no_in)?)
            } else {
                None
            };
            declarators.push(self.alloc(NodeKind::VariableDeclarator { name, init }, start));
            if self.peek_operator() != SyntaxKind::CommaToken {
                break;
            }
            self.next();
        }
        Ok(declarators)
    }

    fn parse_expression_statement(&mut self) -> PResult<NodeId> {
        let start = self.start_of_next();
        let expression = self.parse_expression(false)?;
        self.finish_statement(NodeKind::ExpressionStatement { expression }, start)
    }

    /// A statement starting with `function`. A named function directly in
    /// a program or function body is a hoisted declaration. Anywhere else
    /// the literal begins an expression statement: if nothing follows it,
    /// it is an expression-statement function whose value is discarded;
    /// otherwise it is an ordinary function expression.
    fn parse_function_at_statement_start(&mut self, context: StatementContext) -> PResult<NodeId> {
        let start = self.start_of_next();
        let (name, params, body) = self.parse_function_parts()?;

        if context == StatementContext::Body && name.is_some() {
            let function = FunctionNode { name, params, body, kind: FunctionKind::Statement };
            return Ok(self.alloc(NodeKind::Function(function), start));
        }

        self.scanner.set_regex_allowed(false);
        let next = self.scanner.peek();
        let stands_alone = next.kind == SyntaxKind::SemicolonToken
            || next.kind == SyntaxKind::CloseBraceToken
            || next.is_eof()
            || next.has_preceding_line_break();

        if stands_alone {
            let function = FunctionNode { name, params, body, kind: FunctionKind::ExpressionStatement };
            let expression = self.alloc(NodeKind::Function(function), start);
            return self.finish_statement(NodeKind::ExpressionStatement { expression }, start);
        }

        let function = FunctionNode { name, params, body, kind: FunctionKind::Expression };
        let literal = self.alloc(NodeKind::Function(function), start);
        self.pending_primary = Some((literal, start));
        let expression = self.parse_expression(false)?;
        self.finish_statement(NodeKind::ExpressionStatement { expression }, start)
    }

    fn parse_if_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.expect(SyntaxKind::OpenParenToken)?;
        let test = self.parse_expression(false)?;
        self.expect(SyntaxKind::CloseParenToken)?;
        let consequent = self.parse_statement(StatementContext::Nested)?;
        // A dangling `else` binds to the nearest `if`.
        let alternate = if self.peek_operand() == SyntaxKind::ElseKeyword {
            self.next();
            Some(self.parse_statement(StatementContext::Nested)?)
        } else {
            None
        };
        Ok(self.alloc(NodeKind::If { test, consequent, alternate }, start))
    }

    fn parse_while_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.expect(SyntaxKind::OpenParenToken)?;
        let test = self.parse_expression(false)?;
        self.expect(SyntaxKind::CloseParenToken)?;
        let body = self.parse_statement(StatementContext::Nested)?;
        Ok(self.alloc(NodeKind::While { test, body }, start))
    }

    fn parse_do_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        let body = self.parse_statement(StatementContext::Nested)?;
        self.expect(SyntaxKind::WhileKeyword)?;
        self.expect(SyntaxKind::OpenParenToken)?;
        let test = self.parse_expression(false)?;
        self.expect(SyntaxKind::CloseParenToken)?;
        // The terminator after `do ... while (...)` is optional.
        self.peek_operator();
        self.eat(SyntaxKind::SemicolonToken);
        Ok(self.alloc(NodeKind::DoWhile { body, test }, start))
    }

    fn parse_for_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.expect(SyntaxKind::OpenParenToken)?;

        let init = match self.peek_operand() {
            SyntaxKind::SemicolonToken => None,
            SyntaxKind::VarKeyword => {
                let var_start = Start::of(&self.next());
                let declarators = self.parse_var_declarators(true)?;
                let single = declarators.len() == 1;
                let declaration = self.alloc(NodeKind::VarDeclaration { declarators }, var_start);
                if single && self.peek_operator() == SyntaxKind::InKeyword {
                    return self.parse_for_in_rest(declaration, start);
                }
                Some(declaration)
            }
            _ => {
                let expression_token = self.scanner.peek().clone();
                let expression = self.parse_expression(true)?;
                if self.peek_operator() == SyntaxKind::InKeyword {
                    if !self.ast.kind(expression).is_reference() {
                        return Err(self.error_at(&messages::INVALID_FOR_IN_TARGET, &[], &expression_token));
                    }
                    return self.parse_for_in_rest(expression, start);
                }
                Some(expression)
            }
        };

        self.peek_operator();
        self.expect(SyntaxKind::SemicolonToken)?;
        let test = if self.peek_operand() == SyntaxKind::SemicolonToken {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.peek_operator();
        self.expect(SyntaxKind::SemicolonToken)?;
        let update = if self.peek_operand() == SyntaxKind::CloseParenToken {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.peek_operator();
        self.expect(SyntaxKind::CloseParenToken)?;
        let body = self.parse_statement(StatementContext::Nested)?;
        Ok(self.alloc(NodeKind::For { init, test, update, body }, start))
    }

    fn parse_for_in_rest(&mut self, left: NodeId, start: Start) -> PResult<NodeId> {
        self.expect(SyntaxKind::InKeyword)?;
        let right = self.parse_expression(false)?;
        self.peek_operator();
        self.expect(SyntaxKind::CloseParenToken)?;
        let body = self.parse_statement(StatementContext::Nested)?;
        Ok(self.alloc(NodeKind::ForIn { left, right, body }, start))
    }

    fn parse_break_or_continue(&mut self, is_break: bool) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.scanner.set_regex_allowed(false);
        let has_label = matches!(
            self.scanner.peek_same_line(),
            Some(token) if token.kind == SyntaxKind::Identifier
        );
        let label = if has_label {
            let token = self.next();
            Some(self.intern(&token))
        } else {
            None
        };
        let kind = if is_break {
            NodeKind::Break { label }
        } else {
            NodeKind::Continue { label }
        };
        self.finish_statement(kind, start)
    }

    fn parse_return_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.scanner.set_regex_allowed(true);
        let has_argument = match self.scanner.peek_same_line() {
            Some(token) => !matches!(token.kind, SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken),
            None => false,
        };
        let argument = if has_argument {
            Some(self.parse_expression(false)?)
        } else {
            None
        };
        self.finish_statement(NodeKind::Return { argument }, start)
    }

    fn parse_throw_statement(&mut self) -> PResult<NodeId> {
        let throw_token = self.next();
        let start = Start::of(&throw_token);
        self.scanner.set_regex_allowed(true);
        if self.scanner.peek_same_line().is_none() {
            return Err(self.error_at(&messages::NEWLINE_AFTER_THROW, &[], &throw_token));
        }
        let argument = self.parse_expression(false)?;
        self.finish_statement(NodeKind::Throw { argument }, start)
    }

    fn parse_with_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.expect(SyntaxKind::OpenParenToken)?;
        let object = self.parse_expression(false)?;
        self.expect(SyntaxKind::CloseParenToken)?;
        let body = self.parse_statement(StatementContext::Nested)?;
        Ok(self.alloc(NodeKind::With { object, body }, start))
    }

    fn parse_switch_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        self.expect(SyntaxKind::OpenParenToken)?;
        let discriminant = self.parse_expression(false)?;
        self.expect(SyntaxKind::CloseParenToken)?;
        self.expect(SyntaxKind::OpenBraceToken)?;

        let mut clauses = Vec::new();
        let mut seen_default = false;
        loop {
            let token = self.scanner.peek().clone();
            let clause_start = Start::of(&token);
            let test = match token.kind {
                SyntaxKind::CloseBraceToken => break,
                SyntaxKind::CaseKeyword => {
                    self.next();
                    Some(self.parse_expression(false)?)
                }
                SyntaxKind::DefaultKeyword => {
                    if seen_default {
                        return Err(self.error_at(&messages::MULTIPLE_DEFAULT_CLAUSES, &[], &token));
                    }
                    seen_default = true;
                    self.next();
                    None
                }
                _ => return Err(self.unexpected(&token)),
            };
            self.peek_operator();
            self.expect(SyntaxKind::ColonToken)?;
            let body = self.parse_statement_list(ListEnd::SwitchClause, StatementContext::Nested)?;
            clauses.push(self.alloc(NodeKind::SwitchClause { test, body }, clause_start));
            self.peek_operand();
        }

        self.expect(SyntaxKind::CloseBraceToken)?;
        Ok(self.alloc(NodeKind::Switch { discriminant, clauses }, start))
    }

    fn parse_try_statement(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        let block = self.parse_block()?;

        let handler = if self.peek_operand() == SyntaxKind::CatchKeyword {
            let catch_start = Start::of(&self.next());
            self.expect(SyntaxKind::OpenParenToken)?;
            let param_token = self.expect_identifier()?;
            let param = self.intern(&param_token);
            self.expect(SyntaxKind::CloseParenToken)?;
            let body = self.parse_block()?;
            Some(self.alloc(NodeKind::Catch { param, body }, catch_start))
        } else {
            None
        };

        let finalizer = if self.peek_operand() == SyntaxKind::FinallyKeyword {
            self.next();
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            let token = self.scanner.peek().clone();
            return Err(self.error_at(&messages::CATCH_OR_FINALLY_EXPECTED, &[], &token));
        }
        Ok(self.alloc(NodeKind::Try { block, handler, finalizer }, start))
    }

    fn parse_labelled_statement(&mut self) -> PResult<NodeId> {
        let label_token = self.next();
        let start = Start::of(&label_token);
        let label = self.intern(&label_token);
        self.expect(SyntaxKind::ColonToken)?;
        let body = self.parse_statement(StatementContext::Nested)?;
        Ok(self.alloc(NodeKind::Labelled { label, body }, start))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// `function name? (params) { body }`, without allocating the function
    /// node so the caller can decide its kind.
    fn parse_function_parts(&mut self) -> PResult<(Option<jscript_core::Symbol>, Vec<Parameter>, Vec<NodeId>)> {
        self.expect(SyntaxKind::FunctionKeyword)?;
        let name = if self.peek_operand() == SyntaxKind::Identifier {
            let token = self.next();
            Some(self.intern(&token))
        } else {
            None
        };

        self.expect(SyntaxKind::OpenParenToken)?;
        let mut params = Vec::new();
        if self.peek_operand() != SyntaxKind::CloseParenToken {
            loop {
                let token = self.expect_identifier()?;
                params.push(Parameter {
                    name: self.intern(&token),
                    span: TextSpan::from_bounds(token.start, token.end),
                });
                if !self.eat(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::CloseParenToken)?;
        self.expect(SyntaxKind::OpenBraceToken)?;
        let body = self.parse_statement_list(ListEnd::CloseBrace, StatementContext::Body)?;
        self.expect(SyntaxKind::CloseBraceToken)?;
        Ok((name, params, body))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Expression: assignment expressions separated by commas.
    fn parse_expression(&mut self, no_in: bool) -> PResult<NodeId> {
        let start = self.start_of_next();
        let first = self.parse_assignment_expression(no_in)?;
        if self.peek_operator() != SyntaxKind::CommaToken {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(SyntaxKind::CommaToken) {
            expressions.push(self.parse_assignment_expression(no_in)?);
            self.peek_operator();
        }
        Ok(self.alloc(NodeKind::Comma { expressions }, start))
    }

    /// Assignment or conditional. The left side is parsed as a conditional
    /// expression; if an assignment operator follows, it becomes the target.
    /// Whether the target is assignable is checked during resolution.
    fn parse_assignment_expression(&mut self, no_in: bool) -> PResult<NodeId> {
        self.nested(|p| {
            let start = p.start_of_next();
            let target = p.parse_conditional_expression(no_in)?;
            let Some(op) = assignment_operator(p.peek_operator()) else {
                return Ok(target);
            };
            p.next();
            let value = p.parse_assignment_expression(no_in)?;
            Ok(p.alloc(NodeKind::Assign { op, target, value }, start))
        })
    }

    fn parse_conditional_expression(&mut self, no_in: bool) -> PResult<NodeId> {
        let start = self.start_of_next();
        let test = self.parse_binary_expression(OperatorPrecedence::Lowest, no_in)?;
        if self.peek_operator() != SyntaxKind::QuestionToken {
            return Ok(test);
        }
        self.next();
        let consequent = self.parse_assignment_expression(false)?;
        self.peek_operator();
        self.expect(SyntaxKind::ColonToken)?;
        let alternate = self.parse_assignment_expression(no_in)?;
        Ok(self.alloc(NodeKind::Conditional { test, consequent, alternate }, start))
    }

    /// Precedence climbing over every binary operator level from
    /// logical-or down to multiplicative.
    fn parse_binary_expression(&mut self, min_precedence: OperatorPrecedence, no_in: bool) -> PResult<NodeId> {
        let start = self.start_of_next();
        let left = self.parse_unary_expression()?;
        let mut charged = 0;
        let result = self.parse_binary_tail(left, start, min_precedence, no_in, &mut charged);
        self.release(charged, result)
    }

    /// The operator loop of precedence climbing. Every node it builds
    /// deepens the left spine of the tree by one.
    fn parse_binary_tail(
        &mut self,
        mut left: NodeId,
        start: Start,
        min_precedence: OperatorPrecedence,
        no_in: bool,
        charged: &mut u32,
    ) -> PResult<NodeId> {
        loop {
            let kind = self.peek_operator();
            if no_in && kind == SyntaxKind::InKeyword {
                break;
            }
            let precedence = get_binary_operator_precedence(kind);
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            let Some(operator) = BinaryOperator::from_token(kind) else {
                break;
            };
            self.charge(charged)?;
            self.next();
            let right = self.parse_binary_expression(precedence, no_in)?;
            left = self.alloc(operator.into_node(left, right), start);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> PResult<NodeId> {
        if self.pending_primary.is_some() {
            return self.parse_postfix_expression();
        }
        let kind = self.peek_operand();
        if let Some(op) = unary_operator(kind) {
            let start = Start::of(&self.next());
            let operand = self.nested(|p| p.parse_unary_expression())?;
            return Ok(self.alloc(NodeKind::Unary { op, operand }, start));
        }
        let update = match kind {
            SyntaxKind::PlusPlusToken => Some(UpdateOp::Increment),
            SyntaxKind::MinusMinusToken => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            let start = Start::of(&self.next());
            let operand = self.nested(|p| p.parse_unary_expression())?;
            return Ok(self.alloc(NodeKind::Update { op, prefix: true, operand }, start));
        }
        self.parse_postfix_expression()
    }

    /// A postfix `++`/`--` must be on the same line as its operand.
    fn parse_postfix_expression(&mut self) -> PResult<NodeId> {
        let start = self.start_of_next();
        let operand = self.parse_left_hand_side_expression()?;
        self.scanner.set_regex_allowed(false);
        let op = match self.scanner.peek_same_line().map(|t| t.kind) {
            Some(SyntaxKind::PlusPlusToken) => UpdateOp::Increment,
            Some(SyntaxKind::MinusMinusToken) => UpdateOp::Decrement,
            _ => return Ok(operand),
        };
        self.next();
        Ok(self.alloc(NodeKind::Update { op, prefix: false, operand }, start))
    }

    fn parse_left_hand_side_expression(&mut self) -> PResult<NodeId> {
        let start = self.start_of_next();
        let expression = if self.pending_primary.is_none() && self.peek_operand() == SyntaxKind::NewKeyword {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        self.parse_member_or_call_tail(expression, start, true)
    }

    /// `new` callee. The callee is a member expression; an argument list
    /// directly after it belongs to this `new` rather than starting a call
    /// on its result.
    fn parse_new_expression(&mut self) -> PResult<NodeId> {
        let start = Start::of(&self.next());
        let callee_start = self.start_of_next();
        let callee = if self.peek_operand() == SyntaxKind::NewKeyword {
            self.nested(|p| p.parse_new_expression())?
        } else {
            self.parse_primary_expression()?
        };
        let callee = self.parse_member_or_call_tail(callee, callee_start, false)?;

        if self.peek_operator() == SyntaxKind::OpenParenToken {
            let arguments = self.parse_arguments()?;
            let id = self.alloc(NodeKind::New { callee, arguments }, start);
            self.ast.add_flags(id, NodeFlags::HAS_ARGUMENTS);
            Ok(id)
        } else {
            Ok(self.alloc(NodeKind::New { callee, arguments: Vec::new() }, start))
        }
    }

    fn parse_member_or_call_tail(&mut self, expression: NodeId, start: Start, allow_call: bool) -> PResult<NodeId> {
        let mut charged = 0;
        let result = self.parse_member_or_call_links(expression, start, allow_call, &mut charged);
        self.release(charged, result)
    }

    fn parse_member_or_call_links(
        &mut self,
        mut expression: NodeId,
        start: Start,
        allow_call: bool,
        charged: &mut u32,
    ) -> PResult<NodeId> {
        loop {
            match self.peek_operator() {
                SyntaxKind::DotToken => {
                    self.charge(charged)?;
                    self.next();
                    self.scanner.set_regex_allowed(false);
                    let token = self.next();
                    if !token.is_identifier_name() {
                        return Err(match token.kind {
                            SyntaxKind::ErrorToken => ParseFailure::Reported,
                            _ => self.error_at(&messages::IDENTIFIER_EXPECTED, &[], &token),
                        });
                    }
                    let property = self.intern(&token);
                    expression = self.alloc(NodeKind::Member { object: expression, property }, start);
                }
                SyntaxKind::OpenBracketToken => {
                    self.charge(charged)?;
                    self.next();
                    let index = self.parse_expression(false)?;
                    self.peek_operator();
                    self.expect(SyntaxKind::CloseBracketToken)?;
                    expression = self.alloc(NodeKind::Index { object: expression, index }, start);
                }
                SyntaxKind::OpenParenToken if allow_call => {
                    self.charge(charged)?;
                    let arguments = self.parse_arguments()?;
                    expression = self.alloc(NodeKind::Call { callee: expression, arguments }, start);
                }
                _ => return Ok(expression),
            }
        }
    }

    fn parse_arguments(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(SyntaxKind::OpenParenToken)?;
        let mut arguments = Vec::new();
        if self.peek_operand() != SyntaxKind::CloseParenToken {
            loop {
                arguments.push(self.parse_assignment_expression(false)?);
                if !self.eat(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.peek_operator();
        self.expect(SyntaxKind::CloseParenToken)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> PResult<NodeId> {
        if let Some((id, _)) = self.pending_primary.take() {
            return Ok(id);
        }
        self.scanner.set_regex_allowed(true);
        let token = self.next();
        let start = Start::of(&token);
        let token_kind = token.kind;
        let kind = match token_kind {
            SyntaxKind::Identifier => NodeKind::Identifier { name: self.intern(&token) },
            SyntaxKind::ThisKeyword => NodeKind::This,
            SyntaxKind::NullKeyword => NodeKind::Literal(Literal::Null),
            SyntaxKind::TrueKeyword => NodeKind::Literal(Literal::Boolean(true)),
            SyntaxKind::FalseKeyword => NodeKind::Literal(Literal::Boolean(false)),
            SyntaxKind::NumericLiteral => {
                let value = token.value.unwrap_or(f64::NAN);
                let id = self.alloc(NodeKind::Literal(Literal::Number(value)), start);
                if token.flags.contains(TokenFlags::LEGACY_OCTAL) {
                    self.ast.add_flags(id, NodeFlags::LEGACY_OCTAL);
                }
                return Ok(id);
            }
            SyntaxKind::StringLiteral => NodeKind::Literal(Literal::String(token.text.clone())),
            SyntaxKind::RegularExpressionLiteral => {
                let (pattern, flags) = token.regexp_parts().unwrap_or(("", ""));
                if !is_valid_regexp_flags(flags) {
                    return Err(self.error_at(&messages::INVALID_REGEXP_FLAGS, &[flags], &token));
                }
                NodeKind::Literal(Literal::RegExp {
                    pattern: pattern.to_string(),
                    flags: flags.to_string(),
                })
            }
            SyntaxKind::OpenParenToken => {
                let inner = self.parse_expression(false)?;
                self.peek_operator();
                self.expect(SyntaxKind::CloseParenToken)?;
                self.ast.add_flags(inner, NodeFlags::PARENTHESIZED);
                return Ok(inner);
            }
            SyntaxKind::OpenBracketToken => return self.parse_array_literal(start),
            SyntaxKind::OpenBraceToken => return self.parse_object_literal(start),
            SyntaxKind::FunctionKeyword => {
                self.scanner.unget(token);
                let (name, params, body) = self.parse_function_parts()?;
                let function = FunctionNode { name, params, body, kind: FunctionKind::Expression };
                NodeKind::Function(function)
            }
            _ => return Err(self.unexpected(&token)),
        };
        Ok(self.alloc(kind, start))
    }

    /// Array literal after `[`. Elisions become holes; one trailing comma
    /// adds no element.
    fn parse_array_literal(&mut self, start: Start) -> PResult<NodeId> {
        let mut elements = Vec::new();
        loop {
            match self.peek_operand() {
                SyntaxKind::CloseBracketToken => {
                    self.next();
                    break;
                }
                SyntaxKind::CommaToken => {
                    self.next();
                    elements.push(None);
                    continue;
                }
                _ => {}
            }
            elements.push(Some(self.parse_assignment_expression(false)?));
            if self.peek_operator() == SyntaxKind::CloseBracketToken {
                self.next();
                break;
            }
            self.expect(SyntaxKind::CommaToken)?;
        }
        Ok(self.alloc(NodeKind::ArrayLiteral { elements }, start))
    }

    /// Object literal after `{`.
    fn parse_object_literal(&mut self, start: Start) -> PResult<NodeId> {
        let mut properties = Vec::new();
        loop {
            self.scanner.set_regex_allowed(false);
            let token = self.next();
            let name = match token.kind {
                SyntaxKind::CloseBraceToken => break,
                SyntaxKind::StringLiteral => PropertyName::String(token.text.clone()),
                SyntaxKind::NumericLiteral => PropertyName::Number(token.value.unwrap_or(f64::NAN)),
                _ if token.is_identifier_name() => PropertyName::Identifier(self.intern(&token)),
                _ => return Err(self.unexpected(&token)),
            };
            self.peek_operator();
            self.expect(SyntaxKind::ColonToken)?;
            let value = self.parse_assignment_expression(false)?;
            properties.push(ObjectProperty { name, value });
            match self.peek_operator() {
                SyntaxKind::CommaToken => {
                    self.next();
                }
                SyntaxKind::CloseBraceToken => {
                    self.next();
                    break;
                }
                _ => {
                    let token = self.scanner.peek().clone();
                    return Err(self.expected(SyntaxKind::CloseBraceToken, &token));
                }
            }
        }
        Ok(self.alloc(NodeKind::ObjectLiteral { properties }, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(source: &str) -> String {
        Parser::new(source).parse().unwrap().dump()
    }

    #[test]
    fn test_precedence_climbing() {
        let a = dump("a + b * c;");
        let b = dump("a + (b * c);");
        assert_eq!(a, b);
        assert_ne!(dump("(a + b) * c;"), a);
    }

    #[test]
    fn test_nesting_limit_is_fatal() {
        let source = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        let result = Parser::new(&source).with_max_nesting_depth(20).parse();
        assert!(matches!(result, Err(ParseError::NestingTooDeep { limit: 20, .. })));
    }

    #[test]
    fn test_chain_links_are_charged_and_released() {
        let long = "a + b + c + d + e + f + g + h;";
        let result = Parser::new(long).with_max_nesting_depth(6).parse();
        assert!(matches!(result, Err(ParseError::NestingTooDeep { limit: 6, .. })));

        let short = "a + b + c;\n".repeat(20);
        assert!(Parser::new(&short).with_max_nesting_depth(6).parse().is_ok());

        let calls = "f()()()()()()()();";
        assert!(Parser::new(calls).with_max_nesting_depth(6).parse().is_err());
        assert!(Parser::new("o.a.b(1);").with_max_nesting_depth(6).parse().is_ok());
    }

    #[test]
    fn test_regex_in_operand_position() {
        let ast = Parser::new("x = /a+/g;").parse().unwrap();
        assert!(ast.dump().contains("/a+/g"));
    }

    #[test]
    fn test_division_in_operator_position() {
        let ast = Parser::new("x = a / b / c;").parse().unwrap();
        assert_eq!(ast.dump(), "(program (expr (= x (/ (/ a b) c))))");
    }
}
