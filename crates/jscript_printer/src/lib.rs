//! jscript_printer: AST to source text.
//!
//! Prints every node kind back to source. Parentheses are emitted only
//! where operator precedence (or a statement-start ambiguity) requires
//! them, so reparsing the output yields a tree with the same shape.

use jscript_ast::node::*;
use jscript_ast::Ast;
use jscript_core::Symbol;
use jscript_convert::number_to_string;

/// Options for the printer.
pub struct PrinterOptions {
    /// Indentation string.
    pub indent_str: String,
    /// Newline string.
    pub new_line: String,
    /// Whether to emit a trailing newline.
    pub trailing_newline: bool,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
            new_line: "\n".to_string(),
            trailing_newline: true,
        }
    }
}

/// Binding strength of an expression form, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Comma,
    Assignment,
    Conditional,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    LeftHandSide,
    Primary,
}

impl Precedence {
    /// The next tighter level. Right operands of left-associative
    /// operators are printed at this level.
    fn tighter(self) -> Precedence {
        use Precedence::*;
        match self {
            Comma => Assignment,
            Assignment => Conditional,
            Conditional => LogicalOr,
            LogicalOr => LogicalAnd,
            LogicalAnd => BitwiseOr,
            BitwiseOr => BitwiseXor,
            BitwiseXor => BitwiseAnd,
            BitwiseAnd => Equality,
            Equality => Relational,
            Relational => Shift,
            Shift => Additive,
            Additive => Multiplicative,
            Multiplicative => Unary,
            Unary => Postfix,
            Postfix => LeftHandSide,
            LeftHandSide | Primary => Primary,
        }
    }
}

fn binary_precedence(op: BinaryOp) -> Precedence {
    match op {
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Precedence::Multiplicative,
        BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => Precedence::Shift,
        BinaryOp::BitAnd => Precedence::BitwiseAnd,
        BinaryOp::BitXor => Precedence::BitwiseXor,
        BinaryOp::BitOr => Precedence::BitwiseOr,
    }
}

fn precedence_of(kind: &NodeKind) -> Precedence {
    match kind {
        NodeKind::Comma { .. } => Precedence::Comma,
        NodeKind::Assign { .. } => Precedence::Assignment,
        NodeKind::Conditional { .. } => Precedence::Conditional,
        NodeKind::Logical { op: LogicalOp::Or, .. } => Precedence::LogicalOr,
        NodeKind::Logical { op: LogicalOp::And, .. } => Precedence::LogicalAnd,
        NodeKind::Binary { op, .. } => binary_precedence(*op),
        NodeKind::Equality { .. } => Precedence::Equality,
        NodeKind::Relational { .. } => Precedence::Relational,
        NodeKind::Unary { .. } | NodeKind::Update { prefix: true, .. } => Precedence::Unary,
        NodeKind::Update { prefix: false, .. } => Precedence::Postfix,
        NodeKind::Call { .. } | NodeKind::New { .. } | NodeKind::Member { .. } | NodeKind::Index { .. } => {
            Precedence::LeftHandSide
        }
        _ => Precedence::Primary,
    }
}

/// Print a whole tree with default options.
pub fn print(ast: &Ast) -> String {
    Printer::new(ast).print_program()
}

/// The printer converts AST nodes to text.
pub struct Printer<'a> {
    output: String,
    indent_level: u32,
    options: PrinterOptions,
    ast: &'a Ast,
}

impl<'a> Printer<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self::with_options(ast, PrinterOptions::default())
    }

    pub fn with_options(ast: &'a Ast, options: PrinterOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            indent_level: 0,
            options,
            ast,
        }
    }

    /// Print the tree's root program.
    pub fn print_program(&mut self) -> String {
        let ast = self.ast;
        self.output.clear();
        if let Some(root) = ast.root() {
            match ast.kind(root) {
                NodeKind::Program { body } => {
                    for (i, statement) in body.iter().enumerate() {
                        if i > 0 {
                            self.write_newline();
                        }
                        self.write_indent();
                        self.print_statement(*statement);
                    }
                }
                _ => self.print_node(root),
            }
        }
        if self.options.trailing_newline && !self.output.is_empty() {
            self.write_newline();
        }
        std::mem::take(&mut self.output)
    }

    /// Print one node, as a statement or as an expression depending on
    /// its kind.
    pub fn print_node_to_string(&mut self, id: NodeId) -> String {
        self.output.clear();
        self.print_node(id);
        std::mem::take(&mut self.output)
    }

    fn print_node(&mut self, id: NodeId) {
        let kind = self.ast.kind(id);
        if kind.is_statement() || matches!(kind, NodeKind::Program { .. } | NodeKind::SwitchClause { .. } | NodeKind::Catch { .. }) {
            self.print_statement(id);
        } else {
            self.print_expression(id, Precedence::Comma);
        }
    }

    // ========================================================================
    // Statement printing
    // ========================================================================

    fn print_statement(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Program { body } => {
                for (i, statement) in body.iter().enumerate() {
                    if i > 0 {
                        self.write_newline();
                        self.write_indent();
                    }
                    self.print_statement(*statement);
                }
            }
            NodeKind::Block { body } => self.print_block(body),
            NodeKind::Empty => self.write(";"),
            NodeKind::ExpressionStatement { expression } => {
                let expression = *expression;
                if self.needs_statement_parens(expression) {
                    self.write("(");
                    self.print_expression(expression, Precedence::Comma);
                    self.write(")");
                } else {
                    self.print_expression(expression, Precedence::Comma);
                }
                self.write(";");
            }
            NodeKind::VarDeclaration { declarators } => {
                self.print_var_declaration(declarators, false);
                self.write(";");
            }
            NodeKind::Function(function) => self.print_function(function),
            NodeKind::If { test, consequent, alternate } => {
                self.write("if (");
                self.print_expression(*test, Precedence::Comma);
                self.write(") ");
                self.print_statement(*consequent);
                if let Some(alternate) = alternate {
                    self.write(" else ");
                    self.print_statement(*alternate);
                }
            }
            NodeKind::While { test, body } => {
                self.write("while (");
                self.print_expression(*test, Precedence::Comma);
                self.write(") ");
                self.print_statement(*body);
            }
            NodeKind::DoWhile { body, test } => {
                self.write("do ");
                self.print_statement(*body);
                self.write(" while (");
                self.print_expression(*test, Precedence::Comma);
                self.write(");");
            }
            NodeKind::For { init, test, update, body } => {
                self.write("for (");
                if let Some(init) = init {
                    self.print_for_head(*init);
                }
                self.write(";");
                if let Some(test) = test {
                    self.write(" ");
                    self.print_expression(*test, Precedence::Comma);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.print_expression(*update, Precedence::Comma);
                }
                self.write(") ");
                self.print_statement(*body);
            }
            NodeKind::ForIn { left, right, body } => {
                self.write("for (");
                self.print_for_head(*left);
                self.write(" in ");
                self.print_expression(*right, Precedence::Comma);
                self.write(") ");
                self.print_statement(*body);
            }
            NodeKind::Switch { discriminant, clauses } => {
                self.write("switch (");
                self.print_expression(*discriminant, Precedence::Comma);
                self.write(") {");
                for clause in clauses {
                    self.write_newline();
                    self.write_indent();
                    self.print_statement(*clause);
                }
                if !clauses.is_empty() {
                    self.write_newline();
                    self.write_indent();
                }
                self.write("}");
            }
            NodeKind::SwitchClause { test, body } => {
                match test {
                    Some(test) => {
                        self.write("case ");
                        self.print_expression(*test, Precedence::Comma);
                        self.write(":");
                    }
                    None => self.write("default:"),
                }
                self.increase_indent();
                for statement in body {
                    self.write_newline();
                    self.write_indent();
                    self.print_statement(*statement);
                }
                self.decrease_indent();
            }
            NodeKind::Try { block, handler, finalizer } => {
                self.write("try ");
                self.print_statement(*block);
                if let Some(handler) = handler {
                    self.write(" ");
                    self.print_statement(*handler);
                }
                if let Some(finalizer) = finalizer {
                    self.write(" finally ");
                    self.print_statement(*finalizer);
                }
            }
            NodeKind::Catch { param, body } => {
                self.write("catch (");
                self.write(ast.name(*param));
                self.write(") ");
                self.print_statement(*body);
            }
            NodeKind::Throw { argument } => {
                self.write("throw ");
                self.print_expression(*argument, Precedence::Comma);
                self.write(";");
            }
            NodeKind::Return { argument } => {
                self.write("return");
                if let Some(argument) = argument {
                    self.write(" ");
                    self.print_expression(*argument, Precedence::Comma);
                }
                self.write(";");
            }
            NodeKind::Break { label } => self.print_jump("break", *label),
            NodeKind::Continue { label } => self.print_jump("continue", *label),
            NodeKind::Labelled { label, body } => {
                self.write(ast.name(*label));
                self.write(": ");
                self.print_statement(*body);
            }
            NodeKind::With { object, body } => {
                self.write("with (");
                self.print_expression(*object, Precedence::Comma);
                self.write(") ");
                self.print_statement(*body);
            }
            NodeKind::Debugger => self.write("debugger;"),
            // An expression in statement position outside an
            // ExpressionStatement only arises from hand-built trees.
            _ => {
                self.print_expression(id, Precedence::Comma);
                self.write(";");
            }
        }
    }

    fn print_block(&mut self, body: &[NodeId]) {
        self.write("{");
        if !body.is_empty() {
            self.increase_indent();
            for statement in body {
                self.write_newline();
                self.write_indent();
                self.print_statement(*statement);
            }
            self.decrease_indent();
            self.write_newline();
            self.write_indent();
        }
        self.write("}");
    }

    fn print_jump(&mut self, keyword: &str, label: Option<Symbol>) {
        let ast = self.ast;
        self.write(keyword);
        if let Some(label) = label {
            self.write(" ");
            self.write(ast.name(label));
        }
        self.write(";");
    }

    fn print_var_declaration(&mut self, declarators: &[NodeId], in_for_head: bool) {
        let ast = self.ast;
        self.write("var ");
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let NodeKind::VariableDeclarator { name, init } = ast.kind(*declarator) {
                self.write(ast.name(*name));
                if let Some(init) = init {
                    self.write(" = ");
                    if in_for_head && self.contains_in(*init) {
                        self.write("(");
                        self.print_expression(*init, Precedence::Comma);
                        self.write(")");
                    } else {
                        self.print_expression(*init, Precedence::Assignment);
                    }
                }
            }
        }
    }

    /// A `for` initializer or `for-in` target. A bare `in` there would
    /// end the head early, so expressions containing one are wrapped.
    fn print_for_head(&mut self, id: NodeId) {
        let ast = self.ast;
        if let NodeKind::VarDeclaration { declarators } = ast.kind(id) {
            self.print_var_declaration(declarators, true);
        } else if self.contains_in(id) {
            self.write("(");
            self.print_expression(id, Precedence::Comma);
            self.write(")");
        } else {
            self.print_expression(id, Precedence::Comma);
        }
    }

    fn print_function(&mut self, function: &FunctionNode) {
        let ast = self.ast;
        self.write("function");
        if let Some(name) = function.name {
            self.write(" ");
            self.write(ast.name(name));
        }
        self.write("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(ast.name(param.name));
        }
        self.write(") ");
        self.print_block(&function.body);
    }

    // ========================================================================
    // Expression printing
    // ========================================================================

    fn print_expression(&mut self, id: NodeId, min: Precedence) {
        let kind = self.ast.kind(id);
        if precedence_of(kind) < min {
            self.write("(");
            self.print_expression_inner(id);
            self.write(")");
        } else {
            self.print_expression_inner(id);
        }
    }

    fn print_expression_inner(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Identifier { name } => self.write(ast.name(*name)),
            NodeKind::Literal(literal) => self.print_literal(literal),
            NodeKind::This => self.write("this"),
            NodeKind::ArrayLiteral { elements } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(element) = element {
                        self.print_expression(*element, Precedence::Assignment);
                    }
                }
                // A trailing hole needs its own comma to survive.
                if matches!(elements.last(), Some(None)) {
                    self.write(",");
                }
                self.write("]");
            }
            NodeKind::ObjectLiteral { properties } => {
                if properties.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{");
                for (i, property) in properties.iter().enumerate() {
                    self.write(if i > 0 { ", " } else { " " });
                    match &property.name {
                        PropertyName::Identifier(name) => self.write(ast.name(*name)),
                        PropertyName::String(text) => self.write_string(text),
                        PropertyName::Number(value) => self.write_number(*value),
                    }
                    self.write(": ");
                    self.print_expression(property.value, Precedence::Assignment);
                }
                self.write(" }");
            }
            NodeKind::Function(function) => self.print_function(function),
            NodeKind::Member { object, property } => {
                self.print_member_object(*object);
                self.write(".");
                self.write(ast.name(*property));
            }
            NodeKind::Index { object, index } => {
                self.print_member_object(*object);
                self.write("[");
                self.print_expression(*index, Precedence::Comma);
                self.write("]");
            }
            NodeKind::Call { callee, arguments } => {
                self.print_expression(*callee, Precedence::LeftHandSide);
                self.print_arguments(arguments);
            }
            NodeKind::New { callee, arguments } => {
                self.write("new ");
                if self.contains_call(*callee) || precedence_of(ast.kind(*callee)) < Precedence::LeftHandSide {
                    self.write("(");
                    self.print_expression(*callee, Precedence::Comma);
                    self.write(")");
                } else {
                    self.print_expression(*callee, Precedence::LeftHandSide);
                }
                // Always written with an argument list so a following
                // member access cannot be absorbed into the callee.
                self.print_arguments(arguments);
            }
            NodeKind::Unary { op, operand } => {
                self.write(op.text());
                if op.is_word() || self.starts_with_sign(*op, *operand) {
                    self.write(" ");
                }
                self.print_expression(*operand, Precedence::Unary);
            }
            NodeKind::Update { op, prefix: true, operand } => {
                self.write(op.text());
                self.print_expression(*operand, Precedence::Unary);
            }
            NodeKind::Update { op, prefix: false, operand } => {
                self.print_expression(*operand, Precedence::LeftHandSide);
                self.write(op.text());
            }
            NodeKind::Binary { op, left, right } => {
                self.print_binary(binary_precedence(*op), op.text(), *left, *right);
            }
            NodeKind::Relational { op, left, right } => {
                self.print_binary(Precedence::Relational, op.text(), *left, *right);
            }
            NodeKind::Equality { op, left, right } => {
                self.print_binary(Precedence::Equality, op.text(), *left, *right);
            }
            NodeKind::Logical { op, left, right } => {
                let precedence = precedence_of(ast.kind(id));
                self.print_binary(precedence, op.text(), *left, *right);
            }
            NodeKind::Conditional { test, consequent, alternate } => {
                self.print_expression(*test, Precedence::LogicalOr);
                self.write(" ? ");
                self.print_expression(*consequent, Precedence::Assignment);
                self.write(" : ");
                self.print_expression(*alternate, Precedence::Assignment);
            }
            NodeKind::Assign { op, target, value } => {
                self.print_expression(*target, Precedence::Conditional);
                self.write(" ");
                self.write(op.text());
                self.write(" ");
                self.print_expression(*value, Precedence::Assignment);
            }
            NodeKind::Comma { expressions } => {
                for (i, expression) in expressions.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_expression(*expression, Precedence::Assignment);
                }
            }
            // Statements never appear in expression position in a parsed
            // tree.
            _ => self.print_statement(id),
        }
    }

    fn print_binary(&mut self, precedence: Precedence, operator: &str, left: NodeId, right: NodeId) {
        self.print_expression(left, precedence);
        self.write(" ");
        self.write(operator);
        self.write(" ");
        self.print_expression(right, precedence.tighter());
    }

    fn print_arguments(&mut self, arguments: &[NodeId]) {
        self.write("(");
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expression(*argument, Precedence::Assignment);
        }
        self.write(")");
    }

    /// Object of a member or index access. Number literals are wrapped so
    /// the dot is not read as a decimal point.
    fn print_member_object(&mut self, object: NodeId) {
        if matches!(self.ast.kind(object), NodeKind::Literal(Literal::Number(_))) {
            self.write("(");
            self.print_expression(object, Precedence::Comma);
            self.write(")");
        } else {
            self.print_expression(object, Precedence::LeftHandSide);
        }
    }

    fn print_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.write("null"),
            Literal::Boolean(true) => self.write("true"),
            Literal::Boolean(false) => self.write("false"),
            Literal::Number(value) => self.write_number(*value),
            Literal::String(text) => self.write_string(text),
            Literal::RegExp { pattern, flags } => {
                self.write("/");
                self.write(pattern);
                self.write("/");
                self.write(flags);
            }
        }
    }

    fn write_number(&mut self, value: f64) {
        if value.is_infinite() {
            // Overflows back to infinity when reparsed.
            self.write("1e999");
        } else {
            let text = number_to_string(value);
            self.write(&text);
        }
    }

    fn write_string(&mut self, text: &str) {
        let escaped = escape_string(text);
        self.write(&escaped);
    }

    // ========================================================================
    // Shape queries
    // ========================================================================

    /// `- -x` and `+ +x` need a space to stay two operators.
    fn starts_with_sign(&self, op: UnaryOp, operand: NodeId) -> bool {
        let sign = match op {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            _ => return false,
        };
        match self.ast.kind(operand) {
            NodeKind::Unary { op: inner, .. } => inner.text() == sign,
            NodeKind::Update { op: inner, prefix: true, .. } => inner.text().starts_with(sign),
            _ => false,
        }
    }

    /// Whether the expression's leftmost token would make a statement
    /// parse as something else: `{` opens a block, `function` a
    /// declaration.
    fn needs_statement_parens(&self, expression: NodeId) -> bool {
        let mut current = expression;
        loop {
            current = match self.ast.kind(current) {
                NodeKind::ObjectLiteral { .. } => return true,
                NodeKind::Function(function) => return function.kind != FunctionKind::ExpressionStatement,
                NodeKind::Member { object, .. } | NodeKind::Index { object, .. } => *object,
                NodeKind::Call { callee, .. } => *callee,
                NodeKind::Binary { left, .. }
                | NodeKind::Relational { left, .. }
                | NodeKind::Equality { left, .. }
                | NodeKind::Logical { left, .. } => *left,
                NodeKind::Conditional { test, .. } => *test,
                NodeKind::Assign { target, .. } => *target,
                NodeKind::Update { prefix: false, operand, .. } => *operand,
                NodeKind::Comma { expressions } => match expressions.first() {
                    Some(first) => *first,
                    None => return false,
                },
                _ => return false,
            };
        }
    }

    /// Whether a call appears on the member chain of a `new` callee.
    fn contains_call(&self, id: NodeId) -> bool {
        match self.ast.kind(id) {
            NodeKind::Call { .. } => true,
            NodeKind::Member { object, .. } | NodeKind::Index { object, .. } => self.contains_call(*object),
            _ => false,
        }
    }

    /// Whether an `in` operator occurs outside any function body.
    fn contains_in(&self, id: NodeId) -> bool {
        match self.ast.kind(id) {
            NodeKind::Relational { op: RelationalOp::In, .. } => true,
            NodeKind::Function(_) => false,
            kind => kind.children().into_iter().any(|child| self.contains_in(child)),
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_newline(&mut self) {
        self.output.push_str(&self.options.new_line);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

/// Quote a string value as a double-quoted literal.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
