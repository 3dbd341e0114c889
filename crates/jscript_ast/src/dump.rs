//! Position-free S-expression rendering of a tree.
//!
//! Two trees with equal dumps have the same shape, which is how tests
//! compare a reparsed program against the original.

use crate::ast::Ast;
use crate::node::{AssignOp, FunctionKind, Literal, NodeId, NodeKind, PropertyName};
use std::fmt::Write;

impl Ast {
    /// Dump the whole tree, or an empty string for an empty arena.
    pub fn dump(&self) -> String {
        match self.root() {
            Some(root) => self.dump_node(root),
            None => String::new(),
        }
    }

    pub fn dump_node(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    fn write_list(&self, out: &mut String, ids: &[NodeId]) {
        for id in ids {
            out.push(' ');
            self.write_node(out, *id);
        }
    }

    fn write_opt(&self, out: &mut String, id: Option<NodeId>) {
        out.push(' ');
        match id {
            Some(id) => self.write_node(out, id),
            None => out.push('_'),
        }
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        let _ = match self.kind(id) {
            NodeKind::Program { body } => {
                out.push_str("(program");
                self.write_list(out, body);
                write!(out, ")")
            }
            NodeKind::Identifier { name } => write!(out, "{}", self.name(*name)),
            NodeKind::Literal(lit) => match lit {
                Literal::Null => write!(out, "null"),
                Literal::Boolean(b) => write!(out, "{}", b),
                Literal::Number(n) => write!(out, "{:?}", n),
                Literal::String(s) => write!(out, "{:?}", s),
                Literal::RegExp { pattern, flags } => write!(out, "/{}/{}", pattern, flags),
            },
            NodeKind::This => write!(out, "this"),
            NodeKind::ArrayLiteral { elements } => {
                out.push_str("(array");
                for element in elements {
                    self.write_opt(out, *element);
                }
                write!(out, ")")
            }
            NodeKind::ObjectLiteral { properties } => {
                out.push_str("(object");
                for prop in properties {
                    let _ = match &prop.name {
                        PropertyName::Identifier(s) => write!(out, " ({}", self.name(*s)),
                        PropertyName::String(s) => write!(out, " ({:?}", s),
                        PropertyName::Number(n) => write!(out, " ({:?}", n),
                    };
                    self.write_opt(out, Some(prop.value));
                    out.push(')');
                }
                write!(out, ")")
            }
            NodeKind::Function(f) => {
                let kind = match f.kind {
                    FunctionKind::Statement => "function-statement",
                    FunctionKind::Expression => "function",
                    FunctionKind::ExpressionStatement => "function-expression-statement",
                };
                write!(out, "({} {} (", kind, f.name.map(|n| self.name(n)).unwrap_or("_")).ok();
                let params: Vec<&str> = f.params.iter().map(|p| self.name(p.name)).collect();
                out.push_str(&params.join(" "));
                out.push(')');
                self.write_list(out, &f.body);
                write!(out, ")")
            }
            NodeKind::Member { object, property } => {
                out.push_str("(. ");
                self.write_node(out, *object);
                write!(out, " {})", self.name(*property))
            }
            NodeKind::Index { object, index } => {
                out.push_str("([]");
                self.write_list(out, &[*object, *index]);
                write!(out, ")")
            }
            NodeKind::Call { callee, arguments } => {
                out.push_str("(call");
                self.write_opt(out, Some(*callee));
                self.write_list(out, arguments);
                write!(out, ")")
            }
            NodeKind::New { callee, arguments } => {
                out.push_str("(new");
                self.write_opt(out, Some(*callee));
                self.write_list(out, arguments);
                write!(out, ")")
            }
            NodeKind::Unary { op, operand } => {
                write!(out, "({}", op.text()).ok();
                self.write_opt(out, Some(*operand));
                write!(out, ")")
            }
            NodeKind::Update { op, prefix, operand } => {
                let fix = if *prefix { "pre" } else { "post" };
                write!(out, "({}{}", fix, op.text()).ok();
                self.write_opt(out, Some(*operand));
                write!(out, ")")
            }
            NodeKind::Binary { op, left, right } => self.write_binary(out, op.text(), *left, *right),
            NodeKind::Relational { op, left, right } => self.write_binary(out, op.text(), *left, *right),
            NodeKind::Equality { op, left, right } => self.write_binary(out, op.text(), *left, *right),
            NodeKind::Logical { op, left, right } => self.write_binary(out, op.text(), *left, *right),
            NodeKind::Conditional { test, consequent, alternate } => {
                out.push_str("(?");
                self.write_list(out, &[*test, *consequent, *alternate]);
                write!(out, ")")
            }
            NodeKind::Assign { op, target, value } => {
                let text = match op {
                    AssignOp::Assign => "=",
                    other => other.text(),
                };
                self.write_binary(out, text, *target, *value)
            }
            NodeKind::Comma { expressions } => {
                out.push_str("(,");
                self.write_list(out, expressions);
                write!(out, ")")
            }
            NodeKind::Block { body } => {
                out.push_str("(block");
                self.write_list(out, body);
                write!(out, ")")
            }
            NodeKind::Empty => write!(out, "(empty)"),
            NodeKind::ExpressionStatement { expression } => {
                out.push_str("(expr");
                self.write_opt(out, Some(*expression));
                write!(out, ")")
            }
            NodeKind::VarDeclaration { declarators } => {
                out.push_str("(var");
                self.write_list(out, declarators);
                write!(out, ")")
            }
            NodeKind::VariableDeclarator { name, init } => {
                write!(out, "({}", self.name(*name)).ok();
                if init.is_some() {
                    self.write_opt(out, *init);
                }
                write!(out, ")")
            }
            NodeKind::If { test, consequent, alternate } => {
                out.push_str("(if");
                self.write_list(out, &[*test, *consequent]);
                self.write_opt(out, *alternate);
                write!(out, ")")
            }
            NodeKind::While { test, body } => {
                out.push_str("(while");
                self.write_list(out, &[*test, *body]);
                write!(out, ")")
            }
            NodeKind::DoWhile { body, test } => {
                out.push_str("(do");
                self.write_list(out, &[*body, *test]);
                write!(out, ")")
            }
            NodeKind::For { init, test, update, body } => {
                out.push_str("(for");
                self.write_opt(out, *init);
                self.write_opt(out, *test);
                self.write_opt(out, *update);
                self.write_opt(out, Some(*body));
                write!(out, ")")
            }
            NodeKind::ForIn { left, right, body } => {
                out.push_str("(for-in");
                self.write_list(out, &[*left, *right, *body]);
                write!(out, ")")
            }
            NodeKind::Switch { discriminant, clauses } => {
                out.push_str("(switch");
                self.write_opt(out, Some(*discriminant));
                self.write_list(out, clauses);
                write!(out, ")")
            }
            NodeKind::SwitchClause { test, body } => {
                match test {
                    Some(test) => {
                        out.push_str("(case");
                        self.write_opt(out, Some(*test));
                    }
                    None => out.push_str("(default"),
                }
                self.write_list(out, body);
                write!(out, ")")
            }
            NodeKind::Try { block, handler, finalizer } => {
                out.push_str("(try");
                self.write_opt(out, Some(*block));
                self.write_opt(out, *handler);
                self.write_opt(out, *finalizer);
                write!(out, ")")
            }
            NodeKind::Catch { param, body } => {
                write!(out, "(catch {}", self.name(*param)).ok();
                self.write_opt(out, Some(*body));
                write!(out, ")")
            }
            NodeKind::Throw { argument } => {
                out.push_str("(throw");
                self.write_opt(out, Some(*argument));
                write!(out, ")")
            }
            NodeKind::Return { argument } => {
                out.push_str("(return");
                if argument.is_some() {
                    self.write_opt(out, *argument);
                }
                write!(out, ")")
            }
            NodeKind::Break { label } => match label {
                Some(l) => write!(out, "(break {})", self.name(*l)),
                None => write!(out, "(break)"),
            },
            NodeKind::Continue { label } => match label {
                Some(l) => write!(out, "(continue {})", self.name(*l)),
                None => write!(out, "(continue)"),
            },
            NodeKind::Labelled { label, body } => {
                write!(out, "(label {}", self.name(*label)).ok();
                self.write_opt(out, Some(*body));
                write!(out, ")")
            }
            NodeKind::With { object, body } => {
                out.push_str("(with");
                self.write_list(out, &[*object, *body]);
                write!(out, ")")
            }
            NodeKind::Debugger => write!(out, "(debugger)"),
        };
    }

    fn write_binary(&self, out: &mut String, op: &str, left: NodeId, right: NodeId) -> std::fmt::Result {
        write!(out, "({}", op)?;
        self.write_list(out, &[left, right]);
        write!(out, ")")
    }
}
